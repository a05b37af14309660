use std::path::Path;

use super::traits::TextRecognizer;

/// Extract plain text from a source file.
///
/// Images go through the injected recognizer; PDFs use the native text
/// layer, first page only — recognition latency grows with page count and
/// the first page carries the classification signal. Scanned PDFs with no
/// text layer read as empty. All failures degrade to an empty string: text
/// extraction alone never fails an import.
pub fn extract_text(source: &Path, mime_type: &str, recognizer: &dyn TextRecognizer) -> String {
    if mime_type.starts_with("image/") {
        return match recognizer.recognize(source) {
            Ok(text) => text,
            Err(e) => {
                tracing::debug!(file = %source.display(), error = %e, "Text recognition failed");
                String::new()
            }
        };
    }

    if mime_type == "application/pdf" {
        return first_page_text(source);
    }

    String::new()
}

/// Text layer of the first PDF page, or empty when there is none.
fn first_page_text(source: &Path) -> String {
    let bytes = match std::fs::read(source) {
        Ok(b) => b,
        Err(e) => {
            tracing::debug!(file = %source.display(), error = %e, "Could not read PDF");
            return String::new();
        }
    };

    match pdf_extract::extract_text_from_mem_by_pages(&bytes) {
        Ok(pages) => pages.into_iter().next().unwrap_or_default(),
        Err(e) => {
            tracing::debug!(file = %source.display(), error = %e, "PDF text layer extraction failed");
            String::new()
        }
    }
}
