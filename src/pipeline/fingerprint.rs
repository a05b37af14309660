use std::io::Read;
use std::path::Path;

use base64::Engine;
use sha2::{Digest, Sha256};

use super::ImportError;
use crate::models::ScannedFile;

/// Streaming SHA-256 content fingerprint, base64-encoded.
///
/// Hashing file content (rather than a path+size+mtime proxy) means renamed
/// or re-downloaded copies of the same bytes dedup correctly and distinct
/// files never collide.
pub fn content_fingerprint(path: &Path) -> Result<String, ImportError> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0u8; 64 * 1024];
    loop {
        let n = file.read(&mut buffer)?;
        if n == 0 {
            break;
        }
        hasher.update(&buffer[..n]);
    }
    Ok(base64::engine::general_purpose::STANDARD.encode(hasher.finalize()))
}

/// Build a `ScannedFile` descriptor for a path — a convenience for hosts
/// whose scanner yields bare paths.
pub fn describe_file(path: &Path) -> Result<ScannedFile, ImportError> {
    let metadata = std::fs::metadata(path)?;
    let modified_at = metadata
        .modified()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).naive_utc())
        .unwrap_or_default();

    Ok(ScannedFile {
        path: path.to_path_buf(),
        display_name: path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "unknown".to_string()),
        size_bytes: metadata.len(),
        mime_type: sniff_mime_type(path)?,
        modified_at,
        fingerprint: content_fingerprint(path)?,
    })
}

/// Detect the MIME type from magic bytes, falling back to the extension.
/// Magic bytes don't lie — extensions can be wrong.
pub fn sniff_mime_type(path: &Path) -> Result<String, ImportError> {
    let mut file = std::fs::File::open(path)?;
    let mut header = [0u8; 12];
    let n = file.read(&mut header)?;

    let sniffed = match &header[..n.min(8)] {
        // PDF: %PDF
        [0x25, 0x50, 0x44, 0x46, ..] => Some("application/pdf"),
        // JPEG: FF D8 FF
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        // PNG: 89 50 4E 47
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        // TIFF: little-endian (49 49 2A 00) or big-endian (4D 4D 00 2A)
        [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => Some("image/tiff"),
        _ => None,
    };

    if let Some(mime) = sniffed {
        return Ok(mime.to_string());
    }

    Ok(mime_guess::from_path(path)
        .first_raw()
        .unwrap_or("application/octet-stream")
        .to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        std::fs::write(&path, "document content").unwrap();

        let f1 = content_fingerprint(&path).unwrap();
        let f2 = content_fingerprint(&path).unwrap();
        assert_eq!(f1, f2);
    }

    #[test]
    fn different_content_different_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = dir.path().join("a.txt");
        let p2 = dir.path().join("b.txt");
        std::fs::write(&p1, "Content A").unwrap();
        std::fs::write(&p2, "Content B").unwrap();
        assert_ne!(
            content_fingerprint(&p1).unwrap(),
            content_fingerprint(&p2).unwrap()
        );
    }

    #[test]
    fn same_content_different_name_same_fingerprint() {
        let dir = tempfile::tempdir().unwrap();
        let p1 = dir.path().join("original.pdf");
        let p2 = dir.path().join("copy (1).pdf");
        std::fs::write(&p1, "identical bytes").unwrap();
        std::fs::write(&p2, "identical bytes").unwrap();
        assert_eq!(
            content_fingerprint(&p1).unwrap(),
            content_fingerprint(&p2).unwrap()
        );
    }

    #[test]
    fn sniffs_pdf_from_magic_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.bin");
        std::fs::write(&path, b"%PDF-1.4 content").unwrap();
        assert_eq!(sniff_mime_type(&path).unwrap(), "application/pdf");
    }

    #[test]
    fn sniffs_jpeg_despite_wrong_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("misleading.pdf");
        std::fs::write(&path, [0xFF, 0xD8, 0xFF, 0xE0, 0x00]).unwrap();
        assert_eq!(sniff_mime_type(&path).unwrap(), "image/jpeg");
    }

    #[test]
    fn sniffs_png_and_tiff() {
        let dir = tempfile::tempdir().unwrap();
        let png = dir.path().join("img.png");
        std::fs::write(&png, [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]).unwrap();
        assert_eq!(sniff_mime_type(&png).unwrap(), "image/png");

        let tiff = dir.path().join("img.tiff");
        std::fs::write(&tiff, [0x49, 0x49, 0x2A, 0x00, 0x08, 0x00, 0x00, 0x00]).unwrap();
        assert_eq!(sniff_mime_type(&tiff).unwrap(), "image/tiff");
    }

    #[test]
    fn falls_back_to_extension_for_unknown_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, "plain text").unwrap();
        assert_eq!(sniff_mime_type(&path).unwrap(), "text/plain");
    }

    #[test]
    fn describe_file_fills_descriptor() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scan.pdf");
        std::fs::write(&path, b"%PDF-1.4 body").unwrap();

        let file = describe_file(&path).unwrap();
        assert_eq!(file.display_name, "scan.pdf");
        assert_eq!(file.mime_type, "application/pdf");
        assert_eq!(file.size_bytes, 13);
        assert!(!file.fingerprint.is_empty());
    }
}
