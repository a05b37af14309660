use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::DynamicImage;
use printpdf::{Image, ImageTransform, Mm, PdfDocument};
use uuid::Uuid;

use super::ImportError;

/// DPI assumed when sizing an image onto its PDF page.
const EMBED_DPI: f64 = 300.0;

/// Normalize an input file into a single-document PDF container on scratch
/// storage. PDFs are copied through; images are enhanced and wrapped into a
/// one-page PDF. The returned file is transient — the coordinator removes
/// it after vault encryption.
pub fn prepare_container(
    source: &Path,
    mime_type: &str,
    document_id: &Uuid,
    scratch_dir: &Path,
) -> Result<PathBuf, ImportError> {
    std::fs::create_dir_all(scratch_dir)?;
    let target = scratch_dir.join(format!("imp_{document_id}.pdf"));

    if mime_type == "application/pdf" {
        std::fs::copy(source, &target)?;
        return Ok(target);
    }

    if mime_type.starts_with("image/") {
        image_to_pdf(source, &target)?;
        return Ok(target);
    }

    Err(ImportError::UnsupportedFormat(mime_type.to_string()))
}

/// Wrap an image into a one-page PDF at its native pixel size (300 dpi).
fn image_to_pdf(source: &Path, target: &Path) -> Result<(), ImportError> {
    let decoded = printpdf::image_crate::open(source)
        .map_err(|e| ImportError::Conversion(format!("image decode: {e}")))?;
    let enhanced = enhance_for_scan(decoded);

    let width_mm = Mm(px_to_mm(enhanced.width()) as f32);
    let height_mm = Mm(px_to_mm(enhanced.height()) as f32);

    let (doc, page, layer) = PdfDocument::new("Imported document", width_mm, height_mm, "Layer 1");
    let layer = doc.get_page(page).get_layer(layer);

    Image::from_dynamic_image(&enhanced).add_to_layer(
        layer,
        ImageTransform {
            dpi: Some(EMBED_DPI as f32),
            ..Default::default()
        },
    );

    let mut writer = BufWriter::new(File::create(target)?);
    doc.save(&mut writer)
        .map_err(|e| ImportError::Conversion(format!("PDF save: {e}")))?;
    Ok(())
}

/// Grayscale + contrast boost for the "scanned document" look.
fn enhance_for_scan(image: DynamicImage) -> DynamicImage {
    image.grayscale().adjust_contrast(25.0)
}

fn px_to_mm(px: u32) -> f64 {
    px as f64 * 25.4 / EMBED_DPI
}
