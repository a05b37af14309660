use std::path::PathBuf;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A candidate file produced by the external storage scanner.
///
/// The pipeline never walks directories itself — it consumes batches of
/// these descriptors. `path` is both locator and source path (a filesystem
/// scanner has no separate content URI). `fingerprint` is a SHA-256 content
/// hash used for duplicate detection; see `pipeline::fingerprint`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScannedFile {
    pub path: PathBuf,
    pub display_name: String,
    pub size_bytes: u64,
    pub mime_type: String,
    pub modified_at: NaiveDateTime,
    pub fingerprint: String,
}

impl ScannedFile {
    /// Parent directory of the source file, for the document record.
    pub fn source_folder(&self) -> String {
        self.path
            .parent()
            .map(|p| p.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_folder_is_parent_dir() {
        let file = ScannedFile {
            path: PathBuf::from("/storage/downloads/invoice.pdf"),
            display_name: "invoice.pdf".into(),
            size_bytes: 100,
            mime_type: "application/pdf".into(),
            modified_at: NaiveDateTime::default(),
            fingerprint: "fp".into(),
        };
        assert_eq!(file.source_folder(), "/storage/downloads");
    }
}
