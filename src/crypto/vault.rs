use std::fs::File;
use std::io::{BufReader, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use uuid::Uuid;

use super::keys::KeyProvider;
use super::{CryptoError, EncryptedData};

/// Suffix for thumbnail key aliases — a distinct key per thumbnail so a
/// thumbnail compromise never exposes the full document key.
const THUMB_ALIAS_SUFFIX: &str = ".thumb";

/// Descriptor of one encrypted blob in the vault.
#[derive(Debug, Clone)]
pub struct VaultObject {
    pub object_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// Content-addressed encrypted object store: one `<uuid>.vault` file per
/// document, encrypted AES-256-GCM under that document's own key.
///
/// The vault exclusively owns the bytes on disk and the key material behind
/// them. The object for a document is written before its repository row is
/// inserted and removed when the row is deleted — the pair constitutes a
/// valid document; neither alone does.
pub struct Vault {
    documents_dir: PathBuf,
    thumbnails_dir: PathBuf,
    keys: Arc<dyn KeyProvider>,
}

impl Vault {
    /// Open (creating directories as needed) a vault rooted at `root`.
    pub fn open(root: impl Into<PathBuf>, keys: Arc<dyn KeyProvider>) -> Result<Self, CryptoError> {
        let root = root.into();
        let documents_dir = root.join("documents");
        let thumbnails_dir = root.join("thumbnails");
        std::fs::create_dir_all(&documents_dir)?;
        std::fs::create_dir_all(&thumbnails_dir)?;
        Ok(Self {
            documents_dir,
            thumbnails_dir,
            keys,
        })
    }

    /// Encrypt `source` under the document's key and store it in the vault.
    ///
    /// A fresh IV is generated on every call; re-encrypting the same id
    /// replaces the object with a new IV. On error nothing usable is left
    /// behind and the caller must not persist a document record.
    pub fn encrypt_and_store(
        &self,
        source: &Path,
        document_id: &Uuid,
    ) -> Result<VaultObject, CryptoError> {
        self.store_in(source, document_id, &self.documents_dir, &document_id.to_string())
    }

    /// Encrypt a thumbnail alongside the document, under its own key.
    pub fn encrypt_thumbnail(
        &self,
        source: &Path,
        document_id: &Uuid,
    ) -> Result<VaultObject, CryptoError> {
        self.store_in(
            source,
            document_id,
            &self.thumbnails_dir,
            &format!("{document_id}{THUMB_ALIAS_SUFFIX}"),
        )
    }

    fn store_in(
        &self,
        source: &Path,
        document_id: &Uuid,
        dir: &Path,
        alias: &str,
    ) -> Result<VaultObject, CryptoError> {
        let key = self.keys.get_or_create(alias)?;
        let plaintext = std::fs::read(source)?;
        let encrypted = key.seal(&plaintext)?;

        let object_name = format!("{document_id}.vault");
        let target = dir.join(&object_name);
        let bytes = encrypted.to_bytes();

        let mut file = File::create(&target)?;
        file.write_all(&bytes)?;
        file.sync_all()?;

        tracing::debug!(
            document_id = %document_id,
            size = plaintext.len(),
            "Vault object written"
        );

        Ok(VaultObject {
            object_name,
            path: target,
            size_bytes: bytes.len() as u64,
        })
    }

    /// Decrypt a document to a temporary file under `temp_dir` (outside the
    /// vault) and return its path. The caller owns the returned file.
    ///
    /// Missing object, corrupt header, and authentication failure all
    /// surface as errors — tampered ciphertext never decrypts to garbage.
    pub fn decrypt_to_temp(
        &self,
        document_id: &Uuid,
        temp_dir: &Path,
    ) -> Result<PathBuf, CryptoError> {
        self.decrypt_from(document_id, &self.documents_dir, &document_id.to_string(), temp_dir)
    }

    /// Decrypt a document's thumbnail to a temporary file.
    pub fn decrypt_thumbnail_to_temp(
        &self,
        document_id: &Uuid,
        temp_dir: &Path,
    ) -> Result<PathBuf, CryptoError> {
        self.decrypt_from(
            document_id,
            &self.thumbnails_dir,
            &format!("{document_id}{THUMB_ALIAS_SUFFIX}"),
            temp_dir,
        )
    }

    fn decrypt_from(
        &self,
        document_id: &Uuid,
        dir: &Path,
        alias: &str,
        temp_dir: &Path,
    ) -> Result<PathBuf, CryptoError> {
        let object_path = dir.join(format!("{document_id}.vault"));
        if !object_path.exists() {
            return Err(CryptoError::ObjectNotFound(document_id.to_string()));
        }

        let mut reader = BufReader::new(File::open(&object_path)?);
        let encrypted = EncryptedData::read_from(&mut reader)?;

        let key = self.keys.get_or_create(alias)?;
        let plaintext = key.open(&encrypted)?;

        std::fs::create_dir_all(temp_dir)?;
        let mut temp = tempfile::Builder::new()
            .prefix("dv_")
            .suffix(".tmp")
            .tempfile_in(temp_dir)?;
        temp.write_all(&plaintext)?;
        let (_file, path) = temp
            .keep()
            .map_err(|e| CryptoError::Io(e.error))?;
        Ok(path)
    }

    /// Whether a vault object exists for this document.
    pub fn contains(&self, document_id: &Uuid) -> bool {
        self.documents_dir
            .join(format!("{document_id}.vault"))
            .exists()
    }

    /// Remove the document's object, thumbnail, and both keys.
    /// Called when a document row is deleted or an insert fails.
    pub fn remove(&self, document_id: &Uuid) -> Result<(), CryptoError> {
        let object = self.documents_dir.join(format!("{document_id}.vault"));
        if object.exists() {
            std::fs::remove_file(object)?;
        }
        let thumb = self.thumbnails_dir.join(format!("{document_id}.vault"));
        if thumb.exists() {
            std::fs::remove_file(thumb)?;
        }
        self.keys.delete(&document_id.to_string())?;
        self.keys
            .delete(&format!("{document_id}{THUMB_ALIAS_SUFFIX}"))?;
        tracing::debug!(document_id = %document_id, "Vault object removed");
        Ok(())
    }

    /// Number of document objects currently stored.
    pub fn object_count(&self) -> Result<usize, CryptoError> {
        let mut count = 0;
        for entry in std::fs::read_dir(&self.documents_dir)? {
            let entry = entry?;
            if entry.file_name().to_string_lossy().ends_with(".vault") {
                count += 1;
            }
        }
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::MemoryKeyStore;

    fn setup() -> (tempfile::TempDir, Vault) {
        let dir = tempfile::tempdir().unwrap();
        let vault = Vault::open(dir.path().join("vault"), Arc::new(MemoryKeyStore::new())).unwrap();
        (dir, vault)
    }

    fn write_source(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn encrypt_decrypt_round_trip_is_byte_identical() {
        let (dir, vault) = setup();
        let content = b"PDF container bytes for the round-trip test";
        let source = write_source(dir.path(), "doc.pdf", content);

        let id = Uuid::new_v4();
        let object = vault.encrypt_and_store(&source, &id).unwrap();
        assert!(object.path.exists());
        assert_eq!(object.object_name, format!("{id}.vault"));

        let temp = vault.decrypt_to_temp(&id, dir.path()).unwrap();
        let decrypted = std::fs::read(temp).unwrap();
        assert_eq!(decrypted, content);
    }

    #[test]
    fn stored_object_is_not_plaintext() {
        let (dir, vault) = setup();
        let content = b"very sensitive document content";
        let source = write_source(dir.path(), "doc.pdf", content);

        let id = Uuid::new_v4();
        let object = vault.encrypt_and_store(&source, &id).unwrap();
        let stored = std::fs::read(&object.path).unwrap();
        assert!(!stored
            .windows(content.len())
            .any(|w| w == content.as_slice()));
    }

    #[test]
    fn tampering_any_ciphertext_byte_is_detected() {
        let (dir, vault) = setup();
        let source = write_source(dir.path(), "doc.pdf", b"bytes that must not survive tampering");

        let id = Uuid::new_v4();
        let object = vault.encrypt_and_store(&source, &id).unwrap();

        let original = std::fs::read(&object.path).unwrap();
        // Flip one byte at several positions across the ciphertext body
        for pos in [13usize, original.len() / 2, original.len() - 1] {
            let mut tampered = original.clone();
            tampered[pos] ^= 0xFF;
            std::fs::write(&object.path, &tampered).unwrap();
            assert!(
                vault.decrypt_to_temp(&id, dir.path()).is_err(),
                "tampering at byte {pos} was not detected"
            );
        }
    }

    #[test]
    fn truncated_object_is_corrupt_not_garbage() {
        let (dir, vault) = setup();
        let source = write_source(dir.path(), "doc.pdf", b"content");
        let id = Uuid::new_v4();
        let object = vault.encrypt_and_store(&source, &id).unwrap();

        let bytes = std::fs::read(&object.path).unwrap();
        std::fs::write(&object.path, &bytes[..5]).unwrap();
        assert!(vault.decrypt_to_temp(&id, dir.path()).is_err());
    }

    #[test]
    fn missing_object_reports_not_found() {
        let (dir, vault) = setup();
        let err = vault.decrypt_to_temp(&Uuid::new_v4(), dir.path()).unwrap_err();
        assert!(matches!(err, CryptoError::ObjectNotFound(_)));
    }

    #[test]
    fn reencrypting_same_id_uses_fresh_iv() {
        let (dir, vault) = setup();
        let source = write_source(dir.path(), "doc.pdf", b"same content twice");
        let id = Uuid::new_v4();

        vault.encrypt_and_store(&source, &id).unwrap();
        let first = std::fs::read(vault.documents_dir.join(format!("{id}.vault"))).unwrap();
        vault.encrypt_and_store(&source, &id).unwrap();
        let second = std::fs::read(vault.documents_dir.join(format!("{id}.vault"))).unwrap();

        // IV sits after the 1-byte length prefix
        assert_ne!(&first[1..13], &second[1..13]);
    }

    #[test]
    fn thumbnail_stored_separately_with_own_key() {
        let (dir, vault) = setup();
        let doc = write_source(dir.path(), "doc.pdf", b"full document");
        let thumb = write_source(dir.path(), "thumb.jpg", b"small thumbnail");
        let id = Uuid::new_v4();

        let doc_obj = vault.encrypt_and_store(&doc, &id).unwrap();
        let thumb_obj = vault.encrypt_thumbnail(&thumb, &id).unwrap();
        assert_ne!(doc_obj.path, thumb_obj.path);
        assert!(thumb_obj.path.starts_with(&vault.thumbnails_dir));

        let restored = vault.decrypt_thumbnail_to_temp(&id, dir.path()).unwrap();
        assert_eq!(std::fs::read(restored).unwrap(), b"small thumbnail");
    }

    #[test]
    fn remove_deletes_objects_and_keys() {
        let (dir, vault) = setup();
        let doc = write_source(dir.path(), "doc.pdf", b"doc");
        let thumb = write_source(dir.path(), "thumb.jpg", b"thumb");
        let id = Uuid::new_v4();

        vault.encrypt_and_store(&doc, &id).unwrap();
        vault.encrypt_thumbnail(&thumb, &id).unwrap();
        assert!(vault.contains(&id));

        vault.remove(&id).unwrap();
        assert!(!vault.contains(&id));
        assert!(!vault.keys.contains(&id.to_string()).unwrap());
        assert!(vault.decrypt_to_temp(&id, dir.path()).is_err());
    }

    #[test]
    fn object_count_tracks_documents_only() {
        let (dir, vault) = setup();
        assert_eq!(vault.object_count().unwrap(), 0);
        let doc = write_source(dir.path(), "doc.pdf", b"doc");
        vault.encrypt_and_store(&doc, &Uuid::new_v4()).unwrap();
        vault.encrypt_and_store(&doc, &Uuid::new_v4()).unwrap();
        assert_eq!(vault.object_count().unwrap(), 2);
    }
}
