use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Mutex;

use zeroize::Zeroize;

use super::encryption::EncryptedData;
use super::CryptoError;

pub const KEY_LENGTH: usize = 32; // AES-256

/// A per-document symmetric key — zeroed on drop, never serialized.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct DocumentKey {
    pub(super) key_bytes: [u8; KEY_LENGTH],
}

impl DocumentKey {
    /// Generate a fresh random key.
    pub fn generate() -> Self {
        use rand::RngCore;
        let mut key_bytes = [0u8; KEY_LENGTH];
        rand::thread_rng().fill_bytes(&mut key_bytes);
        Self { key_bytes }
    }

    pub(crate) fn from_bytes(key_bytes: [u8; KEY_LENGTH]) -> Self {
        Self { key_bytes }
    }

    /// Encrypt data under this key (AES-256-GCM, fresh IV).
    pub fn seal(&self, plaintext: &[u8]) -> Result<EncryptedData, CryptoError> {
        EncryptedData::encrypt(&self.key_bytes, plaintext)
    }

    /// Decrypt and authenticate data sealed under this key.
    pub fn open(&self, encrypted: &EncryptedData) -> Result<Vec<u8>, CryptoError> {
        encrypted.decrypt(&self.key_bytes)
    }
}

/// Source of per-document keys, keyed by alias (document id, or
/// `<id>.thumb` for thumbnails).
///
/// One key per alias, created lazily on first use, never shared between
/// aliases. Injected so hosts can plug in a hardware-backed store and tests
/// can use `MemoryKeyStore`.
pub trait KeyProvider: Send + Sync {
    /// Return the key for `alias`, creating and persisting it on first use.
    fn get_or_create(&self, alias: &str) -> Result<DocumentKey, CryptoError>;

    /// Whether a key exists for `alias`.
    fn contains(&self, alias: &str) -> Result<bool, CryptoError>;

    /// Remove the key for `alias`. Removing a missing alias is not an error.
    fn delete(&self, alias: &str) -> Result<(), CryptoError>;
}

/// Ephemeral key store. Keys live only as long as the process — suitable
/// for tests and throwaway vaults.
#[derive(Default)]
pub struct MemoryKeyStore {
    keys: Mutex<HashMap<String, [u8; KEY_LENGTH]>>,
}

impl MemoryKeyStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, [u8; KEY_LENGTH]>> {
        self.keys
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl KeyProvider for MemoryKeyStore {
    fn get_or_create(&self, alias: &str) -> Result<DocumentKey, CryptoError> {
        let mut keys = self.lock();
        let bytes = keys.entry(alias.to_string()).or_insert_with(|| {
            use rand::RngCore;
            let mut b = [0u8; KEY_LENGTH];
            rand::thread_rng().fill_bytes(&mut b);
            b
        });
        Ok(DocumentKey::from_bytes(*bytes))
    }

    fn contains(&self, alias: &str) -> Result<bool, CryptoError> {
        Ok(self.lock().contains_key(alias))
    }

    fn delete(&self, alias: &str) -> Result<(), CryptoError> {
        self.lock().remove(alias);
        Ok(())
    }
}

/// Disk-backed key store: one wrapped key file per alias, sealed under a
/// master key held in `master.key` at the store root.
///
/// The master key file is created on first use with owner-only permissions
/// on unix. Hosts with a hardware keystore should implement `KeyProvider`
/// against it instead — this store is the portable default.
pub struct FileKeyStore {
    root: PathBuf,
    master: DocumentKey,
}

impl FileKeyStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, CryptoError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        let master = load_or_create_master(&root)?;
        Ok(Self { root, master })
    }

    fn alias_path(&self, alias: &str) -> Result<PathBuf, CryptoError> {
        // Aliases are document ids (plus a suffix); anything that could
        // escape the store directory is rejected outright.
        if alias.is_empty()
            || !alias
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
            || alias.contains("..")
        {
            return Err(CryptoError::KeyStore(format!("invalid key alias: {alias}")));
        }
        Ok(self.root.join(format!("{alias}.key")))
    }
}

impl KeyProvider for FileKeyStore {
    fn get_or_create(&self, alias: &str) -> Result<DocumentKey, CryptoError> {
        let path = self.alias_path(alias)?;

        if path.exists() {
            let wrapped = std::fs::read(&path)?;
            let encrypted = EncryptedData::from_bytes(&wrapped)?;
            let mut plain = self.master.open(&encrypted)?;
            if plain.len() != KEY_LENGTH {
                plain.zeroize();
                return Err(CryptoError::KeyStore(format!(
                    "wrapped key for {alias} has wrong length"
                )));
            }
            let mut bytes = [0u8; KEY_LENGTH];
            bytes.copy_from_slice(&plain);
            plain.zeroize();
            return Ok(DocumentKey::from_bytes(bytes));
        }

        let key = DocumentKey::generate();
        let wrapped = self.master.seal(&key.key_bytes)?;
        write_restricted(&path, &wrapped.to_bytes())?;
        tracing::debug!(alias, "Created new document key");
        Ok(key)
    }

    fn contains(&self, alias: &str) -> Result<bool, CryptoError> {
        Ok(self.alias_path(alias)?.exists())
    }

    fn delete(&self, alias: &str) -> Result<(), CryptoError> {
        let path = self.alias_path(alias)?;
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

fn load_or_create_master(root: &std::path::Path) -> Result<DocumentKey, CryptoError> {
    let path = root.join("master.key");
    if path.exists() {
        let bytes = std::fs::read(&path)?;
        if bytes.len() != KEY_LENGTH {
            return Err(CryptoError::KeyStore("master key has wrong length".into()));
        }
        let mut key_bytes = [0u8; KEY_LENGTH];
        key_bytes.copy_from_slice(&bytes);
        return Ok(DocumentKey::from_bytes(key_bytes));
    }

    let key = DocumentKey::generate();
    write_restricted(&path, &key.key_bytes)?;
    tracing::info!("Generated key store master key");
    Ok(key)
}

fn write_restricted(path: &std::path::Path, bytes: &[u8]) -> Result<(), CryptoError> {
    std::fs::write(path, bytes)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generate_produces_distinct_keys() {
        let k1 = DocumentKey::generate();
        let k2 = DocumentKey::generate();
        assert_ne!(k1.key_bytes, k2.key_bytes);
    }

    #[test]
    fn memory_store_returns_same_key_for_alias() {
        let store = MemoryKeyStore::new();
        let k1 = store.get_or_create("doc-1").unwrap();
        let k2 = store.get_or_create("doc-1").unwrap();
        assert_eq!(k1.key_bytes, k2.key_bytes);
    }

    #[test]
    fn memory_store_distinct_keys_per_alias() {
        let store = MemoryKeyStore::new();
        let k1 = store.get_or_create("doc-1").unwrap();
        let k2 = store.get_or_create("doc-2").unwrap();
        assert_ne!(k1.key_bytes, k2.key_bytes);
    }

    #[test]
    fn memory_store_delete_forgets_key() {
        let store = MemoryKeyStore::new();
        let k1 = store.get_or_create("doc-1").unwrap();
        store.delete("doc-1").unwrap();
        assert!(!store.contains("doc-1").unwrap());
        let k2 = store.get_or_create("doc-1").unwrap();
        assert_ne!(k1.key_bytes, k2.key_bytes);
    }

    #[test]
    fn file_store_persists_keys_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let k1 = {
            let store = FileKeyStore::open(dir.path()).unwrap();
            store.get_or_create("doc-1").unwrap().key_bytes
        };
        let store = FileKeyStore::open(dir.path()).unwrap();
        let k2 = store.get_or_create("doc-1").unwrap();
        assert_eq!(k1, k2.key_bytes);
    }

    #[test]
    fn file_store_keys_are_wrapped_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        let key = store.get_or_create("doc-1").unwrap();

        let on_disk = std::fs::read(dir.path().join("doc-1.key")).unwrap();
        // The raw key bytes must not appear in the wrapped file
        assert!(!on_disk
            .windows(KEY_LENGTH)
            .any(|w| w == key.key_bytes.as_slice()));
    }

    #[test]
    fn file_store_thumbnail_alias_is_distinct() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        let doc = store.get_or_create("doc-1").unwrap();
        let thumb = store.get_or_create("doc-1.thumb").unwrap();
        assert_ne!(doc.key_bytes, thumb.key_bytes);
    }

    #[test]
    fn file_store_rejects_path_traversal_alias() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        assert!(store.get_or_create("../evil").is_err());
        assert!(store.get_or_create("").is_err());
        assert!(store.get_or_create("a/b").is_err());
    }

    #[test]
    fn file_store_delete_missing_is_ok() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKeyStore::open(dir.path()).unwrap();
        assert!(store.delete("never-created").is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn master_key_has_restricted_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let dir = tempfile::tempdir().unwrap();
        let _store = FileKeyStore::open(dir.path()).unwrap();
        let mode = std::fs::metadata(dir.path().join("master.key"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
