pub mod encryption;
pub mod keys;
pub mod vault;

pub use encryption::*;
pub use keys::*;
pub use vault::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption failed")]
    EncryptionFailed,

    #[error("Decryption failed — wrong key or corrupted data")]
    DecryptionFailed,

    #[error("Vault object not found: {0}")]
    ObjectNotFound(String),

    #[error("Corrupted vault object: {0}")]
    CorruptedObject(String),

    #[error("Key store error: {0}")]
    KeyStore(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
