pub mod classify;
pub mod convert;
pub mod coordinator;
pub mod extract;
pub mod fingerprint;
pub mod metadata;
pub mod store;
pub mod title;
pub mod traits;
pub mod types;

pub use classify::*;
pub use convert::*;
pub use coordinator::*;
pub use extract::*;
pub use fingerprint::*;
pub use metadata::*;
pub use store::*;
pub use title::*;
pub use traits::*;
pub use types::*;

use thiserror::Error;

use crate::crypto::CryptoError;
use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    #[error("Conversion failed: {0}")]
    Conversion(String),

    #[error("Text recognition failed: {0}")]
    Recognition(String),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Encryption error: {0}")]
    Crypto(#[from] CryptoError),
}
