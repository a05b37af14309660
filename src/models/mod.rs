pub mod category;
pub mod document;
pub mod keyword;
pub mod scanned_file;

pub use category::*;
pub use document::*;
pub use keyword::*;
pub use scanned_file::*;
