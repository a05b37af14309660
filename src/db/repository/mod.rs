pub mod category;
pub mod document;
pub mod keyword;

pub use category::*;
pub use document::*;
pub use keyword::*;
