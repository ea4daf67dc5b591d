pub mod identity;
pub mod reader;

pub use identity::TrackedFile;
pub use reader::{Line, LineReader, ReaderError};
