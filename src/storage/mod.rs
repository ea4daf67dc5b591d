pub mod offset;

pub use offset::{OffsetError, OffsetStore};
