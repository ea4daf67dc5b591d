pub mod extract;
pub mod filter;
pub mod format;
pub mod render;
pub mod table;

pub use extract::{normalize, ExtractError, FieldExtractor, FieldMap, FieldRule, GroupKey};
pub use filter::{FilterError, RecordFilter};
pub use format::{DisplayFormat, FormatError};
pub use render::ReportRenderer;
pub use table::AggregationTable;
