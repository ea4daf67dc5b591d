//! Tail a tab-separated audit log, count matching lines per group key and
//! print ranked reports, either once or continuously with a resumable offset.

pub mod cli;
pub mod config;
pub mod pipeline;
pub mod source;
pub mod stats;
pub mod storage;
