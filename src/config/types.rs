use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log file to tail. May also be supplied on the command line.
    #[serde(default)]
    pub audit_log: Option<PathBuf>,
    #[serde(default)]
    pub continuous: bool,
    /// Pause between poll cycles in continuous mode.
    #[serde(default = "default_sleep", with = "humantime_serde")]
    pub sleep: Duration,
    /// Minimum time between two reports in continuous mode.
    #[serde(default, with = "humantime_serde")]
    pub interval: Duration,
    /// Patterns a line must all match to be counted.
    #[serde(default)]
    pub query: Vec<String>,
    /// Field names forming the grouping key, in display order.
    #[serde(default)]
    pub group_by: Vec<String>,
    /// Maximum rows per report; 0 means unlimited.
    #[serde(default)]
    pub limit: usize,
    #[serde(default)]
    pub suppress_header: bool,
    #[serde(default)]
    pub on_missing_field: MissingFieldStrategy,
    /// Directory holding the `.pos` offset file.
    #[serde(default = "default_offset_dir")]
    pub offset_dir: PathBuf,
    #[serde(default = "crate::config::generate::default_field_map")]
    pub fields: HashMap<String, FieldConfig>,
}

fn default_sleep() -> Duration {
    Duration::from_secs(1)
}

fn default_offset_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audit_log: None,
            continuous: false,
            sleep: default_sleep(),
            interval: Duration::ZERO,
            query: Vec::new(),
            group_by: Vec::new(),
            limit: 0,
            suppress_header: false,
            on_missing_field: MissingFieldStrategy::default(),
            offset_dir: default_offset_dir(),
            fields: crate::config::generate::default_field_map(),
        }
    }
}

/// How to parse one logical field out of a tab-split line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldConfig {
    /// Zero-based column index.
    pub position: usize,
    /// Normalization regex; empty leaves the value as is.
    #[serde(default)]
    pub pattern: String,
    /// Replacement for every `pattern` match. Supports `$1` / `${name}`.
    #[serde(default)]
    pub replace: String,
    /// Column format: `%s`, `%Ns` or `%-Ns`.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "%-20s".to_string()
}

/// What to do with a line that lacks a column a group-by field needs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MissingFieldStrategy {
    #[default]
    Abort,
    Skip,
}
