use crate::config::types::FieldConfig;
use crate::stats::format::{DisplayFormat, FormatError};
use regex::Regex;
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("field '{field}' reads column {position} but the line has only {available} columns")]
    MissingField {
        field: String,
        position: usize,
        available: usize,
    },

    #[error("unknown field '{0}' (not present in the field map)")]
    UnknownField(String),

    #[error("regex compilation error for field '{field}' pattern '{pattern}': {source}")]
    RegexCompilation {
        field: String,
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid format for field '{field}': {source}")]
    Format {
        field: String,
        #[source]
        source: FormatError,
    },
}

/// Aggregation unit: the normalized values of the group-by fields, in
/// group-by order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey(Vec<String>);

impl GroupKey {
    pub fn new(values: Vec<String>) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[String] {
        &self.0
    }

    /// Comma-joined form, as shown in logs.
    pub fn joined(&self) -> String {
        self.0.join(",")
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.joined())
    }
}

impl<S: Into<String>> FromIterator<S> for GroupKey {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

/// Replace every match of `pattern` in `raw` with `replacement`.
///
/// `replacement` may reference capture groups (`$1`, `${name}`).
pub fn normalize(raw: &str, pattern: &Regex, replacement: &str) -> String {
    pattern.replace_all(raw, replacement).into_owned()
}

/// Compiled parsing rule for one logical field.
#[derive(Debug, Clone)]
pub struct FieldRule {
    pub name: String,
    pub position: usize,
    pub pattern: Option<Regex>,
    pub replacement: String,
    pub format: DisplayFormat,
}

impl FieldRule {
    fn from_config(name: &str, config: &FieldConfig) -> Result<Self, ExtractError> {
        let pattern = if config.pattern.is_empty() {
            None
        } else {
            let regex = Regex::new(&config.pattern).map_err(|e| ExtractError::RegexCompilation {
                field: name.to_string(),
                pattern: config.pattern.clone(),
                source: e,
            })?;
            Some(regex)
        };

        let format = config
            .format
            .parse::<DisplayFormat>()
            .map_err(|e| ExtractError::Format {
                field: name.to_string(),
                source: e,
            })?;

        Ok(Self {
            name: name.to_string(),
            position: config.position,
            pattern,
            replacement: config.replace.clone(),
            format,
        })
    }

    /// Read this field from a tab-split line and normalize it.
    pub fn extract(&self, fields: &[&str]) -> Result<String, ExtractError> {
        let raw = fields
            .get(self.position)
            .ok_or_else(|| ExtractError::MissingField {
                field: self.name.clone(),
                position: self.position,
                available: fields.len(),
            })?;

        Ok(match &self.pattern {
            Some(pattern) => normalize(raw, pattern, &self.replacement),
            None => (*raw).to_string(),
        })
    }
}

/// All known field rules, keyed by field name.
#[derive(Debug, Clone, Default)]
pub struct FieldMap {
    rules: HashMap<String, FieldRule>,
}

impl FieldMap {
    pub fn compile(fields: &HashMap<String, FieldConfig>) -> Result<Self, ExtractError> {
        let rules = fields
            .iter()
            .map(|(name, config)| Ok((name.clone(), FieldRule::from_config(name, config)?)))
            .collect::<Result<HashMap<_, _>, ExtractError>>()?;

        Ok(Self { rules })
    }

    pub fn get(&self, name: &str) -> Option<&FieldRule> {
        self.rules.get(name)
    }
}

/// The group-by fields resolved against the field map once at startup.
///
/// Rule order is the key order and the display column order.
#[derive(Debug, Clone)]
pub struct FieldExtractor {
    columns: Vec<FieldRule>,
}

impl FieldExtractor {
    pub fn new<S: AsRef<str>>(field_names: &[S], field_map: &FieldMap) -> Result<Self, ExtractError> {
        let columns = field_names
            .iter()
            .map(|name| {
                let name = name.as_ref();
                field_map
                    .get(name)
                    .cloned()
                    .ok_or_else(|| ExtractError::UnknownField(name.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { columns })
    }

    pub fn columns(&self) -> &[FieldRule] {
        &self.columns
    }

    /// Split a line on tabs and extract the group key.
    pub fn extract_line(&self, line: &str) -> Result<GroupKey, ExtractError> {
        let fields: Vec<&str> = line.split('\t').collect();
        self.extract(&fields)
    }

    pub fn extract(&self, fields: &[&str]) -> Result<GroupKey, ExtractError> {
        self.columns
            .iter()
            .map(|rule| rule.extract(fields))
            .collect::<Result<Vec<_>, _>>()
            .map(GroupKey::new)
    }
}
