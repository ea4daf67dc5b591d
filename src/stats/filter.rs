use regex::Regex;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error("regex compilation error for query '{pattern}': {source}")]
    RegexCompilation {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// Conjunction of required patterns a line must satisfy to be counted.
///
/// Patterns are compiled once up front so a malformed query fails at startup
/// instead of looking like a non-match on every line.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    patterns: Vec<Regex>,
}

impl RecordFilter {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, FilterError> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(p).map_err(|e| FilterError::RegexCompilation {
                    pattern: p.to_string(),
                    source: e,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { patterns })
    }

    /// True if every pattern matches somewhere in `line`. Stops at the first
    /// pattern that does not match; an empty filter accepts everything.
    pub fn matches(&self, line: &str) -> bool {
        self.patterns.iter().all(|re| re.is_match(line))
    }
}
