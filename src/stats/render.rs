use crate::stats::extract::{ExtractError, FieldExtractor, FieldMap, GroupKey};
use crate::stats::format::DisplayFormat;
use std::fmt::Write;

const COUNT_LABEL: &str = " count";
const COUNT_WIDTH: usize = 6;

#[derive(Debug, Clone)]
struct Column {
    name: String,
    format: DisplayFormat,
}

/// Formats a ranked snapshot as a plain-text table.
#[derive(Debug, Clone)]
pub struct ReportRenderer {
    columns: Vec<Column>,
    limit: Option<usize>,
    suppress_header: bool,
}

impl ReportRenderer {
    /// `limit == 0` renders every row.
    pub fn new<S: AsRef<str>>(
        field_names: &[S],
        field_map: &FieldMap,
        limit: usize,
        suppress_header: bool,
    ) -> Result<Self, ExtractError> {
        let extractor = FieldExtractor::new(field_names, field_map)?;
        Ok(Self::from_extractor(&extractor, limit, suppress_header))
    }

    pub fn from_extractor(extractor: &FieldExtractor, limit: usize, suppress_header: bool) -> Self {
        let columns = extractor
            .columns()
            .iter()
            .map(|rule| Column {
                name: rule.name.clone(),
                format: rule.format,
            })
            .collect();

        Self {
            columns,
            limit: (limit > 0).then_some(limit),
            suppress_header,
        }
    }

    /// Render `snapshot`, which must already be ranked. An empty snapshot
    /// renders to an empty string, header included.
    pub fn render(&self, snapshot: &[(GroupKey, u64)]) -> String {
        let mut out = String::new();
        if snapshot.is_empty() {
            return out;
        }

        if !self.suppress_header {
            let header = self.header();
            // Rule spans the header line including its terminator
            let rule = "-".repeat(header.chars().count() + 1);
            let _ = writeln!(out, "{}", header);
            let _ = writeln!(out, "{}", rule);
        }

        let rows = match self.limit {
            Some(limit) => &snapshot[..limit.min(snapshot.len())],
            None => snapshot,
        };

        for (key, count) in rows {
            self.write_row(&mut out, key, *count);
        }

        out
    }

    fn header(&self) -> String {
        let mut header = String::new();
        for column in &self.columns {
            header.push_str(&column.format.apply(&column.name));
            header.push(' ');
        }
        header.push_str(COUNT_LABEL);
        header
    }

    fn write_row(&self, out: &mut String, key: &GroupKey, count: u64) {
        for (column, value) in self.columns.iter().zip(key.values()) {
            out.push_str(&column.format.apply(value));
            out.push(' ');
        }
        let _ = writeln!(out, "{:>width$}", count, width = COUNT_WIDTH);
    }
}
