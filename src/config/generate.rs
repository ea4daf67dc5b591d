use super::types::FieldConfig;
use std::collections::HashMap;

/// Columns of an HDFS `FSNamesystem.audit` line, for example:
///
/// ```text
/// 2016-05-06 18:03:22,983 INFO FSNamesystem.audit: allowed=true	ugi=doe (auth:SIMPLE)	ip=/10.211.55.1	cmd=contentSummary	src=/tmp/x	dst=null	perm=null	proto=rpc
/// ```
const HDFS_AUDIT_FIELDS: &[(&str, usize, &str, &str, &str)] = &[
    ("allowed", 0, r"^.*allowed=(\S+).*$", "$1", "%-8s"),
    ("ugi", 1, r"^ugi=(\S+).*$", "$1", "%-20s"),
    ("ip", 2, r"^ip=/?", "", "%-16s"),
    ("cmd", 3, r"^cmd=", "", "%-20s"),
    ("src", 4, r"^src=", "", "%-60s"),
    ("dst", 5, r"^dst=", "", "%-60s"),
    ("perm", 6, r"^perm=", "", "%-30s"),
    ("proto", 7, r"^proto=", "", "%-8s"),
];

/// Field map for HDFS audit logs, used when a config has no `fields` section.
pub fn default_field_map() -> HashMap<String, FieldConfig> {
    HDFS_AUDIT_FIELDS
        .iter()
        .map(|(name, position, pattern, replace, format)| {
            (
                name.to_string(),
                FieldConfig {
                    position: *position,
                    pattern: pattern.to_string(),
                    replace: replace.to_string(),
                    format: format.to_string(),
                },
            )
        })
        .collect()
}

/// Generate a starter configuration with the HDFS audit field map spelled out.
pub fn generate_starter_config() -> String {
    let mut config = String::from(STARTER_HEADER);

    for (name, position, pattern, replace, format) in HDFS_AUDIT_FIELDS {
        config.push_str(&format!(
            "  {}:\n    position: {}\n    pattern: '{}'\n    replace: '{}'\n    format: '{}'\n",
            name, position, pattern, replace, format
        ));
    }

    config
}

const STARTER_HEADER: &str = r#"# auditstat configuration
#
# Counts matching audit log lines per group key and prints a ranked table.

# Log file to read. Supports ~ and environment references written as
# $env followed by the variable name in braces.
audit_log: /var/log/hadoop/hdfs/hdfs-audit.log

# Keep reading appended lines and resume from the saved offset after restart.
continuous: false

# Pause between polls for new lines (continuous mode).
sleep: 1s

# Minimum time between reports (continuous mode).
interval: 10s

# Every pattern must match for a line to be counted.
query:
  - 'allowed=true'

# Grouping key and column order.
group_by:
  - cmd
  - ugi

# Maximum rows per report, 0 for all.
limit: 20

suppress_header: false

# abort: stop on a line missing a group-by column. skip: log and move on.
on_missing_field: abort

# Where the <log name>-<inode>.pos offset file is kept.
offset_dir: .

# Field name -> column position, normalization regex, replacement, display format.
fields:
"#;
