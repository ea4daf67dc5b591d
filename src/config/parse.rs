use super::types::*;
use crate::config::{expand_env_vars, expand_tilde};
use crate::stats::format::DisplayFormat;
use regex::Regex;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation failed:\n{}", .0.join("\n"))]
    ValidationList(Vec<String>),

    #[error("validation failed: {0}")]
    Validation(String),
}

/// Read and parse a config file.
///
/// The result is not validated yet: command line overrides may still fill in
/// required values. Call [`validate_config`] once they are applied.
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    use std::io::Read;

    let mut file = File::open(path).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to open config file '{}': {}", path.display(), e),
        ))
    })?;

    let mut yaml_string = String::new();
    file.read_to_string(&mut yaml_string).map_err(|e| {
        ConfigError::Io(std::io::Error::new(
            e.kind(),
            format!("failed to read config file '{}': {}", path.display(), e),
        ))
    })?;

    parse_config(&yaml_string).map_err(|e| match e {
        ConfigError::YamlParse(e) => ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::InvalidData,
            format!("in file '{}': {}", path.display(), e),
        )),
        other => other,
    })
}

/// Parse config YAML, expanding `$env{VAR}` references and `~` in paths.
pub fn parse_config(yaml: &str) -> Result<Config, ConfigError> {
    let yaml_string = expand_env_vars(yaml);

    check_unexpanded_vars(&yaml_string)?;

    let mut config: Config = serde_yaml::from_str(&yaml_string)?;

    expand_paths(&mut config);

    Ok(config)
}

/// Checks for unexpanded environment variables and returns a helpful error
fn check_unexpanded_vars(yaml_string: &str) -> Result<(), ConfigError> {
    let re = Regex::new(r"\$env\{([A-Za-z_][A-Za-z0-9_]*)\}").unwrap();
    let mut unexpanded_vars: Vec<String> = re
        .captures_iter(yaml_string)
        .map(|cap| cap.get(1).unwrap().as_str().to_string())
        .collect();

    if unexpanded_vars.is_empty() {
        return Ok(());
    }

    unexpanded_vars.sort();
    unexpanded_vars.dedup();

    let error_msg = if unexpanded_vars.len() == 1 {
        format!(
            "Environment variable $env{{{0}}} is not set.\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variable: export {0}=/path/to/file\n\
             2. Replace $env{{{0}}} in the config file with an actual value",
            unexpanded_vars[0]
        )
    } else {
        format!(
            "Environment variables are not set: {}\n\
             \n\
             To fix this, either:\n\
             1. Set the environment variables\n\
             2. Replace the variables in the config file with actual values",
            unexpanded_vars.join(", ")
        )
    };

    Err(ConfigError::Validation(error_msg))
}

fn expand_paths(config: &mut Config) {
    if let Some(path) = &config.audit_log {
        config.audit_log = Some(expand_tilde(path));
    }
    config.offset_dir = expand_tilde(&config.offset_dir);
}

/// Check everything that would otherwise fail later: required keys, field
/// references, and that every regex and display format compiles.
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    let mut errors = Vec::new();

    if config.audit_log.is_none() {
        errors.push("'audit_log' must be set (in the config file or with --audit-log)".to_string());
    }

    if config.group_by.is_empty() {
        errors.push("'group_by' must name at least one field".to_string());
    }

    for name in &config.group_by {
        if !config.fields.contains_key(name) {
            let mut known: Vec<&str> = config.fields.keys().map(String::as_str).collect();
            known.sort_unstable();
            errors.push(format!(
                "group_by field '{}' is not defined in 'fields' (known: {})",
                name,
                known.join(", ")
            ));
        }
    }

    for (index, pattern) in config.query.iter().enumerate() {
        if let Err(e) = Regex::new(pattern) {
            errors.push(format!("query[{}]: invalid regex '{}': {}", index, pattern, e));
        }
    }

    let mut field_names: Vec<&String> = config.fields.keys().collect();
    field_names.sort();
    for name in field_names {
        validate_field(name, &config.fields[name], &mut errors);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::ValidationList(errors))
    }
}

fn validate_field(name: &str, field: &FieldConfig, errors: &mut Vec<String>) {
    if !field.pattern.is_empty() {
        if let Err(e) = Regex::new(&field.pattern) {
            errors.push(format!(
                "fields.{}: invalid regex '{}': {}",
                name, field.pattern, e
            ));
        }
    }

    if let Err(e) = field.format.parse::<DisplayFormat>() {
        errors.push(format!("fields.{}: {}", name, e));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    #[test]
    fn test_parse_minimal() {
        let config = parse_config("audit_log: /tmp/audit.log\ngroup_by: [cmd]\n").unwrap();

        assert_eq!(config.audit_log, Some(PathBuf::from("/tmp/audit.log")));
        assert!(!config.continuous);
        assert_eq!(config.sleep, Duration::from_secs(1));
        assert_eq!(config.interval, Duration::ZERO);
        assert_eq!(config.limit, 0);
        assert_eq!(config.on_missing_field, MissingFieldStrategy::Abort);
        assert_eq!(config.offset_dir, PathBuf::from("."));
        assert!(config.fields.contains_key("cmd"));
        validate_config(&config).unwrap();
    }

    #[test]
    fn test_parse_durations() {
        let config = parse_config("sleep: 250ms\ninterval: 2m\n").unwrap();
        assert_eq!(config.sleep, Duration::from_millis(250));
        assert_eq!(config.interval, Duration::from_secs(120));
    }

    #[test]
    fn test_parse_missing_field_strategy() {
        let config = parse_config("on_missing_field: skip\n").unwrap();
        assert_eq!(config.on_missing_field, MissingFieldStrategy::Skip);

        assert!(parse_config("on_missing_field: ignore\n").is_err());
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("AUDITSTAT_PARSE_TEST_DIR", "/data/logs");
        let config = parse_config("audit_log: $env{AUDITSTAT_PARSE_TEST_DIR}/audit.log\n").unwrap();
        assert_eq!(config.audit_log, Some(PathBuf::from("/data/logs/audit.log")));
        std::env::remove_var("AUDITSTAT_PARSE_TEST_DIR");
    }

    #[test]
    fn test_unexpanded_env_var_rejected() {
        let result = parse_config("audit_log: $env{AUDITSTAT_SURELY_UNSET}/audit.log\n");
        match result {
            Err(ConfigError::Validation(msg)) => assert!(msg.contains("AUDITSTAT_SURELY_UNSET")),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_collects_all_errors() {
        let yaml = r#"
group_by: [cmd, nope]
query: ['(']
fields:
  cmd:
    position: 3
    pattern: '['
    format: '%d'
"#;
        let config = parse_config(yaml).unwrap();
        match validate_config(&config) {
            Err(ConfigError::ValidationList(errors)) => {
                assert_eq!(errors.len(), 5, "{:#?}", errors);
                assert!(errors.iter().any(|e| e.contains("audit_log")));
                assert!(errors.iter().any(|e| e.contains("'nope'")));
                assert!(errors.iter().any(|e| e.starts_with("query[0]")));
                assert!(errors.iter().any(|e| e.contains("fields.cmd: invalid regex")));
                assert!(errors.iter().any(|e| e.contains("fields.cmd: unsupported display format")));
            }
            other => panic!("expected validation list, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_requires_group_by() {
        let config = parse_config("audit_log: /tmp/audit.log\n").unwrap();
        assert!(validate_config(&config).is_err());
    }
}
