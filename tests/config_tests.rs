use auditstat::config::generate::{default_field_map, generate_starter_config};
use auditstat::config::{load_config, validate_config, ConfigError, MissingFieldStrategy};
use auditstat::pipeline::TailEngine;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_generated_config_is_valid() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, generate_starter_config()).unwrap();

    let config = load_config(&config_path).expect("Generated config should parse");
    validate_config(&config).expect("Generated config should be valid");

    assert_eq!(
        config.audit_log,
        Some(PathBuf::from("/var/log/hadoop/hdfs/hdfs-audit.log"))
    );
    assert!(!config.continuous);
    assert_eq!(config.interval, Duration::from_secs(10));
    assert_eq!(config.query, vec!["allowed=true"]);
    assert_eq!(config.group_by, vec!["cmd", "ugi"]);
    assert_eq!(config.fields.len(), 8);
}

#[test]
fn test_full_config() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");

    let config_yaml = r#"
audit_log: /tmp/app.log
continuous: true
sleep: 500ms
interval: 30s
query:
  - 'status=5\d\d'
group_by: [method, path]
limit: 10
suppress_header: true
on_missing_field: skip
offset_dir: /var/lib/auditstat
fields:
  method:
    position: 0
  path:
    position: 1
    pattern: '\?.*$'
    replace: ''
    format: '%-40s'
"#;
    fs::write(&config_path, config_yaml).unwrap();

    let config = load_config(&config_path).unwrap();
    validate_config(&config).unwrap();

    assert!(config.continuous);
    assert_eq!(config.sleep, Duration::from_millis(500));
    assert_eq!(config.interval, Duration::from_secs(30));
    assert_eq!(config.limit, 10);
    assert!(config.suppress_header);
    assert_eq!(config.on_missing_field, MissingFieldStrategy::Skip);
    assert_eq!(config.offset_dir, PathBuf::from("/var/lib/auditstat"));

    // An explicit field map replaces the built-in one
    assert_eq!(config.fields.len(), 2);
    let method = &config.fields["method"];
    assert_eq!(method.pattern, "");
    assert_eq!(method.format, "%-20s");
}

#[test]
fn test_missing_fields_section_uses_hdfs_map() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "audit_log: /tmp/a.log\ngroup_by: [ugi]\n").unwrap();

    let config = load_config(&config_path).unwrap();
    assert_eq!(config.fields, default_field_map());
    validate_config(&config).unwrap();
}

#[test]
fn test_group_by_unknown_field() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(
        &config_path,
        "audit_log: /tmp/a.log\ngroup_by: [cmd, user]\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    match validate_config(&config) {
        Err(ConfigError::ValidationList(errors)) => {
            assert_eq!(errors.len(), 1);
            assert!(errors[0].contains("'user'"));
        }
        other => panic!("expected validation error, got {:?}", other),
    }
}

#[test]
fn test_malformed_query_fails_before_reading() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(
        &config_path,
        "audit_log: /tmp/a.log\ngroup_by: [cmd]\nquery: ['cmd=(open']\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    let err = validate_config(&config).unwrap_err();
    assert!(err.to_string().contains("query[0]"));
}

#[test]
fn test_invalid_yaml_names_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("config.yml");
    fs::write(&config_path, "limit: [not, a, number]\n").unwrap();

    let err = load_config(&config_path).unwrap_err();
    assert!(err.to_string().contains("config.yml"));
}

#[test]
fn test_missing_config_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = load_config(&temp_dir.path().join("absent.yml"));
    assert!(matches!(result, Err(ConfigError::Io(_))));
}

#[tokio::test]
async fn test_loaded_config_drives_engine() {
    let temp_dir = TempDir::new().unwrap();
    let log_path = temp_dir.path().join("hdfs-audit.log");
    fs::write(
        &log_path,
        "2016-05-06 18:03:22,983 INFO FSNamesystem.audit: allowed=true\tugi=doe (auth:SIMPLE)\tip=/10.211.55.1\tcmd=contentSummary\tsrc=/tmp/x\tdst=null\tperm=null\tproto=rpc\n",
    )
    .unwrap();

    std::env::set_var("AUDITSTAT_TEST_LOG_DIR", temp_dir.path());
    let config_path = temp_dir.path().join("config.yml");
    fs::write(
        &config_path,
        "audit_log: $env{AUDITSTAT_TEST_LOG_DIR}/hdfs-audit.log\ngroup_by: [ugi, ip]\nsuppress_header: true\n",
    )
    .unwrap();

    let config = load_config(&config_path).unwrap();
    std::env::remove_var("AUDITSTAT_TEST_LOG_DIR");
    validate_config(&config).unwrap();
    assert_eq!(config.audit_log.as_deref(), Some(log_path.as_path()));

    let mut engine = TailEngine::from_config(&config, Vec::new()).unwrap();
    engine.run().await.unwrap();

    let output = String::from_utf8(engine.into_output()).unwrap();
    assert_eq!(
        output,
        format!("{:<20} {:<16} {:>6}\n", "doe", "10.211.55.1", 1)
    );
}
