use std::io::Write;

use cyphergen::config::{ConfigError, TranslatorConfig};

#[test]
fn test_yaml_config_overrides_defaults() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "count_prefix: Num").unwrap();
    writeln!(file, "strict_arguments: false").unwrap();

    let config = TranslatorConfig::from_yaml_file(file.path()).unwrap();
    assert_eq!(config.count_prefix, "Num");
    assert!(!config.strict_arguments);
    assert!(!config.auth_scopes);
}

#[test]
fn test_yaml_config_is_validated() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "count_prefix: \"\"").unwrap();

    let result = TranslatorConfig::from_yaml_file(file.path());
    assert!(matches!(result, Err(ConfigError::Validation(_))));
}

#[test]
fn test_malformed_yaml_config() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "auth_scopes: [yes, please]").unwrap();

    let result = TranslatorConfig::from_yaml_file(file.path());
    assert!(matches!(result, Err(ConfigError::Parse { ref field, .. }) if field == "yaml_content"));
}
