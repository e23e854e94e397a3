use andor_idus::{AndorConfig, AndorError};
use serial_test::serial;
use std::io::Write;
use std::path::PathBuf;
use tempfile::NamedTempFile;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_missing_file_falls_back_to_defaults() {
    let config = AndorConfig::load_from("does/not/exist.toml").unwrap();
    assert_eq!(config, AndorConfig::default());
}

#[test]
#[serial]
fn test_file_values_override_defaults() {
    let file = write_config(
        r#"
[library]
path = "C:/Program Files/Andor SDK/atmcd64d.dll"
init_dir = "C:/Program Files/Andor SDK"

[logging]
level = "debug"
"#,
    );

    let config = AndorConfig::load_from(file.path()).unwrap();
    assert_eq!(
        config.library.path,
        PathBuf::from("C:/Program Files/Andor SDK/atmcd64d.dll")
    );
    assert_eq!(config.library.init_dir, PathBuf::from("C:/Program Files/Andor SDK"));
    assert_eq!(config.logging.level, "debug");
    assert!(!config.logging.json);
}

#[test]
#[serial]
fn test_env_overrides_file() {
    let file = write_config("[library]\npath = \"from-file.dll\"\n");

    std::env::set_var("ANDOR_LIBRARY__PATH", "from-env.dll");
    std::env::set_var("ANDOR_LOGGING__JSON", "true");
    let result = AndorConfig::load_from(file.path());
    std::env::remove_var("ANDOR_LIBRARY__PATH");
    std::env::remove_var("ANDOR_LOGGING__JSON");

    let config = result.unwrap();
    assert_eq!(config.library.path, PathBuf::from("from-env.dll"));
    assert!(config.logging.json);
}

#[test]
#[serial]
fn test_env_sets_init_dir() {
    std::env::set_var("ANDOR_LIBRARY__INIT_DIR", "C:/Andor/ini");
    let result = AndorConfig::load_from("does/not/exist.toml");
    std::env::remove_var("ANDOR_LIBRARY__INIT_DIR");

    let config = result.unwrap();
    assert_eq!(config.library.init_dir, PathBuf::from("C:/Andor/ini"));
    assert_eq!(config.library.path, PathBuf::from("lib/atmcd64d.dll"));
}

#[test]
#[serial]
fn test_unsectioned_env_vars_are_ignored() {
    // Names without a `__` section separator do not map onto a config key.
    std::env::set_var("ANDOR_LIBRARY", "stray.dll");
    std::env::set_var("ANDOR_INIT_DIR", "stray-dir");
    let result = AndorConfig::load_from("does/not/exist.toml");
    std::env::remove_var("ANDOR_LIBRARY");
    std::env::remove_var("ANDOR_INIT_DIR");

    assert_eq!(result.unwrap(), AndorConfig::default());
}

#[test]
#[serial]
fn test_malformed_toml_is_config_error() {
    let file = write_config("[library\npath = ");
    let err = AndorConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, AndorError::Config(_)));
}

#[test]
#[serial]
fn test_validation_runs_after_load() {
    let file = write_config("[logging]\nlevel = \"loud\"\n");
    let err = AndorConfig::load_from(file.path()).unwrap_err();
    assert!(matches!(err, AndorError::Configuration(_)));
}
