// tests/config_test.rs
use git_bump::config::{load_config, Config};
use std::io::Write;
use tempfile::NamedTempFile;

#[test]
fn test_load_default_config() {
    let config = Config::default();
    assert_eq!(config.repository.main_branch, "main");
    assert_eq!(config.repository.remote, "origin");
    assert!(!config.release.push);
    assert!(config.outputs.github_output);
}

#[test]
fn test_load_from_file() {
    let mut temp_file = NamedTempFile::new().unwrap();
    let toml_content = r#"
[repository]
main_branch = "trunk"
remote = "upstream"

[release]
push = true
fetch = true

[outputs]
github_output = false
"#;
    temp_file.write_all(toml_content.as_bytes()).unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert_eq!(config.repository.main_branch, "trunk");
    assert_eq!(config.repository.remote, "upstream");
    assert!(config.release.push);
    assert!(config.release.fetch);
    assert!(!config.outputs.github_output);
}

#[test]
fn test_partial_file_keeps_defaults() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file.write_all(b"[release]\nfetch = true\n").unwrap();
    temp_file.flush().unwrap();

    let config = load_config(Some(temp_file.path().to_str().unwrap())).unwrap();
    assert!(config.release.fetch);
    assert!(!config.release.push);
    assert_eq!(config.repository.main_branch, "main");
}

#[test]
fn test_invalid_file_is_an_error() {
    let mut temp_file = NamedTempFile::new().unwrap();
    temp_file
        .write_all(b"[repository]\nmain_branch = \"release/v2\"\n")
        .unwrap();
    temp_file.flush().unwrap();

    let err = load_config(Some(temp_file.path().to_str().unwrap())).unwrap_err();
    assert!(err.to_string().contains("release branch naming"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    assert!(load_config(Some("/nonexistent/gitbump.toml")).is_err());
}
