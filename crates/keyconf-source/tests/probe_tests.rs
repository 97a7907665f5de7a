//! Tests for ordered config file discovery

use assert_fs::prelude::*;
use keyconf_source::{Error, Format, find_config_file, read_file};
use pretty_assertions::assert_eq;
use serde_json::json;

fn dir_string(dir: &std::path::Path) -> String {
    dir.to_string_lossy().into_owned()
}

#[test]
fn finds_file_in_single_path() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("config.yaml").write_str("key: value\n").unwrap();

    let found = find_config_file("config", "yaml", &[dir_string(temp.path())]).unwrap();

    assert_eq!(found, temp.path().join("config.yaml"));
}

#[test]
fn first_matching_path_wins() {
    let first = assert_fs::TempDir::new().unwrap();
    let second = assert_fs::TempDir::new().unwrap();
    first.child("app.json").write_str(r#"{"origin": "first"}"#).unwrap();
    second.child("app.json").write_str(r#"{"origin": "second"}"#).unwrap();

    let paths = vec![dir_string(first.path()), dir_string(second.path())];
    let found = find_config_file("app", "json", &paths).unwrap();
    let tree = read_file(&found, Format::Json).unwrap();

    assert_eq!(tree, json!({"origin": "first"}));
}

#[test]
fn skips_paths_without_the_file() {
    let empty = assert_fs::TempDir::new().unwrap();
    let populated = assert_fs::TempDir::new().unwrap();
    populated.child("app.toml").write_str("name = \"x\"\n").unwrap();

    let paths = vec![
        "/nonexistent/keyconf".to_string(),
        dir_string(empty.path()),
        dir_string(populated.path()),
    ];
    let found = find_config_file("app", "toml", &paths).unwrap();

    assert_eq!(found, populated.path().join("app.toml"));
}

#[test]
fn directory_with_matching_name_is_not_a_match() {
    let temp = assert_fs::TempDir::new().unwrap();
    temp.child("config.yaml").create_dir_all().unwrap();

    let result = find_config_file("config", "yaml", &[dir_string(temp.path())]);

    assert!(matches!(result, Err(Error::NotFound { .. })));
}

#[test]
fn not_found_lists_every_path() {
    let paths = vec!["./a".to_string(), "./b".to_string()];

    let err = find_config_file("bad", "json", &paths).unwrap_err();

    match err {
        Error::NotFound { file_name, paths } => {
            assert_eq!(file_name, "bad.json");
            assert_eq!(paths, vec!["./a", "./b"]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
