//! Integration tests for loading configuration through `ConfigLoader`.
//!
//! These tests build real directory trees and verify precedence between
//! default targets, caller targets and the environment.

use confstack::config::ConfigPaths;
use confstack::{ConfigLoader, ENV_MARKER, ErrorCode, Target};
use serde_json::{Value, json};
use std::fs;
use std::sync::{Mutex, MutexGuard, OnceLock};
use tempfile::TempDir;

/// Serializes tests that read or write process environment variables.
fn env_lock() -> MutexGuard<'static, ()> {
    static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
    LOCK.get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn loader_in(dir: &TempDir) -> ConfigLoader {
    ConfigLoader::with_paths(ConfigPaths::with_dirs(dir.path(), dir.path()))
}

#[test]
fn test_caller_targets_merge_in_order() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.json"), r#"{"x": 1, "y": 2}"#).unwrap();
    fs::write(temp.path().join("b.json"), r#"{"y": 3}"#).unwrap();

    let config = loader_in(&temp)
        .targets(["a.json", "b.json"])
        .exclude_defaults(true)
        .load()
        .unwrap();
    assert_eq!(Value::Object(config.into_map()), json!({"x": 1, "y": 3}));
}

#[test]
fn test_env_marker_last_beats_file() {
    let _guard = env_lock();
    let temp = TempDir::new().unwrap();
    fs::write(
        temp.path().join("app.json"),
        r#"{"CONFSTACK_IT_FOO": "from-file", "other": 1}"#,
    )
    .unwrap();

    // SAFETY: env access in this binary is serialized by env_lock
    unsafe {
        std::env::set_var("CONFSTACK_IT_FOO", "bar");
    }
    let result = loader_in(&temp)
        .targets(["app.json", ENV_MARKER])
        .exclude_defaults(true)
        .load();
    unsafe {
        std::env::remove_var("CONFSTACK_IT_FOO");
    }

    let config = result.unwrap();
    assert_eq!(config.get("CONFSTACK_IT_FOO").unwrap().unwrap(), json!("bar"));
    assert_eq!(config.get("other").unwrap().unwrap(), json!(1));
}

#[test]
fn test_file_after_env_marker_wins() {
    let _guard = env_lock();
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("late.json"), r#"{"CONFSTACK_IT_LATE": "file"}"#).unwrap();

    // SAFETY: env access in this binary is serialized by env_lock
    unsafe {
        std::env::set_var("CONFSTACK_IT_LATE", "env");
    }
    let result = loader_in(&temp)
        .targets([ENV_MARKER, "late.json"])
        .exclude_defaults(true)
        .load();
    unsafe {
        std::env::remove_var("CONFSTACK_IT_LATE");
    }

    assert_eq!(
        result.unwrap().get("CONFSTACK_IT_LATE").unwrap().unwrap(),
        json!("file")
    );
}

#[test]
fn test_default_targets_dotenv_beats_config_json() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.json"), r#"{"mode": "json", "name": "app"}"#).unwrap();
    fs::write(temp.path().join(".env"), "mode=dotenv\n").unwrap();

    let config = loader_in(&temp).exclude([ENV_MARKER]).load().unwrap();
    assert_eq!(config.get("mode").unwrap().unwrap(), json!("dotenv"));
    assert_eq!(config.get("name").unwrap().unwrap(), json!("app"));
}

#[test]
fn test_caller_target_sits_between_default_lists() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("settings.yaml"), "level: settings\nkeep: 1\n").unwrap();
    fs::write(temp.path().join("custom.ini"), "[server]\nport = 80\n").unwrap();
    fs::write(temp.path().join("env_file"), "level=env_file\n").unwrap();

    let config = loader_in(&temp)
        .target("custom.ini")
        .exclude([ENV_MARKER])
        .load()
        .unwrap();
    assert_eq!(config.get("level").unwrap().unwrap(), json!("env_file"));
    assert_eq!(config.get("keep").unwrap().unwrap(), json!(1));
    assert_eq!(config.as_int("server.port").unwrap(), Some(80));
}

#[test]
fn test_nearer_config_json_wins() {
    let temp = TempDir::new().unwrap();
    let project = temp.path().join("project");
    fs::create_dir(&project).unwrap();
    fs::write(temp.path().join("config.json"), r#"{"who": "ancestor", "shared": true}"#).unwrap();
    fs::write(project.join("config.json"), r#"{"who": "nearest"}"#).unwrap();

    let config = ConfigLoader::with_paths(ConfigPaths::with_dirs(&project, temp.path()))
        .exclude([ENV_MARKER])
        .load()
        .unwrap();
    assert_eq!(config.get("who").unwrap().unwrap(), json!("nearest"));
    assert_eq!(config.get("shared").unwrap().unwrap(), json!(true));
}

#[test]
fn test_shallow_merge_replaces_nested_mapping() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("a.json"), r#"{"db": {"host": "h", "port": 1}}"#).unwrap();
    fs::write(temp.path().join("b.yaml"), "db:\n  host: other\n").unwrap();

    let config = loader_in(&temp)
        .targets(["a.json", "b.yaml"])
        .exclude_defaults(true)
        .load()
        .unwrap();
    assert_eq!(config.get("db.host").unwrap().unwrap(), json!("other"));
    assert_eq!(config.get("db.port").unwrap(), None);
}

#[test]
fn test_missing_targets_are_not_errors() {
    let temp = TempDir::new().unwrap();
    let config = loader_in(&temp)
        .targets(["does-not-exist.json"])
        .exclude_defaults(true)
        .load()
        .unwrap();
    assert!(config.is_empty());
}

#[test]
fn test_malformed_file_fails_load() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.json"), "{ nope").unwrap();

    let err = loader_in(&temp).exclude([ENV_MARKER]).load().unwrap_err();
    assert_eq!(err.code(), ErrorCode::MalformedSource);
}

#[test]
fn test_unsupported_format_fails_load() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("app.toml"), "a = 1").unwrap();

    let err = loader_in(&temp)
        .targets(["app.toml"])
        .exclude_defaults(true)
        .load()
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::UnsupportedFormat);
    assert!(err.to_string().contains("app.toml"));
}

#[test]
fn test_raise_on_absent_applies_to_loaded_provider() {
    let temp = TempDir::new().unwrap();
    let config = loader_in(&temp)
        .exclude_defaults(true)
        .raise_on_absent(true)
        .load()
        .unwrap();
    assert_eq!(config.get("nothing").unwrap_err().code(), ErrorCode::AbsentKey);
}

#[test]
fn test_sources_lists_precedence_order() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("config.yaml"), "a: 1\n").unwrap();
    fs::write(temp.path().join(".env"), "b=2\n").unwrap();

    let sources = loader_in(&temp).target(ENV_MARKER).sources();
    let files: Vec<_> = sources
        .iter()
        .filter_map(|s| s.path().and_then(|p| p.file_name()))
        .collect();
    assert_eq!(files, vec!["config.yaml", ".env"]);
    assert_eq!(
        sources.iter().filter(|s| s.kind() == confstack::config::SourceKind::Env).count(),
        2
    );
}

#[test]
fn test_discover_reads_environment_overrides() {
    let _guard = env_lock();
    let temp = TempDir::new().unwrap();
    // SAFETY: env access in this binary is serialized by env_lock
    unsafe {
        std::env::set_var("CONFSTACK_START_DIR", temp.path());
        std::env::set_var("CONFSTACK_ROOT_DIR", temp.path());
        std::env::set_var("CONFSTACK_DEPTH_LIMIT", "2");
    }
    let paths = ConfigPaths::discover();
    unsafe {
        std::env::remove_var("CONFSTACK_START_DIR");
        std::env::remove_var("CONFSTACK_ROOT_DIR");
        std::env::remove_var("CONFSTACK_DEPTH_LIMIT");
    }

    assert_eq!(paths.start_dir, temp.path());
    assert_eq!(paths.root_dir, temp.path());
    assert_eq!(paths.depth_limit, 2);
}

#[test]
fn test_mapping_targets() {
    let temp = TempDir::new().unwrap();
    let base = json!({"k": "base"}).as_object().cloned().unwrap();
    let over = json!({"k": "override"}).as_object().cloned().unwrap();

    let config = loader_in(&temp)
        .targets([Target::from(base), Target::from(over)])
        .exclude_defaults(true)
        .load()
        .unwrap();
    assert_eq!(config.get("k").unwrap().unwrap(), json!("override"));
}
