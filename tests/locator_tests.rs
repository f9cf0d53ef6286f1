//! Integration tests for file location and target resolution.

use confstack::Source;
use confstack::config::{FileLocator, SourceResolver, Target, find_files};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Creates `root/app/service/` and returns the three directories.
fn nested(temp: &TempDir) -> (PathBuf, PathBuf, PathBuf) {
    let root = temp.path().to_path_buf();
    let app = root.join("app");
    let service = app.join("service");
    fs::create_dir_all(&service).unwrap();
    (root, app, service)
}

#[test]
fn test_matches_ordered_ancestor_first() {
    let temp = TempDir::new().unwrap();
    let (root, app, service) = nested(&temp);
    for dir in [&root, &app, &service] {
        fs::write(dir.join("config.json"), "{}").unwrap();
    }

    let found = find_files("config.json", &service, &root, 4);
    assert_eq!(
        found,
        vec![
            root.join("config.json"),
            app.join("config.json"),
            service.join("config.json"),
        ]
    );
}

#[test]
fn test_depth_limit_hides_far_ancestors() {
    let temp = TempDir::new().unwrap();
    let (root, app, service) = nested(&temp);
    fs::write(root.join("settings.yaml"), "a: 1").unwrap();
    fs::write(app.join("settings.yaml"), "a: 2").unwrap();

    let found = find_files("settings.yaml", &service, &root, 2);
    assert_eq!(found, vec![app.join("settings.yaml")]);
}

#[test]
fn test_search_stops_at_root_dir() {
    let temp = TempDir::new().unwrap();
    let (root, app, service) = nested(&temp);
    fs::write(root.join("config.ini"), "[a]\nb = 1\n").unwrap();

    assert!(find_files("config.ini", &service, &app, 4).is_empty());
    assert_eq!(
        find_files("config.ini", &service, &root, 4),
        vec![root.join("config.ini")]
    );
}

#[test]
fn test_directories_are_not_matched() {
    let temp = TempDir::new().unwrap();
    let (root, _app, service) = nested(&temp);
    fs::create_dir(service.join("config.json.d")).unwrap();

    assert!(find_files("config.json", &service, &root, 4).is_empty());
}

#[test]
fn test_absolute_path_target() {
    let temp = TempDir::new().unwrap();
    let (root, _app, service) = nested(&temp);
    let elsewhere = TempDir::new().unwrap();
    let file = elsewhere.path().join("extra.json");
    fs::write(&file, "{}").unwrap();

    let locator = FileLocator::new(&service, &root);
    assert_eq!(locator.find(file.to_str().unwrap()), vec![file]);
}

#[test]
fn test_resolver_turns_matches_into_file_sources() {
    let temp = TempDir::new().unwrap();
    let (root, app, service) = nested(&temp);
    fs::write(root.join(".env"), "A=1\n").unwrap();
    fs::write(app.join(".env"), "A=2\n").unwrap();

    let resolver = SourceResolver::new(FileLocator::new(&service, &root));
    let sources = resolver.resolve_sources(&[Target::from(".env"), Target::Env]);
    assert_eq!(
        sources,
        vec![
            Source::File(root.join(".env")),
            Source::File(app.join(".env")),
            Source::Env,
        ]
    );

    let merged = resolver.resolve_all(&[Target::from(".env")]).unwrap();
    assert_eq!(merged.get("A"), Some(&serde_json::json!("2")));
}
