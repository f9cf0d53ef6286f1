//! Lexical path helpers. No filesystem I/O.

use std::path::{Component, Path, PathBuf};

/// Make `path` absolute against `base` and normalize it.
pub fn absolutize(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        normalize_path_components(path)
    } else {
        normalize_path_components(&base.join(path))
    }
}

/// Make `path` absolute against the process working directory.
pub fn absolutize_from_cwd(path: &Path) -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    absolutize(path, &cwd)
}

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize_path_components(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::Prefix(p) => components.push(Component::Prefix(p)),
            Component::RootDir => components.push(Component::RootDir),
            Component::CurDir => {}
            Component::ParentDir => {
                if let Some(Component::Normal(_)) = components.last() {
                    components.pop();
                } else if !matches!(components.last(), Some(Component::RootDir)) {
                    // Relative path climbing past its start
                    components.push(Component::ParentDir);
                }
            }
            Component::Normal(name) => components.push(Component::Normal(name)),
        }
    }

    components.iter().collect()
}
