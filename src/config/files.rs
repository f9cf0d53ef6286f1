//! Locating configuration files in a directory's ancestry.
//!
//! The search starts in the start directory and climbs toward the root
//! directory, looking at most `depth_limit` directories (the start directory
//! counts as one). Results are ordered so that the file nearest to the start
//! directory comes last and therefore wins when sources are merged.

use crate::paths::{absolutize, absolutize_from_cwd};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default number of directories examined per search.
pub const DEFAULT_DEPTH_LIMIT: usize = 4;

/// Walks from a start directory up to a root directory looking for files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLocator {
    start_dir: PathBuf,
    root_dir: PathBuf,
    depth_limit: usize,
}

impl FileLocator {
    /// Create a locator. Relative directories are taken from the process
    /// working directory.
    pub fn new(start_dir: impl AsRef<Path>, root_dir: impl AsRef<Path>) -> Self {
        Self {
            start_dir: absolutize_from_cwd(start_dir.as_ref()),
            root_dir: absolutize_from_cwd(root_dir.as_ref()),
            depth_limit: DEFAULT_DEPTH_LIMIT,
        }
    }

    /// Limit how many directories are examined.
    pub fn with_depth_limit(mut self, depth_limit: usize) -> Self {
        self.depth_limit = depth_limit;
        self
    }

    pub fn start_dir(&self) -> &Path {
        &self.start_dir
    }

    pub fn root_dir(&self) -> &Path {
        &self.root_dir
    }

    pub fn depth_limit(&self) -> usize {
        self.depth_limit
    }

    /// Directories examined by a search, start directory first.
    ///
    /// Stops after the root directory (inclusive), at the filesystem root,
    /// or once `depth_limit` directories have been listed.
    pub fn search_dirs(&self) -> Vec<PathBuf> {
        let mut dirs = Vec::with_capacity(self.depth_limit);
        let mut current = self.start_dir.as_path();
        for _ in 0..self.depth_limit {
            dirs.push(current.to_path_buf());
            if current == self.root_dir {
                break;
            }
            match current.parent() {
                Some(parent) => current = parent,
                None => break,
            }
        }
        dirs
    }

    /// Find files whose name contains `pattern`.
    ///
    /// Returns absolute paths, farthest ancestor first and start directory
    /// last; within one directory files are ordered by name. If `pattern` is
    /// itself the path of an existing file (absolute, or relative to the
    /// process working directory) that the scan did not already find, it is
    /// placed first. Nothing found yields an empty list.
    pub fn find(&self, pattern: &str) -> Vec<PathBuf> {
        if pattern.is_empty() {
            return Vec::new();
        }

        let mut found: Vec<PathBuf> = Vec::new();
        for dir in self.search_dirs().iter().rev() {
            found.extend(matches_in(dir, pattern));
        }

        let direct = absolutize_from_cwd(Path::new(pattern));
        if direct.is_file() && !found.contains(&direct) {
            found.insert(0, direct);
        }

        debug!(pattern, count = found.len(), "located configuration files");
        found
    }
}

/// Search for `pattern` with explicit bounds.
pub fn find_files(
    pattern: &str,
    start_dir: &Path,
    root_dir: &Path,
    depth_limit: usize,
) -> Vec<PathBuf> {
    FileLocator::new(start_dir, root_dir)
        .with_depth_limit(depth_limit)
        .find(pattern)
}

/// Regular files in `dir` whose name contains `pattern`, sorted by name.
///
/// A directory that does not exist or cannot be listed has no matches.
fn matches_in(dir: &Path, pattern: &str) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return Vec::new();
    };

    let mut names: Vec<String> = entries
        .flatten()
        .filter_map(|entry| entry.file_name().to_str().map(str::to_string))
        .filter(|name| name.contains(pattern))
        .collect();
    names.sort();

    names
        .into_iter()
        .map(|name| absolutize(Path::new(&name), dir))
        .filter(|path| path.is_file())
        .collect()
}
