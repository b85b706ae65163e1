//! Fixture and sample discovery.
//!
//! Fixtures are `*.test.sql` files; samples are every other `*.sql` file.
//! Results are sorted by path so reports come out in a stable order.

use std::fs;
use std::path::{Path, PathBuf};

const FIXTURE_SUFFIX: &str = ".test.sql";
const SQL_EXTENSION: &str = "sql";

/// Which SQL files a search collects.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileKind {
    /// `*.test.sql`, checked by the assertion runner.
    Fixture,
    /// Plain `*.sql`, checked by the auditor.
    Sample,
}

impl FileKind {
    pub fn accepts(self, path: &Path) -> bool {
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            return false;
        };
        let is_sql = path.extension().is_some_and(|e| e == SQL_EXTENSION);
        let is_fixture = name.ends_with(FIXTURE_SUFFIX);
        match self {
            FileKind::Fixture => is_fixture,
            FileKind::Sample => is_sql && !is_fixture,
        }
    }
}

/// A discovered SQL file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SqlFile {
    pub path: PathBuf,
}

impl SqlFile {
    pub fn new(path: PathBuf) -> Self {
        SqlFile { path }
    }
}

/// Find every file of `kind` under `root`, sorted by path.
pub fn discover(root: &Path, kind: FileKind) -> Vec<SqlFile> {
    let mut files = Vec::new();
    discover_recursive(root, kind, &mut files);
    files.sort_by(|a, b| a.path.cmp(&b.path));
    files
}

fn discover_recursive(dir: &Path, kind: FileKind, files: &mut Vec<SqlFile>) {
    let Ok(entries) = fs::read_dir(dir) else {
        tracing::debug!(dir = %dir.display(), "skipping unreadable directory");
        return;
    };

    for entry in entries.flatten() {
        let path = entry.path();

        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.starts_with('.') {
                continue;
            }
        }

        if path.is_dir() {
            if path.file_name().is_some_and(|name| name == "target") {
                continue;
            }
            discover_recursive(&path, kind, files);
        } else if kind.accepts(&path) {
            files.push(SqlFile::new(path));
        }
    }
}

/// Discover in a file or a directory.
///
/// A file is returned on its own when it is of `kind`; a directory is
/// searched recursively.
pub fn discover_in(path: &Path, kind: FileKind) -> Vec<SqlFile> {
    if path.is_file() {
        if kind.accepts(path) {
            vec![SqlFile::new(path.to_path_buf())]
        } else {
            vec![]
        }
    } else if path.is_dir() {
        discover(path, kind)
    } else {
        vec![]
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests;
