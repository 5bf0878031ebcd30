//! Enumeration of candidate source files under a root directory.

use crate::error::{Result, ScanError};
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Recursive file enumerator with suffix, hidden-entry and glob filters.
#[derive(Debug, Clone)]
pub struct SourceScanner {
    extensions: Vec<String>,
    skip_hidden: bool,
    exclude: GlobSet,
    follow_links: bool,
}

impl Default for SourceScanner {
    fn default() -> Self {
        Self {
            extensions: vec!["py".to_string()],
            skip_hidden: false,
            exclude: GlobSet::empty(),
            follow_links: false,
        }
    }
}

impl SourceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the accepted file extensions (without leading dot).
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extensions = extensions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_skip_hidden(mut self, skip_hidden: bool) -> Self {
        self.skip_hidden = skip_hidden;
        self
    }

    pub fn with_follow_links(mut self, follow_links: bool) -> Self {
        self.follow_links = follow_links;
        self
    }

    /// Exclude paths matching any of `patterns`, relative to the scan root.
    pub fn with_exclude<I, S>(mut self, patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let pattern = pattern.as_ref();
            let glob = Glob::new(pattern).map_err(|e| ScanError::InvalidPattern {
                pattern: pattern.to_string(),
                message: e.to_string(),
            })?;
            builder.add(glob);
        }
        self.exclude = builder.build().map_err(|e| ScanError::InvalidPattern {
            pattern: String::new(),
            message: e.to_string(),
        })?;
        Ok(self)
    }

    /// Check that `root` is an existing directory.
    pub fn validate_root(root: &Path) -> Result<()> {
        match std::fs::metadata(root) {
            Ok(meta) if meta.is_dir() => Ok(()),
            Ok(_) => Err(ScanError::NotADirectory(root.to_path_buf())),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(ScanError::NotFound(root.to_path_buf()))
            }
            Err(source) => Err(ScanError::Io {
                path: root.to_path_buf(),
                source,
            }),
        }
    }

    /// All matching files under `root`, sorted by path.
    ///
    /// Unreadable entries below the root are logged and skipped.
    pub fn collect(&self, root: &Path) -> Result<Vec<PathBuf>> {
        Self::validate_root(root)?;

        let walker = WalkDir::new(root)
            .follow_links(self.follow_links)
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !(self.skip_hidden && is_hidden(e)));

        let mut files = Vec::new();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.has_extension(path) || self.is_excluded(root, path) {
                continue;
            }
            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    fn has_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| self.extensions.iter().any(|wanted| wanted == ext))
            .unwrap_or(false)
    }

    fn is_excluded(&self, root: &Path, path: &Path) -> bool {
        if self.exclude.is_empty() {
            return false;
        }
        let relative = path.strip_prefix(root).unwrap_or(path);
        self.exclude.is_match(relative)
    }
}

/// Check if directory entry is hidden
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .map(|s| s.starts_with('.'))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "x = 1\n").unwrap();
    }

    fn relative(root: &Path, files: Vec<PathBuf>) -> Vec<String> {
        files
            .into_iter()
            .map(|p| p.strip_prefix(root).unwrap().to_string_lossy().replace('\\', "/"))
            .collect()
    }

    #[test]
    fn test_collect_sorted_python_files() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a.py");
        touch(dir.path(), "pkg/c.py");
        touch(dir.path(), "notes.txt");

        let files = SourceScanner::new().collect(dir.path()).unwrap();
        assert_eq!(relative(dir.path(), files), vec!["a.py", "b.py", "pkg/c.py"]);
    }

    #[test]
    fn test_hidden_entries_visited_unless_skipped() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tool.py");
        touch(dir.path(), ".venv/lib/site.py");
        touch(dir.path(), ".hidden.py");

        let files = SourceScanner::new().collect(dir.path()).unwrap();
        assert_eq!(files.len(), 3);

        let files = SourceScanner::new()
            .with_skip_hidden(true)
            .collect(dir.path())
            .unwrap();
        assert_eq!(relative(dir.path(), files), vec!["tool.py"]);
    }

    #[test]
    fn test_exclude_patterns() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "tools/a.py");
        touch(dir.path(), "tests/test_a.py");

        let files = SourceScanner::new()
            .with_exclude(["tests/**"])
            .unwrap()
            .collect(dir.path())
            .unwrap();
        assert_eq!(relative(dir.path(), files), vec!["tools/a.py"]);
    }

    #[test]
    fn test_invalid_pattern() {
        let err = SourceScanner::new().with_exclude(["[unclosed"]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidPattern { .. }));
    }

    #[test]
    fn test_root_errors() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("missing");
        assert!(SourceScanner::new().collect(&missing).unwrap_err().is_not_found());

        let file = dir.path().join("file.py");
        fs::write(&file, "").unwrap();
        assert!(SourceScanner::new()
            .collect(&file)
            .unwrap_err()
            .is_not_a_directory());
    }
}
