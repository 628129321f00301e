use crate::source_file::{Language, SourceFile};
use codescope_walker::read_safe;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Scan-scoped parse cache.
///
/// Owned by the orchestrator for the duration of one scan and passed
/// into the engines that need source trees, so each file is read and
/// parsed at most once per scan. Not a process-wide singleton: dropping
/// the session drops every cached tree.
pub struct ParseSession {
    root: PathBuf,
    max_file_bytes: u64,
    cache: HashMap<String, Option<Arc<SourceFile>>>,
    error_count: u64,
}

impl ParseSession {
    pub fn new(root: impl AsRef<Path>, max_file_bytes: u64) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            max_file_bytes,
            cache: HashMap::new(),
            error_count: 0,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Parse a workspace-relative source file, reusing the cached tree
    /// on repeat calls.
    ///
    /// `None` means "skip this file": unsupported language, unreadable
    /// content, or a parse failure (the latter increments the error
    /// counter exactly once per file).
    pub fn parse(&mut self, rel_path: &str) -> Option<Arc<SourceFile>> {
        if let Some(cached) = self.cache.get(rel_path) {
            return cached.clone();
        }

        let parsed = self.parse_uncached(rel_path);
        self.cache.insert(rel_path.to_string(), parsed.clone());
        parsed
    }

    fn parse_uncached(&mut self, rel_path: &str) -> Option<Arc<SourceFile>> {
        let path = self.root.join(rel_path);
        let language = Language::from_path(&path)?;
        let content = read_safe(&path, self.max_file_bytes)?;
        match SourceFile::parse(rel_path.to_string(), content, language) {
            Ok(file) => Some(Arc::new(file)),
            Err(e) => {
                log::debug!("Skipping unparsable file {rel_path}: {e}");
                self.error_count += 1;
                None
            }
        }
    }

    /// Files skipped due to parse failures so far.
    pub fn error_count(&self) -> u64 {
        self.error_count
    }

    /// Files parsed successfully so far.
    pub fn parsed_count(&self) -> usize {
        self.cache.values().filter(|v| v.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn parse_caches_per_file() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("a.ts"), "export const x = 1;").unwrap();

        let mut session = ParseSession::new(temp.path(), 1_048_576);
        let first = session.parse("a.ts").unwrap();
        let second = session.parse("a.ts").unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(session.parsed_count(), 1);
    }

    #[test]
    fn unsupported_and_missing_files_are_skipped_without_errors() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("README.md"), "# readme").unwrap();

        let mut session = ParseSession::new(temp.path(), 1_048_576);
        assert!(session.parse("README.md").is_none());
        assert!(session.parse("gone.ts").is_none());
        assert_eq!(session.error_count(), 0);
    }
}
