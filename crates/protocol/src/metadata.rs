use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Change-detection snapshot of a workspace.
///
/// Advisory only: callers compare snapshots to decide whether a rescan is
/// worthwhile, the pipeline itself never auto-skips based on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanMetadata {
    pub timestamp_utc: DateTime<Utc>,
    /// Relative path → sha256 hex digest.
    pub file_hashes: BTreeMap<String, String>,
    pub file_count: u64,
}

impl ScanMetadata {
    pub fn new(file_hashes: BTreeMap<String, String>) -> Self {
        let file_count = file_hashes.len() as u64;
        Self {
            timestamp_utc: Utc::now(),
            file_hashes,
            file_count,
        }
    }

    /// True if anything differs: file counts, path sets, or any shared
    /// path's hash.
    pub fn has_changes(&self, other: &ScanMetadata) -> bool {
        if self.file_count != other.file_count {
            return true;
        }
        if self.file_hashes.len() != other.file_hashes.len() {
            return true;
        }
        for (path, hash) in &self.file_hashes {
            match other.file_hashes.get(path) {
                Some(other_hash) if other_hash == hash => {}
                _ => return true,
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(entries: &[(&str, &str)]) -> ScanMetadata {
        ScanMetadata::new(
            entries
                .iter()
                .map(|(p, h)| (p.to_string(), h.to_string()))
                .collect(),
        )
    }

    #[test]
    fn identical_snapshots_report_no_changes() {
        let a = snapshot(&[("src/main.ts", "aa"), ("lib/db.ts", "bb")]);
        let b = snapshot(&[("src/main.ts", "aa"), ("lib/db.ts", "bb")]);
        assert!(!a.has_changes(&b));
    }

    #[test]
    fn hash_difference_reports_changes() {
        let a = snapshot(&[("src/main.ts", "aa")]);
        let b = snapshot(&[("src/main.ts", "ab")]);
        assert!(a.has_changes(&b));
    }

    #[test]
    fn path_set_difference_reports_changes() {
        let a = snapshot(&[("src/main.ts", "aa")]);
        let b = snapshot(&[("src/index.ts", "aa")]);
        assert!(a.has_changes(&b));

        let c = snapshot(&[("src/main.ts", "aa"), ("src/extra.ts", "cc")]);
        assert!(a.has_changes(&c));
    }
}
