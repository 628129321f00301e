use std::fs;
use std::path::{Path, PathBuf};

/// One directory entry, as returned by [`list_entries`].
#[derive(Debug, Clone)]
pub struct DirEntryInfo {
    pub name: String,
    pub path: PathBuf,
    pub is_dir: bool,
    /// File size in bytes; 0 for directories.
    pub size: u64,
}

/// List a directory's entries sorted by name.
///
/// Any I/O error (missing dir, permission denied) yields an empty list,
/// never an error: inaccessible corners of a workspace must not fail a
/// scan.
pub fn list_entries(dir: &Path) -> Vec<DirEntryInfo> {
    let Ok(read_dir) = fs::read_dir(dir) else {
        log::debug!("Unreadable directory {}", dir.display());
        return Vec::new();
    };

    let mut entries: Vec<DirEntryInfo> = Vec::new();
    for entry in read_dir.flatten() {
        let Some(name) = entry.file_name().to_str().map(str::to_string) else {
            continue;
        };
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        // resolve symlinks so a linked directory walks as a directory;
        // broken links are skipped
        let meta = if file_type.is_symlink() {
            match fs::metadata(&path) {
                Ok(meta) => meta,
                Err(_) => continue,
            }
        } else {
            match entry.metadata() {
                Ok(meta) => meta,
                Err(_) => continue,
            }
        };
        let is_dir = meta.is_dir();
        entries.push(DirEntryInfo {
            name,
            path,
            is_dir,
            size: if is_dir { 0 } else { meta.len() },
        });
    }

    entries.sort_by(|a, b| a.name.cmp(&b.name));
    entries
}

/// Fail-closed directory check.
pub fn is_directory(path: &Path) -> bool {
    fs::metadata(path).map(|m| m.is_dir()).unwrap_or(false)
}

/// Fail-closed existence check.
pub fn path_exists(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Extensions we never try to read as text.
const BINARY_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "webp", "ico", "bmp", "tiff", "pdf", "zip", "tar", "gz", "bz2",
    "xz", "7z", "rar", "exe", "dll", "so", "dylib", "a", "o", "class", "jar", "war", "wasm",
    "woff", "woff2", "ttf", "otf", "eot", "mp3", "mp4", "avi", "mov", "mkv", "sqlite", "db",
    "bin", "dat", "pyc", "node",
];

/// Read a file as text, defensively.
///
/// Returns `None` when the extension is known-binary, the file exceeds
/// `max_bytes`, or any I/O error occurs. Invalid UTF-8 falls back to a
/// byte-per-char decoding so legacy-encoded sources still yield text.
pub fn read_safe(path: &Path, max_bytes: u64) -> Option<String> {
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        let ext = ext.to_lowercase();
        if BINARY_EXTENSIONS.iter().any(|b| b == &ext) {
            return None;
        }
    }

    let meta = fs::metadata(path).ok()?;
    if meta.len() > max_bytes {
        log::debug!(
            "Skipping large file {} ({} bytes > {})",
            path.display(),
            meta.len(),
            max_bytes
        );
        return None;
    }

    let bytes = fs::read(path).ok()?;
    match String::from_utf8(bytes) {
        Ok(text) => Some(text),
        Err(err) => {
            // Latin-1-style fallback: every byte maps to one char.
            let bytes = err.into_bytes();
            Some(bytes.iter().map(|&b| b as char).collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn list_entries_sorts_and_swallows_errors() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("zeta.ts"), "x").unwrap();
        fs::write(temp.path().join("alpha.ts"), "x").unwrap();
        fs::create_dir(temp.path().join("mid")).unwrap();

        let names: Vec<String> = list_entries(temp.path())
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, vec!["alpha.ts", "mid", "zeta.ts"]);

        assert!(list_entries(&temp.path().join("no-such-dir")).is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_list_as_directories() {
        let temp = tempdir().unwrap();
        fs::create_dir(temp.path().join("real")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("real"), temp.path().join("link")).unwrap();
        std::os::unix::fs::symlink(temp.path().join("gone"), temp.path().join("broken")).unwrap();

        let entries = list_entries(temp.path());
        let link = entries.iter().find(|e| e.name == "link").unwrap();
        assert!(link.is_dir);
        // a dangling link has no target to classify
        assert!(!entries.iter().any(|e| e.name == "broken"));
    }

    #[test]
    fn fail_closed_checks() {
        let temp = tempdir().unwrap();
        assert!(is_directory(temp.path()));
        assert!(!is_directory(&temp.path().join("missing")));
        assert!(!path_exists(&temp.path().join("missing")));
    }

    #[test]
    fn read_safe_refuses_binary_and_oversized() {
        let temp = tempdir().unwrap();
        let png = temp.path().join("logo.png");
        fs::write(&png, [0x89, 0x50, 0x4e, 0x47]).unwrap();
        assert_eq!(read_safe(&png, 1024), None);

        let big = temp.path().join("big.txt");
        fs::write(&big, "0123456789").unwrap();
        assert_eq!(read_safe(&big, 5), None);
        assert_eq!(read_safe(&big, 1024).as_deref(), Some("0123456789"));
    }

    #[test]
    fn read_safe_decodes_invalid_utf8_lossily() {
        let temp = tempdir().unwrap();
        let latin = temp.path().join("legacy.txt");
        // "café" in Latin-1: the 0xE9 byte is invalid UTF-8.
        fs::write(&latin, [b'c', b'a', b'f', 0xE9]).unwrap();
        let text = read_safe(&latin, 1024).unwrap();
        assert_eq!(text, "caf\u{e9}");
    }

    #[test]
    fn read_safe_returns_none_for_missing_file() {
        let temp = tempdir().unwrap();
        assert_eq!(read_safe(&temp.path().join("gone.ts"), 1024), None);
    }
}
