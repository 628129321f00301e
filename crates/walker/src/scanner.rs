use crate::fs_ops::{list_entries, read_safe};
use crate::ignore_rules::IgnoreRules;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

pub const DEFAULT_MAX_DEPTH: usize = 10;

const GITIGNORE_MAX_BYTES: u64 = 262_144;

/// Directory names excluded before any gitignore pattern is consulted,
/// by exact segment match.
pub const DENIED_SEGMENTS: &[&str] = &[
    // our own scan output
    ".codescope",
    // VCS / tooling
    ".git",
    ".hg",
    ".svn",
    ".idea",
    ".vscode",
    ".husky",
    ".yarn",
    ".npm",
    // caches / builds
    ".cache",
    "node_modules",
    ".next",
    ".nuxt",
    ".turbo",
    ".output",
    ".vercel",
    ".svelte-kit",
    "build",
    "dist",
    "out",
    "coverage",
    "target",
    ".venv",
    "venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    // data / vendor
    "vendor",
    "third_party",
    "third-party",
];

pub fn is_denied_segment(name: &str) -> bool {
    let lowered = name.to_lowercase();
    DENIED_SEGMENTS.iter().any(|denied| denied == &lowered)
}

/// Walk-scoped guard against circular symlinks.
///
/// Tracks canonical paths seen during one walk; re-entering a canonical
/// path reports circular and the walker does not descend.
pub struct CycleGuard {
    visited: HashSet<PathBuf>,
}

impl CycleGuard {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
        }
    }

    /// Returns `false` when the directory's canonical path was already
    /// visited in this walk.
    pub fn enter(&mut self, dir: &Path) -> bool {
        let canonical = match dir.canonicalize() {
            Ok(c) => c,
            // Unresolvable paths can't cycle; let the walker find out
            // the directory is unreadable on its own.
            Err(_) => dir.to_path_buf(),
        };
        self.visited.insert(canonical)
    }
}

impl Default for CycleGuard {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
pub struct WalkedFile {
    /// Workspace-relative path with `/` separators.
    pub rel_path: String,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct WalkedDir {
    pub rel_path: String,
    pub depth: usize,
}

/// Everything a single walk saw.
#[derive(Debug, Default)]
pub struct WalkOutcome {
    pub files: Vec<WalkedFile>,
    pub dirs: Vec<WalkedDir>,
    /// Relative paths of directories skipped as circular symlinks.
    pub circular: Vec<String>,
}

/// Deterministic depth-first workspace traversal.
///
/// Entries come out sorted by name per directory regardless of readdir
/// order, the static deny-list is checked before gitignore rules, and a
/// per-walk [`CycleGuard`] stops symlink loops.
pub struct ProjectWalker {
    root: PathBuf,
    max_depth: usize,
    rules: IgnoreRules,
}

impl ProjectWalker {
    /// Create a walker rooted at `root`, loading the root `.gitignore`
    /// if one exists.
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref().to_path_buf();
        let rules = read_safe(&root.join(".gitignore"), GITIGNORE_MAX_BYTES)
            .map(|text| IgnoreRules::parse(&text))
            .unwrap_or_else(IgnoreRules::empty);
        Self {
            root,
            max_depth: DEFAULT_MAX_DEPTH,
            rules,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn walk(&self) -> WalkOutcome {
        let mut outcome = WalkOutcome::default();
        let mut guard = CycleGuard::new();
        guard.enter(&self.root);
        self.walk_dir(&self.root, 0, &mut guard, &mut outcome);
        log::debug!(
            "Walked {}: {} files, {} dirs, {} circular",
            self.root.display(),
            outcome.files.len(),
            outcome.dirs.len(),
            outcome.circular.len()
        );
        outcome
    }

    fn walk_dir(&self, dir: &Path, depth: usize, guard: &mut CycleGuard, out: &mut WalkOutcome) {
        if depth >= self.max_depth {
            return;
        }

        for entry in list_entries(dir) {
            let rel_path = self.relative(&entry.path);
            if entry.is_dir {
                if is_denied_segment(&entry.name) {
                    continue;
                }
                if self.rules.is_ignored(&rel_path, true) {
                    continue;
                }
                if !guard.enter(&entry.path) {
                    log::debug!("Circular symlink at {rel_path}");
                    out.circular.push(rel_path);
                    continue;
                }
                out.dirs.push(WalkedDir {
                    rel_path,
                    depth: depth + 1,
                });
                self.walk_dir(&entry.path, depth + 1, guard, out);
            } else {
                if self.rules.is_ignored(&rel_path, false) {
                    continue;
                }
                out.files.push(WalkedFile {
                    rel_path,
                    size: entry.size,
                });
            }
        }
    }

    fn relative(&self, path: &Path) -> String {
        path.strip_prefix(&self.root)
            .unwrap_or(path)
            .to_string_lossy()
            .replace('\\', "/")
    }
}
