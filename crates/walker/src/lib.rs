//! # Codescope Walker
//!
//! Gitignore-aware, symlink-cycle-safe traversal of a target workspace,
//! plus the fail-closed file-system primitives the engines build on.
//!
//! Contract highlights:
//! - `list_entries` / `is_directory` / `path_exists` never fail: an
//!   inaccessible path reads as empty / `false`.
//! - `read_safe` returns `None` for binary, oversized, or unreadable
//!   files; callers treat `None` as "skip, don't fail the scan".
//! - The walker checks a static segment deny-list before any gitignore
//!   pattern, and guards against circular symlinks per walk.

mod fs_ops;
mod ignore_rules;
mod scanner;

pub use fs_ops::{list_entries, path_exists, read_safe, DirEntryInfo};
pub use ignore_rules::IgnoreRules;
pub use scanner::{
    is_denied_segment, CycleGuard, ProjectWalker, WalkOutcome, WalkedDir, WalkedFile,
    DEFAULT_MAX_DEPTH, DENIED_SEGMENTS,
};

pub fn is_directory(path: &std::path::Path) -> bool {
    fs_ops::is_directory(path)
}
