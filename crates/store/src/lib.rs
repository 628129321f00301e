//! # Codescope Store
//!
//! Durable persistence for scan artifacts and planning documents under
//! a workspace-local control directory:
//!
//! ```text
//! <workspace>/.codescope/
//!     artifacts/<kind>.json            current version per kind
//!     artifacts/<kind>.previous.json   single-generation backup
//!     cache/scan-metadata.json         change-detection snapshot
//!     requirements.json                + requirements.json.bak
//!     tasks.json                       + tasks.json.bak
//!     research.json                    FIFO-capped session list
//! ```
//!
//! Every write goes through a tmp-sibling + rename protocol; every read
//! validates structure and degrades corrupt or missing files to
//! "absent" rather than raising. A read-only workspace can fall back to
//! [`ArtifactStore::in_memory`], which keeps the same semantics in a
//! process-local map.

mod atomic;
mod cache;
mod error;
mod planning;
mod store;

pub use cache::hash_files;
pub use error::{Result, StoreError};
pub use store::{ArtifactStore, CONTROL_DIR};
