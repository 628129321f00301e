//! # Codescope Scan
//!
//! The scan orchestrator: one entry point that walks a workspace, runs
//! the five extraction engines in fixed order, and persists every result
//! through the artifact store.
//!
//! ```text
//! ScanPipeline::run(workspace)
//!     │
//!     ├── walk + parse session (shared across engines)
//!     ├── directory → summary → data-model → architecture → workflow
//!     │     each stage: cancel check → progress → timeout-bounded run
//!     │     failures become stored incomplete placeholders
//!     ├── optional documentation post-pass (DocGenerator)
//!     └── scan-metadata snapshot for change detection
//! ```
//!
//! The only hard failure is a workspace whose store cannot be
//! initialized; everything else degrades into `ScanResult::errors`.

mod docgen;
mod options;
mod pipeline;

pub use docgen::DocGenerator;
pub use options::{
    CancelCheck, ProgressSink, ScanOptions, DEFAULT_ENGINE_TIMEOUT, DEFAULT_MAX_FILE_BYTES,
};
pub use pipeline::{Result, ScanError, ScanPipeline, ScanResult, StageError};
