//! # Codescope Engines
//!
//! The five extraction engines and the naming-convention matchers they
//! share. Each engine consumes the walker/parsers output and produces
//! one self-contained [`ArtifactResult`](codescope_protocol::ArtifactResult):
//!
//! ```text
//! WalkOutcome + ParseSession
//!     │
//!     ├──> DirectoryStructure  (indented tree, counts + sizes)
//!     ├──> CodebaseSummary     (manifests, languages, frameworks)
//!     ├──> DataModel           (entities, enums, relationships)
//!     ├──> Architecture        (layers, entry points, import graph)
//!     └──> Workflow            (CRUD ops, handlers, call sequences)
//! ```
//!
//! Engines fail soft: unreadable or unparsable files are counted in the
//! artifact's `error_count` and skipped, never raised.

mod architecture;
mod data_model;
mod directory;
mod error;
mod patterns;
mod summary;
mod workflow;

pub use architecture::ArchitectureEngine;
pub use data_model::DataModelEngine;
pub use directory::DirectoryStructureEngine;
pub use error::{EngineError, Result};
pub use patterns::{
    dominant_kind, match_entry_point, match_layer, match_workflow_name, resource_workflow_name,
};
pub use summary::CodebaseSummaryEngine;
pub use workflow::WorkflowEngine;
