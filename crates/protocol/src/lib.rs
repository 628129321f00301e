//! # Codescope Protocol
//!
//! Shared data model for the scan pipeline and the artifact store.
//!
//! Everything here is plain serde data: engines produce it, the store
//! persists it, and external surfaces (chat, documentation generators)
//! consume it as JSON. No I/O lives in this crate.

mod architecture;
mod artifact;
mod entity;
mod metadata;
mod planning;
mod summary;
mod workflow;

pub use architecture::{
    ArchitectureLayer, ArchitectureModel, DependencyEdge, DependencyKind, EntryPoint,
    EntryPointKind, LayerInfo,
};
pub use artifact::{
    ArtifactKind, ArtifactMetadata, ArtifactResult, StoredArtifact, ARTIFACT_KINDS,
};
pub use entity::{
    DataModel, EntityDefinition, EntitySource, EnumDefinition, FieldDefinition, Relationship,
    RelationshipKind,
};
pub use metadata::ScanMetadata;
pub use planning::{
    RequirementsDocument, ResearchSession, StoredResearchSession, TaskItem, TaskList, TaskStatus,
    MAX_RESEARCH_SESSIONS,
};
pub use summary::{CodebaseSummary, LanguageShare};
pub use workflow::{
    CallGraphEdge, CrudKind, CrudOperation, NamedHandler, Workflow, WorkflowKind, WorkflowModel,
};
