use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The closed set of artifact kinds a scan can produce.
///
/// `Documentation` wraps the kind of the raw artifact it was generated
/// from, so `documentation-data-model` and `data-model` coexist in the
/// store without clashing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "source")]
pub enum ArtifactKind {
    DirectoryStructure,
    CodebaseSummary,
    DataModel,
    Architecture,
    Workflow,
    Documentation(String),
}

/// The five raw engine kinds, in pipeline order.
pub const ARTIFACT_KINDS: [ArtifactKind; 5] = [
    ArtifactKind::DirectoryStructure,
    ArtifactKind::CodebaseSummary,
    ArtifactKind::DataModel,
    ArtifactKind::Architecture,
    ArtifactKind::Workflow,
];

impl ArtifactKind {
    /// Stable string form, used for on-disk file names.
    pub fn as_str(&self) -> String {
        match self {
            ArtifactKind::DirectoryStructure => "directory-structure".to_string(),
            ArtifactKind::CodebaseSummary => "codebase-summary".to_string(),
            ArtifactKind::DataModel => "data-model".to_string(),
            ArtifactKind::Architecture => "architecture".to_string(),
            ArtifactKind::Workflow => "workflow".to_string(),
            ArtifactKind::Documentation(source) => format!("documentation-{source}"),
        }
    }

    /// Parse the stable string form back into a kind.
    pub fn parse(value: &str) -> Option<ArtifactKind> {
        match value {
            "directory-structure" => Some(ArtifactKind::DirectoryStructure),
            "codebase-summary" => Some(ArtifactKind::CodebaseSummary),
            "data-model" => Some(ArtifactKind::DataModel),
            "architecture" => Some(ArtifactKind::Architecture),
            "workflow" => Some(ArtifactKind::Workflow),
            other => other
                .strip_prefix("documentation-")
                .filter(|source| !source.is_empty())
                .map(|source| ArtifactKind::Documentation(source.to_string())),
        }
    }
}

impl std::fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_str())
    }
}

/// Transient output of a single engine run.
///
/// `content` is rendered text for the directory tree and serialized JSON
/// for the data-bearing engines. `incomplete` marks a placeholder written
/// after an engine failure or timeout.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactResult {
    pub kind: ArtifactKind,
    pub content: String,
    pub generated_at_utc: DateTime<Utc>,
    pub file_count: u64,
    pub error_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<bool>,
}

impl ArtifactResult {
    pub fn new(kind: ArtifactKind, content: String, file_count: u64, error_count: u64) -> Self {
        Self {
            kind,
            content,
            generated_at_utc: Utc::now(),
            file_count,
            error_count,
            incomplete: None,
        }
    }

    /// Placeholder emitted when an engine fails or times out, so every
    /// kind always has a stored value.
    pub fn incomplete(kind: ArtifactKind, reason: &str) -> Self {
        Self {
            kind: kind.clone(),
            content: format!("Artifact '{}' is incomplete: {reason}", kind.as_str()),
            generated_at_utc: Utc::now(),
            file_count: 0,
            error_count: 1,
            incomplete: Some(true),
        }
    }

    pub fn is_incomplete(&self) -> bool {
        self.incomplete.unwrap_or(false)
    }
}

/// Metadata carried by a persisted artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactMetadata {
    pub generated_at_utc: DateTime<Utc>,
    pub file_count: u64,
    pub error_count: u64,
    /// Strictly increases by 1 on each successful store of a kind.
    pub version: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub incomplete: Option<bool>,
}

/// Durable form of an artifact, as written to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredArtifact {
    pub id: Uuid,
    pub kind: ArtifactKind,
    pub workspace_path: String,
    pub content: String,
    pub metadata: ArtifactMetadata,
}

impl StoredArtifact {
    /// Structural validity check used by every store read path.
    pub fn is_valid(&self) -> bool {
        self.metadata.version >= 1 && !self.workspace_path.is_empty()
    }
}
