use crate::atomic::{read_validated, write_atomic};
use crate::error::{Result, StoreError};
use codescope_protocol::{
    ArtifactKind, ArtifactMetadata, ArtifactResult, RequirementsDocument, ScanMetadata,
    StoredArtifact, StoredResearchSession, TaskList,
};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use uuid::Uuid;

/// Workspace-relative control directory.
pub const CONTROL_DIR: &str = ".codescope";

#[derive(Default)]
pub(crate) struct MemoryState {
    pub current: HashMap<String, StoredArtifact>,
    pub previous: HashMap<String, StoredArtifact>,
    pub requirements: Option<RequirementsDocument>,
    pub tasks: Option<TaskList>,
    pub research: Vec<StoredResearchSession>,
    pub scan_metadata: Option<ScanMetadata>,
}

pub(crate) enum Backend {
    Disk { root: PathBuf },
    Memory { state: Mutex<MemoryState> },
}

/// Atomic, versioned, validated persistence for artifacts and planning
/// documents.
///
/// One store instance per workspace at a time; concurrent external
/// writers to the same control directory are out of scope.
pub struct ArtifactStore {
    pub(crate) backend: Backend,
    workspace_path: String,
}

impl ArtifactStore {
    /// Open (and create) the control directory under `workspace_root`.
    ///
    /// An unwritable root is the one failure class that prevents a scan
    /// from starting; callers may fall back to [`ArtifactStore::in_memory`].
    pub async fn open(workspace_root: impl AsRef<Path>) -> Result<ArtifactStore> {
        let workspace_root = workspace_root.as_ref();
        let root = workspace_root.join(CONTROL_DIR);
        for dir in [root.clone(), root.join("artifacts"), root.join("cache")] {
            tokio::fs::create_dir_all(&dir).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::PermissionDenied {
                    StoreError::ReadOnly(workspace_root.display().to_string())
                } else {
                    StoreError::from_io(e, &dir)
                }
            })?;
        }
        Ok(ArtifactStore {
            backend: Backend::Disk { root },
            workspace_path: workspace_root.display().to_string(),
        })
    }

    /// Process-local fallback for read-only workspaces. Keeps the same
    /// versioning semantics without touching the file system.
    pub fn in_memory() -> ArtifactStore {
        ArtifactStore {
            backend: Backend::Memory {
                state: Mutex::new(MemoryState::default()),
            },
            workspace_path: "<in-memory>".to_string(),
        }
    }

    pub fn workspace_path(&self) -> &str {
        &self.workspace_path
    }

    fn artifact_path(root: &Path, kind: &ArtifactKind) -> PathBuf {
        root.join("artifacts").join(format!("{}.json", kind.as_str()))
    }

    fn previous_path(root: &Path, kind: &ArtifactKind) -> PathBuf {
        root.join("artifacts")
            .join(format!("{}.previous.json", kind.as_str()))
    }

    /// Persist an engine result, bumping the kind's version and demoting
    /// the prior current file to the single `.previous` backup.
    pub async fn store_artifact(&self, result: &ArtifactResult) -> Result<StoredArtifact> {
        let existing = self.load_artifact(&result.kind).await?;
        let version = existing.as_ref().map(|a| a.metadata.version + 1).unwrap_or(1);

        let stored = StoredArtifact {
            id: Uuid::new_v4(),
            kind: result.kind.clone(),
            workspace_path: self.workspace_path.clone(),
            content: result.content.clone(),
            metadata: ArtifactMetadata {
                generated_at_utc: result.generated_at_utc,
                file_count: result.file_count,
                error_count: result.error_count,
                version,
                incomplete: result.incomplete,
            },
        };

        match &self.backend {
            Backend::Disk { root } => {
                let path = Self::artifact_path(root, &result.kind);
                if existing.is_some() {
                    // Backup failure must not block the write.
                    let backup = Self::previous_path(root, &result.kind);
                    if let Err(e) = tokio::fs::copy(&path, &backup).await {
                        log::warn!(
                            "Failed to back up {} before overwrite: {e}",
                            path.display()
                        );
                    }
                }
                let bytes = serde_json::to_vec_pretty(&stored)?;
                write_atomic(&path, &bytes).await?;
            }
            Backend::Memory { state } => {
                let mut state = state.lock().expect("store mutex");
                let key = result.kind.as_str();
                if let Some(old) = state.current.remove(&key) {
                    state.previous.insert(key.clone(), old);
                }
                state.current.insert(key, stored.clone());
            }
        }

        log::debug!(
            "Stored artifact {} v{version} ({} bytes)",
            result.kind.as_str(),
            result.content.len()
        );
        Ok(stored)
    }

    /// Current artifact for a kind; `None` for missing or corrupt files.
    pub async fn load_artifact(&self, kind: &ArtifactKind) -> Result<Option<StoredArtifact>> {
        match &self.backend {
            Backend::Disk { root } => {
                let path = Self::artifact_path(root, kind);
                Ok(read_validated(&path, StoredArtifact::is_valid).await)
            }
            Backend::Memory { state } => {
                let state = state.lock().expect("store mutex");
                Ok(state.current.get(&kind.as_str()).cloned())
            }
        }
    }

    /// All current artifacts, sorted by kind string.
    pub async fn list_artifacts(&self) -> Result<Vec<StoredArtifact>> {
        let mut artifacts: Vec<StoredArtifact> = match &self.backend {
            Backend::Disk { root } => {
                let dir = root.join("artifacts");
                let mut artifacts = Vec::new();
                let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
                    return Ok(artifacts);
                };
                while let Ok(Some(entry)) = entries.next_entry().await {
                    let name = entry.file_name().to_string_lossy().into_owned();
                    if !name.ends_with(".json") || name.ends_with(".previous.json") {
                        continue;
                    }
                    if let Some(artifact) =
                        read_validated(&entry.path(), StoredArtifact::is_valid).await
                    {
                        artifacts.push(artifact);
                    }
                }
                artifacts
            }
            Backend::Memory { state } => {
                let state = state.lock().expect("store mutex");
                state.current.values().cloned().collect()
            }
        };
        artifacts.sort_by_key(|a| a.kind.as_str());
        Ok(artifacts)
    }

    /// Re-promote a kind's backup to current and consume it. `false`
    /// (not an error) when no backup exists or it is itself invalid.
    pub async fn restore_previous(&self, kind: &ArtifactKind) -> Result<bool> {
        match &self.backend {
            Backend::Disk { root } => {
                let backup_path = Self::previous_path(root, kind);
                let Some(backup) =
                    read_validated::<StoredArtifact>(&backup_path, StoredArtifact::is_valid).await
                else {
                    return Ok(false);
                };
                let bytes = serde_json::to_vec_pretty(&backup)?;
                write_atomic(&Self::artifact_path(root, kind), &bytes).await?;
                if let Err(e) = tokio::fs::remove_file(&backup_path).await {
                    log::warn!("Failed to remove consumed backup: {e}");
                }
                Ok(true)
            }
            Backend::Memory { state } => {
                let mut state = state.lock().expect("store mutex");
                let key = kind.as_str();
                match state.previous.remove(&key) {
                    Some(backup) => {
                        state.current.insert(key, backup);
                        Ok(true)
                    }
                    None => Ok(false),
                }
            }
        }
    }
}
