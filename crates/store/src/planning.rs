//! Planning documents: requirements, task lists, research sessions.
//!
//! These share the store's write protocol but differ from artifacts in
//! two ways: backups use a `.bak` suffix instead of generation files,
//! and task loading filters invalid records instead of discarding the
//! whole list.

use crate::atomic::{read_validated, write_atomic};
use crate::error::Result;
use crate::store::{ArtifactStore, Backend};
use codescope_protocol::{
    RequirementsDocument, ResearchSession, StoredResearchSession, TaskItem, TaskList,
    MAX_RESEARCH_SESSIONS,
};
use chrono::Utc;
use std::path::Path;

const REQUIREMENTS_FILE: &str = "requirements.json";
const TASKS_FILE: &str = "tasks.json";
const RESEARCH_FILE: &str = "research.json";

/// Copy `path` to `path.bak` (best effort), then write atomically.
async fn backup_then_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut bak = path.as_os_str().to_owned();
    bak.push(".bak");
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        if let Err(e) = tokio::fs::copy(path, &bak).await {
            log::warn!("Failed to back up {}: {e}", path.display());
        }
    }
    write_atomic(path, bytes).await
}

impl ArtifactStore {
    pub async fn save_requirements(&self, content: &str) -> Result<RequirementsDocument> {
        let doc = RequirementsDocument::new(content.to_string());
        match &self.backend {
            Backend::Disk { root } => {
                let bytes = serde_json::to_vec_pretty(&doc)?;
                backup_then_write(&root.join(REQUIREMENTS_FILE), &bytes).await?;
            }
            Backend::Memory { state } => {
                state.lock().expect("store mutex").requirements = Some(doc.clone());
            }
        }
        Ok(doc)
    }

    pub async fn load_requirements(&self) -> Result<Option<RequirementsDocument>> {
        match &self.backend {
            Backend::Disk { root } => {
                Ok(read_validated(&root.join(REQUIREMENTS_FILE), |_: &RequirementsDocument| true)
                    .await)
            }
            Backend::Memory { state } => {
                Ok(state.lock().expect("store mutex").requirements.clone())
            }
        }
    }

    pub async fn save_tasks(&self, tasks: Vec<TaskItem>) -> Result<TaskList> {
        let list = TaskList {
            tasks,
            updated_at_utc: Some(Utc::now()),
        };
        match &self.backend {
            Backend::Disk { root } => {
                let bytes = serde_json::to_vec_pretty(&list)?;
                backup_then_write(&root.join(TASKS_FILE), &bytes).await?;
            }
            Backend::Memory { state } => {
                state.lock().expect("store mutex").tasks = Some(list.clone());
            }
        }
        Ok(list)
    }

    /// Load the task list, dropping records that fail to parse or fail
    /// validation. A missing or wholly unreadable file yields an empty
    /// list.
    pub async fn load_tasks(&self) -> Result<TaskList> {
        match &self.backend {
            Backend::Disk { root } => {
                let path = root.join(TASKS_FILE);
                let Some(raw) = read_validated::<serde_json::Value>(&path, |_| true).await else {
                    return Ok(TaskList::default());
                };
                let mut list = TaskList {
                    tasks: Vec::new(),
                    updated_at_utc: raw
                        .get("updatedAtUtc")
                        .and_then(|v| serde_json::from_value(v.clone()).ok()),
                };
                let records = raw
                    .get("tasks")
                    .and_then(|v| v.as_array())
                    .cloned()
                    .unwrap_or_default();
                let mut dropped = 0usize;
                for record in records {
                    match serde_json::from_value::<TaskItem>(record) {
                        Ok(task) if task.is_valid() => list.tasks.push(task),
                        _ => dropped += 1,
                    }
                }
                if dropped > 0 {
                    log::warn!("Dropped {dropped} invalid task record(s) from {}", path.display());
                }
                Ok(list)
            }
            Backend::Memory { state } => Ok(state
                .lock()
                .expect("store mutex")
                .tasks
                .clone()
                .unwrap_or_default()),
        }
    }

    /// Append a research session, evicting the oldest entries beyond the
    /// session cap.
    pub async fn append_research_session(&self, session: &ResearchSession) -> Result<()> {
        match &self.backend {
            Backend::Disk { root } => {
                let path = root.join(RESEARCH_FILE);
                let mut sessions: Vec<StoredResearchSession> =
                    read_validated(&path, |_: &Vec<StoredResearchSession>| true)
                        .await
                        .unwrap_or_default();
                sessions.push(StoredResearchSession::from(session));
                if sessions.len() > MAX_RESEARCH_SESSIONS {
                    let overflow = sessions.len() - MAX_RESEARCH_SESSIONS;
                    sessions.drain(..overflow);
                }
                let bytes = serde_json::to_vec_pretty(&sessions)?;
                write_atomic(&path, &bytes).await?;
            }
            Backend::Memory { state } => {
                let mut state = state.lock().expect("store mutex");
                state.research.push(StoredResearchSession::from(session));
                if state.research.len() > MAX_RESEARCH_SESSIONS {
                    let overflow = state.research.len() - MAX_RESEARCH_SESSIONS;
                    state.research.drain(..overflow);
                }
            }
        }
        Ok(())
    }

    /// Sessions in insertion order; entries with unparseable timestamps
    /// are skipped.
    pub async fn list_research_sessions(&self) -> Result<Vec<ResearchSession>> {
        let stored: Vec<StoredResearchSession> = match &self.backend {
            Backend::Disk { root } => {
                read_validated(&root.join(RESEARCH_FILE), |_: &Vec<StoredResearchSession>| true)
                    .await
                    .unwrap_or_default()
            }
            Backend::Memory { state } => state.lock().expect("store mutex").research.clone(),
        };
        Ok(stored
            .into_iter()
            .filter_map(StoredResearchSession::into_session)
            .collect())
    }
}
