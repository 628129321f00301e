use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Research-session list cap; oldest sessions are evicted first.
pub const MAX_RESEARCH_SESSIONS: usize = 50;

/// Free-form requirements text persisted verbatim for the chat surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequirementsDocument {
    pub content: String,
    pub updated_at_utc: DateTime<Utc>,
}

impl RequirementsDocument {
    pub fn new(content: String) -> Self {
        Self {
            content,
            updated_at_utc: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskItem {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at_utc: DateTime<Utc>,
}

impl TaskItem {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            status: TaskStatus::Pending,
            created_at_utc: Utc::now(),
        }
    }

    /// A task record is usable only if it has an id and a title.
    pub fn is_valid(&self) -> bool {
        !self.title.is_empty()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskList {
    pub tasks: Vec<TaskItem>,
    pub updated_at_utc: Option<DateTime<Utc>>,
}

/// In-memory form of a research session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchSession {
    pub id: Uuid,
    pub query: String,
    pub findings: String,
    pub created_at: DateTime<Utc>,
}

impl ResearchSession {
    pub fn new(query: impl Into<String>, findings: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            query: query.into(),
            findings: findings.into(),
            created_at: Utc::now(),
        }
    }
}

/// On-disk form: the timestamp serializes as an RFC 3339 string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredResearchSession {
    pub id: Uuid,
    pub query: String,
    pub findings: String,
    pub created_at: String,
}

impl From<&ResearchSession> for StoredResearchSession {
    fn from(session: &ResearchSession) -> Self {
        Self {
            id: session.id,
            query: session.query.clone(),
            findings: session.findings.clone(),
            created_at: session.created_at.to_rfc3339(),
        }
    }
}

impl StoredResearchSession {
    /// Convert back to the structured form; `None` when the stored
    /// timestamp is not parseable.
    pub fn into_session(self) -> Option<ResearchSession> {
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .ok()?
            .with_timezone(&Utc);
        Some(ResearchSession {
            id: self.id,
            query: self.query,
            findings: self.findings,
            created_at,
        })
    }
}
