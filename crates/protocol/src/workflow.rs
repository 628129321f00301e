use serde::{Deserialize, Serialize};

/// CRUD verb derived from an HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CrudKind {
    Create,
    Read,
    Update,
    Delete,
}

impl CrudKind {
    /// POST→create, GET→read, PUT/PATCH→update, DELETE→delete.
    pub fn from_http_method(method: &str) -> Option<CrudKind> {
        match method.to_ascii_uppercase().as_str() {
            "POST" => Some(CrudKind::Create),
            "GET" => Some(CrudKind::Read),
            "PUT" | "PATCH" => Some(CrudKind::Update),
            "DELETE" => Some(CrudKind::Delete),
            _ => None,
        }
    }
}

/// One exported HTTP-method handler found under an API-route convention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrudOperation {
    pub method: String,
    pub operation: CrudKind,
    pub endpoint: String,
    pub file_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handler_name: Option<String>,
}

/// Workflow category assigned by the naming-convention matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkflowKind {
    Authentication,
    Payment,
    Notification,
    DataSync,
    Validation,
    Crud,
    Unknown,
}

/// A named function or arrow-bound handler found in source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NamedHandler {
    pub name: String,
    pub file_path: String,
    pub kind: WorkflowKind,
    pub line_number: u32,
    pub is_exported: bool,
}

/// Caller→callee edge between functions declared in the same file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CallGraphEdge {
    pub caller: String,
    pub callee: String,
    pub file_path: String,
    pub line_number: u32,
}

/// A resource- or category-grouped workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub name: String,
    pub kind: WorkflowKind,
    pub operations: Vec<CrudOperation>,
    pub handlers: Vec<NamedHandler>,
    /// Deterministic ordering seeded from call-graph entry points.
    pub call_sequence: Vec<String>,
}

/// The workflow artifact payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowModel {
    pub workflows: Vec<Workflow>,
    pub call_graph: Vec<CallGraphEdge>,
}
