use crate::error::Result;
use crate::patterns::{dominant_kind, match_entry_point, match_workflow_name, resource_workflow_name};
use codescope_parsers::{extract_handlers, ParseSession};
use codescope_protocol::{
    ArtifactKind, ArtifactResult, CallGraphEdge, CrudKind, CrudOperation, EntryPointKind,
    NamedHandler, Workflow, WorkflowKind, WorkflowModel,
};
use codescope_walker::WalkOutcome;
use std::collections::HashSet;

/// Derives CRUD operations from API-route conventions, collects named
/// handlers with their intra-file call graph, and groups both into
/// resource- or category-named workflows.
pub struct WorkflowEngine;

impl WorkflowEngine {
    pub fn run(&self, walk: &WalkOutcome, session: &mut ParseSession) -> Result<ArtifactResult> {
        let errors_before = session.error_count();
        let mut parsed = 0u64;

        let mut operations: Vec<CrudOperation> = Vec::new();
        let mut handlers: Vec<NamedHandler> = Vec::new();
        let mut call_graph: Vec<CallGraphEdge> = Vec::new();

        for file in &walk.files {
            let Some(source) = session.parse(&file.rel_path) else {
                continue;
            };
            parsed += 1;
            let scan = extract_handlers(&source);

            let route = match_entry_point(&file.rel_path)
                .filter(|(kind, _)| *kind == EntryPointKind::ApiRoute);
            if let Some((_, route_name)) = &route {
                let endpoint = format!("/{route_name}");
                for handler in &scan.handlers {
                    if !handler.is_exported {
                        continue;
                    }
                    if let Some(operation) = CrudKind::from_http_method(&handler.name) {
                        operations.push(CrudOperation {
                            method: handler.name.to_ascii_uppercase(),
                            operation,
                            endpoint: endpoint.clone(),
                            file_path: file.rel_path.clone(),
                            handler_name: Some(handler.name.clone()),
                        });
                    }
                }
            }

            for handler in &scan.handlers {
                // Method-named route exports are already captured as
                // operations.
                if CrudKind::from_http_method(&handler.name).is_some() && route.is_some() {
                    continue;
                }
                handlers.push(NamedHandler {
                    name: handler.name.clone(),
                    file_path: file.rel_path.clone(),
                    kind: match_workflow_name(&handler.name),
                    line_number: handler.line,
                    is_exported: handler.is_exported,
                });
            }
            for call in &scan.calls {
                call_graph.push(CallGraphEdge {
                    caller: call.caller.clone(),
                    callee: call.callee.clone(),
                    file_path: file.rel_path.clone(),
                    line_number: call.line,
                });
            }
        }

        let workflows = group_workflows(&operations, &handlers, &call_graph);
        let model = WorkflowModel {
            workflows,
            call_graph,
        };

        log::debug!(
            "Workflows: {} groups from {} operations, {} handlers",
            model.workflows.len(),
            operations.len(),
            handlers.len()
        );

        let content = serde_json::to_string_pretty(&model)?;
        Ok(ArtifactResult::new(
            ArtifactKind::Workflow,
            content,
            parsed,
            session.error_count() - errors_before,
        ))
    }
}

/// First endpoint segment that is not `api`.
fn resource_of(endpoint: &str) -> Option<String> {
    endpoint
        .split('/')
        .filter(|s| !s.is_empty())
        .find(|s| !s.eq_ignore_ascii_case("api"))
        .map(|s| s.to_lowercase())
}

fn category_display(kind: WorkflowKind) -> &'static str {
    match kind {
        WorkflowKind::Authentication => "Authentication",
        WorkflowKind::Payment => "Payments",
        WorkflowKind::Notification => "Notifications",
        WorkflowKind::DataSync => "Data Synchronization",
        WorkflowKind::Validation => "Validation",
        WorkflowKind::Crud => "Data Operations",
        WorkflowKind::Unknown => "General",
    }
}

fn group_workflows(
    operations: &[CrudOperation],
    handlers: &[NamedHandler],
    call_graph: &[CallGraphEdge],
) -> Vec<Workflow> {
    let mut workflows = Vec::new();
    let mut attached: HashSet<usize> = HashSet::new();

    // Resource groups, in order of first appearance.
    let mut resources: Vec<String> = Vec::new();
    for op in operations {
        if let Some(resource) = resource_of(&op.endpoint) {
            if !resources.contains(&resource) {
                resources.push(resource);
            }
        }
    }

    for resource in &resources {
        let ops: Vec<CrudOperation> = operations
            .iter()
            .filter(|op| resource_of(&op.endpoint).as_deref() == Some(resource))
            .cloned()
            .collect();

        let mut group_handlers: Vec<NamedHandler> = Vec::new();
        for (i, handler) in handlers.iter().enumerate() {
            if handler.file_path.to_lowercase().contains(resource.as_str()) {
                attached.insert(i);
                group_handlers.push(handler.clone());
            }
        }

        let kinds: Vec<WorkflowKind> = group_handlers.iter().map(|h| h.kind).collect();
        let mut kind = dominant_kind(&kinds);
        if kind == WorkflowKind::Unknown {
            kind = WorkflowKind::Crud;
        }

        let call_sequence = call_sequence(&group_handlers, call_graph);
        workflows.push(Workflow {
            name: resource_workflow_name(resource),
            kind,
            operations: ops,
            handlers: group_handlers,
            call_sequence,
        });
    }

    // Leftover handlers cluster by shared category; singleton
    // categories are dropped, not emitted as workflows of one.
    let mut leftover_kinds: Vec<WorkflowKind> = Vec::new();
    for (i, handler) in handlers.iter().enumerate() {
        if attached.contains(&i)
            || handler.kind == WorkflowKind::Unknown
            || leftover_kinds.contains(&handler.kind)
        {
            continue;
        }
        leftover_kinds.push(handler.kind);
    }

    for kind in leftover_kinds {
        let group_handlers: Vec<NamedHandler> = handlers
            .iter()
            .enumerate()
            .filter(|(i, h)| !attached.contains(i) && h.kind == kind)
            .map(|(_, h)| h.clone())
            .collect();
        if group_handlers.len() < 2 {
            continue;
        }
        let call_sequence = call_sequence(&group_handlers, call_graph);
        workflows.push(Workflow {
            name: category_display(kind).to_string(),
            kind,
            operations: Vec::new(),
            handlers: group_handlers,
            call_sequence,
        });
    }

    workflows
}

/// Deterministic ordering seeded from call-graph entry points (callers
/// that are never callees), with unvisited handlers appended in their
/// original order.
fn call_sequence(handlers: &[NamedHandler], call_graph: &[CallGraphEdge]) -> Vec<String> {
    let names: Vec<&str> = {
        let mut seen = HashSet::new();
        handlers
            .iter()
            .map(|h| h.name.as_str())
            .filter(|n| seen.insert(*n))
            .collect()
    };
    let in_group: HashSet<&str> = names.iter().copied().collect();

    // Edge list restricted to this group, with adjacency by name.
    let edges: Vec<(&str, &str)> = call_graph
        .iter()
        .filter(|e| in_group.contains(e.caller.as_str()) && in_group.contains(e.callee.as_str()))
        .map(|e| (e.caller.as_str(), e.callee.as_str()))
        .collect();
    let callees: HashSet<&str> = edges.iter().map(|(_, callee)| *callee).collect();

    let mut sequence: Vec<String> = Vec::new();
    let mut visited: HashSet<&str> = HashSet::new();

    fn visit<'a>(
        name: &'a str,
        edges: &[(&'a str, &'a str)],
        visited: &mut HashSet<&'a str>,
        sequence: &mut Vec<String>,
    ) {
        if !visited.insert(name) {
            return;
        }
        sequence.push(name.to_string());
        for (caller, callee) in edges {
            if *caller == name {
                visit(callee, edges, visited, sequence);
            }
        }
    }

    for name in &names {
        if !callees.contains(name) {
            visit(name, &edges, &mut visited, &mut sequence);
        }
    }
    for name in &names {
        if !visited.contains(name) {
            sequence.push(name.to_string());
            visited.insert(name);
        }
    }
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_walker::ProjectWalker;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    fn handler(name: &str, path: &str, kind: WorkflowKind) -> NamedHandler {
        NamedHandler {
            name: name.into(),
            file_path: path.into(),
            kind,
            line_number: 1,
            is_exported: true,
        }
    }

    fn edge(caller: &str, callee: &str) -> CallGraphEdge {
        CallGraphEdge {
            caller: caller.into(),
            callee: callee.into(),
            file_path: "f.ts".into(),
            line_number: 1,
        }
    }

    #[test]
    fn call_sequence_seeds_from_entry_points() {
        let handlers = vec![
            handler("finish", "f.ts", WorkflowKind::Unknown),
            handler("start", "f.ts", WorkflowKind::Unknown),
            handler("middle", "f.ts", WorkflowKind::Unknown),
            handler("orphan", "f.ts", WorkflowKind::Unknown),
        ];
        let edges = vec![edge("start", "middle"), edge("middle", "finish")];
        assert_eq!(
            call_sequence(&handlers, &edges),
            vec!["start", "middle", "finish", "orphan"]
        );
    }

    #[test]
    fn singleton_categories_are_dropped() {
        let handlers = vec![
            handler("loginUser", "src/auth.ts", WorkflowKind::Authentication),
            handler("logoutUser", "src/auth.ts", WorkflowKind::Authentication),
            handler("chargeCard", "src/billing.ts", WorkflowKind::Payment),
        ];
        let workflows = group_workflows(&[], &handlers, &[]);
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].name, "Authentication");
        assert_eq!(workflows[0].handlers.len(), 2);
    }

    #[test]
    fn route_files_yield_resource_workflows() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("app/api/users")).unwrap();
        fs::write(
            temp.path().join("app/api/users/route.ts"),
            r#"export async function GET() {}
export async function POST() {}
"#,
        )
        .unwrap();
        fs::create_dir_all(temp.path().join("src/services")).unwrap();
        fs::write(
            temp.path().join("src/services/users.ts"),
            r#"export function createUser() { validateUser(); }
function validateUser() {}
"#,
        )
        .unwrap();

        let walk = ProjectWalker::new(temp.path()).walk();
        let mut session = ParseSession::new(temp.path(), 1_048_576);
        let artifact = WorkflowEngine.run(&walk, &mut session).unwrap();
        let model: WorkflowModel = serde_json::from_str(&artifact.content).unwrap();

        assert_eq!(model.workflows.len(), 1);
        let users = &model.workflows[0];
        assert_eq!(users.name, "User Management");
        assert_eq!(users.operations.len(), 2);
        assert_eq!(users.operations[0].endpoint, "/api/users");
        assert_eq!(users.operations[0].operation, CrudKind::Read);
        // both handlers live in a file whose path contains "users"
        assert_eq!(users.handlers.len(), 2);
        assert_eq!(users.call_sequence, vec!["createUser", "validateUser"]);
        assert_eq!(model.call_graph.len(), 1);
    }

    #[test]
    fn resource_is_first_non_api_segment() {
        assert_eq!(resource_of("/api/users/[id]"), Some("users".into()));
        assert_eq!(resource_of("/api"), None);
        assert_eq!(resource_of("/orders"), Some("orders".into()));
    }
}
