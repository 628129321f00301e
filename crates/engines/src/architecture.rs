use crate::error::Result;
use crate::patterns::{match_entry_point, match_layer};
use codescope_parsers::{extract_imports, ParseSession, DEFAULT_ALIAS_PREFIXES};
use codescope_protocol::{
    ArchitectureLayer, ArchitectureModel, ArtifactKind, ArtifactResult, DependencyEdge,
    DependencyKind, EntryPoint, LayerInfo,
};
use codescope_walker::WalkOutcome;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{BTreeMap, BTreeSet, HashMap};

/// Classifies directories into layers, files into entry points, and
/// builds the import graph with its external-dependency roll-up.
pub struct ArchitectureEngine;

impl ArchitectureEngine {
    pub fn run(&self, walk: &WalkOutcome, session: &mut ParseSession) -> Result<ArtifactResult> {
        let errors_before = session.error_count();

        let layers = classify_layers(walk);
        let entry_points = classify_entry_points(walk);
        let (edges, external_packages, parsed) = build_import_graph(walk, session);

        let model = ArchitectureModel {
            layers,
            entry_points,
            edges,
            external_packages,
        };

        log::debug!(
            "Architecture: {} layers, {} entry points, {} edges, {} external packages",
            model.layers.len(),
            model.entry_points.len(),
            model.edges.len(),
            model.external_packages.len()
        );

        let content = serde_json::to_string_pretty(&model)?;
        Ok(ArtifactResult::new(
            ArtifactKind::Architecture,
            content,
            parsed,
            session.error_count() - errors_before,
        ))
    }
}

fn parent_dir(rel_path: &str) -> &str {
    rel_path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

fn classify_layers(walk: &WalkOutcome) -> Vec<LayerInfo> {
    let mut directories: BTreeMap<ArchitectureLayer, Vec<String>> = BTreeMap::new();
    for dir in &walk.dirs {
        if let Some(layer) = match_layer(&dir.rel_path) {
            directories.entry(layer).or_default().push(dir.rel_path.clone());
        }
    }

    let mut file_counts: HashMap<ArchitectureLayer, u64> = HashMap::new();
    for file in &walk.files {
        if let Some(layer) = match_layer(parent_dir(&file.rel_path)) {
            *file_counts.entry(layer).or_insert(0) += 1;
        }
    }

    directories
        .into_iter()
        .map(|(layer, directories)| LayerInfo {
            layer,
            file_count: file_counts.get(&layer).copied().unwrap_or(0),
            directories,
        })
        .collect()
}

fn classify_entry_points(walk: &WalkOutcome) -> Vec<EntryPoint> {
    walk.files
        .iter()
        .filter_map(|file| {
            match_entry_point(&file.rel_path).map(|(kind, name)| EntryPoint {
                file_path: file.rel_path.clone(),
                kind,
                name,
            })
        })
        .collect()
}

/// Split an external specifier into its package name: scoped packages
/// keep `@scope/name`, others take the first path segment.
fn external_package_name(specifier: &str) -> String {
    if specifier.starts_with('@') {
        let mut segments = specifier.splitn(3, '/');
        match (segments.next(), segments.next()) {
            (Some(scope), Some(name)) => format!("{scope}/{name}"),
            _ => specifier.to_string(),
        }
    } else {
        specifier
            .split('/')
            .next()
            .unwrap_or(specifier)
            .to_string()
    }
}

fn build_import_graph(
    walk: &WalkOutcome,
    session: &mut ParseSession,
) -> (Vec<DependencyEdge>, Vec<String>, u64) {
    let mut graph: DiGraph<String, DependencyKind> = DiGraph::new();
    let mut nodes: HashMap<String, NodeIndex> = HashMap::new();
    let mut externals: BTreeSet<String> = BTreeSet::new();
    let mut parsed = 0u64;

    let mut node_for = |graph: &mut DiGraph<String, DependencyKind>, name: &str| -> NodeIndex {
        if let Some(&idx) = nodes.get(name) {
            return idx;
        }
        let idx = graph.add_node(name.to_string());
        nodes.insert(name.to_string(), idx);
        idx
    };

    for file in &walk.files {
        let Some(source) = session.parse(&file.rel_path) else {
            continue;
        };
        parsed += 1;
        let scan = extract_imports(&source, DEFAULT_ALIAS_PREFIXES);
        let from = node_for(&mut graph, &file.rel_path);
        for import in &scan.imports {
            let to = node_for(&mut graph, &import.specifier);
            if !graph.contains_edge(from, to) {
                graph.add_edge(from, to, import.kind);
            }
            if import.kind == DependencyKind::External {
                externals.insert(external_package_name(&import.specifier));
            }
        }
    }

    let edges = graph
        .edge_indices()
        .map(|edge| {
            let (from, to) = graph.edge_endpoints(edge).expect("edge endpoints");
            DependencyEdge {
                from: graph[from].clone(),
                to: graph[to].clone(),
                kind: graph[edge],
            }
        })
        .collect();

    (edges, externals.into_iter().collect(), parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_protocol::EntryPointKind;
    use codescope_walker::ProjectWalker;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn external_package_names_keep_scopes() {
        assert_eq!(external_package_name("@prisma/client/runtime"), "@prisma/client");
        assert_eq!(external_package_name("lodash/merge"), "lodash");
        assert_eq!(external_package_name("react"), "react");
    }

    #[test]
    fn graph_layers_and_entry_points_come_together() {
        let temp = tempdir().unwrap();
        fs::create_dir_all(temp.path().join("app/api/users")).unwrap();
        fs::create_dir_all(temp.path().join("src/services")).unwrap();
        fs::write(
            temp.path().join("app/api/users/route.ts"),
            r#"import { listUsers } from "../../../src/services/users";
import { PrismaClient } from "@prisma/client";
export async function GET() { return listUsers(); }"#,
        )
        .unwrap();
        fs::write(
            temp.path().join("src/services/users.ts"),
            r#"import merge from "lodash/merge";
export function listUsers() { return []; }"#,
        )
        .unwrap();

        let walk = ProjectWalker::new(temp.path()).walk();
        let mut session = ParseSession::new(temp.path(), 1_048_576);
        let artifact = ArchitectureEngine.run(&walk, &mut session).unwrap();
        let model: ArchitectureModel = serde_json::from_str(&artifact.content).unwrap();

        assert_eq!(model.external_packages, vec!["@prisma/client", "lodash"]);

        let api_layer = model
            .layers
            .iter()
            .find(|l| l.layer == ArchitectureLayer::Api)
            .unwrap();
        assert!(api_layer.directories.contains(&"app/api".to_string()));
        assert_eq!(api_layer.file_count, 1);

        let route = model
            .entry_points
            .iter()
            .find(|e| e.kind == EntryPointKind::ApiRoute)
            .unwrap();
        assert_eq!(route.file_path, "app/api/users/route.ts");

        let relative_edge = model
            .edges
            .iter()
            .find(|e| e.kind == DependencyKind::Relative)
            .unwrap();
        assert_eq!(relative_edge.from, "app/api/users/route.ts");
    }
}
