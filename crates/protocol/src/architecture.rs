use serde::{Deserialize, Serialize};

/// Architectural layer a directory belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchitectureLayer {
    Presentation,
    Api,
    Business,
    Data,
    Infrastructure,
}

/// Directories classified into one layer, with their aggregate file count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerInfo {
    pub layer: ArchitectureLayer,
    pub directories: Vec<String>,
    pub file_count: u64,
}

/// What kind of execution start a file represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryPointKind {
    Main,
    ApiRoute,
    Page,
    Worker,
    Cli,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryPoint {
    pub file_path: String,
    pub kind: EntryPointKind,
    /// Best-effort name derived from the route/page path or file stem.
    pub name: String,
}

/// How an import specifier resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DependencyKind {
    Relative,
    Alias,
    External,
}

/// One edge of the import graph: `from` (file) imports `to` (specifier).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyEdge {
    pub from: String,
    pub to: String,
    pub kind: DependencyKind,
}

/// The architecture artifact payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchitectureModel {
    pub layers: Vec<LayerInfo>,
    pub entry_points: Vec<EntryPoint>,
    pub edges: Vec<DependencyEdge>,
    /// Deduplicated, sorted external package names.
    pub external_packages: Vec<String>,
}
