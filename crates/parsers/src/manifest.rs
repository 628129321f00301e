use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

/// Dependency summary extracted from one ecosystem's manifest files.
///
/// Every parser returns `None` when its manifest is absent or
/// unparsable; parse failures never surface as errors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManifestSummary {
    pub dependencies: Vec<String>,
    pub dev_dependencies: Vec<String>,
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

impl ManifestSummary {
    fn is_empty(&self) -> bool {
        self.dependencies.is_empty()
            && self.dev_dependencies.is_empty()
            && self.name.is_none()
            && self.version.is_none()
            && self.description.is_none()
    }

    /// Union `other` into `self`; metadata keeps the first non-empty
    /// value already present.
    fn merge(&mut self, other: ManifestSummary) {
        for dep in other.dependencies {
            if !self.dependencies.contains(&dep) {
                self.dependencies.push(dep);
            }
        }
        for dep in other.dev_dependencies {
            if !self.dev_dependencies.contains(&dep) {
                self.dev_dependencies.push(dep);
            }
        }
        if self.name.is_none() {
            self.name = other.name;
        }
        if self.version.is_none() {
            self.version = other.version;
        }
        if self.description.is_none() {
            self.description = other.description;
        }
    }

    /// Union size of dependencies + devDependencies.
    pub fn dependency_count(&self) -> usize {
        let mut all: Vec<&String> = self.dependencies.iter().collect();
        for dep in &self.dev_dependencies {
            if !self.dependencies.contains(dep) {
                all.push(dep);
            }
        }
        all.len()
    }
}

async fn read_text(path: &Path) -> Option<String> {
    tokio::fs::read_to_string(path).await.ok()
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// `package.json`.
pub async fn parse_npm(root: &Path) -> Option<ManifestSummary> {
    let text = read_text(&root.join("package.json")).await?;
    let json: serde_json::Value = match serde_json::from_str(&text) {
        Ok(json) => json,
        Err(e) => {
            log::debug!("Unparsable package.json: {e}");
            return None;
        }
    };

    let keys_of = |section: &str| -> Vec<String> {
        json.get(section)
            .and_then(|v| v.as_object())
            .map(|map| map.keys().cloned().collect())
            .unwrap_or_default()
    };

    Some(ManifestSummary {
        dependencies: keys_of("dependencies"),
        dev_dependencies: keys_of("devDependencies"),
        name: non_empty(json.get("name").and_then(|v| v.as_str())),
        version: non_empty(json.get("version").and_then(|v| v.as_str())),
        description: non_empty(json.get("description").and_then(|v| v.as_str())),
    })
}

/// `Cargo.toml`.
pub async fn parse_cargo(root: &Path) -> Option<ManifestSummary> {
    let text = read_text(&root.join("Cargo.toml")).await?;
    let doc: toml::Value = match text.parse() {
        Ok(doc) => doc,
        Err(e) => {
            log::debug!("Unparsable Cargo.toml: {e}");
            return None;
        }
    };

    let table_keys = |section: &str| -> Vec<String> {
        doc.get(section)
            .and_then(|v| v.as_table())
            .map(|t| t.keys().cloned().collect())
            .unwrap_or_default()
    };
    let package = doc.get("package").and_then(|v| v.as_table());
    let package_str =
        |key: &str| non_empty(package.and_then(|p| p.get(key)).and_then(|v| v.as_str()));

    Some(ManifestSummary {
        dependencies: table_keys("dependencies"),
        dev_dependencies: table_keys("dev-dependencies"),
        name: package_str("name"),
        version: package_str("version"),
        description: package_str("description"),
    })
}

static REQUIREMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*").expect("static regex"));

/// `requirements.txt` and/or `pyproject.toml`.
pub async fn parse_pip(root: &Path) -> Option<ManifestSummary> {
    let mut summary = ManifestSummary::default();

    if let Some(text) = read_text(&root.join("requirements.txt")).await {
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') || line.starts_with('-') {
                continue;
            }
            if let Some(m) = REQUIREMENT_NAME.find(line) {
                summary.dependencies.push(m.as_str().to_string());
            }
        }
    }

    if let Some(text) = read_text(&root.join("pyproject.toml")).await {
        if let Ok(doc) = text.parse::<toml::Value>() {
            let project = doc.get("project").and_then(|v| v.as_table());
            if let Some(project) = project {
                summary.name = non_empty(project.get("name").and_then(|v| v.as_str()));
                summary.version = non_empty(project.get("version").and_then(|v| v.as_str()));
                summary.description =
                    non_empty(project.get("description").and_then(|v| v.as_str()));
                if let Some(deps) = project.get("dependencies").and_then(|v| v.as_array()) {
                    for dep in deps.iter().filter_map(|v| v.as_str()) {
                        if let Some(m) = REQUIREMENT_NAME.find(dep.trim()) {
                            let name = m.as_str().to_string();
                            if !summary.dependencies.contains(&name) {
                                summary.dependencies.push(name);
                            }
                        }
                    }
                }
                if let Some(optional) = project
                    .get("optional-dependencies")
                    .and_then(|v| v.as_table())
                {
                    for deps in optional.values().filter_map(|v| v.as_array()) {
                        for dep in deps.iter().filter_map(|v| v.as_str()) {
                            if let Some(m) = REQUIREMENT_NAME.find(dep.trim()) {
                                summary.dev_dependencies.push(m.as_str().to_string());
                            }
                        }
                    }
                }
            }
        }
    }

    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

/// `go.mod`.
pub async fn parse_go(root: &Path) -> Option<ManifestSummary> {
    let text = read_text(&root.join("go.mod")).await?;
    let mut summary = ManifestSummary::default();
    let mut in_require_block = false;

    for line in text.lines() {
        let line = line.trim();
        if let Some(module) = line.strip_prefix("module ") {
            summary.name = non_empty(Some(module));
            continue;
        }
        if line.starts_with("require (") {
            in_require_block = true;
            continue;
        }
        if in_require_block {
            if line == ")" {
                in_require_block = false;
                continue;
            }
            if let Some(name) = line.split_whitespace().next() {
                summary.dependencies.push(name.to_string());
            }
            continue;
        }
        if let Some(rest) = line.strip_prefix("require ") {
            if let Some(name) = rest.split_whitespace().next() {
                summary.dependencies.push(name.to_string());
            }
        }
    }

    if summary.is_empty() {
        None
    } else {
        Some(summary)
    }
}

/// Run all ecosystem parsers concurrently and union the results.
///
/// Metadata (name/version/description) takes the first non-empty value
/// in priority order: npm, cargo, pip, go.
pub async fn parse_all_manifests(root: &Path) -> ManifestSummary {
    let (npm, cargo, pip, go) = tokio::join!(
        parse_npm(root),
        parse_cargo(root),
        parse_pip(root),
        parse_go(root),
    );

    let mut summary = ManifestSummary::default();
    for part in [npm, cargo, pip, go].into_iter().flatten() {
        summary.merge(part);
    }
    summary
}
