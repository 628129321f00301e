use crate::error::Result;
use codescope_parsers::{parse_all_manifests, ManifestSummary};
use codescope_protocol::{ArtifactKind, ArtifactResult, CodebaseSummary, LanguageShare};
use codescope_walker::{read_safe, WalkOutcome};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const PURPOSE_MAX_CHARS: usize = 500;
const README_MAX_BYTES: u64 = 524_288;

/// Extension → language display name.
const LANGUAGE_EXTENSIONS: &[(&str, &str)] = &[
    ("ts", "TypeScript"),
    ("tsx", "TypeScript"),
    ("mts", "TypeScript"),
    ("cts", "TypeScript"),
    ("js", "JavaScript"),
    ("jsx", "JavaScript"),
    ("mjs", "JavaScript"),
    ("cjs", "JavaScript"),
    ("py", "Python"),
    ("rs", "Rust"),
    ("go", "Go"),
    ("java", "Java"),
    ("kt", "Kotlin"),
    ("rb", "Ruby"),
    ("php", "PHP"),
    ("cs", "C#"),
    ("cpp", "C++"),
    ("cc", "C++"),
    ("cxx", "C++"),
    ("c", "C"),
    ("h", "C"),
    ("swift", "Swift"),
    ("scala", "Scala"),
    ("dart", "Dart"),
    ("vue", "Vue"),
    ("svelte", "Svelte"),
];

/// Dependency-name patterns → framework display name. A trailing `/`
/// makes the pattern a prefix match; otherwise names match exactly.
const FRAMEWORK_PATTERNS: &[(&str, &str)] = &[
    ("next", "Next.js"),
    ("react", "React"),
    ("vue", "Vue.js"),
    ("nuxt", "Nuxt"),
    ("svelte", "Svelte"),
    ("@angular/", "Angular"),
    ("express", "Express"),
    ("fastify", "Fastify"),
    ("@nestjs/", "NestJS"),
    ("koa", "Koa"),
    ("django", "Django"),
    ("flask", "Flask"),
    ("fastapi", "FastAPI"),
    ("rails", "Ruby on Rails"),
    ("spring-boot", "Spring Boot"),
    ("axum", "Axum"),
    ("actix-web", "Actix Web"),
    ("rocket", "Rocket"),
    ("gin-gonic", "Gin"),
    ("laravel/framework", "Laravel"),
];

/// Dependency-name patterns → API style. Same matching rules, plus
/// substring for patterns containing a `/` mid-name.
const API_PATTERNS: &[(&str, &str)] = &[
    ("graphql", "GraphQL"),
    ("@apollo/", "GraphQL"),
    ("@trpc/", "tRPC"),
    ("grpc", "gRPC"),
    ("socket.io", "WebSockets"),
    ("ws", "WebSockets"),
];

fn match_pattern(dep: &str, pattern: &str) -> bool {
    if let Some(prefix) = pattern.strip_suffix('/') {
        // prefix patterns match the scope (`@nestjs/core`)
        dep.starts_with(prefix) && dep[prefix.len()..].starts_with('/')
    } else if pattern.contains('-') || pattern.contains('/') {
        dep.contains(pattern)
    } else {
        dep == pattern
    }
}

fn detect(deps: &[String], table: &[(&str, &str)]) -> Vec<String> {
    let mut found = Vec::new();
    for (pattern, display) in table {
        let hit = deps
            .iter()
            .any(|dep| match_pattern(&dep.to_lowercase(), pattern));
        if hit && !found.contains(&display.to_string()) {
            found.push(display.to_string());
        }
    }
    found
}

fn language_shares(walk: &WalkOutcome) -> Vec<LanguageShare> {
    // first-seen iteration order doubles as the tiebreak for primary
    let mut counts: Vec<(String, u64)> = Vec::new();
    for file in &walk.files {
        let Some(ext) = file.rel_path.rsplit('.').next() else {
            continue;
        };
        let ext = ext.to_lowercase();
        let Some((_, language)) = LANGUAGE_EXTENSIONS.iter().find(|(e, _)| e == &ext) else {
            continue;
        };
        match counts.iter_mut().find(|(l, _)| l == language) {
            Some((_, count)) => *count += 1,
            None => counts.push((language.to_string(), 1)),
        }
    }

    let total: u64 = counts.iter().map(|(_, c)| c).sum();
    if total == 0 {
        // no code files at all: empty map, no division by zero
        return Vec::new();
    }
    counts
        .into_iter()
        .map(|(language, file_count)| LanguageShare {
            language,
            file_count,
            percentage: (file_count as f64 / total as f64) * 100.0,
        })
        .collect()
}

static FENCED_CODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```.*?```").expect("static regex"));
static HEADER_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^#{1,6}[^\n]*\n?").expect("static regex"));
static IMAGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("static regex"));
static LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]*)\]\([^)]*\)").expect("static regex"));
static BLANK_RUNS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("static regex"));

/// First ~500 chars of a README with markdown decoration removed:
/// headers and images dropped, links keep their text, code fences
/// dropped, inline code and emphasis markers unwrapped.
fn extract_purpose(readme: &str) -> Option<String> {
    let text = FENCED_CODE.replace_all(readme, "");
    let text = HEADER_LINE.replace_all(&text, "");
    let text = IMAGE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = text.replace(['`', '*'], "").replace("__", "");
    let text = BLANK_RUNS.replace_all(&text, "\n\n");
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    Some(trimmed.chars().take(PURPOSE_MAX_CHARS).collect())
}

fn find_readme(root: &Path, walk: &WalkOutcome) -> Option<String> {
    let readme = walk.files.iter().find(|f| {
        let basename = f.rel_path.rsplit('/').next().unwrap_or(&f.rel_path);
        let lowered = basename.to_lowercase();
        lowered == "readme" || lowered.starts_with("readme.")
    })?;
    read_safe(&root.join(&readme.rel_path), README_MAX_BYTES)
}

/// Produces the tech-stack summary: manifest union, language shares,
/// framework/API detection, and a README-derived purpose blurb.
pub struct CodebaseSummaryEngine;

impl CodebaseSummaryEngine {
    pub async fn run(&self, root: &Path, walk: &WalkOutcome) -> Result<ArtifactResult> {
        let manifest: ManifestSummary = parse_all_manifests(root).await;

        let languages = language_shares(walk);
        // ties break toward the first-seen language
        let mut primary_language: Option<&LanguageShare> = None;
        for share in &languages {
            if primary_language.map_or(true, |best| share.file_count > best.file_count) {
                primary_language = Some(share);
            }
        }
        let primary_language = primary_language.map(|share| share.language.clone());

        let mut all_deps: Vec<String> = manifest.dependencies.clone();
        all_deps.extend(manifest.dev_dependencies.iter().cloned());

        let purpose = find_readme(root, walk).and_then(|text| extract_purpose(&text));

        let summary = CodebaseSummary {
            project_name: manifest.name.clone(),
            version: manifest.version.clone(),
            description: manifest.description.clone(),
            purpose,
            frameworks: detect(&all_deps, FRAMEWORK_PATTERNS),
            api_styles: detect(&all_deps, API_PATTERNS),
            dependency_count: manifest.dependency_count() as u64,
            dependencies: manifest.dependencies,
            dev_dependencies: manifest.dev_dependencies,
            languages,
            primary_language,
        };

        let content = serde_json::to_string_pretty(&summary)?;
        Ok(ArtifactResult::new(
            ArtifactKind::CodebaseSummary,
            content,
            walk.files.len() as u64,
            0,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use codescope_walker::ProjectWalker;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[tokio::test]
    async fn next_react_project_is_summarized() {
        let temp = tempdir().unwrap();
        fs::write(
            temp.path().join("package.json"),
            r#"{"name":"shop","dependencies":{"next":"14.0.0","react":"18.2.0"},
                "devDependencies":{"typescript":"5.3.0","react":"18.2.0"}}"#,
        )
        .unwrap();
        fs::write(temp.path().join("index.ts"), "export {}").unwrap();
        fs::write(temp.path().join("app.tsx"), "export {}").unwrap();
        fs::write(temp.path().join("legacy.js"), "module.exports = {}").unwrap();

        let walk = ProjectWalker::new(temp.path()).walk();
        let artifact = CodebaseSummaryEngine.run(temp.path(), &walk).await.unwrap();
        let summary: CodebaseSummary = serde_json::from_str(&artifact.content).unwrap();

        assert!(summary.frameworks.contains(&"Next.js".to_string()));
        assert!(summary.frameworks.contains(&"React".to_string()));
        assert_eq!(summary.primary_language.as_deref(), Some("TypeScript"));
        // union of deps + devDeps, react deduplicated
        assert_eq!(summary.dependency_count, 3);
    }

    #[tokio::test]
    async fn no_code_files_yields_empty_language_map() {
        let temp = tempdir().unwrap();
        fs::write(temp.path().join("notes.txt"), "hello").unwrap();

        let walk = ProjectWalker::new(temp.path()).walk();
        let artifact = CodebaseSummaryEngine.run(temp.path(), &walk).await.unwrap();
        let summary: CodebaseSummary = serde_json::from_str(&artifact.content).unwrap();

        assert!(summary.languages.is_empty());
        assert_eq!(summary.primary_language, None);
    }

    #[test]
    fn purpose_strips_markdown() {
        let readme = "# Shop\n\nA **fast** storefront built on [Next.js](https://nextjs.org).\n\n![screenshot](img.png)\n\n```bash\nnpm install\n```\n\nRuns `anywhere`.\n";
        let purpose = extract_purpose(readme).unwrap();
        assert!(purpose.contains("A fast storefront built on Next.js."));
        assert!(!purpose.contains("# Shop"));
        assert!(!purpose.contains("npm install"));
        assert!(!purpose.contains("img.png"));
        assert!(purpose.contains("Runs anywhere."));
    }

    #[test]
    fn scoped_prefix_patterns_do_not_match_bare_names() {
        assert!(match_pattern("@nestjs/core", "@nestjs/"));
        assert!(!match_pattern("@nestjs", "@nestjs/"));
        assert!(match_pattern("next", "next"));
        assert!(!match_pattern("nextui", "next"));
    }
}
