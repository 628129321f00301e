use codescope_protocol::{ArchitectureLayer, EntryPointKind, WorkflowKind};
use once_cell::sync::Lazy;
use regex::Regex;

/// Function-name prefix → workflow category. Consulted longest-prefix
/// first, so `checkout` beats `check`.
const WORKFLOW_PATTERNS: &[(&str, WorkflowKind)] = &[
    // authentication
    ("login", WorkflowKind::Authentication),
    ("logout", WorkflowKind::Authentication),
    ("signin", WorkflowKind::Authentication),
    ("signup", WorkflowKind::Authentication),
    ("register", WorkflowKind::Authentication),
    ("authenticate", WorkflowKind::Authentication),
    ("authorize", WorkflowKind::Authentication),
    ("auth", WorkflowKind::Authentication),
    // payment
    ("charge", WorkflowKind::Payment),
    ("checkout", WorkflowKind::Payment),
    ("refund", WorkflowKind::Payment),
    ("payment", WorkflowKind::Payment),
    ("billing", WorkflowKind::Payment),
    ("invoice", WorkflowKind::Payment),
    ("pay", WorkflowKind::Payment),
    // notification
    ("notify", WorkflowKind::Notification),
    ("email", WorkflowKind::Notification),
    ("sms", WorkflowKind::Notification),
    ("push", WorkflowKind::Notification),
    ("alert", WorkflowKind::Notification),
    // data sync
    ("sync", WorkflowKind::DataSync),
    ("import", WorkflowKind::DataSync),
    ("export", WorkflowKind::DataSync),
    ("migrate", WorkflowKind::DataSync),
    ("seed", WorkflowKind::DataSync),
    // validation
    ("validate", WorkflowKind::Validation),
    ("verify", WorkflowKind::Validation),
    ("sanitize", WorkflowKind::Validation),
    ("check", WorkflowKind::Validation),
    // crud
    ("create", WorkflowKind::Crud),
    ("get", WorkflowKind::Crud),
    ("list", WorkflowKind::Crud),
    ("find", WorkflowKind::Crud),
    ("fetch", WorkflowKind::Crud),
    ("update", WorkflowKind::Crud),
    ("delete", WorkflowKind::Crud),
    ("remove", WorkflowKind::Crud),
    ("add", WorkflowKind::Crud),
    ("save", WorkflowKind::Crud),
    ("load", WorkflowKind::Crud),
    ("insert", WorkflowKind::Crud),
    ("upsert", WorkflowKind::Crud),
];

/// Variants tried in front of each pattern (`onLogin`, `doSync`, …).
const NAME_PREFIXES: &[&str] = &["on", "_", "do", "perform"];

static PATTERNS_LONGEST_FIRST: Lazy<Vec<(&'static str, WorkflowKind)>> = Lazy::new(|| {
    let mut patterns = WORKFLOW_PATTERNS.to_vec();
    patterns.sort_by_key(|(pattern, _)| std::cmp::Reverse(pattern.len()));
    patterns
});

/// Classify a function name by longest-prefix match against the pattern
/// table; `Unknown` when nothing matches.
pub fn match_workflow_name(name: &str) -> WorkflowKind {
    let lowered = name.to_lowercase();
    for (pattern, kind) in PATTERNS_LONGEST_FIRST.iter() {
        if lowered.starts_with(pattern) {
            return *kind;
        }
        for prefix in NAME_PREFIXES {
            if lowered.starts_with(prefix) && lowered[prefix.len()..].starts_with(pattern) {
                return *kind;
            }
        }
    }
    WorkflowKind::Unknown
}

/// Most frequent non-`Unknown` category; `Unknown` only when every
/// match is unknown. Ties resolve to the earliest-seen category.
pub fn dominant_kind(kinds: &[WorkflowKind]) -> WorkflowKind {
    let mut counts: Vec<(WorkflowKind, usize)> = Vec::new();
    for kind in kinds {
        if *kind == WorkflowKind::Unknown {
            continue;
        }
        match counts.iter_mut().find(|(k, _)| k == kind) {
            Some((_, count)) => *count += 1,
            None => counts.push((*kind, 1)),
        }
    }
    let mut best: Option<(WorkflowKind, usize)> = None;
    for (kind, count) in counts {
        if best.map_or(true, |(_, best_count)| count > best_count) {
            best = Some((kind, count));
        }
    }
    best.map(|(kind, _)| kind).unwrap_or(WorkflowKind::Unknown)
}

/// Layer classification table. API fragments come first: API-like paths
/// are a strict subset of presentation-like paths, so the narrower rule
/// must win.
const LAYER_PATTERNS: &[(ArchitectureLayer, &str)] = &[
    (ArchitectureLayer::Api, "api"),
    (ArchitectureLayer::Api, "routes"),
    (ArchitectureLayer::Api, "controllers"),
    (ArchitectureLayer::Api, "endpoints"),
    (ArchitectureLayer::Presentation, "components"),
    (ArchitectureLayer::Presentation, "pages"),
    (ArchitectureLayer::Presentation, "views"),
    (ArchitectureLayer::Presentation, "screens"),
    (ArchitectureLayer::Presentation, "layouts"),
    (ArchitectureLayer::Presentation, "ui"),
    (ArchitectureLayer::Presentation, "app"),
    (ArchitectureLayer::Business, "services"),
    (ArchitectureLayer::Business, "domain"),
    (ArchitectureLayer::Business, "usecases"),
    (ArchitectureLayer::Business, "use-cases"),
    (ArchitectureLayer::Business, "core"),
    (ArchitectureLayer::Business, "logic"),
    (ArchitectureLayer::Data, "models"),
    (ArchitectureLayer::Data, "entities"),
    (ArchitectureLayer::Data, "repositories"),
    (ArchitectureLayer::Data, "prisma"),
    (ArchitectureLayer::Data, "db"),
    (ArchitectureLayer::Data, "database"),
    (ArchitectureLayer::Data, "migrations"),
    (ArchitectureLayer::Data, "schemas"),
    (ArchitectureLayer::Infrastructure, "config"),
    (ArchitectureLayer::Infrastructure, "middleware"),
    (ArchitectureLayer::Infrastructure, "lib"),
    (ArchitectureLayer::Infrastructure, "utils"),
    (ArchitectureLayer::Infrastructure, "helpers"),
    (ArchitectureLayer::Infrastructure, "infra"),
    (ArchitectureLayer::Infrastructure, "infrastructure"),
    (ArchitectureLayer::Infrastructure, "scripts"),
    (ArchitectureLayer::Infrastructure, "tools"),
];

/// Classify a workspace-relative directory path into a layer by its
/// segments, first matching table entry wins.
pub fn match_layer(dir_path: &str) -> Option<ArchitectureLayer> {
    let lowered = dir_path.to_lowercase();
    let segments: Vec<&str> = lowered.split('/').filter(|s| !s.is_empty()).collect();
    for (layer, fragment) in LAYER_PATTERNS {
        if segments.iter().any(|segment| segment == fragment) {
            return Some(*layer);
        }
    }
    None
}

static ROUTE_FIXTURES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(src/)?(app/|pages/)?").expect("static regex"));
static ROUTE_FILE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(^|/)(route|page|index)\.[a-z]+$").expect("static regex"));

/// Best-effort route/page name: strip known path fixtures and the
/// route/page/index file name. May come out empty or approximate for
/// unconventional layouts; that is not a contract.
fn route_name(rel_path: &str) -> String {
    let without_file = ROUTE_FILE.replace(rel_path, "");
    let stripped = ROUTE_FIXTURES.replace(&without_file, "");
    let stripped = stripped.trim_matches('/');
    if stripped.is_empty() {
        "/".to_string()
    } else {
        // Drop a remaining extension when the route is a plain file
        // (pages/api/users.ts).
        match stripped.rsplit_once('.') {
            Some((head, ext)) if !ext.contains('/') => head.to_string(),
            _ => stripped.to_string(),
        }
    }
}

fn file_stem(rel_path: &str) -> &str {
    let basename = rel_path.rsplit('/').next().unwrap_or(rel_path);
    basename.rsplit_once('.').map(|(s, _)| s).unwrap_or(basename)
}

fn has_segment(segments: &[&str], wanted: &str) -> bool {
    segments.iter().any(|s| *s == wanted)
}

/// Classify a file as an entry point, conditioned on its location.
///
/// Route-handler filenames only count under an API-route directory, and
/// main-like filenames only within the first two path segments.
pub fn match_entry_point(rel_path: &str) -> Option<(EntryPointKind, String)> {
    let lowered = rel_path.to_lowercase();
    let segments: Vec<&str> = lowered.split('/').filter(|s| !s.is_empty()).collect();
    let (dirs, basename) = match segments.split_last() {
        Some((basename, dirs)) => (dirs, *basename),
        None => return None,
    };
    let stem = file_stem(basename);

    let in_api = has_segment(dirs, "api");
    if in_api && matches!(stem, "route" | "index") {
        return Some((EntryPointKind::ApiRoute, route_name(&lowered)));
    }
    if in_api && !basename.is_empty() {
        // pages/api/users.ts style: every file is a route.
        if has_segment(dirs, "pages") {
            return Some((EntryPointKind::ApiRoute, route_name(&lowered)));
        }
    }

    if stem == "page" || (has_segment(dirs, "pages") && !in_api) {
        return Some((EntryPointKind::Page, route_name(&lowered)));
    }

    if stem == "worker" || stem.ends_with(".worker") || has_segment(dirs, "workers") {
        return Some((EntryPointKind::Worker, stem.to_string()));
    }

    if stem == "cli" || has_segment(dirs, "bin") {
        return Some((EntryPointKind::Cli, stem.to_string()));
    }

    // Main files only count near the root.
    if segments.len() <= 2 && matches!(stem, "main" | "index" | "app" | "server") {
        return Some((EntryPointKind::Main, stem.to_string()));
    }

    None
}

/// Known API resources and their workflow display names.
const RESOURCE_NAMES: &[(&str, &str)] = &[
    ("users", "User Management"),
    ("user", "User Management"),
    ("auth", "Authentication"),
    ("products", "Product Management"),
    ("orders", "Order Management"),
    ("payments", "Payment Processing"),
    ("notifications", "Notifications"),
    ("settings", "Settings"),
];

/// Workflow name for a resource segment, falling back to
/// `<Capitalized> Management`.
pub fn resource_workflow_name(resource: &str) -> String {
    let lowered = resource.to_lowercase();
    for (known, name) in RESOURCE_NAMES {
        if known == &lowered {
            return name.to_string();
        }
    }
    let mut chars = lowered.chars();
    match chars.next() {
        Some(first) => format!("{}{} Management", first.to_uppercase(), chars.as_str()),
        None => "General Management".to_string(),
    }
}
