use crate::error::Result;
use codescope_protocol::{ArtifactKind, ArtifactResult};
use codescope_walker::WalkOutcome;
use std::collections::BTreeMap;

/// Renders the workspace as an indented text tree with per-node
/// aggregate file counts and byte sizes.
pub struct DirectoryStructureEngine;

#[derive(Default)]
struct TreeNode {
    dirs: BTreeMap<String, TreeNode>,
    files: BTreeMap<String, u64>,
}

impl TreeNode {
    fn insert_file(&mut self, segments: &[&str], size: u64) {
        match segments {
            [] => {}
            [file] => {
                self.files.insert((*file).to_string(), size);
            }
            [dir, rest @ ..] => {
                self.dirs
                    .entry((*dir).to_string())
                    .or_default()
                    .insert_file(rest, size);
            }
        }
    }

    fn insert_dir(&mut self, segments: &[&str]) {
        if let [dir, rest @ ..] = segments {
            let child = self.dirs.entry((*dir).to_string()).or_default();
            child.insert_dir(rest);
        }
    }

    /// (file count, total bytes) over this subtree.
    fn totals(&self) -> (u64, u64) {
        let mut count = self.files.len() as u64;
        let mut bytes: u64 = self.files.values().sum();
        for child in self.dirs.values() {
            let (child_count, child_bytes) = child.totals();
            count += child_count;
            bytes += child_bytes;
        }
        (count, bytes)
    }

    fn render(&self, out: &mut String, depth: usize) {
        let indent = "  ".repeat(depth);
        for (name, child) in &self.dirs {
            let (count, bytes) = child.totals();
            out.push_str(&format!(
                "{indent}{name}/ ({count} files, {})\n",
                format_bytes(bytes)
            ));
            child.render(out, depth + 1);
        }
        for (name, size) in &self.files {
            out.push_str(&format!("{indent}{name} ({})\n", format_bytes(*size)));
        }
    }
}

fn format_bytes(bytes: u64) -> String {
    if bytes >= 1_048_576 {
        format!("{:.1} MB", bytes as f64 / 1_048_576.0)
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{bytes} B")
    }
}

impl DirectoryStructureEngine {
    pub fn run(&self, project_name: &str, walk: &WalkOutcome) -> Result<ArtifactResult> {
        let mut root = TreeNode::default();
        for dir in &walk.dirs {
            let segments: Vec<&str> = dir.rel_path.split('/').filter(|s| !s.is_empty()).collect();
            root.insert_dir(&segments);
        }
        for file in &walk.files {
            let segments: Vec<&str> = file.rel_path.split('/').filter(|s| !s.is_empty()).collect();
            root.insert_file(&segments, file.size);
        }

        let (total_files, total_bytes) = root.totals();
        let mut content = format!(
            "{project_name}/ ({total_files} files, {})\n",
            format_bytes(total_bytes)
        );
        root.render(&mut content, 1);
        for circular in &walk.circular {
            content.push_str(&format!("[circular symlink skipped: {circular}]\n"));
        }

        log::debug!("Directory tree rendered: {total_files} files");
        Ok(ArtifactResult::new(
            ArtifactKind::DirectoryStructure,
            content,
            total_files,
            0,
        ))
    }
}
