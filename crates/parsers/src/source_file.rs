use crate::error::{ParserError, Result};
use std::path::Path;
use tree_sitter::{Node, Parser, Tree};

/// Source languages the AST passes understand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Language {
    TypeScript,
    Tsx,
    JavaScript,
}

impl Language {
    /// Detect from a file extension; `None` for non-source files.
    pub fn from_path(path: &Path) -> Option<Language> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "ts" | "mts" | "cts" => Some(Language::TypeScript),
            "tsx" => Some(Language::Tsx),
            "js" | "jsx" | "mjs" | "cjs" => Some(Language::JavaScript),
            _ => None,
        }
    }

    pub(crate) fn grammar(&self) -> tree_sitter::Language {
        match self {
            Language::TypeScript => tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into(),
            Language::Tsx => tree_sitter_typescript::LANGUAGE_TSX.into(),
            Language::JavaScript => tree_sitter_javascript::LANGUAGE.into(),
        }
    }
}

/// A parsed source file shared by the type, import, and call passes.
///
/// Parsed once per scan (see `ParseSession`) so later engines reuse the
/// same tree instead of re-reading the file.
pub struct SourceFile {
    pub rel_path: String,
    pub content: String,
    pub language: Language,
    pub tree: Tree,
}

impl SourceFile {
    pub fn parse(rel_path: String, content: String, language: Language) -> Result<SourceFile> {
        let mut parser = Parser::new();
        parser.set_language(&language.grammar())?;
        let tree = parser
            .parse(&content, None)
            .ok_or_else(|| ParserError::ParseFailed(rel_path.clone()))?;
        Ok(SourceFile {
            rel_path,
            content,
            language,
            tree,
        })
    }

    /// Text slice behind a node.
    pub fn text(&self, node: Node) -> &str {
        self.content.get(node.byte_range()).unwrap_or("")
    }

    /// 1-based line of a node's start.
    pub fn line(&self, node: Node) -> u32 {
        node.start_position().row as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn language_detection_by_extension() {
        assert_eq!(
            Language::from_path(Path::new("src/app.ts")),
            Some(Language::TypeScript)
        );
        assert_eq!(
            Language::from_path(Path::new("pages/index.tsx")),
            Some(Language::Tsx)
        );
        assert_eq!(
            Language::from_path(Path::new("lib/util.mjs")),
            Some(Language::JavaScript)
        );
        assert_eq!(Language::from_path(Path::new("README.md")), None);
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn parse_produces_a_tree() {
        let file = SourceFile::parse(
            "a.ts".into(),
            "const x: number = 1;".into(),
            Language::TypeScript,
        )
        .unwrap();
        assert_eq!(file.tree.root_node().kind(), "program");
    }
}
