use crate::source_file::SourceFile;
use codescope_protocol::DependencyKind;
use tree_sitter::Node;

/// Default internal path-alias prefixes (`@/lib/db`, `~/utils`).
pub const DEFAULT_ALIAS_PREFIXES: &[&str] = &["@/", "~/", "#"];

/// How an import binds names into the module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportBinding {
    Default(String),
    Named(Vec<String>),
    Namespace(String),
    SideEffect,
    /// Dynamic `require(...)` call.
    Require,
}

/// Classification kept alongside each import record.
pub type ImportKind = DependencyKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRecord {
    pub specifier: String,
    pub kind: ImportKind,
    pub binding: ImportBinding,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportRecord {
    /// `default` for the default-export marker.
    pub name: String,
    pub line: u32,
}

/// Imports and exports lifted from one source file.
#[derive(Debug, Default)]
pub struct ImportScan {
    pub imports: Vec<ImportRecord>,
    pub exports: Vec<ExportRecord>,
}

/// Classify a module specifier: `.`/`..` prefixes are relative, known
/// alias prefixes are internal aliases, everything else is external.
pub fn classify_specifier(specifier: &str, alias_prefixes: &[&str]) -> DependencyKind {
    if specifier.starts_with("./") || specifier.starts_with("../") || specifier == "." || specifier == ".." {
        return DependencyKind::Relative;
    }
    if alias_prefixes.iter().any(|p| specifier.starts_with(p)) {
        return DependencyKind::Alias;
    }
    DependencyKind::External
}

/// Collect import statements, dynamic requires, and exports.
pub fn extract_imports(file: &SourceFile, alias_prefixes: &[&str]) -> ImportScan {
    let mut scan = ImportScan::default();
    collect(file.tree.root_node(), file, alias_prefixes, &mut scan);
    scan
}

fn collect(node: Node, file: &SourceFile, alias_prefixes: &[&str], scan: &mut ImportScan) {
    match node.kind() {
        "import_statement" => {
            if let Some(record) = import_record(node, file, alias_prefixes) {
                scan.imports.push(record);
            }
        }
        "call_expression" => {
            if let Some(record) = require_record(node, file, alias_prefixes) {
                scan.imports.push(record);
            }
        }
        "export_statement" => {
            collect_exports(node, file, scan);
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, file, alias_prefixes, scan);
    }
}

fn string_value(node: Node, file: &SourceFile) -> String {
    file.text(node).trim_matches(['"', '\'', '`']).to_string()
}

fn import_record(node: Node, file: &SourceFile, alias_prefixes: &[&str]) -> Option<ImportRecord> {
    let source = node.child_by_field_name("source")?;
    let specifier = string_value(source, file);
    let kind = classify_specifier(&specifier, alias_prefixes);
    let line = file.line(node);

    let mut binding = ImportBinding::SideEffect;
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "import_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for clause in child.named_children(&mut clause_cursor) {
            match clause.kind() {
                "identifier" => {
                    binding = ImportBinding::Default(file.text(clause).to_string());
                }
                "namespace_import" => {
                    let mut ns_cursor = clause.walk();
                    for part in clause.named_children(&mut ns_cursor) {
                        if part.kind() == "identifier" {
                            binding = ImportBinding::Namespace(file.text(part).to_string());
                        }
                    }
                }
                "named_imports" => {
                    let mut names = Vec::new();
                    let mut named_cursor = clause.walk();
                    for spec in clause.named_children(&mut named_cursor) {
                        if spec.kind() == "import_specifier" {
                            if let Some(name) = spec.child_by_field_name("name") {
                                names.push(file.text(name).to_string());
                            }
                        }
                    }
                    binding = ImportBinding::Named(names);
                }
                _ => {}
            }
        }
    }

    Some(ImportRecord {
        specifier,
        kind,
        binding,
        line,
    })
}

fn require_record(node: Node, file: &SourceFile, alias_prefixes: &[&str]) -> Option<ImportRecord> {
    let function = node.child_by_field_name("function")?;
    if function.kind() != "identifier" || file.text(function) != "require" {
        return None;
    }
    let args = node.child_by_field_name("arguments")?;
    let mut cursor = args.walk();
    let first = args
        .named_children(&mut cursor)
        .find(|a| a.kind() == "string")?;
    let specifier = string_value(first, file);
    let kind = classify_specifier(&specifier, alias_prefixes);
    Some(ImportRecord {
        specifier,
        kind,
        binding: ImportBinding::Require,
        line: file.line(node),
    })
}

fn collect_exports(node: Node, file: &SourceFile, scan: &mut ImportScan) {
    let line = file.line(node);

    // `export default ...` marker.
    for i in 0..node.child_count() {
        if node.child(i).is_some_and(|c| c.kind() == "default") {
            scan.exports.push(ExportRecord {
                name: "default".to_string(),
                line,
            });
        }
    }

    if let Some(declaration) = node.child_by_field_name("declaration") {
        match declaration.kind() {
            "function_declaration"
            | "generator_function_declaration"
            | "class_declaration"
            | "interface_declaration"
            | "type_alias_declaration"
            | "enum_declaration" => {
                if let Some(name) = declaration.child_by_field_name("name") {
                    scan.exports.push(ExportRecord {
                        name: file.text(name).to_string(),
                        line,
                    });
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                let mut cursor = declaration.walk();
                for declarator in declaration.named_children(&mut cursor) {
                    if declarator.kind() == "variable_declarator" {
                        if let Some(name) = declarator.child_by_field_name("name") {
                            scan.exports.push(ExportRecord {
                                name: file.text(name).to_string(),
                                line,
                            });
                        }
                    }
                }
            }
            _ => {}
        }
    }

    // `export { a, b as c }` clauses.
    let mut cursor = node.walk();
    for child in node.named_children(&mut cursor) {
        if child.kind() != "export_clause" {
            continue;
        }
        let mut clause_cursor = child.walk();
        for spec in child.named_children(&mut clause_cursor) {
            if spec.kind() == "export_specifier" {
                if let Some(name) = spec.child_by_field_name("name") {
                    scan.exports.push(ExportRecord {
                        name: file.text(name).to_string(),
                        line,
                    });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::Language;
    use pretty_assertions::assert_eq;

    fn scan(code: &str) -> ImportScan {
        let file =
            SourceFile::parse("app.ts".into(), code.into(), Language::TypeScript).expect("parse");
        extract_imports(&file, DEFAULT_ALIAS_PREFIXES)
    }

    #[test]
    fn specifier_classification() {
        assert_eq!(
            classify_specifier("./util", DEFAULT_ALIAS_PREFIXES),
            DependencyKind::Relative
        );
        assert_eq!(
            classify_specifier("../db/client", DEFAULT_ALIAS_PREFIXES),
            DependencyKind::Relative
        );
        assert_eq!(
            classify_specifier("@/lib/auth", DEFAULT_ALIAS_PREFIXES),
            DependencyKind::Alias
        );
        assert_eq!(
            classify_specifier("@prisma/client", DEFAULT_ALIAS_PREFIXES),
            DependencyKind::External
        );
        assert_eq!(
            classify_specifier("react", DEFAULT_ALIAS_PREFIXES),
            DependencyKind::External
        );
    }

    #[test]
    fn import_bindings_are_recorded() {
        let scan = scan(
            r#"
import React from "react";
import { useState, useEffect } from "react";
import * as path from "path";
import "./globals.css";
"#,
        );
        assert_eq!(scan.imports.len(), 4);
        assert_eq!(
            scan.imports[0].binding,
            ImportBinding::Default("React".into())
        );
        assert_eq!(
            scan.imports[1].binding,
            ImportBinding::Named(vec!["useState".into(), "useEffect".into()])
        );
        assert_eq!(
            scan.imports[2].binding,
            ImportBinding::Namespace("path".into())
        );
        assert_eq!(scan.imports[3].binding, ImportBinding::SideEffect);
        assert_eq!(scan.imports[3].kind, DependencyKind::Relative);
    }

    #[test]
    fn dynamic_requires_are_imports() {
        let scan = scan(r#"const config = require("./config.json");"#);
        assert_eq!(scan.imports.len(), 1);
        assert_eq!(scan.imports[0].binding, ImportBinding::Require);
        assert_eq!(scan.imports[0].specifier, "./config.json");
    }

    #[test]
    fn exports_are_collected() {
        let scan = scan(
            r#"
export function createUser() {}
export const MAX_USERS = 100;
export interface Session { token: string; }
export { createUser as makeUser };
export default function handler() {}
"#,
        );
        let names: Vec<&str> = scan.exports.iter().map(|e| e.name.as_str()).collect();
        assert!(names.contains(&"createUser"));
        assert!(names.contains(&"MAX_USERS"));
        assert!(names.contains(&"Session"));
        assert!(names.contains(&"default"));
    }
}
