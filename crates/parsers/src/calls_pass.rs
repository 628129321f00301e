use crate::source_file::SourceFile;
use std::collections::HashSet;
use tree_sitter::Node;

/// A named function or arrow handler declared in a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerDecl {
    pub name: String,
    pub line: u32,
    pub is_exported: bool,
}

/// Caller→callee edge between functions declared in the same file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallEdge {
    pub caller: String,
    pub callee: String,
    pub line: u32,
}

/// Handlers plus intra-file call edges for one source file.
#[derive(Debug, Default)]
pub struct HandlerScan {
    pub handlers: Vec<HandlerDecl>,
    pub calls: Vec<CallEdge>,
}

/// Collect named functions / arrow-bound variables and the call edges
/// between them.
///
/// Only calls to names declared in the same file become edges; calls to
/// imported or global names are not part of the graph.
pub fn extract_handlers(file: &SourceFile) -> HandlerScan {
    let root = file.tree.root_node();
    let mut declarations: Vec<(HandlerDecl, Node)> = Vec::new();
    collect_declarations(root, file, &mut declarations);

    let local_names: HashSet<String> = declarations
        .iter()
        .map(|(decl, _)| decl.name.clone())
        .collect();

    let mut scan = HandlerScan::default();
    for (decl, body) in &declarations {
        collect_calls(*body, file, &decl.name, &local_names, &mut scan.calls);
    }
    scan.handlers = declarations.into_iter().map(|(decl, _)| decl).collect();
    scan
}

fn is_exported(node: Node) -> bool {
    let mut current = node.parent();
    while let Some(parent) = current {
        if parent.kind() == "export_statement" {
            return true;
        }
        // Stop at the first statement boundary above the declaration.
        if parent.kind() == "program" || parent.kind() == "statement_block" {
            return false;
        }
        current = parent.parent();
    }
    false
}

fn collect_declarations<'t>(
    node: Node<'t>,
    file: &SourceFile,
    out: &mut Vec<(HandlerDecl, Node<'t>)>,
) {
    match node.kind() {
        "function_declaration" | "generator_function_declaration" => {
            if let (Some(name), Some(body)) = (
                node.child_by_field_name("name"),
                node.child_by_field_name("body"),
            ) {
                out.push((
                    HandlerDecl {
                        name: file.text(name).to_string(),
                        line: file.line(node),
                        is_exported: is_exported(node),
                    },
                    body,
                ));
            }
        }
        "variable_declarator" => {
            let value = node.child_by_field_name("value");
            let is_function = value.is_some_and(|v| {
                matches!(v.kind(), "arrow_function" | "function_expression" | "function")
            });
            if is_function {
                if let (Some(name), Some(value)) = (node.child_by_field_name("name"), value) {
                    if name.kind() == "identifier" {
                        out.push((
                            HandlerDecl {
                                name: file.text(name).to_string(),
                                line: file.line(node),
                                is_exported: is_exported(node),
                            },
                            value,
                        ));
                    }
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_declarations(child, file, out);
    }
}

fn collect_calls(
    node: Node,
    file: &SourceFile,
    caller: &str,
    local_names: &HashSet<String>,
    out: &mut Vec<CallEdge>,
) {
    if node.kind() == "call_expression" {
        if let Some(function) = node.child_by_field_name("function") {
            if function.kind() == "identifier" {
                let callee = file.text(function);
                if callee != caller && local_names.contains(callee) {
                    out.push(CallEdge {
                        caller: caller.to_string(),
                        callee: callee.to_string(),
                        line: file.line(node),
                    });
                }
            }
        }
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, file, caller, local_names, out);
    }
}
