use crate::source_file::SourceFile;
use codescope_protocol::{EntityDefinition, EntitySource, EnumDefinition, FieldDefinition};
use tree_sitter::Node;

/// Typed declarations lifted from one source file.
#[derive(Debug, Default)]
pub struct TypeScan {
    pub entities: Vec<EntityDefinition>,
    pub enums: Vec<EnumDefinition>,
}

/// Type names that never count as entity relations.
const KNOWN_TYPES: &[&str] = &[
    "string", "number", "boolean", "any", "unknown", "never", "void", "null", "undefined",
    "object", "bigint", "symbol", "Date", "Array", "Record", "Map", "Set", "Promise", "Partial",
    "Pick", "Omit", "Readonly", "Required", "Buffer", "RegExp", "Error", "Function", "JSON",
    "String", "Number", "Boolean", "Object",
];

fn is_known_type(name: &str) -> bool {
    KNOWN_TYPES.iter().any(|known| known == &name)
}

/// Extract interface-like declarations, object-shaped type aliases, and
/// enums from a parsed source file.
///
/// Type aliases whose definition has no object shape, or that yield zero
/// properties, are skipped; they are not entities.
pub fn extract_types(file: &SourceFile) -> TypeScan {
    let mut scan = TypeScan::default();
    collect(file.tree.root_node(), file, &mut scan);
    scan
}

fn collect(node: Node, file: &SourceFile, scan: &mut TypeScan) {
    match node.kind() {
        "interface_declaration" => {
            if let Some(entity) = interface_entity(node, file) {
                scan.entities.push(entity);
            }
        }
        "type_alias_declaration" => {
            if let Some(entity) = alias_entity(node, file) {
                scan.entities.push(entity);
            }
        }
        "enum_declaration" => {
            if let Some(decl) = enum_definition(node, file) {
                scan.enums.push(decl);
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect(child, file, scan);
    }
}

fn interface_entity(node: Node, file: &SourceFile) -> Option<EntityDefinition> {
    let name = file.text(node.child_by_field_name("name")?).to_string();
    let body = node.child_by_field_name("body")?;
    Some(EntityDefinition {
        name,
        fields: object_fields(body, file),
        source_kind: EntitySource::Interface,
        file_path: Some(file.rel_path.clone()),
    })
}

fn alias_entity(node: Node, file: &SourceFile) -> Option<EntityDefinition> {
    let value = node.child_by_field_name("value")?;
    // Only object-shaped aliases qualify; `type Id = string` is not an
    // entity.
    if value.kind() != "object_type" {
        return None;
    }
    let fields = object_fields(value, file);
    if fields.is_empty() {
        return None;
    }
    let name = file.text(node.child_by_field_name("name")?).to_string();
    Some(EntityDefinition {
        name,
        fields,
        source_kind: EntitySource::Interface,
        file_path: Some(file.rel_path.clone()),
    })
}

fn object_fields(body: Node, file: &SourceFile) -> Vec<FieldDefinition> {
    let mut fields = Vec::new();
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        if member.kind() != "property_signature" {
            continue;
        }
        let Some(name_node) = member.child_by_field_name("name") else {
            continue;
        };
        let name = file.text(name_node).trim_matches(['"', '\'']).to_string();

        let mut optional = false;
        for i in 0..member.child_count() {
            if member.child(i).is_some_and(|c| c.kind() == "?") {
                optional = true;
                break;
            }
        }

        let raw_type = member
            .child_by_field_name("type")
            .map(|t| file.text(t).trim_start_matches(':').trim().to_string())
            .unwrap_or_else(|| "any".to_string());

        let shape = analyze_type(&raw_type);
        fields.push(FieldDefinition {
            name,
            ty: shape.base,
            optional: optional || shape.nullable,
            is_array: shape.is_array,
            is_relation: shape.is_relation,
        });
    }
    fields
}

fn enum_definition(node: Node, file: &SourceFile) -> Option<EnumDefinition> {
    let name = file.text(node.child_by_field_name("name")?).to_string();
    let body = node.child_by_field_name("body")?;
    let mut values = Vec::new();
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let value_node = match member.kind() {
            "enum_assignment" => member.child_by_field_name("name"),
            "property_identifier" | "string" => Some(member),
            _ => None,
        };
        if let Some(value_node) = value_node {
            values.push(file.text(value_node).trim_matches(['"', '\'']).to_string());
        }
    }
    Some(EnumDefinition {
        name,
        values,
        source_kind: EntitySource::Interface,
    })
}

struct TypeShape {
    base: String,
    is_array: bool,
    nullable: bool,
    is_relation: bool,
}

/// Strip array/union decoration from a raw type and decide whether any
/// constituent token names another entity.
fn analyze_type(raw: &str) -> TypeShape {
    let mut nullable = false;
    let mut is_array = false;
    let mut relation_base: Option<String> = None;
    let mut first_base: Option<String> = None;

    for token in raw.split('|').map(str::trim).filter(|t| !t.is_empty()) {
        if token == "null" || token == "undefined" {
            nullable = true;
            continue;
        }

        let (base, token_is_array) = strip_array(token);
        if token_is_array {
            is_array = true;
        }
        if first_base.is_none() {
            first_base = Some(base.clone());
        }
        let uppercase = base.chars().next().is_some_and(|c| c.is_ascii_uppercase());
        if uppercase && !is_known_type(&base) && relation_base.is_none() {
            relation_base = Some(base);
        }
    }

    let is_relation = relation_base.is_some();
    TypeShape {
        base: relation_base
            .or(first_base)
            .unwrap_or_else(|| "any".to_string()),
        is_array,
        nullable,
        is_relation,
    }
}

fn strip_array(token: &str) -> (String, bool) {
    if let Some(inner) = token.strip_suffix("[]") {
        return (inner.trim().to_string(), true);
    }
    if let Some(inner) = token
        .strip_prefix("Array<")
        .and_then(|rest| rest.strip_suffix('>'))
    {
        return (inner.trim().to_string(), true);
    }
    (token.to_string(), false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_file::Language;
    use pretty_assertions::assert_eq;

    fn scan(code: &str) -> TypeScan {
        let file = SourceFile::parse("models.ts".into(), code.into(), Language::TypeScript)
            .expect("parse");
        extract_types(&file)
    }

    #[test]
    fn interfaces_become_entities() {
        let scan = scan(
            r#"
export interface User {
  id: number;
  email: string;
  nickname?: string;
  posts: Post[];
  lastLogin: Date | null;
}
"#,
        );
        assert_eq!(scan.entities.len(), 1);
        let user = &scan.entities[0];
        assert_eq!(user.name, "User");
        assert_eq!(user.fields.len(), 5);

        let nickname = user.fields.iter().find(|f| f.name == "nickname").unwrap();
        assert!(nickname.optional);
        assert!(!nickname.is_relation);

        let posts = user.fields.iter().find(|f| f.name == "posts").unwrap();
        assert!(posts.is_array);
        assert!(posts.is_relation);
        assert_eq!(posts.ty, "Post");

        let last_login = user.fields.iter().find(|f| f.name == "lastLogin").unwrap();
        assert!(last_login.optional);
        assert!(!last_login.is_relation);
    }

    #[test]
    fn object_aliases_qualify_but_scalar_aliases_do_not() {
        let scan = scan(
            r#"
type Account = {
  id: string;
  owner: User;
};
type UserId = string;
type Callback = () => void;
"#,
        );
        assert_eq!(scan.entities.len(), 1);
        assert_eq!(scan.entities[0].name, "Account");
        let owner = &scan.entities[0].fields[1];
        assert!(owner.is_relation);
    }

    #[test]
    fn empty_object_alias_is_skipped() {
        let scan = scan("type Marker = {};");
        assert!(scan.entities.is_empty());
    }

    #[test]
    fn enums_are_collected() {
        let scan = scan(
            r#"
export enum OrderStatus {
  Pending = "PENDING",
  Shipped = "SHIPPED",
  Delivered,
}
"#,
        );
        assert_eq!(scan.enums.len(), 1);
        assert_eq!(
            scan.enums[0].values,
            vec!["Pending", "Shipped", "Delivered"]
        );
    }

    #[test]
    fn array_of_known_type_is_not_a_relation() {
        let scan = scan("interface Tags { names: string[]; created: Date[]; }");
        let fields = &scan.entities[0].fields;
        assert!(fields.iter().all(|f| !f.is_relation));
        assert!(fields.iter().all(|f| f.is_array));
    }
}
