use codescope_protocol::{EntityDefinition, EntitySource, EnumDefinition, FieldDefinition};
use once_cell::sync::Lazy;
use regex::Regex;

/// Entities and enums lifted from an ORM schema file.
#[derive(Debug, Default)]
pub struct SchemaScan {
    pub entities: Vec<EntityDefinition>,
    pub enums: Vec<EnumDefinition>,
}

static BLOCK_HEADER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*(model|enum)\s+([A-Za-z_][A-Za-z0-9_]*)\s*\{").expect("static regex"));

/// Map ORM scalar types to generic equivalents.
fn map_scalar(ty: &str) -> Option<&'static str> {
    match ty {
        "String" => Some("string"),
        "Int" | "BigInt" | "Float" | "Decimal" => Some("number"),
        "Boolean" => Some("boolean"),
        "DateTime" => Some("date"),
        "Json" => Some("object"),
        "Bytes" => Some("binary"),
        _ => None,
    }
}

/// Parse a Prisma-style schema by block-regex + balanced-brace matching.
///
/// This is deliberately not a full grammar: `model`/`enum` headers are
/// found by regex, bodies by brace balancing, and fields by line
/// splitting. A field is a relation if it carries `@relation` or its
/// type starts with an uppercase letter and is not a known scalar.
pub fn parse_schema(content: &str, file_path: &str) -> SchemaScan {
    let mut scan = SchemaScan::default();

    for captures in BLOCK_HEADER.captures_iter(content) {
        let keyword = &captures[1];
        let name = captures[2].to_string();
        let open = captures.get(0).expect("whole match").end();
        let Some(body) = balanced_block(content, open) else {
            log::debug!("Unbalanced {keyword} block '{name}' in {file_path}");
            continue;
        };

        match keyword {
            "model" => scan.entities.push(EntityDefinition {
                name,
                fields: parse_model_body(body),
                source_kind: EntitySource::Schema,
                file_path: Some(file_path.to_string()),
            }),
            _ => scan.enums.push(EnumDefinition {
                name,
                values: parse_enum_body(body),
                source_kind: EntitySource::Schema,
            }),
        }
    }

    scan
}

/// Body text between an already-consumed `{` and its balancing `}`.
fn balanced_block(content: &str, start: usize) -> Option<&str> {
    let mut depth = 1usize;
    for (offset, ch) in content[start..].char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_model_body(body: &str) -> Vec<FieldDefinition> {
    let mut fields = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") || line.starts_with("@@") {
            continue;
        }
        let mut parts = line.split_whitespace();
        let (Some(name), Some(raw_type)) = (parts.next(), parts.next()) else {
            continue;
        };
        let rest: String = parts.collect::<Vec<_>>().join(" ");

        let optional = raw_type.ends_with('?');
        let trimmed = raw_type.trim_end_matches('?');
        let is_array = trimmed.ends_with("[]");
        let base = trimmed.trim_end_matches("[]");

        let (ty, is_relation) = match map_scalar(base) {
            Some(mapped) => (mapped.to_string(), rest.contains("@relation")),
            None => {
                let uppercase = base.chars().next().is_some_and(|c| c.is_ascii_uppercase());
                (
                    base.to_string(),
                    rest.contains("@relation") || uppercase,
                )
            }
        };

        fields.push(FieldDefinition {
            name: name.to_string(),
            ty,
            optional,
            is_array,
            is_relation,
        });
    }
    fields
}

fn parse_enum_body(body: &str) -> Vec<String> {
    body.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("//") && !l.starts_with("@@"))
        .filter_map(|l| l.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SCHEMA: &str = r#"
// customers and their orders
model User {
  id        Int      @id @default(autoincrement())
  email     String   @unique
  nickname  String?
  orders    Order[]
  role      Role     @default(CUSTOMER)
  createdAt DateTime @default(now())
  @@index([email])
}

model Order {
  id     Int    @id
  user   User   @relation(fields: [userId], references: [id])
  userId Int
  total  Decimal
}

enum Role {
  CUSTOMER
  ADMIN
}
"#;

    #[test]
    fn models_and_enums_are_extracted() {
        let scan = parse_schema(SCHEMA, "prisma/schema.prisma");
        assert_eq!(scan.entities.len(), 2);
        assert_eq!(scan.enums.len(), 1);
        assert_eq!(scan.enums[0].values, vec!["CUSTOMER", "ADMIN"]);
        assert_eq!(
            scan.entities[0].file_path.as_deref(),
            Some("prisma/schema.prisma")
        );
    }

    #[test]
    fn scalars_map_and_relations_are_flagged() {
        let scan = parse_schema(SCHEMA, "schema.prisma");
        let user = &scan.entities[0];

        let email = user.fields.iter().find(|f| f.name == "email").unwrap();
        assert_eq!(email.ty, "string");
        assert!(!email.is_relation);

        let nickname = user.fields.iter().find(|f| f.name == "nickname").unwrap();
        assert!(nickname.optional);

        let orders = user.fields.iter().find(|f| f.name == "orders").unwrap();
        assert_eq!(orders.ty, "Order");
        assert!(orders.is_array);
        assert!(orders.is_relation);

        // Uppercase non-scalar without @relation still counts (enum ref).
        let role = user.fields.iter().find(|f| f.name == "role").unwrap();
        assert!(role.is_relation);

        let created = user.fields.iter().find(|f| f.name == "createdAt").unwrap();
        assert_eq!(created.ty, "date");
        assert!(!created.is_relation);
    }

    #[test]
    fn unbalanced_blocks_are_skipped_not_fatal() {
        let scan = parse_schema("model Broken {\n  id Int\n", "schema.prisma");
        assert!(scan.entities.is_empty());
    }
}
