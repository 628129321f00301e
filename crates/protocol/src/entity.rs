use serde::{Deserialize, Serialize};

/// Where an entity or enum definition came from.
///
/// Schema sources are ground truth: when a schema model and a source-code
/// interface share a name, the schema definition wins the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntitySource {
    Interface,
    Schema,
}

/// A single field of an entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub ty: String,
    pub optional: bool,
    pub is_array: bool,
    pub is_relation: bool,
}

/// An entity extracted from an interface declaration or a schema model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityDefinition {
    pub name: String,
    pub fields: Vec<FieldDefinition>,
    pub source_kind: EntitySource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
}

impl EntityDefinition {
    /// Look up a field referencing `entity` (by bare type name).
    pub fn field_of_type(&self, entity: &str) -> Option<&FieldDefinition> {
        self.fields.iter().find(|f| f.ty == entity)
    }
}

/// An enum extracted from source or schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnumDefinition {
    pub name: String,
    pub values: Vec<String>,
    pub source_kind: EntitySource,
}

/// Cardinality of a derived relationship.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RelationshipKind {
    OneToOne,
    OneToMany,
    ManyToOne,
    ManyToMany,
}

/// A relationship derived from a relation field and its (possible)
/// reciprocal field on the referenced entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub source: String,
    pub target: String,
    pub kind: RelationshipKind,
    pub source_field: String,
}

/// The merged data model artifact payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataModel {
    pub entities: Vec<EntityDefinition>,
    pub enums: Vec<EnumDefinition>,
    pub relationships: Vec<Relationship>,
}
