use crate::error::Result;
use codescope_parsers::{extract_types, parse_schema, ParseSession};
use codescope_protocol::{
    ArtifactKind, ArtifactResult, DataModel, EntityDefinition, EnumDefinition, Relationship,
    RelationshipKind,
};
use codescope_walker::{read_safe, WalkOutcome};
use std::collections::HashMap;

const SCHEMA_MAX_BYTES: u64 = 1_048_576;

/// Merges schema-derived and source-derived entities into one data
/// model and infers relationships between them.
pub struct DataModelEngine;

impl DataModelEngine {
    pub fn run(&self, walk: &WalkOutcome, session: &mut ParseSession) -> Result<ArtifactResult> {
        let errors_before = session.error_count();
        let mut error_count = 0u64;
        let mut examined = 0u64;

        // Source-code pass first so schema entities can override them.
        let mut entities: Vec<EntityDefinition> = Vec::new();
        let mut enums: Vec<EnumDefinition> = Vec::new();
        for file in &walk.files {
            let Some(source) = session.parse(&file.rel_path) else {
                continue;
            };
            examined += 1;
            let scan = extract_types(&source);
            entities.extend(scan.entities);
            enums.extend(scan.enums);
        }

        // Schema pass: ground truth on name collisions.
        let mut schema_entities: Vec<EntityDefinition> = Vec::new();
        let mut schema_enums: Vec<EnumDefinition> = Vec::new();
        for file in &walk.files {
            if !file.rel_path.ends_with(".prisma") {
                continue;
            }
            examined += 1;
            match read_safe(&session.root().join(&file.rel_path), SCHEMA_MAX_BYTES) {
                Some(text) => {
                    let scan = parse_schema(&text, &file.rel_path);
                    schema_entities.extend(scan.entities);
                    schema_enums.extend(scan.enums);
                }
                None => error_count += 1,
            }
        }

        let entities = merge_by_name(entities, schema_entities, |e| e.name.clone());
        let enums = merge_by_name(enums, schema_enums, |e| e.name.clone());
        let relationships = derive_relationships(&entities);

        let model = DataModel {
            entities,
            enums,
            relationships,
        };

        error_count += session.error_count() - errors_before;
        log::debug!(
            "Data model: {} entities, {} enums, {} relationships",
            model.entities.len(),
            model.enums.len(),
            model.relationships.len()
        );

        let content = serde_json::to_string_pretty(&model)?;
        Ok(ArtifactResult::new(
            ArtifactKind::DataModel,
            content,
            examined,
            error_count,
        ))
    }
}

/// Last-writer-wins merge keyed by name; `overrides` replace `base`
/// entries in place, new names append in order.
fn merge_by_name<T>(base: Vec<T>, overrides: Vec<T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut merged = base;
    let mut index: HashMap<String, usize> = merged
        .iter()
        .enumerate()
        .map(|(i, item)| (key(item), i))
        .collect();

    for item in overrides {
        let name = key(&item);
        match index.get(&name) {
            Some(&i) => merged[i] = item,
            None => {
                index.insert(name, merged.len());
                merged.push(item);
            }
        }
    }
    merged
}

/// Infer relationships by inspecting reciprocal fields. Only pairs
/// where both entities exist in the merged set produce an edge.
fn derive_relationships(entities: &[EntityDefinition]) -> Vec<Relationship> {
    let by_name: HashMap<&str, &EntityDefinition> =
        entities.iter().map(|e| (e.name.as_str(), e)).collect();

    let mut relationships = Vec::new();
    for entity in entities {
        for field in &entity.fields {
            if !field.is_relation {
                continue;
            }
            let Some(target) = by_name.get(field.ty.as_str()) else {
                continue;
            };

            let reciprocal = target.field_of_type(&entity.name);
            let kind = match (field.is_array, reciprocal) {
                (true, Some(back)) if back.is_array => RelationshipKind::ManyToMany,
                (true, _) => RelationshipKind::OneToMany,
                (false, Some(back)) if back.is_array => RelationshipKind::ManyToOne,
                (false, Some(_)) => RelationshipKind::OneToOne,
                (false, None) => RelationshipKind::ManyToOne,
            };

            relationships.push(Relationship {
                source: entity.name.clone(),
                target: target.name.clone(),
                kind,
                source_field: field.name.clone(),
            });
        }
    }
    relationships
}
