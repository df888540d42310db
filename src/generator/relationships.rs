//! Relationship processing.
//!
//! Relation defaults (navigation property, foreign key, join entity names)
//! are filled by the schema validator; this module synthesizes the join
//! entities that many-to-many relations imply so the rest of the pipeline
//! can treat them as ordinary entities.

use crate::schema::{Entity, EntityKind, ManyToManyRelation, PrimaryKeyType, Property, Schema};

/// Build the implicit join entity for a many-to-many relation
///
/// The join name is already normalized to the lexicographic concatenation
/// of both endpoints, so both sides of the relation derive the same entity.
pub fn join_entity(
    entity: &Entity,
    relation: &ManyToManyRelation,
    pk_type: PrimaryKeyType,
) -> Entity {
    let left = entity.name.clone();
    let right = relation.target_entity.clone();
    Entity {
        name: relation.join_entity.clone(),
        table_name: crate::naming::pluralize(&relation.join_entity),
        entity_type: Some(EntityKind::Entity),
        primary_key_type: Some(pk_type),
        properties: vec![
            Property {
                name: format!("{left}Id"),
                type_name: pk_type.cs_name().to_string(),
                is_required: true,
                is_foreign_key: true,
                target_entity: Some(left),
                ..Default::default()
            },
            Property {
                name: format!("{right}Id"),
                type_name: pk_type.cs_name().to_string(),
                is_required: true,
                is_foreign_key: true,
                target_entity: Some(right),
                ..Default::default()
            },
        ],
        relations: None,
        custom_repository: None,
        domain_events: vec![],
        enums: vec![],
        value_object: None,
    }
}

/// Join entities needed by an entity that are not already declared
///
/// A join entity declared explicitly in the schema (or generated for the
/// other endpoint earlier in the run) must not be generated twice.
pub fn missing_join_entities(schema: &Schema, entity: &Entity) -> Vec<Entity> {
    let Some(relations) = &entity.relations else {
        return Vec::new();
    };
    let solution_pk = schema
        .solution
        .primary_key_type
        .unwrap_or(PrimaryKeyType::Guid);
    relations
        .many_to_many
        .iter()
        .filter(|rel| !schema.entities.iter().any(|e| e.name == rel.join_entity))
        .map(|rel| join_entity(entity, rel, entity.effective_primary_key(solution_pk)))
        .collect()
}
