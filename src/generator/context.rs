//! Template context construction.
//!
//! Templates receive snake_case keys with pre-computed derived values
//! (nullable-adjusted C# types, pluralized names, validation constants) so
//! they stay declarative.

use crate::naming;
use crate::schema::{Entity, EnumDef, Property, Schema};
use serde_json::{json, Map, Value};

/// Build the shared context for an entity's artifacts
pub fn entity_context(schema: &Schema, entity: &Entity) -> Value {
    let solution = &schema.solution;
    let solution_pk = solution
        .primary_key_type
        .unwrap_or(crate::schema::PrimaryKeyType::Guid);
    let pk_type = entity.effective_primary_key(solution_pk).cs_name();
    let kind = entity.kind();

    let properties: Vec<Value> = entity.properties.iter().map(property_context).collect();
    let required_properties: Vec<Value> = entity
        .properties
        .iter()
        .filter(|p| p.is_required)
        .map(property_context)
        .collect();
    let non_fk: Vec<Value> = entity
        .non_foreign_key_properties()
        .into_iter()
        .map(property_context)
        .collect();
    let fk: Vec<Value> = entity
        .foreign_key_properties()
        .into_iter()
        .map(property_context)
        .collect();

    let validation_constants: Vec<Value> = entity
        .properties
        .iter()
        .filter_map(|p| {
            p.max_length.map(|len| {
                json!({ "name": format!("{}MaxLength", p.name), "value": len })
            })
        })
        .collect();

    let relations = entity.relations.clone().unwrap_or_default();
    let one_to_one: Vec<Value> = relations
        .one_to_one
        .iter()
        .map(|r| {
            json!({
                "target_entity": r.target_entity,
                "navigation_property": r.navigation_property,
                "foreign_key_name": r.foreign_key_name,
                "owned": r.owned,
                "cascade_delete": r.cascade_delete,
            })
        })
        .collect();
    let one_to_many: Vec<Value> = relations
        .one_to_many
        .iter()
        .map(|r| {
            json!({
                "target_entity": r.target_entity,
                "navigation_property": r.navigation_property,
                "foreign_key_name": r.foreign_key_name,
                "cascade_delete": r.cascade_delete,
                "self_reference": r.self_reference,
            })
        })
        .collect();
    let many_to_one: Vec<Value> = relations
        .many_to_one
        .iter()
        .map(|r| {
            json!({
                "target_entity": r.target_entity,
                "navigation_property": r.navigation_property,
                "foreign_key_name": r.foreign_key_name,
                "inverse_property": r.inverse_property,
            })
        })
        .collect();
    let many_to_many: Vec<Value> = relations
        .many_to_many
        .iter()
        .map(|r| {
            json!({
                "target_entity": r.target_entity,
                "join_entity": r.join_entity,
                "navigation_property": r.navigation_property,
            })
        })
        .collect();

    let tenancy = solution.multi_tenancy.as_ref();

    json!({
        "solution_name": solution.name,
        "module_name": solution.module_name,
        "module_namespace": solution.module_namespace(),
        "namespace_root": solution.namespace_root,
        "entity_name": entity.name,
        "entity_plural": naming::pluralize(&entity.name),
        "table_name": entity.table_name,
        "pk_type": pk_type,
        "base_class": kind.cs_base_class(),
        "is_aggregate_root": kind.is_aggregate_root(),
        "has_events": kind.has_events(),
        "multi_tenancy_enabled": tenancy.is_some_and(|t| t.enabled && t.enable_data_isolation),
        "tenant_id_property": tenancy.map(|t| t.tenant_id_property.clone()).unwrap_or_else(|| "TenantId".to_string()),
        "properties": properties,
        "required_properties": required_properties,
        "non_fk_properties": non_fk,
        "fk_properties": fk,
        "validation_constants": validation_constants,
        "has_constants": !entity.properties.iter().all(|p| p.max_length.is_none()),
        "one_to_one": one_to_one,
        "one_to_many": one_to_many,
        "many_to_one": many_to_one,
        "many_to_many": many_to_many,
    })
}

/// Context for one property
pub fn property_context(p: &Property) -> Value {
    json!({
        "name": p.name,
        "name_lower": naming::lower_first(&p.name),
        "raw_type": p.type_name,
        "cs_type": naming::nullable(&naming::cs_type(&p.type_name), p.nullable),
        "is_required": p.is_required,
        "nullable": p.nullable,
        "max_length": p.max_length,
        "min_length": p.min_length,
        "default_value": p.default_value,
        "is_foreign_key": p.is_foreign_key,
        "target_entity": p.target_entity,
        "is_enum": p.is_enum,
        "enum_name": p.enum_name,
        "validation_rules": p.validation_rules,
    })
}

/// Extend a base context with enum-specific keys
pub fn enum_context(base: &Value, enum_def: &EnumDef) -> Value {
    let mut map: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    map.insert("enum_name".to_string(), json!(enum_def.name));
    map.insert(
        "enum_values".to_string(),
        json!(enum_def
            .values
            .iter()
            .map(|v| json!({ "name": v.name, "value": v.value }))
            .collect::<Vec<Value>>()),
    );
    Value::Object(map)
}

/// Extend a base context with extra keys
pub fn with_keys(base: &Value, pairs: &[(&str, Value)]) -> Value {
    let mut map: Map<String, Value> = base.as_object().cloned().unwrap_or_default();
    for (key, value) in pairs {
        map.insert(key.to_string(), value.clone());
    }
    Value::Object(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{EntityKind, Solution};

    fn sample() -> (Schema, Entity) {
        let schema = Schema {
            solution: Solution {
                name: "Acme".to_string(),
                module_name: "Catalog".to_string(),
                namespace_root: "Acme.Catalog".to_string(),
                ..Default::default()
            },
            entities: vec![],
            options: Default::default(),
        };
        let entity = Entity {
            name: "Product".to_string(),
            table_name: "Products".to_string(),
            entity_type: Some(EntityKind::FullAuditedAggregateRoot),
            primary_key_type: None,
            properties: vec![
                Property {
                    name: "Name".to_string(),
                    type_name: "string".to_string(),
                    is_required: true,
                    max_length: Some(128),
                    ..Default::default()
                },
                Property {
                    name: "Stock".to_string(),
                    type_name: "int".to_string(),
                    nullable: true,
                    ..Default::default()
                },
            ],
            relations: None,
            custom_repository: None,
            domain_events: vec![],
            enums: vec![],
            value_object: None,
        };
        (schema, entity)
    }

    #[test]
    fn test_entity_context_basics() {
        let (schema, entity) = sample();
        let ctx = entity_context(&schema, &entity);
        assert_eq!(ctx["entity_name"], "Product");
        assert_eq!(ctx["entity_plural"], "Products");
        assert_eq!(ctx["pk_type"], "Guid");
        assert_eq!(ctx["base_class"], "FullAuditedAggregateRoot");
        assert_eq!(ctx["module_namespace"], "CatalogModule");
        assert_eq!(ctx["has_constants"], true);
    }

    #[test]
    fn test_nullable_value_type_in_context() {
        let (schema, entity) = sample();
        let ctx = entity_context(&schema, &entity);
        assert_eq!(ctx["properties"][1]["cs_type"], "int?");
        assert_eq!(ctx["properties"][0]["cs_type"], "string");
    }

    #[test]
    fn test_validation_constants() {
        let (schema, entity) = sample();
        let ctx = entity_context(&schema, &entity);
        assert_eq!(ctx["validation_constants"][0]["name"], "NameMaxLength");
        assert_eq!(ctx["validation_constants"][0]["value"], 128);
    }
}
