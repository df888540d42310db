use super::{EntityKind, PrimaryKeyType, Relations, Schema};
use crate::error::GenError;
use crate::naming;
use std::collections::HashSet;

/// Conflict strategies accepted for localization merging
const LOCALIZATION_STRATEGIES: &[&str] = &["overwrite", "append", "skip"];

impl Schema {
    /// Normalize defaults and reject contradictory input
    ///
    /// Validation mutates the schema only by filling defaults; running it a
    /// second time makes no further change. After a successful validation
    /// the schema is treated as frozen.
    pub fn validate(&mut self) -> Result<(), GenError> {
        self.validate_solution()?;

        if self.entities.is_empty() {
            return Err(invalid("schema must contain at least one entity"));
        }

        let mut entity_names: HashSet<String> = HashSet::new();
        for i in 0..self.entities.len() {
            let name = self.entities[i].name.clone();
            if name.is_empty() {
                return Err(invalid(&format!("entity[{i}]: name is required")));
            }
            if !entity_names.insert(name.clone()) {
                return Err(invalid(&format!("duplicate entity name '{name}'")));
            }
            self.validate_entity(i)?;
        }

        // Relations may forward-reference entities that are not in this
        // schema; only the target name itself is required.
        for i in 0..self.entities.len() {
            self.normalize_relations(i)?;
        }

        Ok(())
    }

    fn validate_solution(&mut self) -> Result<(), GenError> {
        let sol = &mut self.solution;
        if sol.name.is_empty() {
            return Err(invalid("solution.name is required"));
        }
        if sol.module_name.is_empty() {
            return Err(invalid("solution.moduleName is required"));
        }
        if sol.namespace_root.is_empty() {
            sol.namespace_root = format!("{}.{}", sol.name, sol.module_name);
        }
        if sol.abp_version.is_empty() {
            sol.abp_version = "9.0".to_string();
        }
        if sol.primary_key_type.is_none() {
            sol.primary_key_type = Some(PrimaryKeyType::Guid);
        }
        if sol.db_provider.is_none() {
            sol.db_provider = Some(super::DbProvider::EfCore);
        }
        if let Some(tenancy) = sol.multi_tenancy.as_mut() {
            if tenancy.tenant_id_property.is_empty() {
                tenancy.tenant_id_property = "TenantId".to_string();
            }
        }

        if self.options.validation_type.is_empty() {
            self.options.validation_type = "fluentvalidation".to_string();
        }
        match self.options.validation_type.as_str() {
            "fluentvalidation" | "native" => {}
            other => {
                return Err(invalid(&format!(
                    "options.validationType must be 'fluentvalidation' or 'native', got '{other}'"
                )))
            }
        }

        if let Some(merge) = self.options.localization_merge.as_mut() {
            if merge.conflict_strategy.is_empty() {
                merge.conflict_strategy = "append".to_string();
            }
            if !LOCALIZATION_STRATEGIES.contains(&merge.conflict_strategy.as_str()) {
                return Err(invalid(&format!(
                    "options.localizationMerge.conflictStrategy must be one of {LOCALIZATION_STRATEGIES:?}, got '{}'",
                    merge.conflict_strategy
                )));
            }
        }

        Ok(())
    }

    fn validate_entity(&mut self, index: usize) -> Result<(), GenError> {
        let entity = &mut self.entities[index];
        let entity_name = entity.name.clone();

        if entity.table_name.is_empty() {
            entity.table_name = naming::pluralize(&entity_name);
        }
        if entity.entity_type.is_none() {
            entity.entity_type = Some(EntityKind::FullAuditedAggregateRoot);
        }

        if entity.properties.is_empty() && entity.kind() != EntityKind::ValueObject {
            return Err(invalid(&format!(
                "entity '{entity_name}' must have at least one property"
            )));
        }

        let mut property_names: HashSet<&str> = HashSet::new();
        for (i, prop) in entity.properties.iter().enumerate() {
            if prop.name.is_empty() {
                return Err(invalid(&format!(
                    "entity '{entity_name}' property[{i}]: name is required"
                )));
            }
            if !property_names.insert(prop.name.as_str()) {
                return Err(invalid(&format!(
                    "entity '{entity_name}': duplicate property name '{}'",
                    prop.name
                )));
            }
            if prop.type_name.is_empty() {
                return Err(invalid(&format!(
                    "entity '{entity_name}' property '{}': type is required",
                    prop.name
                )));
            }
            // Unknown property types are tolerated; they may be enums or
            // entities defined elsewhere in the target language.
            if prop.is_foreign_key && prop.target_entity.as_deref().unwrap_or("").is_empty() {
                return Err(invalid(&format!(
                    "entity '{entity_name}' property '{}': foreign key must specify targetEntity",
                    prop.name
                )));
            }
        }

        let mut enum_names: HashSet<&str> = HashSet::new();
        for enum_def in &entity.enums {
            if enum_def.name.is_empty() {
                return Err(invalid(&format!(
                    "entity '{entity_name}': enum name is required"
                )));
            }
            if !enum_names.insert(enum_def.name.as_str()) {
                return Err(invalid(&format!(
                    "entity '{entity_name}': duplicate enum name '{}'",
                    enum_def.name
                )));
            }
            let mut value_names: HashSet<&str> = HashSet::new();
            for value in &enum_def.values {
                if !value_names.insert(value.name.as_str()) {
                    return Err(invalid(&format!(
                        "enum '{}': duplicate value name '{}'",
                        enum_def.name, value.name
                    )));
                }
            }
        }

        Ok(())
    }

    fn normalize_relations(&mut self, index: usize) -> Result<(), GenError> {
        let entity_name = self.entities[index].name.clone();
        let Some(relations) = self.entities[index].relations.as_mut() else {
            return Ok(());
        };
        normalize_relation_defaults(&entity_name, relations)
    }
}

/// Fill defaulted relation fields in place
///
/// Target existence is deliberately not checked: forward references are
/// allowed because the referenced entity may live in another schema or
/// already exist in the target solution.
fn normalize_relation_defaults(
    entity_name: &str,
    relations: &mut Relations,
) -> Result<(), GenError> {
    for (i, rel) in relations.one_to_one.iter_mut().enumerate() {
        if rel.target_entity.is_empty() {
            return Err(invalid(&format!(
                "entity '{entity_name}' oneToOne[{i}]: targetEntity is required"
            )));
        }
        if rel.navigation_property.is_empty() {
            rel.navigation_property = rel.target_entity.clone();
        }
        if rel.foreign_key_name.is_empty() {
            rel.foreign_key_name = format!("{}Id", rel.target_entity);
        }
    }
    for (i, rel) in relations.one_to_many.iter_mut().enumerate() {
        if rel.target_entity.is_empty() {
            return Err(invalid(&format!(
                "entity '{entity_name}' oneToMany[{i}]: targetEntity is required"
            )));
        }
        if rel.navigation_property.is_empty() {
            rel.navigation_property = naming::pluralize(&rel.target_entity);
        }
        if rel.foreign_key_name.is_empty() {
            rel.foreign_key_name = format!("{entity_name}Id");
        }
    }
    for (i, rel) in relations.many_to_one.iter_mut().enumerate() {
        if rel.target_entity.is_empty() {
            return Err(invalid(&format!(
                "entity '{entity_name}' manyToOne[{i}]: targetEntity is required"
            )));
        }
        if rel.navigation_property.is_empty() {
            rel.navigation_property = rel.target_entity.clone();
        }
        if rel.foreign_key_name.is_empty() {
            rel.foreign_key_name = format!("{}Id", rel.target_entity);
        }
    }
    for (i, rel) in relations.many_to_many.iter_mut().enumerate() {
        if rel.target_entity.is_empty() {
            return Err(invalid(&format!(
                "entity '{entity_name}' manyToMany[{i}]: targetEntity is required"
            )));
        }
        if rel.navigation_property.is_empty() {
            rel.navigation_property = naming::pluralize(&rel.target_entity);
        }
        if rel.join_entity.is_empty() {
            // Deterministic join name: lexicographic concatenation so both
            // endpoints derive the same entity.
            let mut pair = [entity_name.to_string(), rel.target_entity.clone()];
            pair.sort();
            rel.join_entity = format!("{}{}", pair[0], pair[1]);
        }
    }
    Ok(())
}

fn invalid(message: &str) -> GenError {
    GenError::SchemaInvalid {
        message: message.to_string(),
    }
}
