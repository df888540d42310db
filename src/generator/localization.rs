//! Localization catalog generation and merging.
//!
//! Culture catalogs are shared structured-data collaborators: each entity
//! contributes its keys, and the key-tree merger fuses them into whatever
//! already exists under the configured conflict strategy.

use crate::detector::LayerPaths;
use crate::merger::{self, JsonMergeStrategy};
use crate::schema::{Entity, Schema};
use crate::writer::Writer;
use serde_json::{json, Map, Value};

/// Generate and merge localization entries for an entity
pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    if !schema.options.use_localization {
        return Ok(());
    }
    let content = entity_localization_content(entity);
    for culture in &schema.options.localization_cultures {
        merge_localization_file(schema, paths, culture, &content, writer)?;
    }
    Ok(())
}

/// Merge one culture file
pub fn merge_localization_file(
    schema: &Schema,
    paths: &LayerPaths,
    culture: &str,
    new_content: &Value,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let override_path = schema
        .options
        .localization_merge
        .as_ref()
        .map(|m| m.target_path.as_str())
        .unwrap_or("");
    let Some(dir) = paths.localization_dir(override_path) else {
        return Ok(());
    };
    let path = dir.join(format!("{culture}.json"));

    let strategy = schema
        .options
        .localization_merge
        .as_ref()
        .and_then(|m| JsonMergeStrategy::parse(&m.conflict_strategy))
        .unwrap_or_default();

    let existing = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => "{}".to_string(),
        Err(e) => return Err(anyhow::anyhow!("failed to read {path:?}: {e}")),
    };

    let new_json = serde_json::to_string(new_content)?;
    let (merged, conflicts) = merger::merge_json(&existing, &new_json, strategy)?;

    for conflict in &conflicts {
        println!("Localization conflict: {}", conflict.description);
    }

    writer.write_collaborator(&path, &merged)
}

/// Build the key set an entity contributes to each culture
fn entity_localization_content(entity: &Entity) -> Value {
    let mut content = Map::new();
    content.insert(entity.name.clone(), json!(entity.name));

    for prop in &entity.properties {
        content.insert(format!("{}.{}", entity.name, prop.name), json!(prop.name));
    }

    let permission_base = format!("Permission:{}", entity.name);
    content.insert(permission_base.clone(), json!(entity.name));
    content.insert(
        format!("{permission_base}.Create"),
        json!(format!("Create {}", entity.name)),
    );
    content.insert(
        format!("{permission_base}.Update"),
        json!(format!("Update {}", entity.name)),
    );
    content.insert(
        format!("{permission_base}.Delete"),
        json!(format!("Delete {}", entity.name)),
    );

    for enum_def in &entity.enums {
        if enum_def.use_localization {
            for value in &enum_def.values {
                let key = if value.localization_key.is_empty() {
                    format!("Enum:{}.{}", enum_def.name, value.name)
                } else {
                    value.localization_key.clone()
                };
                content.insert(key, json!(value.name));
            }
        }
    }

    Value::Object(content)
}
