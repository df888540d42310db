//! Custom repository generation for entities that declare extra methods.
//!
//! Both templates are optional: a deployment that strips them gets a soft
//! skip per entity instead of a failed run.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{DbProvider, Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;
use serde_json::json;
use tracing::debug;

pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if entity.kind() == EntityKind::ValueObject {
        return Ok(());
    }
    let Some(custom) = &entity.custom_repository else {
        return Ok(());
    };
    if custom.methods.is_empty() {
        return Ok(());
    }

    let methods: Vec<serde_json::Value> = custom
        .methods
        .iter()
        .map(|m| {
            json!({
                "name": m.name,
                "return_type": if m.return_type.is_empty() {
                    "Task".to_string()
                } else {
                    m.return_type.clone()
                },
                "parameters": m
                    .parameters
                    .iter()
                    .map(|p| json!({ "name": p.name, "type": p.type_name }))
                    .collect::<Vec<serde_json::Value>>(),
            })
        })
        .collect();
    let base = context::entity_context(schema, entity);
    let ctx = context::with_keys(&base, &[("repository_methods", json!(methods))]);

    if let Some(dir) = &paths.domain_repositories {
        match loader.render_optional("custom_repository_interface", &ctx)? {
            Some(rendered) => {
                let path = dir.join(format!("I{}CustomRepository.cs", entity.name));
                writer.write_file(&path, &rendered, provider)?;
            }
            None => debug!(entity = %entity.name, "custom repository interface template absent"),
        }
    }

    let db_provider = schema.solution.db_provider.unwrap_or(DbProvider::EfCore);
    if db_provider.includes_efcore() {
        if let Some(dir) = &paths.efcore_repositories {
            match loader.render_optional("custom_repository_efcore", &ctx)? {
                Some(rendered) => {
                    let path = dir.join(format!("EfCore{}CustomRepository.cs", entity.name));
                    writer.write_file(&path, &rendered, provider)?;
                }
                None => debug!(entity = %entity.name, "custom EF Core repository template absent"),
            }
        }
    }
    if db_provider.includes_mongodb() {
        if let Some(dir) = &paths.mongodb_repositories {
            match loader.render_optional("custom_repository_mongodb", &ctx)? {
                Some(rendered) => {
                    let path = dir.join(format!("MongoDb{}CustomRepository.cs", entity.name));
                    writer.write_file(&path, &rendered, provider)?;
                }
                None => debug!(entity = %entity.name, "custom MongoDB repository template absent"),
            }
        }
    }
    Ok(())
}
