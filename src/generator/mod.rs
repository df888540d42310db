//! The renderer pipeline.
//!
//! One module per artifact family. Renderers are pure with respect to the
//! filesystem: they produce `(path, text)` pairs and hand them to the
//! writer, which owns every filesystem effect. Entities are processed in
//! schema order and, within an entity, artifact kinds run in the fixed
//! order encoded in [`generate_all`]. The writer ledger observes exactly
//! that order.

mod context;
mod custom_repository;
mod domain_events;
mod dto;
mod entity;
mod enums;
mod event_handler;
mod localization;
mod manager;
mod mongodb;
mod permissions;
mod relationships;
mod service;
mod validator;
mod value_object;

pub mod efcore;

pub use context::{entity_context, property_context};
pub use relationships::{join_entity, missing_join_entities};

use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{DbProvider, Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;

/// Generate every artifact for every entity in the schema
///
/// A fatal error from any artifact aborts the run immediately; the writer
/// ledger up to that point is retained for the summary. There is no
/// rollback; dry-run is the mechanism for safe previewing.
pub fn generate_all(
    schema: &Schema,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let total = schema.entities.len();
    for (i, entity) in schema.entities.iter().enumerate() {
        println!("[{}/{}] Generating {}...", i + 1, total, entity.name);
        generate_entity(schema, entity, paths, loader, writer, provider)
            .map_err(|e| anyhow::anyhow!("failed to generate {}: {e}", entity.name))?;
        println!("✓ Generated {}\n", entity.name);
    }
    Ok(())
}

/// Generate all artifacts for one entity, in the fixed artifact order
pub fn generate_entity(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let db_provider = schema.solution.db_provider.unwrap_or(DbProvider::EfCore);

    enums::generate(schema, entity, paths, loader, writer, provider)?;

    if entity.kind() == EntityKind::ValueObject {
        value_object::generate(schema, entity, paths, loader, writer, provider)?;
        value_object::generate_factory(schema, entity, paths, loader, writer, provider)?;
    } else {
        entity::generate(schema, entity, paths, loader, writer, provider)?;
        // Join entities implied by many-to-many relations are ordinary
        // entities generated alongside their left endpoint.
        for join in relationships::missing_join_entities(schema, entity) {
            entity::generate(schema, &join, paths, loader, writer, provider)?;
            if db_provider.includes_efcore() {
                efcore::generate_configuration(schema, &join, paths, loader, writer, provider)?;
            }
        }
    }

    entity::generate_repository(schema, entity, paths, loader, writer, provider)?;
    custom_repository::generate(schema, entity, paths, loader, writer, provider)?;
    domain_events::generate(schema, entity, paths, loader, writer, provider)?;
    manager::generate(schema, entity, paths, loader, writer, provider)?;
    entity::generate_constants(schema, entity, paths, loader, writer, provider)?;
    entity::generate_events(schema, entity, paths, loader, writer, provider)?;
    entity::generate_data_seeder(schema, entity, paths, loader, writer, provider)?;
    dto::generate(schema, entity, paths, loader, writer, provider)?;
    dto::generate_app_service_interface(schema, entity, paths, loader, writer, provider)?;
    validator::generate(schema, entity, paths, loader, writer, provider)?;
    service::generate(schema, entity, paths, loader, writer, provider)?;
    service::generate_mapper_profile(schema, entity, paths, loader, writer, provider)?;
    service::generate_controller(schema, entity, paths, loader, writer, provider)?;
    permissions::generate(schema, entity, paths, loader, writer)?;
    localization::generate(schema, entity, paths, writer)?;
    event_handler::generate(schema, entity, paths, loader, writer, provider)?;

    if db_provider.includes_efcore() {
        efcore::generate(schema, entity, paths, loader, writer, provider)?;
    }
    if db_provider.includes_mongodb() {
        mongodb::generate(schema, entity, paths, loader, writer, provider)?;
    }

    integration_tests::generate(schema, entity, paths, loader, writer, provider)?;
    Ok(())
}
