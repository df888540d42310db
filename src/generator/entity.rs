//! Domain-layer artifacts: entity, repository interface, constants,
//! distributed event types and data seeder.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;

/// Generate the entity class file
pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let Some(dir) = &paths.domain_entities else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("entity", &ctx)?;
    let path = dir.join(format!("{}.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate the repository interface
///
/// Value objects have no repository.
pub fn generate_repository(
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
    let Some(dir) = &paths.domain_repositories else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("repository", &ctx)?;
    let path = dir.join(format!("I{}Repository.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate the validation-constants file
pub fn generate_constants(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let Some(dir) = &paths.domain_shared_constants else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("constants", &ctx)?;
    let path = dir.join(format!("{}Constants.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate distributed event artifacts (ETO + event type constants)
///
/// Plain entities and value objects do not publish distributed events.
pub fn generate_events(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if !entity.kind().has_events() {
        return Ok(());
    }
    let Some(dir) = &paths.domain_shared_events else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);

    let eto_types = loader.render("eto_types", &ctx)?;
    writer.write_file(
        &dir.join(format!("{}EtoTypes.cs", entity.name)),
        &eto_types,
        provider,
    )?;

    let eto = loader.render("eto", &ctx)?;
    writer.write_file(&dir.join(format!("{}Eto.cs", entity.name)), &eto, provider)
}

/// Generate the data seeder skeleton
pub fn generate_data_seeder(
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
    let Some(dir) = &paths.domain_data else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("seeder", &ctx)?;
    let path = dir.join(format!("{}DataSeeder.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
