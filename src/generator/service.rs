//! Application-layer artifacts: app service, mapper profile, controller.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;

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
    let Some(dir) = &paths.application_services else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("app_service", &ctx)?;
    let path = dir.join(format!("{}AppService.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

pub fn generate_mapper_profile(
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
    let Some(dir) = &paths.application_auto_mapper else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("mapper_profile", &ctx)?;
    let path = dir.join(format!("{}AutoMapperProfile.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate the HTTP controller, gated on the solution flag
pub fn generate_controller(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if entity.kind() == EntityKind::ValueObject || !schema.solution.generate_controllers {
        return Ok(());
    }
    let Some(dir) = &paths.http_api_controllers else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("controller", &ctx)?;
    let path = dir.join(format!("{}Controller.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
