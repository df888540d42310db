//! Contracts-layer artifacts: DTO set and app-service interface.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;

/// Generate the DTO family for an entity
///
/// One file carries `{E}Dto`, `Create{E}Dto`, `Update{E}Dto` and
/// `GetList{E}Dto`, organized under a per-entity folder.
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
    let Some(dir) = paths.entity_dto_dir(&schema.solution.module_name, &entity.name) else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("dto", &ctx)?;
    let path = dir.join(format!("{}Dto.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate the app-service interface
pub fn generate_app_service_interface(
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
    let Some(dir) = &paths.contracts_services else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("app_service_interface", &ctx)?;
    let path = dir.join(format!("I{}AppService.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
