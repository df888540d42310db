//! FluentValidation validator generation.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;

/// Generate DTO validators, gated on the declarative validation flavor
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
    if schema.options.validation_type != "fluentvalidation" {
        return Ok(());
    }
    let Some(dir) = &paths.application_validators else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("validator", &ctx)?;
    let path = dir.join(format!("{}DtoValidator.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
