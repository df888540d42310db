//! Value object and factory generation.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, Schema};
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
    let Some(dir) = &paths.domain_entities else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("value_object", &ctx)?;
    let path = dir.join(format!("{}.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

pub fn generate_factory(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if !entity
        .value_object
        .as_ref()
        .is_some_and(|vo| vo.generate_factory)
    {
        return Ok(());
    }
    let Some(dir) = &paths.domain_entities else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("value_object_factory", &ctx)?;
    let path = dir.join(format!("{}Factory.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
