//! Distributed event handler generation, option-gated.

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
    if !schema.options.generate_event_handlers || !entity.kind().has_events() {
        return Ok(());
    }
    let Some(dir) = &paths.application_event_handlers else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("event_handler", &ctx)?;
    let path = dir.join(format!("{}EventHandler.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
