//! Per-entity domain event record generation.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;
use serde_json::json;

pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if entity.domain_events.is_empty() {
        return Ok(());
    }
    let Some(dir) = &paths.domain_shared_events else {
        return Ok(());
    };
    let base = context::entity_context(schema, entity);

    for event in &entity.domain_events {
        let properties: Vec<serde_json::Value> = event
            .properties
            .iter()
            .map(context::property_context)
            .collect();
        let ctx = context::with_keys(
            &base,
            &[
                ("event_name", json!(event.name)),
                ("event_properties", json!(properties)),
            ],
        );
        let rendered = loader.render("domain_event", &ctx)?;
        let path = dir.join(format!("{}.cs", event.name));
        writer.write_file(&path, &rendered, provider)?;
    }
    Ok(())
}
