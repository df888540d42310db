//! MongoDB repository generation, provider-gated by the caller.

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
    let Some(dir) = &paths.mongodb_repositories else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("mongodb_repository", &ctx)?;
    let path = dir.join(format!("MongoDb{}Repository.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}
