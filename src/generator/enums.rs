//! Enum definition and extension generation.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::schema::{Entity, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;
use tracing::debug;

pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    if entity.enums.is_empty() {
        return Ok(());
    }
    let Some(dir) = &paths.domain_shared_enums else {
        return Ok(());
    };
    let base = context::entity_context(schema, entity);

    for enum_def in &entity.enums {
        let ctx = context::enum_context(&base, enum_def);
        let rendered = loader.render("enum", &ctx)?;
        let path = dir.join(format!("{}.cs", enum_def.name));
        writer.write_file(&path, &rendered, provider)?;

        if enum_def.generate_extensions {
            // Extensions template is optional; absence is a soft skip.
            match loader.render_optional("enum_extensions", &ctx)? {
                Some(rendered) => {
                    let path = dir.join(format!("{}Extensions.cs", enum_def.name));
                    writer.write_file(&path, &rendered, provider)?;
                }
                None => {
                    debug!(enum_name = %enum_def.name, "enum extensions template absent, skipping");
                }
            }
        }
    }
    Ok(())
}
