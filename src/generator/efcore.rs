//! Entity Framework Core artifacts: entity configuration, repository
//! implementation, and DbContext / IDbContext collaborator patches.

use super::context;
use crate::detector::LayerPaths;
use crate::merger::DecisionProvider;
use crate::naming;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;
use once_cell::sync::Lazy;
use regex::Regex;

static DBCONTEXT_CTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s+)(public\s+\w+DbContext\()").unwrap());

static INTERFACE_TAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\s+)(\}\s*\}\s*)$").unwrap());

static ON_MODEL_CREATING_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(protected override void OnModelCreating\(ModelBuilder builder\)\s*\{)").unwrap()
});

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
    generate_configuration(schema, entity, paths, loader, writer, provider)?;
    generate_repository(schema, entity, paths, loader, writer, provider)?;
    update_db_context(schema, entity, paths, writer)?;
    update_idb_context(schema, entity, paths, writer)?;
    update_model_creating(schema, entity, paths, writer)
}

/// Generate the IEntityTypeConfiguration implementation
pub fn generate_configuration(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let Some(dir) = &paths.efcore_configurations else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("efcore_config", &ctx)?;
    let path = dir.join(format!("{}Configuration.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Generate the EF Core repository implementation
pub fn generate_repository(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
    provider: &mut dyn DecisionProvider,
) -> anyhow::Result<()> {
    let Some(dir) = &paths.efcore_repositories else {
        return Ok(());
    };
    let ctx = context::entity_context(schema, entity);
    let rendered = loader.render("efcore_repository", &ctx)?;
    let path = dir.join(format!("EfCore{}Repository.cs", entity.name));
    writer.write_file(&path, &rendered, provider)
}

/// Add the entity's DbSet to the DbContext
fn update_db_context(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let Some(path) = paths.db_context_path(&schema.solution.module_name) else {
        return Ok(());
    };
    let sentinel = format!("DbSet<{}>", entity.name);
    let plural = naming::pluralize(&entity.name);
    let db_set = format!(
        "\n    public virtual DbSet<{}> {} {{ get; set; }}\n",
        entity.name, plural
    );
    writer.update_file_idempotent(
        &path,
        &sentinel,
        |content| {
            let Some(caps) = DBCONTEXT_CTOR_RE.captures(content) else {
                anyhow::bail!("DbContext constructor not found");
            };
            let replacement = format!("{db_set}{}{}", &caps[1], &caps[2]);
            Ok(content.replacen(&caps[0], &replacement, 1))
        },
        None,
    )
}

/// Add the entity's DbSet to the IDbContext interface
fn update_idb_context(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let Some(path) = paths.idb_context_path(&schema.solution.module_name) else {
        return Ok(());
    };
    let sentinel = format!("DbSet<{}>", entity.name);
    let plural = naming::pluralize(&entity.name);
    let db_set = format!("\n    DbSet<{}> {} {{ get; }}\n", entity.name, plural);
    writer.update_file_idempotent(
        &path,
        &sentinel,
        |content| {
            let Some(caps) = INTERFACE_TAIL_RE.captures(content) else {
                anyhow::bail!("interface closing brace not found");
            };
            let replacement = format!("{db_set}{}{}", &caps[1], &caps[2]);
            Ok(content.replacen(&caps[0], &replacement, 1))
        },
        None,
    )
}

/// Register the entity configuration in OnModelCreating
fn update_model_creating(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let Some(path) = paths.db_context_path(&schema.solution.module_name) else {
        return Ok(());
    };
    let sentinel = format!("ApplyConfiguration(new {}Configuration())", entity.name);
    let config_line = format!(
        "\n            builder.ApplyConfiguration(new {}Configuration());\n",
        entity.name
    );
    writer.update_file_idempotent(
        &path,
        &sentinel,
        |content| {
            let Some(caps) = ON_MODEL_CREATING_RE.captures(content) else {
                anyhow::bail!("OnModelCreating method not found");
            };
            let replacement = format!("{}{config_line}", &caps[1]);
            Ok(content.replacen(&caps[0], &replacement, 1))
        },
        None,
    )
}
