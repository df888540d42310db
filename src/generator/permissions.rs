//! Permission registry and definition provider.
//!
//! Both files are collaborators shared by every entity in the run, so they
//! are patched through the writer's idempotent update path: a sentinel
//! probe defends against duplicate application, and an initial-content
//! generator synthesizes the file on first use.

use super::context;
use crate::detector::LayerPaths;
use crate::naming;
use crate::schema::{Entity, EntityKind, Schema};
use crate::templates::TemplateLoader;
use crate::writer::Writer;
use once_cell::sync::Lazy;
use regex::Regex;

static GET_ALL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s+)(public static string\[\] GetAll\(\))").unwrap());

static PROVIDER_TAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\s+)(\}\s+\}\s+\}\s*)$").unwrap());

pub fn generate(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    if entity.kind() == EntityKind::ValueObject {
        return Ok(());
    }
    update_permissions_file(schema, entity, paths, loader, writer)?;
    update_permission_provider(schema, entity, paths, loader, writer)
}

/// Patch the permission constants registry
fn update_permissions_file(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let module_folder = schema.solution.module_folder_name();
    let Some(path) = paths.permissions_file_path(&module_folder, &schema.solution.module_name)
    else {
        return Ok(());
    };

    let sentinel = format!("public static class {}Management", entity.name);
    let ctx = context::entity_context(schema, entity);
    let fragment = loader.render("permissions", &ctx)?;

    let initial = initial_permissions_content(schema, entity, &fragment);
    writer.update_file_idempotent(
        &path,
        &sentinel,
        |content| {
            let Some(caps) = GET_ALL_RE.captures(content) else {
                anyhow::bail!("GetAll() method not found in permissions file");
            };
            let replacement = format!("\n{}{}{}", fragment, &caps[1], &caps[2]);
            Ok(content.replacen(&caps[0], &replacement, 1))
        },
        Some(&initial),
    )
}

fn initial_permissions_content(
    schema: &Schema,
    entity: &Entity,
    fragment: &str,
) -> impl Fn() -> String {
    let namespace_root = schema.solution.namespace_root.clone();
    let module_name = schema.solution.module_name.clone();
    let module_namespace = schema.solution.module_namespace();
    let entity_name = entity.name.clone();
    let fragment = fragment.to_string();
    move || {
        format!(
            r#"using Volo.Abp.Authorization.Permissions;

namespace {namespace_root}.Application.Contracts.Permissions.{module_namespace}
{{
    public static class {module_name}Permissions
    {{
        public const string GroupName = "{module_name}";

{fragment}
        public static string[] GetAll()
        {{
            return new[]
            {{
                {entity_name}Management.Default,
                {entity_name}Management.Create,
                {entity_name}Management.Update,
                {entity_name}Management.Delete
            }};
        }}
    }}
}}
"#
        )
    }
}

/// Patch the permission definition provider
fn update_permission_provider(
    schema: &Schema,
    entity: &Entity,
    paths: &LayerPaths,
    loader: &mut TemplateLoader,
    writer: &mut Writer,
) -> anyhow::Result<()> {
    let module_folder = schema.solution.module_folder_name();
    let Some(path) = paths.permission_provider_path(&module_folder, &schema.solution.module_name)
    else {
        return Ok(());
    };

    let sentinel = format!("{}Management.Default", entity.name);
    let ctx = context::entity_context(schema, entity);
    let fragment = loader.render("permission_provider", &ctx)?;

    let initial = initial_provider_content(schema, &fragment);
    writer.update_file_idempotent(
        &path,
        &sentinel,
        |content| {
            let Some(caps) = PROVIDER_TAIL_RE.captures(content) else {
                anyhow::bail!("could not find insertion point in permission provider");
            };
            let replacement = format!("\n{}{}{}", fragment, &caps[1], &caps[2]);
            Ok(content.replacen(&caps[0], &replacement, 1))
        },
        Some(&initial),
    )
}

fn initial_provider_content(schema: &Schema, fragment: &str) -> impl Fn() -> String {
    let namespace_root = schema.solution.namespace_root.clone();
    let module_name = schema.solution.module_name.clone();
    let module_namespace = schema.solution.module_namespace();
    let module_lower = naming::lower_first(&schema.solution.module_name);
    let fragment = fragment.to_string();
    move || {
        format!(
            r#"using Volo.Abp.Authorization.Permissions;
using Volo.Abp.Localization;
using {namespace_root}.Localization.{module_namespace};

namespace {namespace_root}.Application.Contracts.Permissions.{module_namespace}
{{
    public class {module_name}PermissionDefinitionProvider : PermissionDefinitionProvider
    {{
        public override void Define(IPermissionDefinitionContext context)
        {{
            var {module_lower}Group = context.GetGroupOrNull({module_name}Permissions.GroupName)
                ?? context.AddGroup({module_name}Permissions.GroupName, L("Permission:{module_name}"));

{fragment}        }}
    }}
}}
"#
        )
    }
}
