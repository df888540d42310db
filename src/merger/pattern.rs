//! Pattern strategy: additive block merging.
//!
//! Used for files whose interesting content is a set of regex-extractable
//! fragments rather than arbitrary code: permission registries (nested
//! static classes), permission providers (`context.AddPermission(...)`
//! statements) and data contexts (`DbSet<…>` properties plus
//! `builder.Entity<…>` configuration lines). Each fragment has a stable
//! identifier; fragments already present are skipped, identical identifiers
//! with divergent bodies raise conflicts.

use super::classifier::FileKind;
use super::conflict::{Conflict, ConflictKind};
use once_cell::sync::Lazy;
use regex::Regex;

static STATIC_CLASS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)public\s+static\s+class\s+\w+\s*\{[^}]*\}").unwrap());

static STATIC_CLASS_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"public\s+static\s+class\s+(\w+)").unwrap());

/// `xGroup.AddPermission(...)` / `x.AddChild(...)` statements; the argument
/// list tolerates one level of nested calls (`L("Permission:X")`).
static ADD_PERMISSION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[\w.]+\.Add(?:Permission|Child)\((?:[^()]+|\([^()]*\))+\);").unwrap()
});

static DB_SET_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:public\s+(?:virtual\s+)?)?DbSet<(\w+)>\s+(\w+)\s*\{\s*get;(?:\s*set;)?\s*\}").unwrap()
});

static ENTITY_CONFIG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"builder\.(?:Entity<\w+>\([^;]+\)|ApplyConfiguration\([^;]+\));").unwrap());

static DEFINE_METHOD_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)(public\s+override\s+void\s+Define\([^)]*\)\s*\{)(.*?)(\n\s*\})").unwrap()
});

/// Run the pattern strategy for `kind`
///
/// Returns the merged text and any conflicts. When conflicts are present
/// the returned text is the existing content unchanged; the caller resolves
/// first.
pub fn merge(
    existing: &str,
    new_content: &str,
    kind: FileKind,
) -> anyhow::Result<(String, Vec<Conflict>)> {
    match kind {
        FileKind::Permissions => Ok(merge_permissions(existing, new_content)),
        FileKind::PermissionProvider => Ok(merge_permission_provider(existing, new_content)),
        FileKind::DbContext | FileKind::IDbContext => Ok(merge_db_context(existing, new_content)),
        other => anyhow::bail!(
            "unsupported file kind for pattern merging: {}",
            other.display_name()
        ),
    }
}

/// Merge nested permission constant classes
fn merge_permissions(existing: &str, new_content: &str) -> (String, Vec<Conflict>) {
    let mut conflicts = Vec::new();
    let mut to_add = Vec::new();

    for class_match in STATIC_CLASS_RE.find_iter(new_content) {
        let class_code = class_match.as_str();
        let Some(name) = static_class_name(class_code) else {
            continue;
        };
        match existing_static_class(existing, &name) {
            Some(existing_code) => {
                if normalize_ws(&existing_code) != normalize_ws(class_code) {
                    conflicts.push(Conflict {
                        kind: ConflictKind::DuplicateClass,
                        description: format!("Class '{name}' already exists"),
                        existing_code,
                        new_code: class_code.to_string(),
                        line: find_line(existing, &format!("class {name}")),
                        identifier: name,
                    });
                }
            }
            None => to_add.push(class_code.to_string()),
        }
    }

    if conflicts.is_empty() && !to_add.is_empty() {
        let merged = insert_before_last_closing_brace(existing, &to_add.join("\n\n"));
        return (merged, conflicts);
    }
    (existing.to_string(), conflicts)
}

/// Merge `AddPermission` statements into the provider's Define method
fn merge_permission_provider(existing: &str, new_content: &str) -> (String, Vec<Conflict>) {
    let mut to_add = Vec::new();
    for statement in ADD_PERMISSION_RE.find_iter(new_content) {
        let stmt = statement.as_str();
        // The statement text is its own identity; a byte-equal statement
        // already present is simply idempotent, never a conflict.
        if !existing.contains(stmt) {
            to_add.push(format!("            {stmt}"));
        }
    }

    if to_add.is_empty() {
        return (existing.to_string(), Vec::new());
    }
    let insertion = to_add.join("\n");
    if let Some(caps) = DEFINE_METHOD_RE.captures(existing) {
        let replaced = format!(
            "{}{}\n{}{}",
            &caps[1], &caps[2], insertion, &caps[3]
        );
        let merged = existing.replacen(&caps[0], &replaced, 1);
        return (merged, Vec::new());
    }
    // No Define method found; the file is not shaped like a provider.
    (
        existing.to_string(),
        vec![Conflict {
            kind: ConflictKind::Structural,
            description: "Define method not found in permission provider".to_string(),
            existing_code: String::new(),
            new_code: insertion,
            line: None,
            identifier: "Define".to_string(),
        }],
    )
}

/// Merge `DbSet` properties and model configuration lines
fn merge_db_context(existing: &str, new_content: &str) -> (String, Vec<Conflict>) {
    let mut conflicts = Vec::new();
    let mut db_sets = Vec::new();

    for caps in DB_SET_RE.captures_iter(new_content) {
        let declaration = caps.get(0).unwrap().as_str();
        let property_name = caps[2].to_string();
        match existing_db_set(existing, &property_name) {
            Some(existing_code) => {
                if normalize_ws(&existing_code) != normalize_ws(declaration) {
                    conflicts.push(Conflict {
                        kind: ConflictKind::DuplicateProperty,
                        description: format!("DbSet property '{property_name}' already exists"),
                        existing_code,
                        new_code: declaration.to_string(),
                        line: find_line(existing, &format!("{property_name} {{")),
                        identifier: property_name,
                    });
                }
            }
            None => db_sets.push(format!("    {declaration}")),
        }
    }

    let mut config_lines = Vec::new();
    for config in ENTITY_CONFIG_RE.find_iter(new_content) {
        let line = config.as_str();
        if !existing.contains(line) {
            config_lines.push(format!("            {line}"));
        }
    }

    if conflicts.is_empty() && (!db_sets.is_empty() || !config_lines.is_empty()) {
        let merged = insert_db_sets(existing, &db_sets, &config_lines);
        return (merged, conflicts);
    }
    (existing.to_string(), conflicts)
}

fn static_class_name(class_code: &str) -> Option<String> {
    STATIC_CLASS_NAME_RE
        .captures(class_code)
        .map(|caps| caps[1].to_string())
}

fn existing_static_class(content: &str, name: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r"(?s)public\s+static\s+class\s+{}\s*\{{[^}}]*\}}",
        regex::escape(name)
    ))
    .ok()?;
    pattern.find(content).map(|m| m.as_str().to_string())
}

fn existing_db_set(content: &str, property_name: &str) -> Option<String> {
    let pattern = Regex::new(&format!(
        r"(?:public\s+(?:virtual\s+)?)?DbSet<\w+>\s+{}\s*\{{\s*get;(?:\s*set;)?\s*\}}",
        regex::escape(property_name)
    ))
    .ok()?;
    pattern.find(content).map(|m| m.as_str().to_string())
}

fn find_line(content: &str, needle: &str) -> Option<usize> {
    content
        .lines()
        .position(|line| line.contains(needle))
        .map(|i| i + 1)
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Insert before the final closing brace (the namespace close)
fn insert_before_last_closing_brace(content: &str, to_insert: &str) -> String {
    let lines: Vec<&str> = content.lines().collect();
    let insert_index = lines.iter().rposition(|line| line.trim() == "}");
    match insert_index {
        Some(index) => {
            let mut out: Vec<String> = lines[..index].iter().map(|s| s.to_string()).collect();
            out.push(String::new());
            out.push(to_insert.to_string());
            out.extend(lines[index..].iter().map(|s| s.to_string()));
            join_preserving_trailing_newline(content, out)
        }
        None => format!("{content}\n{to_insert}"),
    }
}

/// Insert DbSets after the last existing DbSet, or before the constructor /
/// OnModelCreating when none exist; configuration lines go into
/// OnModelCreating when present.
fn insert_db_sets(content: &str, db_sets: &[String], config_lines: &[String]) -> String {
    let mut lines: Vec<String> = content.lines().map(str::to_string).collect();

    if !db_sets.is_empty() {
        let mut insert_index = lines
            .iter()
            .rposition(|line| line.contains("DbSet<") && line.contains("{ get;"))
            .map(|i| i + 1);
        if insert_index.is_none() {
            insert_index = lines.iter().position(|line| {
                line.contains("protected override void OnModelCreating")
                    || (line.trim_start().starts_with("public ") && line.contains("DbContext("))
            });
        }
        if let Some(index) = insert_index {
            for (offset, decl) in db_sets.iter().enumerate() {
                lines.insert(index + offset, decl.clone());
            }
        }
    }

    if !config_lines.is_empty() {
        if let Some(index) = lines
            .iter()
            .position(|line| line.contains("protected override void OnModelCreating"))
        {
            // Find the opening brace line of the method body
            let mut brace_index = None;
            for (i, line) in lines.iter().enumerate().skip(index) {
                if line.contains('{') {
                    brace_index = Some(i + 1);
                    break;
                }
            }
            if let Some(at) = brace_index {
                for (offset, line) in config_lines.iter().enumerate() {
                    lines.insert(at + offset, line.clone());
                }
            }
        }
    }

    join_preserving_trailing_newline(content, lines)
}

fn join_preserving_trailing_newline(original: &str, lines: Vec<String>) -> String {
    let mut joined = lines.join("\n");
    if original.ends_with('\n') && !joined.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXISTING_PERMISSIONS: &str = r#"namespace Acme.Catalog.Permissions
{
    public static class CatalogPermissions
    {
        public const string GroupName = "Catalog";
    }

    public static class ProductManagement
    {
        public const string Default = "Catalog.Product";
        public const string Create = "Catalog.Product.Create";
    }
}
"#;

    #[test]
    fn test_permissions_additive_merge() {
        let new_content = r#"namespace Acme.Catalog.Permissions
{
    public static class OrderManagement
    {
        public const string Default = "Catalog.Order";
    }
}
"#;
        let (merged, conflicts) =
            merge(EXISTING_PERMISSIONS, new_content, FileKind::Permissions).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("class ProductManagement"));
        assert!(merged.contains("class OrderManagement"));
        // New class goes before the namespace close
        let order_pos = merged.find("class OrderManagement").unwrap();
        let last_brace = merged.rfind('}').unwrap();
        assert!(order_pos < last_brace);
    }

    #[test]
    fn test_permissions_identical_class_is_idempotent() {
        let (merged, conflicts) =
            merge(EXISTING_PERMISSIONS, EXISTING_PERMISSIONS, FileKind::Permissions).unwrap();
        assert!(conflicts.is_empty());
        assert_eq!(merged, EXISTING_PERMISSIONS);
    }

    #[test]
    fn test_permissions_divergent_class_conflicts() {
        let new_content = r#"namespace Acme.Catalog.Permissions
{
    public static class ProductManagement
    {
        public const string Default = "Catalog.Product";
        public const string Delete = "Catalog.Product.Delete";
    }
}
"#;
        let (merged, conflicts) =
            merge(EXISTING_PERMISSIONS, new_content, FileKind::Permissions).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::DuplicateClass);
        assert_eq!(conflicts[0].identifier, "ProductManagement");
        assert!(conflicts[0].line.is_some());
        // Existing returned unchanged when conflicted
        assert_eq!(merged, EXISTING_PERMISSIONS);
    }

    const EXISTING_PROVIDER: &str = r#"namespace Acme.Catalog.Permissions
{
    public class CatalogPermissionDefinitionProvider : PermissionDefinitionProvider
    {
        public override void Define(IPermissionDefinitionContext context)
        {
            var catalogGroup = context.AddGroup(CatalogPermissions.GroupName);
            catalogGroup.AddPermission(ProductManagement.Default, L("Permission:Product"));
        }
    }
}
"#;

    #[test]
    fn test_provider_appends_new_statements() {
        let new_content = r#"
            catalogGroup.AddPermission(OrderManagement.Default, L("Permission:Order"));
"#;
        let (merged, conflicts) =
            merge(EXISTING_PROVIDER, new_content, FileKind::PermissionProvider).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("OrderManagement.Default"));
        assert!(merged.contains("ProductManagement.Default"));
        // Inserted inside the Define method body
        let define_pos = merged.find("void Define").unwrap();
        let insert_pos = merged.find("OrderManagement.Default").unwrap();
        assert!(insert_pos > define_pos);
    }

    #[test]
    fn test_provider_existing_statement_is_idempotent() {
        let new_content =
            "catalogGroup.AddPermission(ProductManagement.Default, L(\"Permission:Product\"));";
        let (merged, conflicts) =
            merge(EXISTING_PROVIDER, new_content, FileKind::PermissionProvider).unwrap();
        assert!(conflicts.is_empty());
        assert_eq!(merged, EXISTING_PROVIDER);
    }

    const EXISTING_DBCONTEXT: &str = r#"namespace Acme.Catalog.EntityFrameworkCore
{
    public class CatalogDbContext : AbpDbContext<CatalogDbContext>
    {
        public virtual DbSet<Product> Products { get; set; }

        public CatalogDbContext(DbContextOptions<CatalogDbContext> options)
            : base(options)
        {
        }

        protected override void OnModelCreating(ModelBuilder builder)
        {
            base.OnModelCreating(builder);
            builder.ApplyConfiguration(new ProductConfiguration());
        }
    }
}
"#;

    #[test]
    fn test_dbcontext_adds_dbset_and_configuration() {
        let new_content = r#"
    public virtual DbSet<Order> Orders { get; set; }

            builder.ApplyConfiguration(new OrderConfiguration());
"#;
        let (merged, conflicts) =
            merge(EXISTING_DBCONTEXT, new_content, FileKind::DbContext).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("DbSet<Order> Orders"));
        assert!(merged.contains("new OrderConfiguration()"));
        // DbSet inserted right after the existing one
        let products = merged.find("DbSet<Product>").unwrap();
        let orders = merged.find("DbSet<Order>").unwrap();
        let ctor = merged.find("public CatalogDbContext(").unwrap();
        assert!(products < orders && orders < ctor);
    }

    #[test]
    fn test_dbcontext_identical_dbset_is_idempotent() {
        let (merged, conflicts) =
            merge(EXISTING_DBCONTEXT, EXISTING_DBCONTEXT, FileKind::DbContext).unwrap();
        assert!(conflicts.is_empty());
        assert_eq!(merged, EXISTING_DBCONTEXT);
    }

    #[test]
    fn test_dbcontext_divergent_dbset_conflicts() {
        let new_content = "public virtual DbSet<ProductV2> Products { get; set; }";
        let (_, conflicts) = merge(EXISTING_DBCONTEXT, new_content, FileKind::DbContext).unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::DuplicateProperty);
        assert_eq!(conflicts[0].identifier, "Products");
    }

    #[test]
    fn test_idbcontext_interface_dbset() {
        let existing = r#"namespace Acme.Catalog.EntityFrameworkCore
{
    public interface ICatalogDbContext
    {
        DbSet<Product> Products { get; }
    }
}
"#;
        let new_content = "DbSet<Order> Orders { get; }";
        let (merged, conflicts) = merge(existing, new_content, FileKind::IDbContext).unwrap();
        assert!(conflicts.is_empty());
        assert!(merged.contains("DbSet<Order> Orders { get; }"));
    }

    #[test]
    fn test_unsupported_kind_errors() {
        assert!(merge("a", "b", FileKind::Entity).is_err());
    }
}
