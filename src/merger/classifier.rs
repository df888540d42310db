use std::path::Path;

/// Classification label attached to an existing file to select a strategy
///
/// Closed enumeration on purpose: the kinds are finite and changes must be
/// auditable alongside the strategy table below.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Permissions,
    PermissionProvider,
    DbContext,
    IDbContext,
    Entity,
    Dto,
    Service,
    Manager,
    Controller,
    Validator,
    Repository,
    Constants,
    LocalizationJson,
    MapperProfile,
    EventHandler,
    Unknown,
}

impl FileKind {
    /// Human-readable name used in prompts and diagnostics
    pub fn display_name(&self) -> &'static str {
        match self {
            FileKind::Permissions => "Permissions",
            FileKind::PermissionProvider => "Permission Provider",
            FileKind::DbContext => "DbContext",
            FileKind::IDbContext => "IDbContext",
            FileKind::Entity => "Entity",
            FileKind::Dto => "DTO",
            FileKind::Service => "Service",
            FileKind::Manager => "Manager",
            FileKind::Controller => "Controller",
            FileKind::Validator => "Validator",
            FileKind::Repository => "Repository",
            FileKind::Constants => "Constants",
            FileKind::LocalizationJson => "Localization JSON",
            FileKind::MapperProfile => "AutoMapper Profile",
            FileKind::EventHandler => "Event Handler",
            FileKind::Unknown => "Unknown",
        }
    }
}

/// Merge strategy derived from a file kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeStrategy {
    /// Additive regex-extracted blocks (registries, providers, contexts)
    Pattern,
    /// Shallow declaration-level merge of a class file
    Structural,
    /// Recursive key-tree merge
    StructuredData,
    /// File kind does not support merging
    None,
}

/// Classify a file by name and path segment
///
/// Classification never reads contents. Rules run in order; the first match
/// wins, so `*PermissionDefinitionProvider.cs` must be excluded from the
/// `*Permissions.cs` rule by the Provider probe.
pub fn classify_file(path: &Path) -> FileKind {
    let filename = path
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let extension = path.extension().and_then(|s| s.to_str()).unwrap_or_default();

    if extension == "json" {
        return FileKind::LocalizationJson;
    }
    if extension != "cs" {
        return FileKind::Unknown;
    }

    if filename.ends_with("Permissions.cs") && !filename.contains("Provider") {
        return FileKind::Permissions;
    }
    if filename.contains("PermissionDefinitionProvider") {
        return FileKind::PermissionProvider;
    }
    if filename.ends_with("DbContext.cs") && !filename.starts_with('I') {
        return FileKind::DbContext;
    }
    if filename.starts_with('I') && filename.ends_with("DbContext.cs") {
        return FileKind::IDbContext;
    }
    if filename.contains("Dto.cs") {
        return FileKind::Dto;
    }
    if filename.ends_with("AppService.cs") {
        return FileKind::Service;
    }
    if filename.ends_with("Manager.cs") {
        return FileKind::Manager;
    }
    if filename.ends_with("Controller.cs") {
        return FileKind::Controller;
    }
    if filename.ends_with("Validator.cs") {
        return FileKind::Validator;
    }
    if filename.contains("Repository.cs") {
        return FileKind::Repository;
    }
    if filename.ends_with("Constants.cs") {
        return FileKind::Constants;
    }
    if filename.ends_with("Profile.cs") {
        return FileKind::MapperProfile;
    }
    if filename.ends_with("EventHandler.cs") {
        return FileKind::EventHandler;
    }
    if path
        .components()
        .any(|c| c.as_os_str().to_str() == Some("Entities"))
    {
        return FileKind::Entity;
    }

    FileKind::Unknown
}

/// Pure strategy lookup
pub fn strategy_of(kind: FileKind) -> MergeStrategy {
    match kind {
        FileKind::Permissions
        | FileKind::PermissionProvider
        | FileKind::DbContext
        | FileKind::IDbContext => MergeStrategy::Pattern,
        FileKind::Entity
        | FileKind::Dto
        | FileKind::Service
        | FileKind::Manager
        | FileKind::Controller
        | FileKind::Validator
        | FileKind::Repository => MergeStrategy::Structural,
        FileKind::LocalizationJson => MergeStrategy::StructuredData,
        FileKind::Constants | FileKind::MapperProfile | FileKind::EventHandler | FileKind::Unknown => {
            MergeStrategy::None
        }
    }
}

/// Whether this kind flows through a merge strategy at all
pub fn is_mergeable(kind: FileKind) -> bool {
    strategy_of(kind) != MergeStrategy::None
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_classify_by_filename() {
        let cases: &[(&str, FileKind)] = &[
            ("CatalogPermissions.cs", FileKind::Permissions),
            (
                "CatalogPermissionDefinitionProvider.cs",
                FileKind::PermissionProvider,
            ),
            ("CatalogDbContext.cs", FileKind::DbContext),
            ("ICatalogDbContext.cs", FileKind::IDbContext),
            ("ProductDto.cs", FileKind::Dto),
            ("CreateProductDto.cs", FileKind::Dto),
            ("ProductAppService.cs", FileKind::Service),
            ("ProductManager.cs", FileKind::Manager),
            ("ProductController.cs", FileKind::Controller),
            ("CreateProductDtoValidator.cs", FileKind::Validator),
            ("IProductRepository.cs", FileKind::Repository),
            ("EfCoreProductRepository.cs", FileKind::Repository),
            ("ProductConstants.cs", FileKind::Constants),
            ("CatalogApplicationAutoMapperProfile.cs", FileKind::MapperProfile),
            ("ProductEventHandler.cs", FileKind::EventHandler),
            ("en.json", FileKind::LocalizationJson),
            ("Program.fs", FileKind::Unknown),
        ];
        for (name, expected) in cases {
            assert_eq!(classify_file(Path::new(name)), *expected, "{name}");
        }
    }

    #[test]
    fn test_classify_entity_by_path_segment() {
        let path = PathBuf::from("/s/src/Acme.Domain/Entities/Product.cs");
        assert_eq!(classify_file(&path), FileKind::Entity);
        let outside = PathBuf::from("/s/src/Acme.Domain/Product.cs");
        assert_eq!(classify_file(&outside), FileKind::Unknown);
    }

    #[test]
    fn test_provider_not_swallowed_by_permissions_rule() {
        // "…PermissionDefinitionProviderPermissions.cs" style names are not a
        // thing, but the real provider name also ends differently; what
        // matters is order: the Provider probe guards the Permissions rule.
        assert_eq!(
            classify_file(Path::new("XPermissionDefinitionProvider.cs")),
            FileKind::PermissionProvider
        );
    }

    #[test]
    fn test_strategy_lookup() {
        assert_eq!(strategy_of(FileKind::Permissions), MergeStrategy::Pattern);
        assert_eq!(strategy_of(FileKind::DbContext), MergeStrategy::Pattern);
        assert_eq!(strategy_of(FileKind::Entity), MergeStrategy::Structural);
        assert_eq!(strategy_of(FileKind::Dto), MergeStrategy::Structural);
        assert_eq!(
            strategy_of(FileKind::LocalizationJson),
            MergeStrategy::StructuredData
        );
        assert_eq!(strategy_of(FileKind::Constants), MergeStrategy::None);
        assert_eq!(strategy_of(FileKind::Unknown), MergeStrategy::None);
    }

    #[test]
    fn test_mergeable() {
        assert!(is_mergeable(FileKind::Entity));
        assert!(is_mergeable(FileKind::LocalizationJson));
        assert!(!is_mergeable(FileKind::MapperProfile));
        assert!(!is_mergeable(FileKind::Unknown));
    }
}
