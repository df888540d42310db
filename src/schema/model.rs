use serde::{Deserialize, Serialize};

/// The complete generation schema
///
/// Loaded from a JSON or YAML document, normalized by
/// [`Schema::validate`](crate::schema::Schema::validate) and then treated as
/// read-only for the rest of the run.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Schema {
    pub solution: Solution,
    #[serde(default)]
    pub entities: Vec<Entity>,
    #[serde(default)]
    pub options: Options,
}

/// Solution-level configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Solution {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub namespace_root: String,
    #[serde(default, rename = "abpVersion")]
    pub abp_version: String,
    /// Target framework tag; `Auto` defers to solution detection
    #[serde(default)]
    pub target_framework: TargetFramework,
    #[serde(default)]
    pub primary_key_type: Option<PrimaryKeyType>,
    #[serde(default)]
    pub db_provider: Option<DbProvider>,
    #[serde(default)]
    pub generate_controllers: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multi_tenancy: Option<MultiTenancy>,
    /// Optional prefix/suffix applied to the module folder name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_folder_prefix: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub module_folder_suffix: Option<String>,
}

impl Solution {
    /// The folder name used for module-scoped subdirectories
    ///
    /// Defaults to `{ModuleName}Module`; the suffix is configurable so
    /// solutions that already use bare module folders can opt out.
    pub fn module_folder_name(&self) -> String {
        let prefix = self.module_folder_prefix.as_deref().unwrap_or("");
        let suffix = self.module_folder_suffix.as_deref().unwrap_or("Module");
        format!("{prefix}{}{suffix}", self.module_name)
    }

    /// Module name with the namespace suffix used in generated namespaces
    pub fn module_namespace(&self) -> String {
        format!("{}Module", self.module_name)
    }
}

/// Primary key type for generated entities
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimaryKeyType {
    Guid,
    #[serde(rename = "long")]
    Long,
    #[serde(rename = "configurable")]
    Configurable,
}

impl PrimaryKeyType {
    /// The C# key type spelled into templates
    pub fn cs_name(&self) -> &'static str {
        match self {
            PrimaryKeyType::Guid => "Guid",
            PrimaryKeyType::Long => "long",
            // Configurable keys fall back to Guid in rendered code; the
            // surrounding project defines the TKey alias.
            PrimaryKeyType::Configurable => "Guid",
        }
    }
}

/// Storage provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DbProvider {
    #[serde(rename = "efcore")]
    EfCore,
    #[serde(rename = "mongodb")]
    MongoDb,
    #[serde(rename = "both")]
    Both,
}

impl DbProvider {
    pub fn includes_efcore(&self) -> bool {
        matches!(self, DbProvider::EfCore | DbProvider::Both)
    }

    pub fn includes_mongodb(&self) -> bool {
        matches!(self, DbProvider::MongoDb | DbProvider::Both)
    }
}

/// Closed set of supported target frameworks
///
/// `Auto` is resolved against the detected solution before rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TargetFramework {
    #[default]
    #[serde(rename = "auto")]
    Auto,
    #[serde(rename = "aspnetcore9")]
    AspNetCore9,
    #[serde(rename = "aspnetcore10")]
    AspNetCore10,
    #[serde(rename = "abp8-monolith")]
    Abp8Monolith,
    #[serde(rename = "abp8-microservice")]
    Abp8Microservice,
    #[serde(rename = "abp9-monolith")]
    Abp9Monolith,
    #[serde(rename = "abp9-microservice")]
    Abp9Microservice,
    #[serde(rename = "abp10-monolith")]
    Abp10Monolith,
    #[serde(rename = "abp10-microservice")]
    Abp10Microservice,
}

impl TargetFramework {
    /// Tag string used for template lookup directories
    pub fn as_tag(&self) -> &'static str {
        match self {
            TargetFramework::Auto => "auto",
            TargetFramework::AspNetCore9 => "aspnetcore9",
            TargetFramework::AspNetCore10 => "aspnetcore10",
            TargetFramework::Abp8Monolith => "abp8-monolith",
            TargetFramework::Abp8Microservice => "abp8-microservice",
            TargetFramework::Abp9Monolith => "abp9-monolith",
            TargetFramework::Abp9Microservice => "abp9-microservice",
            TargetFramework::Abp10Monolith => "abp10-monolith",
            TargetFramework::Abp10Microservice => "abp10-microservice",
        }
    }

    /// Parse a tag string, accepting the same spellings the CLI does
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "auto" | "" => Some(TargetFramework::Auto),
            "aspnetcore9" => Some(TargetFramework::AspNetCore9),
            "aspnetcore10" => Some(TargetFramework::AspNetCore10),
            "abp8-monolith" => Some(TargetFramework::Abp8Monolith),
            "abp8-microservice" => Some(TargetFramework::Abp8Microservice),
            "abp9-monolith" => Some(TargetFramework::Abp9Monolith),
            "abp9-microservice" => Some(TargetFramework::Abp9Microservice),
            "abp10-monolith" => Some(TargetFramework::Abp10Monolith),
            "abp10-microservice" => Some(TargetFramework::Abp10Microservice),
            _ => None,
        }
    }
}

/// Multi-tenancy configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiTenancy {
    pub enabled: bool,
    /// "host", "tenant-per-db" or "none"
    #[serde(default)]
    pub strategy: String,
    #[serde(default)]
    pub enable_data_isolation: bool,
    #[serde(default)]
    pub tenant_id_property: String,
}

/// Entity kind controlling base class and generated surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntityKind {
    Entity,
    AggregateRoot,
    AuditedAggregateRoot,
    FullAuditedAggregateRoot,
    ValueObject,
}

impl EntityKind {
    pub fn is_aggregate_root(&self) -> bool {
        matches!(
            self,
            EntityKind::AggregateRoot
                | EntityKind::AuditedAggregateRoot
                | EntityKind::FullAuditedAggregateRoot
        )
    }

    /// Whether this kind emits distributed event types
    pub fn has_events(&self) -> bool {
        self.is_aggregate_root()
    }

    pub fn cs_base_class(&self) -> &'static str {
        match self {
            EntityKind::Entity => "Entity",
            EntityKind::AggregateRoot => "AggregateRoot",
            EntityKind::AuditedAggregateRoot => "AuditedAggregateRoot",
            EntityKind::FullAuditedAggregateRoot => "FullAuditedAggregateRoot",
            EntityKind::ValueObject => "ValueObject",
        }
    }
}

/// A domain entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub table_name: String,
    #[serde(default, rename = "entityType")]
    pub entity_type: Option<EntityKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primary_key_type: Option<PrimaryKeyType>,
    #[serde(default)]
    pub properties: Vec<Property>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<Relations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_repository: Option<CustomRepository>,
    #[serde(default)]
    pub domain_events: Vec<DomainEvent>,
    #[serde(default)]
    pub enums: Vec<EnumDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_object: Option<ValueObjectConfig>,
}

impl Entity {
    /// Resolved entity kind after validation defaulting
    pub fn kind(&self) -> EntityKind {
        self.entity_type.unwrap_or(EntityKind::FullAuditedAggregateRoot)
    }

    /// Effective primary key type, falling back to the solution default
    pub fn effective_primary_key(&self, solution_default: PrimaryKeyType) -> PrimaryKeyType {
        self.primary_key_type.unwrap_or(solution_default)
    }

    pub fn non_foreign_key_properties(&self) -> Vec<&Property> {
        self.properties.iter().filter(|p| !p.is_foreign_key).collect()
    }

    pub fn foreign_key_properties(&self) -> Vec<&Property> {
        self.properties.iter().filter(|p| p.is_foreign_key).collect()
    }

    pub fn has_relations(&self) -> bool {
        self.relations.as_ref().is_some_and(|r| {
            !r.one_to_one.is_empty()
                || !r.one_to_many.is_empty()
                || !r.many_to_one.is_empty()
                || !r.many_to_many.is_empty()
        })
    }
}

/// An entity property
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Property {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub is_foreign_key: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_entity: Option<String>,
    #[serde(default)]
    pub is_enum: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_name: Option<String>,
    #[serde(default)]
    pub is_value_object: bool,
    #[serde(default)]
    pub validation_rules: Vec<String>,
}

/// Entity relationships, grouped by cardinality
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Relations {
    #[serde(default)]
    pub one_to_one: Vec<OneToOneRelation>,
    #[serde(default)]
    pub one_to_many: Vec<OneToManyRelation>,
    #[serde(default)]
    pub many_to_one: Vec<ManyToOneRelation>,
    #[serde(default)]
    pub many_to_many: Vec<ManyToManyRelation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OneToOneRelation {
    pub target_entity: String,
    #[serde(default)]
    pub navigation_property: String,
    #[serde(default)]
    pub foreign_key_name: String,
    #[serde(default)]
    pub owned: bool,
    #[serde(default)]
    pub cascade_delete: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct OneToManyRelation {
    pub target_entity: String,
    #[serde(default)]
    pub navigation_property: String,
    #[serde(default)]
    pub foreign_key_name: String,
    #[serde(default)]
    pub cascade_delete: bool,
    #[serde(default)]
    pub self_reference: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManyToOneRelation {
    pub target_entity: String,
    #[serde(default)]
    pub navigation_property: String,
    #[serde(default)]
    pub foreign_key_name: String,
    #[serde(default)]
    pub inverse_property: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ManyToManyRelation {
    pub target_entity: String,
    #[serde(default)]
    pub join_entity: String,
    #[serde(default)]
    pub navigation_property: String,
}

/// Custom repository definition beyond the generated CRUD surface
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct CustomRepository {
    #[serde(default)]
    pub methods: Vec<RepositoryMethod>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryMethod {
    pub name: String,
    #[serde(default)]
    pub return_type: String,
    #[serde(default)]
    pub parameters: Vec<MethodParameter>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct MethodParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
}

/// A domain event raised by the entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DomainEvent {
    pub name: String,
    #[serde(default)]
    pub properties: Vec<Property>,
}

/// An enum definition owned by the entity
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnumDef {
    pub name: String,
    #[serde(default)]
    pub values: Vec<EnumValue>,
    #[serde(default)]
    pub use_localization: bool,
    #[serde(default)]
    pub generate_extensions: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EnumValue {
    pub name: String,
    #[serde(default)]
    pub value: Option<i64>,
    #[serde(default)]
    pub localization_key: String,
}

/// Value object configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ValueObjectConfig {
    #[serde(default)]
    pub generate_factory: bool,
    #[serde(default)]
    pub immutable: bool,
}

/// Generation options
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default)]
    pub use_audited_aggregate_root: bool,
    #[serde(default)]
    pub use_soft_delete: bool,
    #[serde(default)]
    pub use_concurrency_stamp: bool,
    #[serde(default)]
    pub use_extra_properties: bool,
    #[serde(default)]
    pub use_localization: bool,
    #[serde(default)]
    pub localization_cultures: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub localization_merge: Option<LocalizationMerge>,
    #[serde(default)]
    pub validation_type: String,
    #[serde(default)]
    pub generate_event_handlers: bool,
    #[serde(default)]
    pub generate_integration_tests: bool,
}

/// Localization merge behavior for shared culture catalogs
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct LocalizationMerge {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default)]
    pub target_path: String,
    /// "overwrite", "append" or "skip"; defaults to "append"
    #[serde(default)]
    pub conflict_strategy: String,
}
