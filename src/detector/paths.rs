use super::{ProjectRole, SolutionInfo};
use crate::error::GenError;
use std::path::{Path, PathBuf};

/// Absolute directory paths for every layer the renderers write into
///
/// Optional layers that were not found in the solution carry `None`; the
/// generators check for presence before emitting into them. Every artifact
/// path is a deterministic function of these directories, the module name
/// and the entity name.
#[derive(Debug, Clone, Default)]
pub struct LayerPaths {
    pub domain: Option<PathBuf>,
    pub domain_shared: Option<PathBuf>,
    pub application_contracts: Option<PathBuf>,
    pub application: Option<PathBuf>,
    pub http_api: Option<PathBuf>,
    pub entity_framework_core: Option<PathBuf>,
    pub mongodb: Option<PathBuf>,

    pub domain_entities: Option<PathBuf>,
    pub domain_repositories: Option<PathBuf>,
    pub domain_managers: Option<PathBuf>,
    pub domain_data: Option<PathBuf>,
    pub domain_shared_constants: Option<PathBuf>,
    pub domain_shared_events: Option<PathBuf>,
    pub domain_shared_enums: Option<PathBuf>,
    pub domain_shared_localization: Option<PathBuf>,
    pub contracts_permissions: Option<PathBuf>,
    pub contracts_dtos: Option<PathBuf>,
    pub contracts_services: Option<PathBuf>,
    pub application_services: Option<PathBuf>,
    pub application_auto_mapper: Option<PathBuf>,
    pub application_validators: Option<PathBuf>,
    pub application_event_handlers: Option<PathBuf>,
    pub http_api_controllers: Option<PathBuf>,
    pub efcore_configurations: Option<PathBuf>,
    pub efcore_repositories: Option<PathBuf>,
    pub mongodb_repositories: Option<PathBuf>,
}

/// Derive layer paths from the classified solution
///
/// The Domain layer is required; its absence is fatal and the error lists
/// every classified and unclassified project together with the expected
/// naming patterns. All other layers are tolerated as missing.
pub fn derive_layer_paths(
    info: &SolutionInfo,
    module_name: &str,
) -> Result<LayerPaths, GenError> {
    let mut paths = LayerPaths::default();

    if let Some(dir) = info.project_directory(ProjectRole::Domain) {
        paths.domain = Some(dir.to_path_buf());
        paths.domain_entities = Some(dir.join("Entities"));
        paths.domain_repositories = Some(dir.join("Repositories"));
        paths.domain_managers = Some(dir.join("Managers"));
        paths.domain_data = Some(dir.join("Data"));
    }
    if let Some(dir) = info.project_directory(ProjectRole::DomainShared) {
        paths.domain_shared = Some(dir.to_path_buf());
        paths.domain_shared_constants = Some(dir.join("Constants"));
        paths.domain_shared_events = Some(dir.join("Events"));
        paths.domain_shared_enums = Some(dir.join("Enums"));
        paths.domain_shared_localization = Some(dir.join("Localization").join(module_name));
    }
    if let Some(dir) = info.project_directory(ProjectRole::ApplicationContracts) {
        paths.application_contracts = Some(dir.to_path_buf());
        paths.contracts_permissions = Some(dir.join("Permissions"));
        // DTOs are organized per entity directly under the contracts root
        paths.contracts_dtos = Some(dir.to_path_buf());
        paths.contracts_services = Some(dir.join("Services"));
    }
    if let Some(dir) = info.project_directory(ProjectRole::Application) {
        paths.application = Some(dir.to_path_buf());
        paths.application_services = Some(dir.join("Services"));
        paths.application_auto_mapper = Some(dir.join("AutoMapper"));
        paths.application_validators = Some(dir.join("Validators"));
        paths.application_event_handlers = Some(dir.join("EventHandlers"));
    }
    if let Some(dir) = info.project_directory(ProjectRole::HttpApi) {
        paths.http_api = Some(dir.to_path_buf());
        paths.http_api_controllers = Some(dir.join("Controllers"));
    }
    if let Some(dir) = info.project_directory(ProjectRole::EntityFrameworkCore) {
        paths.entity_framework_core = Some(dir.to_path_buf());
        paths.efcore_configurations =
            Some(dir.join("EntityFrameworkCore").join("Configurations"));
        paths.efcore_repositories = Some(dir.join("EntityFrameworkCore").join("Repositories"));
    }
    if let Some(dir) = info.project_directory(ProjectRole::MongoDb) {
        paths.mongodb = Some(dir.to_path_buf());
        paths.mongodb_repositories = Some(dir.join("MongoDB").join("Repositories"));
    }

    if paths.domain.is_none() {
        let mut detected = Vec::new();
        let mut unknown = Vec::new();
        for project in &info.projects {
            if project.role == ProjectRole::Unknown {
                unknown.push(project.name.clone());
            } else {
                detected.push(format!("{} ({})", project.name, project.role));
            }
        }
        return Err(GenError::LayerMissing { detected, unknown });
    }

    Ok(paths)
}

impl LayerPaths {
    fn all_dirs(&self) -> Vec<&PathBuf> {
        [
            &self.domain_entities,
            &self.domain_repositories,
            &self.domain_managers,
            &self.domain_data,
            &self.domain_shared_constants,
            &self.domain_shared_events,
            &self.domain_shared_enums,
            &self.domain_shared_localization,
            &self.contracts_permissions,
            &self.contracts_services,
            &self.application_services,
            &self.application_auto_mapper,
            &self.application_validators,
            &self.application_event_handlers,
            &self.http_api_controllers,
            &self.efcore_configurations,
            &self.efcore_repositories,
            &self.mongodb_repositories,
        ]
        .into_iter()
        .flatten()
        .collect()
    }

    /// Create every detected layer subdirectory
    pub fn ensure_directories(&self) -> std::io::Result<()> {
        for dir in self.all_dirs() {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    /// Create the module-scoped subdirectories inside each layer
    pub fn ensure_module_directories(&self, module_folder: &str) -> std::io::Result<()> {
        for dir in self.all_dirs() {
            std::fs::create_dir_all(dir.join(module_folder))?;
        }
        Ok(())
    }

    /// DTO directory for an entity under the contracts layer
    pub fn entity_dto_dir(&self, module_name: &str, entity_name: &str) -> Option<PathBuf> {
        self.contracts_dtos
            .as_ref()
            .map(|dir| dir.join(module_name).join(entity_name))
    }

    pub fn db_context_path(&self, service_name: &str) -> Option<PathBuf> {
        self.entity_framework_core.as_ref().map(|dir| {
            dir.join("EntityFrameworkCore")
                .join(format!("{service_name}DbContext.cs"))
        })
    }

    pub fn idb_context_path(&self, service_name: &str) -> Option<PathBuf> {
        self.entity_framework_core.as_ref().map(|dir| {
            dir.join("EntityFrameworkCore")
                .join(format!("I{service_name}DbContext.cs"))
        })
    }

    pub fn permissions_file_path(
        &self,
        module_folder: &str,
        module_name: &str,
    ) -> Option<PathBuf> {
        self.contracts_permissions
            .as_ref()
            .map(|dir| dir.join(module_folder).join(format!("{module_name}Permissions.cs")))
    }

    pub fn permission_provider_path(
        &self,
        module_folder: &str,
        module_name: &str,
    ) -> Option<PathBuf> {
        self.contracts_permissions.as_ref().map(|dir| {
            dir.join(module_folder)
                .join(format!("{module_name}PermissionDefinitionProvider.cs"))
        })
    }

    /// Localization directory, honoring an explicit override path
    pub fn localization_dir(&self, override_path: &str) -> Option<PathBuf> {
        if !override_path.is_empty() {
            return Some(Path::new(override_path).to_path_buf());
        }
        self.domain_shared_localization.clone()
    }
}
