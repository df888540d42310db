//! Solution topology detection.
//!
//! Locates the solution descriptor, classifies its projects into ABP layer
//! roles, derives the per-layer filesystem paths the renderers target, and
//! sniffs framework/version/tenancy signals from project descriptors.

mod config;
mod csproj;
mod paths;
mod solution;

pub use config::{detect_multi_tenancy, summarize_configuration, TenancyDetection};
pub use csproj::{
    detect_abp_version, detect_dotnet_version, detect_target_framework, map_to_target_framework,
    scan_projects_for_versions,
};
pub use paths::{derive_layer_paths, LayerPaths};
pub use solution::{
    classify_project, find_solution, is_microservice_architecture, parse_solution, ProjectInfo,
    ProjectRole, SolutionInfo,
};
