//! Configuration scanning for auto-detected settings.
//!
//! Looks at `appsettings*.json` files and module sources to infer whether
//! the target solution runs multi-tenant, so the schema can be filled in
//! without asking the user.

use super::{ProjectRole, SolutionInfo};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Detected multi-tenancy state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TenancyDetection {
    pub enabled: bool,
    /// "host", "tenant-per-db" or "none"
    pub strategy: String,
}

/// Detect multi-tenancy configuration across the solution
///
/// Three probes, first hit wins: `Abp.MultiTenancy.IsEnabled` in an
/// appsettings file, a `[MultiTenant]`/`IMultiTenant` marker in domain
/// sources, and per-tenant connection-string keys.
pub fn detect_multi_tenancy(info: &SolutionInfo) -> TenancyDetection {
    let appsettings = find_appsettings_files(&info.root_directory);

    for file in &appsettings {
        if appsettings_enables_tenancy(file) {
            return TenancyDetection {
                enabled: true,
                strategy: "host".to_string(),
            };
        }
    }

    for project in &info.projects {
        if matches!(project.role, ProjectRole::Domain | ProjectRole::DomainShared)
            && module_files_are_multi_tenant(&project.directory)
        {
            return TenancyDetection {
                enabled: true,
                strategy: "host".to_string(),
            };
        }
    }

    for file in &appsettings {
        if has_per_tenant_connection_strings(file) {
            return TenancyDetection {
                enabled: true,
                strategy: "tenant-per-db".to_string(),
            };
        }
    }

    TenancyDetection {
        enabled: false,
        strategy: "none".to_string(),
    }
}

/// One-line-per-fact summary for verbose output
pub fn summarize_configuration(info: &SolutionInfo) -> String {
    let tenancy = detect_multi_tenancy(info);
    let mut out = String::new();
    out.push_str(&format!("  Target framework: {}\n", info.target_framework));
    out.push_str(&format!(
        "  Architecture: {}\n",
        if info.is_microservice {
            "microservice"
        } else {
            "monolith"
        }
    ));
    out.push_str(&format!(
        "  Multi-tenancy: {}\n",
        if tenancy.enabled {
            tenancy.strategy.as_str()
        } else {
            "disabled"
        }
    ));
    out
}

fn find_appsettings_files(root: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    collect_appsettings(root, 0, &mut files);
    files
}

fn collect_appsettings(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    if depth > 4 {
        return;
    }
    let Ok(entries) = std::fs::read_dir(dir) else {
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            let skip = path
                .file_name()
                .and_then(|s| s.to_str())
                .is_some_and(|n| n == "bin" || n == "obj" || n.starts_with('.'));
            if !skip {
                collect_appsettings(&path, depth + 1, out);
            }
        } else if path
            .file_name()
            .and_then(|s| s.to_str())
            .is_some_and(|n| n.starts_with("appsettings") && n.ends_with(".json"))
        {
            out.push(path);
        }
    }
}

fn appsettings_enables_tenancy(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(&content) else {
        return false;
    };
    value
        .pointer("/Abp/MultiTenancy/IsEnabled")
        .and_then(Value::as_bool)
        .unwrap_or(false)
}

fn has_per_tenant_connection_strings(path: &Path) -> bool {
    let Ok(content) = std::fs::read_to_string(path) else {
        return false;
    };
    let Ok(value) = serde_json::from_str::<Value>(&content) else {
        return false;
    };
    value
        .get("ConnectionStrings")
        .and_then(Value::as_object)
        .is_some_and(|map| {
            map.keys()
                .any(|k| k != "Default" && k.chars().next().is_some_and(char::is_uppercase))
                && map.len() > 1
        })
}

fn module_files_are_multi_tenant(dir: &Path) -> bool {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return false;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.extension().and_then(|s| s.to_str()) == Some("cs") {
            if let Ok(content) = std::fs::read_to_string(&path) {
                if content.contains("[MultiTenant]") || content.contains("IMultiTenant") {
                    return true;
                }
            }
        }
    }
    false
}
