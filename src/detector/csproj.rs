//! Project-descriptor scanning.
//!
//! Descriptors are scanned line-oriented with regexes; the probe only needs
//! the `Volo.Abp*` package references and the `<TargetFramework>` element,
//! so a full XML parse is not worth carrying.

use super::SolutionInfo;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static PACKAGE_REF_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"<PackageReference\s+Include="(Volo\.Abp[^"]*)"\s+Version="([^"]+)""#).unwrap()
});

static TARGET_FRAMEWORK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<TargetFrameworks?>([^<]+)</TargetFrameworks?>").unwrap());

static NET_VERSION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"net(\d+)\.?\d*").unwrap());

/// Detect the ABP major version from a project descriptor
///
/// Scans package references for the `Volo.Abp` namespace prefix and returns
/// the major component of the first versioned match.
pub fn detect_abp_version(csproj_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(csproj_path).ok()?;
    for caps in PACKAGE_REF_RE.captures_iter(&content) {
        let version = &caps[2];
        if let Some(major) = normalize_abp_version(version) {
            return Some(major);
        }
    }
    None
}

/// Detect the .NET major version from a project descriptor
pub fn detect_dotnet_version(csproj_path: &Path) -> Option<String> {
    let content = std::fs::read_to_string(csproj_path).ok()?;
    let caps = TARGET_FRAMEWORK_RE.captures(&content)?;
    // Multi-targeting lists take the first entry
    let first = caps[1].split(';').next().unwrap_or("");
    normalize_dotnet_version(first)
}

/// "8.3.0" -> "8", "10.0.0-rc.1" -> "10"
fn normalize_abp_version(version: &str) -> Option<String> {
    let major = version.split('.').next()?.split('-').next()?;
    if major.chars().all(|c| c.is_ascii_digit()) && !major.is_empty() {
        Some(major.to_string())
    } else {
        None
    }
}

/// "net9.0" -> "9", "net10.0" -> "10"
fn normalize_dotnet_version(framework: &str) -> Option<String> {
    let lowered = framework.trim().to_lowercase();
    let caps = NET_VERSION_RE.captures(&lowered)?;
    Some(caps[1].to_string())
}

/// Map detected versions onto a target framework tag
///
/// No ABP packages means a plain ASP.NET Core solution; otherwise the ABP
/// major version picks the tag and the architecture picks the suffix.
pub fn map_to_target_framework(
    abp_version: Option<&str>,
    dotnet_version: Option<&str>,
    is_microservice: bool,
) -> String {
    let Some(abp) = abp_version else {
        return match dotnet_version {
            Some("10") => "aspnetcore10".to_string(),
            _ => "aspnetcore9".to_string(),
        };
    };
    let suffix = if is_microservice {
        "microservice"
    } else {
        "monolith"
    };
    match abp {
        "10" => format!("abp10-{suffix}"),
        "9" => format!("abp9-{suffix}"),
        _ => format!("abp8-{suffix}"),
    }
}

/// Scan every project in the solution until both versions are known
pub fn scan_projects_for_versions(info: &SolutionInfo) -> (Option<String>, Option<String>) {
    let mut abp = None;
    let mut dotnet = None;
    for project in &info.projects {
        if abp.is_none() {
            abp = detect_abp_version(&project.path);
        }
        if dotnet.is_none() {
            dotnet = detect_dotnet_version(&project.path);
        }
        if abp.is_some() && dotnet.is_some() {
            break;
        }
    }
    (abp, dotnet)
}

/// Detect the target framework tag for a solution
pub fn detect_target_framework(info: &SolutionInfo) -> String {
    let (abp, dotnet) = scan_projects_for_versions(info);
    map_to_target_framework(abp.as_deref(), dotnet.as_deref(), info.is_microservice)
}
