use crate::error::GenError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Solution file extensions, in priority order
const SOLUTION_EXTENSIONS: &[&str] = &["sln", "slnx", "abpsln", "abpslnx"];

/// Solution-folder entries in .sln files carry this project type GUID and
/// must be skipped when collecting projects.
const SOLUTION_FOLDER_GUID: &str = "2150E333-8FDC-42A3-9474-1A3956D46DE8";

/// The ABP layer a project plays in the solution
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRole {
    Domain,
    DomainShared,
    ApplicationContracts,
    Application,
    HttpApi,
    EntityFrameworkCore,
    MongoDb,
    Unknown,
}

impl fmt::Display for ProjectRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ProjectRole::Domain => "Domain",
            ProjectRole::DomainShared => "Domain.Shared",
            ProjectRole::ApplicationContracts => "Application.Contracts",
            ProjectRole::Application => "Application",
            ProjectRole::HttpApi => "HttpApi",
            ProjectRole::EntityFrameworkCore => "EntityFrameworkCore",
            ProjectRole::MongoDb => "MongoDB",
            ProjectRole::Unknown => "Unknown",
        };
        write!(f, "{s}")
    }
}

/// A project discovered in the target solution
#[derive(Debug, Clone)]
pub struct ProjectInfo {
    /// Project name without the `.csproj` extension
    pub name: String,
    /// Absolute path to the project descriptor
    pub path: PathBuf,
    /// Directory containing the descriptor
    pub directory: PathBuf,
    pub role: ProjectRole,
}

/// The detected solution and its classified projects
#[derive(Debug, Clone)]
pub struct SolutionInfo {
    /// Path to the solution descriptor, or the start directory when the
    /// solution was synthesized from project files
    pub path: PathBuf,
    pub name: String,
    pub root_directory: PathBuf,
    pub projects: Vec<ProjectInfo>,
    /// Detected target framework tag, e.g. "abp9-monolith"
    pub target_framework: String,
    pub is_microservice: bool,
}

impl SolutionInfo {
    /// First project with the given role, if any
    pub fn project(&self, role: ProjectRole) -> Option<&ProjectInfo> {
        self.projects.iter().find(|p| p.role == role)
    }

    pub fn has_project(&self, role: ProjectRole) -> bool {
        self.project(role).is_some()
    }

    pub fn project_directory(&self, role: ProjectRole) -> Option<&Path> {
        self.project(role).map(|p| p.directory.as_path())
    }
}

/// Search for a solution descriptor from `start_dir` upward
///
/// Ascends the directory chain looking for `.sln`/`.slnx`/`.abpsln`/
/// `.abpslnx` files. When none is found anywhere up the chain, falls back
/// to discovering `.csproj` files under `start_dir` and synthesizing a
/// solution from them.
///
/// # Errors
///
/// Returns [`GenError::SolutionNotFound`] only when neither source yields a
/// single project.
pub fn find_solution(start_dir: &Path) -> Result<SolutionInfo, GenError> {
    let start = start_dir
        .canonicalize()
        .unwrap_or_else(|_| start_dir.to_path_buf());
    let mut current = start.clone();
    loop {
        if let Some(solution_path) = solution_file_in(&current) {
            return parse_solution(&solution_path);
        }
        match current.parent() {
            Some(parent) => current = parent.to_path_buf(),
            None => break,
        }
    }
    discover_from_projects(&start)
}

fn solution_file_in(dir: &Path) -> Option<PathBuf> {
    let entries = std::fs::read_dir(dir).ok()?;
    let mut candidates: Vec<PathBuf> = entries
        .flatten()
        .map(|e| e.path())
        .filter(|p| {
            p.extension()
                .and_then(|s| s.to_str())
                .is_some_and(|ext| SOLUTION_EXTENSIONS.contains(&ext))
        })
        .collect();
    candidates.sort_by_key(|p| {
        let ext = p.extension().and_then(|s| s.to_str()).unwrap_or("");
        SOLUTION_EXTENSIONS.iter().position(|e| *e == ext)
    });
    candidates.into_iter().next()
}

/// Synthesize a solution from `.csproj` files found under `start_dir`
fn discover_from_projects(start_dir: &Path) -> Result<SolutionInfo, GenError> {
    let mut csproj_files = Vec::new();
    collect_csproj_files(start_dir, 0, &mut csproj_files);
    if csproj_files.is_empty() {
        return Err(GenError::SolutionNotFound {
            start_dir: start_dir.display().to_string(),
        });
    }

    let name = start_dir
        .file_name()
        .and_then(|s| s.to_str())
        .unwrap_or("Solution")
        .to_string();
    let mut info = SolutionInfo {
        path: start_dir.to_path_buf(),
        name,
        root_directory: start_dir.to_path_buf(),
        projects: Vec::new(),
        target_framework: String::new(),
        is_microservice: false,
    };
    for csproj in csproj_files {
        info.projects.push(project_from_csproj_path(&csproj));
    }
    finish_detection(&mut info);
    Ok(info)
}

fn collect_csproj_files(dir: &Path, depth: usize, out: &mut Vec<PathBuf>) {
    // Solutions rarely nest projects deeper than src/<Project>/<file>.csproj
    if depth > 6 {
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
                collect_csproj_files(&path, depth + 1, out);
            }
        } else if path.extension().and_then(|s| s.to_str()) == Some("csproj") {
            out.push(path);
        }
    }
    out.sort();
}

fn project_from_csproj_path(csproj: &Path) -> ProjectInfo {
    let name = csproj
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("")
        .to_string();
    let directory = csproj
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let role = classify_project(&name);
    ProjectInfo {
        name,
        path: csproj.to_path_buf(),
        directory,
        role,
    }
}

/// Parse a solution descriptor and classify its projects
///
/// The scan is line-oriented: project entries carry the textual signature
/// `Project("{GUID}") = "Name", "path\Project.csproj", "{GUID}"`. Solution
/// folders are skipped by their well-known type GUID, and only entries
/// whose path ends in `.csproj` are kept.
pub fn parse_solution(solution_path: &Path) -> Result<SolutionInfo, GenError> {
    let content =
        std::fs::read_to_string(solution_path).map_err(|_| GenError::SolutionNotFound {
            start_dir: solution_path.display().to_string(),
        })?;
    let solution_dir = solution_path
        .parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_default();
    let name = solution_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Solution")
        .to_string();

    let mut info = SolutionInfo {
        path: solution_path.to_path_buf(),
        name,
        root_directory: solution_dir.clone(),
        projects: Vec::new(),
        target_framework: String::new(),
        is_microservice: false,
    };

    for line in content.lines() {
        let line = line.trim();
        if line.starts_with("Project(") {
            if let Some(project) = parse_project_line(line, &solution_dir) {
                info.projects.push(project);
            }
        }
    }

    finish_detection(&mut info);
    Ok(info)
}

fn finish_detection(info: &mut SolutionInfo) {
    info.is_microservice = is_microservice_architecture(info);
    info.target_framework = super::csproj::detect_target_framework(info);
}

/// Parse one `Project(...)` line from a solution descriptor
fn parse_project_line(line: &str, solution_dir: &Path) -> Option<ProjectInfo> {
    let parts: Vec<&str> = line.split('"').collect();
    // Project({ GUID }) = " Name ", " path ", " {GUID} "
    if parts.len() < 8 {
        return None;
    }
    let type_guid = parts[1].trim_matches(|c| c == '{' || c == '}');
    if type_guid.eq_ignore_ascii_case(SOLUTION_FOLDER_GUID) {
        return None;
    }
    let project_name = parts[3];
    let project_path = parts[5];
    if !project_path.ends_with(".csproj") {
        return None;
    }
    let normalized: String = project_path.replace('\\', "/");
    let abs_path = solution_dir.join(normalized);
    let directory = abs_path.parent().map(|p| p.to_path_buf()).unwrap_or_default();
    Some(ProjectInfo {
        name: project_name.to_string(),
        path: abs_path,
        directory,
        role: classify_project(project_name),
    })
}

/// Classify a project into an ABP layer role by its name
///
/// More specific suffixes are tested first so `X.Domain.Shared` is not
/// swallowed by the `Domain` rule, and `X.Application.Contracts` is not
/// swallowed by `Application`. Matching is case-insensitive.
pub fn classify_project(project_name: &str) -> ProjectRole {
    let lower = project_name.to_lowercase();

    if lower.ends_with(".domain.shared") || lower == "domain.shared" {
        return ProjectRole::DomainShared;
    }
    if lower.ends_with(".application.contracts") || lower == "application.contracts" {
        return ProjectRole::ApplicationContracts;
    }
    if lower.ends_with(".entityframeworkcore")
        || lower == "entityframeworkcore"
        || lower.ends_with(".efcore")
        || lower == "efcore"
    {
        return ProjectRole::EntityFrameworkCore;
    }
    if lower.ends_with(".mongodb") || lower == "mongodb" {
        return ProjectRole::MongoDb;
    }
    if lower.ends_with(".domain") || lower == "domain" {
        return ProjectRole::Domain;
    }
    if lower.ends_with(".application") || lower == "application" {
        return ProjectRole::Application;
    }
    if lower.ends_with(".httpapi")
        || lower == "httpapi"
        || (lower.ends_with(".api") && !lower.contains("application"))
    {
        return ProjectRole::HttpApi;
    }
    ProjectRole::Unknown
}

/// Structural heuristic for microservice solutions
///
/// Multiple service projects, or a gateway plus at least one service plus a
/// shared project, indicates a microservice layout.
pub fn is_microservice_architecture(info: &SolutionInfo) -> bool {
    let mut service_count = 0usize;
    let mut has_gateway = false;
    let mut has_shared = false;
    for project in &info.projects {
        let lower = project.name.to_lowercase();
        if lower.contains("service") && !lower.contains("shared") {
            service_count += 1;
        }
        if lower.contains("gateway") {
            has_gateway = true;
        }
        if lower.contains("shared") {
            has_shared = true;
        }
    }
    service_count > 1 || (has_gateway && service_count > 0 && has_shared)
}
