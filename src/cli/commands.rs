use crate::detector::{self, SolutionInfo};
use crate::generator;
use crate::merger::{JsonMergeStrategy, MergeDecision};
use crate::schema::{self, DbProvider, MultiTenancy, PrimaryKeyType, Schema, TargetFramework};
use crate::templates::{self, TemplateLoader};
use crate::writer::Writer;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

/// Version metadata baked in at build time
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser)]
#[command(name = "abpgen")]
#[command(about = "Schema-driven ABP Framework code generator with smart merge", long_about = None)]
#[command(version = VERSION)]
pub struct Cli {
    /// Verbose output
    #[arg(short, long, global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate ABP code from a schema file
    Generate(GenerateArgs),
    /// Extract embedded templates for customization
    ExtractTemplates {
        /// Destination directory
        #[arg(long, default_value = templates::EXTRACTED_ROOT)]
        dest: PathBuf,
    },
    /// Print version information
    Version,
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Input schema file (JSON or YAML)
    #[arg(short, long)]
    pub input: PathBuf,

    /// Path to the solution file (auto-detected if not provided)
    #[arg(short, long)]
    pub solution: Option<PathBuf>,

    /// Module name (read from the schema if not provided)
    #[arg(short, long, alias = "moduleName")]
    pub module: Option<String>,

    /// Custom templates directory
    #[arg(short, long)]
    pub templates: Option<PathBuf>,

    /// Target framework tag, or "auto" to detect from the solution
    #[arg(long, default_value = "auto")]
    pub target: String,

    /// Preview changes without writing files
    #[arg(long, default_value_t = false)]
    pub dry_run: bool,

    /// Overwrite existing files
    #[arg(long, default_value_t = false)]
    pub force: bool,

    /// Enable smart merge mode for existing files
    #[arg(long, default_value_t = false)]
    pub merge: bool,

    /// Disable merge mode (skip existing files)
    #[arg(long, default_value_t = false)]
    pub no_merge: bool,

    /// Merge all files without prompting
    #[arg(long, default_value_t = false)]
    pub merge_all: bool,

    /// Structured-data merge strategy: overwrite, append or skip
    #[arg(long)]
    pub merge_strategy: Option<String>,

    /// Solution name (overrides schema)
    #[arg(long = "solutionName")]
    pub solution_name: Option<String>,

    /// Namespace root (overrides schema)
    #[arg(long = "namespaceRoot")]
    pub namespace_root: Option<String>,

    /// ABP version (overrides schema)
    #[arg(long = "abpVersion")]
    pub abp_version: Option<String>,

    /// Primary key type: Guid, long or configurable (overrides schema)
    #[arg(long = "primaryKeyType")]
    pub primary_key_type: Option<String>,

    /// Database provider: efcore, mongodb or both (overrides schema)
    #[arg(long = "dbProvider")]
    pub db_provider: Option<String>,

    /// Generate controllers (overrides schema)
    #[arg(long = "generateControllers", default_value_t = false)]
    pub generate_controllers: bool,
}

/// Entry point for the binary
pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => run_generate(args, cli.verbose),
        Commands::ExtractTemplates { dest } => run_extract_templates(&dest),
        Commands::Version => {
            println!("abpgen version {VERSION}");
            Ok(())
        }
    }
}

fn run_extract_templates(dest: &Path) -> anyhow::Result<()> {
    println!("Extracting embedded templates to {}...", dest.display());
    let written = templates::extract_templates(dest)?;
    for path in &written {
        println!("Extracted: {}", path.display());
    }
    println!("\n✓ Templates extracted successfully!");
    println!(
        "Use --templates {} when generating code to use customized templates.",
        dest.display()
    );
    Ok(())
}

fn run_generate(args: GenerateArgs, verbose: bool) -> anyhow::Result<()> {
    println!("Loading schema from {}...", args.input.display());
    let mut sch = schema::load_schema(&args.input)?;

    apply_schema_overrides(&mut sch, &args, verbose);

    println!("\nDetecting solution structure...");
    let solution_info = match &args.solution {
        Some(path) => detector::parse_solution(path),
        None => detector::find_solution(Path::new(".")),
    };

    fill_missing_fields(&mut sch, solution_info.as_ref().ok(), verbose);
    sch.validate()?;

    let info = solution_info?;
    println!("✓ Found solution: {}", info.name);

    let effective_target = resolve_target(&args, &sch, &info, verbose)?;

    detect_tenancy(&mut sch, &info, verbose);

    if verbose {
        println!("\nDetected projects:");
        for project in &info.projects {
            println!("  - {} ({})", project.name, project.role);
        }
        println!("\nConfiguration Summary:");
        print!("{}", detector::summarize_configuration(&info));
    }

    let module = args
        .module
        .clone()
        .unwrap_or_else(|| sch.solution.module_name.clone());
    let paths = detector::derive_layer_paths(&info, &module)?;

    if !args.dry_run {
        paths.ensure_directories()?;
        paths.ensure_module_directories(&sch.solution.module_folder_name())?;
    }

    let enable_merge = args.merge && !args.no_merge && !args.force;
    let json_strategy = match args.merge_strategy.as_deref() {
        Some(tag) => JsonMergeStrategy::parse(tag)
            .ok_or_else(|| anyhow::anyhow!("invalid merge strategy '{tag}'"))?,
        None => sch
            .options
            .localization_merge
            .as_ref()
            .and_then(|m| JsonMergeStrategy::parse(&m.conflict_strategy))
            .unwrap_or_default(),
    };

    let mut loader = TemplateLoader::new(args.templates.clone(), &effective_target);
    let mut writer = Writer::new(args.dry_run, args.force, verbose).with_merge(enable_merge);
    writer.engine_mut().json_strategy = json_strategy;
    if enable_merge && args.merge_all {
        writer.engine_mut().set_merge_all(MergeDecision::Merge);
    }

    if enable_merge {
        println!("\n✓ Smart merge mode enabled - existing files will be merged intelligently");
    } else if args.force {
        println!("\n⚠ Force mode enabled - existing files will be overwritten");
    } else {
        println!("\n✓ Safe mode - existing files will be skipped");
    }

    println!(
        "\nGenerating code for {} entity(s)...\n",
        sch.entities.len()
    );
    let mut provider = super::prompts::ConsoleDecisionProvider::new();
    generator::generate_all(&sch, &paths, &mut loader, &mut writer, &mut provider)?;

    writer.print_summary();

    if args.dry_run {
        println!("\nTo apply these changes, run the command without --dry-run");
    } else {
        println!("\n✓ Code generation completed successfully!");
        println!("\nNext steps:");
        println!("  1. Add database migration: dotnet ef migrations add Add<EntityName>");
        println!("  2. Update database: dotnet ef database update");
        println!("  3. Build solution: dotnet build");
    }
    Ok(())
}

/// CLI flags take precedence over schema file values
fn apply_schema_overrides(sch: &mut Schema, args: &GenerateArgs, verbose: bool) {
    if let Some(name) = &args.solution_name {
        sch.solution.name = name.clone();
        if verbose {
            println!("✓ Overriding solution name from CLI: {name}");
        }
    }
    if let Some(root) = &args.namespace_root {
        sch.solution.namespace_root = root.clone();
        if verbose {
            println!("✓ Overriding namespace root from CLI: {root}");
        }
    }
    if let Some(module) = &args.module {
        sch.solution.module_name = module.clone();
        if verbose {
            println!("✓ Overriding module name from CLI: {module}");
        }
    }
    if let Some(version) = &args.abp_version {
        sch.solution.abp_version = version.clone();
        if verbose {
            println!("✓ Overriding ABP version from CLI: {version}");
        }
    }
    if let Some(pk) = &args.primary_key_type {
        sch.solution.primary_key_type = match pk.as_str() {
            "Guid" => Some(PrimaryKeyType::Guid),
            "long" => Some(PrimaryKeyType::Long),
            "configurable" => Some(PrimaryKeyType::Configurable),
            other => {
                eprintln!("Ignoring unknown primary key type '{other}'");
                sch.solution.primary_key_type
            }
        };
    }
    if let Some(provider) = &args.db_provider {
        sch.solution.db_provider = match provider.as_str() {
            "efcore" => Some(DbProvider::EfCore),
            "mongodb" => Some(DbProvider::MongoDb),
            "both" => Some(DbProvider::Both),
            other => {
                eprintln!("Ignoring unknown database provider '{other}'");
                sch.solution.db_provider
            }
        };
    }
    if args.generate_controllers {
        sch.solution.generate_controllers = true;
    }
}

/// Fill schema fields the file left empty from the detected solution
fn fill_missing_fields(sch: &mut Schema, info: Option<&SolutionInfo>, verbose: bool) {
    if sch.solution.name.is_empty() {
        if let Some(info) = info {
            sch.solution.name = info.name.clone();
            if verbose {
                println!("✓ Auto-detected solution name: {}", info.name);
            }
        } else if let Ok(cwd) = std::env::current_dir() {
            if let Some(dir_name) = cwd.file_name().and_then(|s| s.to_str()) {
                sch.solution.name = dir_name.to_string();
                if verbose {
                    println!("✓ Auto-detected solution name from current directory: {dir_name}");
                }
            }
        }
    }

    if sch.solution.module_name.is_empty() {
        if let Some(info) = info {
            if let Some(module) = detect_module_name(sch, info) {
                if verbose {
                    println!("✓ Auto-detected module name from project structure: {module}");
                }
                sch.solution.module_name = module;
            }
        }
    }

    if sch.solution.abp_version.is_empty() {
        if let Some(info) = info {
            let (abp, _) = detector::scan_projects_for_versions(info);
            if let Some(major) = abp {
                sch.solution.abp_version = format!("{major}.0");
                if verbose {
                    println!("✓ Auto-detected ABP version: {}", sch.solution.abp_version);
                }
            }
        }
    }

    if sch.solution.db_provider.is_none() {
        if let Some(info) = info {
            let has_efcore = info.has_project(detector::ProjectRole::EntityFrameworkCore);
            let has_mongo = info.has_project(detector::ProjectRole::MongoDb);
            sch.solution.db_provider = match (has_efcore, has_mongo) {
                (true, true) => Some(DbProvider::Both),
                (false, true) => Some(DbProvider::MongoDb),
                (true, false) => Some(DbProvider::EfCore),
                (false, false) => None,
            };
            if verbose {
                if let Some(provider) = sch.solution.db_provider {
                    println!("✓ Auto-detected database provider: {provider:?}");
                }
            }
        }
    }
}

/// Extract a module name from `Solution.Module.Layer` project names
fn detect_module_name(sch: &Schema, info: &SolutionInfo) -> Option<String> {
    const LAYER_NAMES: &[&str] = &[
        "Domain",
        "Application",
        "HttpApi",
        "EntityFrameworkCore",
        "MongoDB",
    ];
    for project in &info.projects {
        let Some(remaining) = project.name.strip_prefix(&format!("{}.", sch.solution.name)) else {
            continue;
        };
        let candidate = remaining.split('.').next().unwrap_or("");
        let candidate = candidate.strip_suffix("Module").unwrap_or(candidate);
        if !candidate.is_empty() && !LAYER_NAMES.contains(&candidate) {
            return Some(candidate.to_string());
        }
    }
    None
}

fn resolve_target(
    args: &GenerateArgs,
    sch: &Schema,
    info: &SolutionInfo,
    verbose: bool,
) -> anyhow::Result<String> {
    let requested = if args.target != "auto" {
        args.target.clone()
    } else if sch.solution.target_framework != TargetFramework::Auto {
        sch.solution.target_framework.as_tag().to_string()
    } else {
        String::new()
    };

    if requested.is_empty() {
        println!("✓ Auto-detected target framework: {}", info.target_framework);
        if verbose {
            let (abp, dotnet) = detector::scan_projects_for_versions(info);
            if let Some(abp) = abp {
                print!("  (ABP {abp}");
                if let Some(dotnet) = dotnet {
                    print!(", .NET {dotnet}");
                }
                println!(")");
            }
        }
        return Ok(info.target_framework.clone());
    }

    if TargetFramework::from_tag(&requested).is_none() {
        anyhow::bail!("unknown target framework '{requested}'");
    }
    println!("✓ Using specified target framework: {requested}");
    Ok(requested)
}

fn detect_tenancy(sch: &mut Schema, info: &SolutionInfo, verbose: bool) {
    if sch.solution.multi_tenancy.is_some() {
        return;
    }
    let detection = detector::detect_multi_tenancy(info);
    if detection.enabled {
        sch.solution.multi_tenancy = Some(MultiTenancy {
            enabled: true,
            strategy: detection.strategy.clone(),
            enable_data_isolation: true,
            tenant_id_property: "TenantId".to_string(),
        });
        if verbose {
            println!("✓ Auto-detected multi-tenancy: {} strategy", detection.strategy);
        }
    }
}
