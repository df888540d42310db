#![allow(dead_code)]

pub mod temp_files {
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::{SystemTime, UNIX_EPOCH};

    static TEMP_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Create a unique temporary directory for one test
    pub fn temp_dir(prefix: &str) -> PathBuf {
        let counter = TEMP_COUNTER.fetch_add(1, Ordering::SeqCst);
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!(
            "abpgen_test_{}_{}_{}_{}",
            prefix,
            std::process::id(),
            counter,
            nanos
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }
}

pub mod solution_tree {
    use std::path::{Path, PathBuf};

    const CSPROJ_GUID: &str = "9A19103F-16F7-4668-BE54-9A1E7A4F7556";

    /// Lay out a solution with the standard ABP layer projects
    ///
    /// Returns the solution root. Every project gets a csproj carrying a
    /// Volo.Abp package reference so version detection resolves to ABP 9.
    pub fn create_abp_solution(root: &Path, solution_name: &str, projects: &[&str]) -> PathBuf {
        std::fs::create_dir_all(root).unwrap();
        let mut sln = String::from(
            "Microsoft Visual Studio Solution File, Format Version 12.00\n# Visual Studio Version 17\n",
        );
        for (i, project) in projects.iter().enumerate() {
            sln.push_str(&format!(
                "Project(\"{{{CSPROJ_GUID}}}\") = \"{project}\", \"src\\{project}\\{project}.csproj\", \"{{00000000-0000-0000-0000-{i:012}}}\"\nEndProject\n"
            ));
            let project_dir = root.join("src").join(project);
            std::fs::create_dir_all(&project_dir).unwrap();
            std::fs::write(
                project_dir.join(format!("{project}.csproj")),
                r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <TargetFramework>net9.0</TargetFramework>
  </PropertyGroup>
  <ItemGroup>
    <PackageReference Include="Volo.Abp.Ddd.Domain" Version="9.1.0" />
  </ItemGroup>
</Project>
"#,
            )
            .unwrap();
        }
        let sln_path = root.join(format!("{solution_name}.sln"));
        std::fs::write(&sln_path, sln).unwrap();
        sln_path
    }

    /// Seed the EF Core project with DbContext + IDbContext shells so the
    /// collaborator patches have a target
    pub fn seed_db_contexts(root: &Path, solution_name: &str, module_name: &str) {
        let efcore_dir = root
            .join("src")
            .join(format!("{solution_name}.{module_name}.EntityFrameworkCore"))
            .join("EntityFrameworkCore");
        std::fs::create_dir_all(&efcore_dir).unwrap();
        std::fs::write(
            efcore_dir.join(format!("{module_name}DbContext.cs")),
            format!(
                r#"using Microsoft.EntityFrameworkCore;
using Volo.Abp.EntityFrameworkCore;

namespace {solution_name}.{module_name}.EntityFrameworkCore
{{
    public class {module_name}DbContext : AbpDbContext<{module_name}DbContext>
    {{
        public {module_name}DbContext(DbContextOptions<{module_name}DbContext> options)
            : base(options)
        {{
        }}

        protected override void OnModelCreating(ModelBuilder builder)
        {{
            base.OnModelCreating(builder);
        }}
    }}
}}
"#
            ),
        )
        .unwrap();
        std::fs::write(
            efcore_dir.join(format!("I{module_name}DbContext.cs")),
            format!(
                r#"using Microsoft.EntityFrameworkCore;

namespace {solution_name}.{module_name}.EntityFrameworkCore
{{
    public interface I{module_name}DbContext
    {{
    }}
}}
"#
            ),
        )
        .unwrap();
    }
}

pub mod scripted {
    use abpgen::{Conflict, DecisionProvider, FileKind, MergeDecision, Resolution};
    use std::collections::VecDeque;
    use std::path::Path;

    /// Decision provider driven by pre-scripted answers
    ///
    /// Runs out of answers gracefully: decisions default to merge,
    /// resolutions to keep-existing.
    pub struct ScriptedProvider {
        pub decisions: VecDeque<MergeDecision>,
        pub resolutions: VecDeque<Resolution>,
        pub apply_decision_to_all: bool,
        pub apply_resolution_to_kind: bool,
    }

    impl ScriptedProvider {
        pub fn auto_merge() -> Self {
            ScriptedProvider {
                decisions: VecDeque::new(),
                resolutions: VecDeque::new(),
                apply_decision_to_all: false,
                apply_resolution_to_kind: false,
            }
        }

        pub fn with_resolutions(resolutions: Vec<Resolution>) -> Self {
            ScriptedProvider {
                decisions: VecDeque::new(),
                resolutions: VecDeque::from(resolutions),
                apply_decision_to_all: false,
                apply_resolution_to_kind: false,
            }
        }
    }

    impl DecisionProvider for ScriptedProvider {
        fn choose_decision(
            &mut self,
            _path: &Path,
            _kind: FileKind,
        ) -> anyhow::Result<MergeDecision> {
            Ok(self.decisions.pop_front().unwrap_or(MergeDecision::Merge))
        }

        fn apply_decision_to_all(&mut self) -> anyhow::Result<bool> {
            Ok(self.apply_decision_to_all)
        }

        fn resolve(
            &mut self,
            _conflict: &Conflict,
            _index: usize,
            _total: usize,
        ) -> anyhow::Result<Resolution> {
            Ok(self
                .resolutions
                .pop_front()
                .unwrap_or(Resolution::KeepExisting))
        }

        fn apply_resolution_to_all_of_kind(&mut self) -> anyhow::Result<bool> {
            Ok(self.apply_resolution_to_kind)
        }
    }
}
