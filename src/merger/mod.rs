//! The smart merge subsystem.
//!
//! Given a rendered artifact and an existing file of the same logical
//! identity, decides whether and how to fuse them: classify the file,
//! select a strategy, ask the decision provider when interaction is
//! needed, run the strategy, and drive batch conflict resolution.
//!
//! Idempotence is the load-bearing invariant: merging identical content
//! yields no conflicts and byte-equal output (up to serializer
//! normalization for structured data).

mod classifier;
mod conflict;
mod csharp;
mod detector;
mod json;
mod pattern;
mod resolver;
mod structural;

pub use classifier::{classify_file, is_mergeable, strategy_of, FileKind, MergeStrategy};
pub use conflict::{Conflict, ConflictKind, MergeDecision, Resolution};
pub use detector::{check_file, FileExistence};
pub use json::{merge as merge_json, to_sorted_pretty, JsonMergeStrategy};
pub use resolver::{apply_resolutions, format_conflict, resolve_batch, DecisionProvider};

use std::path::Path;
use tracing::debug;

/// Outcome of [`MergeEngine::merge_file`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Final bytes to write, `None` when nothing should be written
    pub content: Option<String>,
    /// Whether the caller should write
    pub should_write: bool,
    /// Diagnostic for soft skips (unmergeable, unsupported kind)
    pub diagnostic: Option<String>,
}

impl MergeOutcome {
    fn write(content: String) -> Self {
        MergeOutcome {
            content: Some(content),
            should_write: true,
            diagnostic: None,
        }
    }

    fn skip() -> Self {
        MergeOutcome {
            content: None,
            should_write: false,
            diagnostic: None,
        }
    }

    fn skip_with(diagnostic: String) -> Self {
        MergeOutcome {
            content: None,
            should_write: false,
            diagnostic: Some(diagnostic),
        }
    }
}

/// Orchestrates merge operations for one generation run
pub struct MergeEngine {
    pub force: bool,
    pub verbose: bool,
    /// Structured-data conflict strategy, surfaced in the run summary
    pub json_strategy: JsonMergeStrategy,
    /// Once set, applied to every subsequent existing file without asking
    cached_decision: Option<MergeDecision>,
}

impl MergeEngine {
    pub fn new(force: bool, verbose: bool) -> Self {
        MergeEngine {
            force,
            verbose,
            json_strategy: JsonMergeStrategy::default(),
            cached_decision: None,
        }
    }

    pub fn with_json_strategy(mut self, strategy: JsonMergeStrategy) -> Self {
        self.json_strategy = strategy;
        self
    }

    /// Pre-seed the decision cache (the `--merge-all` flag)
    pub fn set_merge_all(&mut self, decision: MergeDecision) {
        self.cached_decision = Some(decision);
    }

    /// Merge `new_content` against whatever exists at `path`
    ///
    /// Missing files and force mode short-circuit to a plain write. Files
    /// whose kind has no strategy are skipped. Everything else goes through
    /// the decision provider and the selected strategy; conflicts are
    /// resolved in batch before the final text is produced.
    pub fn merge_file(
        &mut self,
        path: &Path,
        new_content: &str,
        provider: &mut dyn DecisionProvider,
    ) -> anyhow::Result<MergeOutcome> {
        let existence = check_file(path)?;
        if !existence.exists {
            return Ok(MergeOutcome::write(new_content.to_string()));
        }
        if self.force {
            if self.verbose {
                println!("[OVERWRITE] {}", path.display());
            }
            return Ok(MergeOutcome::write(new_content.to_string()));
        }

        let kind = existence.kind;
        if !is_mergeable(kind) {
            debug!(path = %path.display(), kind = kind.display_name(), "file kind does not support merging");
            return Ok(MergeOutcome::skip_with(format!(
                "{} (file type doesn't support merging)",
                path.display()
            )));
        }

        let decision = match self.cached_decision {
            Some(decision) => decision,
            None => {
                let mut decision = provider.choose_decision(path, kind)?;
                while decision == MergeDecision::ShowDiff {
                    let existing = std::fs::read_to_string(path)?;
                    print_diff(&existing, new_content);
                    decision = provider.choose_decision(path, kind)?;
                }
                if provider.apply_decision_to_all()? {
                    self.cached_decision = Some(decision);
                }
                decision
            }
        };

        match decision {
            MergeDecision::Overwrite => {
                if self.verbose {
                    println!("[OVERWRITE] {}", path.display());
                }
                Ok(MergeOutcome::write(new_content.to_string()))
            }
            MergeDecision::Skip => {
                if self.verbose {
                    println!("[SKIP] {}", path.display());
                }
                Ok(MergeOutcome::skip())
            }
            MergeDecision::ShowDiff => {
                // Only reachable through the cache; treat as skip.
                Ok(MergeOutcome::skip())
            }
            MergeDecision::Merge => self.perform_merge(path, kind, new_content, provider),
        }
    }

    fn perform_merge(
        &mut self,
        path: &Path,
        kind: FileKind,
        new_content: &str,
        provider: &mut dyn DecisionProvider,
    ) -> anyhow::Result<MergeOutcome> {
        let existing = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read existing file {path:?}: {e}"))?;

        let (merged, conflicts) = match strategy_of(kind) {
            MergeStrategy::Pattern => pattern::merge(&existing, new_content, kind)?,
            MergeStrategy::Structural => match structural::merge(&existing, new_content, kind) {
                structural::StructuralOutcome::Merged(text, conflicts) => (text, conflicts),
                structural::StructuralOutcome::Unmergeable(reason) => {
                    return Ok(MergeOutcome::skip_with(format!(
                        "{}: {}",
                        path.display(),
                        reason
                    )));
                }
            },
            MergeStrategy::StructuredData => {
                json::merge(&existing, new_content, self.json_strategy)?
            }
            MergeStrategy::None => {
                return Ok(MergeOutcome::skip());
            }
        };

        if conflicts.is_empty() {
            if self.verbose {
                println!("[MERGED] {}", path.display());
            }
            return Ok(MergeOutcome::write(merged));
        }

        if self.verbose {
            println!(
                "[CONFLICTS] {} - {} conflict(s) detected",
                path.display(),
                conflicts.len()
            );
        }
        let resolutions = resolve_batch(provider, &conflicts)?;
        let final_text = apply_resolutions(&existing, &conflicts, &resolutions);
        if self.verbose {
            println!("[MERGED] {}", path.display());
        }
        Ok(MergeOutcome::write(final_text))
    }
}

/// Minimal unified-style diff for the show-diff decision
fn print_diff(existing: &str, new_content: &str) {
    println!("--- existing");
    println!("+++ generated");
    let existing_lines: Vec<&str> = existing.lines().collect();
    let new_lines: Vec<&str> = new_content.lines().collect();
    let max = existing_lines.len().max(new_lines.len());
    for i in 0..max {
        let old = existing_lines.get(i).copied();
        let new = new_lines.get(i).copied();
        match (old, new) {
            (Some(a), Some(b)) if a == b => {}
            (Some(a), Some(b)) => {
                println!("-{a}");
                println!("+{b}");
            }
            (Some(a), None) => println!("-{a}"),
            (None, Some(b)) => println!("+{b}"),
            (None, None) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::path::PathBuf;
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Scripted decision provider for engine tests
    pub struct ScriptedProvider {
        pub decisions: VecDeque<MergeDecision>,
        pub resolutions: VecDeque<Resolution>,
        pub apply_decision_to_all: bool,
        pub apply_resolution_to_kind: bool,
    }

    impl ScriptedProvider {
        pub fn merging(resolutions: Vec<Resolution>) -> Self {
            ScriptedProvider {
                decisions: VecDeque::from(vec![MergeDecision::Merge; 16]),
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

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("engine_{}_{}", std::process::id(), nanos));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    const ENTITY: &str = r#"namespace Acme.Catalog.Entities
{
    public class Product : FullAuditedAggregateRoot<Guid>
    {
        public string Name { get; set; }

        public void Recompute()
        {
            /* user */
        }
    }
}
"#;

    #[test]
    fn test_missing_file_writes_new_content() {
        let dir = temp_dir();
        let path = dir.join("Entities").join("Product.cs");
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![]);
        let outcome = engine.merge_file(&path, ENTITY, &mut provider).unwrap();
        assert!(outcome.should_write);
        assert_eq!(outcome.content.unwrap(), ENTITY);
    }

    #[test]
    fn test_force_overwrites_without_asking() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, "old").unwrap();
        let mut engine = MergeEngine::new(true, false);
        // A provider that would panic if asked
        let mut provider = ScriptedProvider {
            decisions: VecDeque::new(),
            resolutions: VecDeque::new(),
            apply_decision_to_all: false,
            apply_resolution_to_kind: false,
        };
        let outcome = engine.merge_file(&path, ENTITY, &mut provider).unwrap();
        assert!(outcome.should_write);
        assert_eq!(outcome.content.unwrap(), ENTITY);
    }

    #[test]
    fn test_unmergeable_kind_skips() {
        let dir = temp_dir();
        let path = dir.join("CatalogApplicationAutoMapperProfile.cs");
        std::fs::write(&path, "existing profile").unwrap();
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![]);
        let outcome = engine.merge_file(&path, "new profile", &mut provider).unwrap();
        assert!(!outcome.should_write);
        assert!(outcome.diagnostic.is_some());
    }

    #[test]
    fn test_skip_decision() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, ENTITY).unwrap();
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![]);
        provider.decisions = VecDeque::from(vec![MergeDecision::Skip]);
        let outcome = engine.merge_file(&path, ENTITY, &mut provider).unwrap();
        assert!(!outcome.should_write);
    }

    #[test]
    fn test_merge_all_caches_decision() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, ENTITY).unwrap();
        let mut engine = MergeEngine::new(false, false);
        engine.set_merge_all(MergeDecision::Skip);
        // Provider would return Merge; the cache wins.
        let mut provider = ScriptedProvider::merging(vec![]);
        let outcome = engine.merge_file(&path, ENTITY, &mut provider).unwrap();
        assert!(!outcome.should_write);
    }

    #[test]
    fn test_conflict_keep_existing_retains_user_body() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, ENTITY).unwrap();
        let regenerated = ENTITY.replace("/* user */", "/* generated */");
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![Resolution::KeepExisting]);
        let outcome = engine.merge_file(&path, &regenerated, &mut provider).unwrap();
        assert!(outcome.should_write);
        let content = outcome.content.unwrap();
        assert!(content.contains("/* user */"));
        assert!(!content.contains("/* generated */"));
    }

    #[test]
    fn test_conflict_keep_both_renames_new_method() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, ENTITY).unwrap();
        let regenerated = ENTITY.replace("/* user */", "/* generated */");
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![Resolution::KeepBoth]);
        let outcome = engine.merge_file(&path, &regenerated, &mut provider).unwrap();
        let content = outcome.content.unwrap();
        assert!(content.contains("public void Recompute()"));
        assert!(content.contains("public void Recompute2()"));
        assert!(content.contains("/* user */"));
        assert!(content.contains("/* generated */"));
    }

    #[test]
    fn test_conflict_stability_same_inputs_same_conflicts() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        std::fs::write(&path, ENTITY).unwrap();
        let regenerated = ENTITY.replace("/* user */", "/* generated */");

        let existing = std::fs::read_to_string(&path).unwrap();
        let first = match super::structural::merge(&existing, &regenerated, FileKind::Entity) {
            super::structural::StructuralOutcome::Merged(_, c) => c,
            _ => panic!("expected merge"),
        };
        let second = match super::structural::merge(&existing, &regenerated, FileKind::Entity) {
            super::structural::StructuralOutcome::Merged(_, c) => c,
            _ => panic!("expected merge"),
        };
        assert_eq!(first, second);
        assert_eq!(first.len(), 1);
    }

    #[test]
    fn test_json_idempotence_modulo_normalization() {
        let dir = temp_dir();
        let path = dir.join("en.json");
        let normalized = to_sorted_pretty(
            &serde_json::from_str(r#"{ "Product": "Product", "Product.Name": "Name" }"#).unwrap(),
        )
        .unwrap();
        std::fs::write(&path, &normalized).unwrap();
        let mut engine = MergeEngine::new(false, false);
        let mut provider = ScriptedProvider::merging(vec![]);
        let outcome = engine.merge_file(&path, &normalized, &mut provider).unwrap();
        assert!(outcome.should_write);
        assert_eq!(outcome.content.unwrap(), normalized);
    }
}
