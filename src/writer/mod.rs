//! The writer: the only component that touches the filesystem.
//!
//! Enforces the mode policy (dry-run / force / skip / merge), routes
//! existing files through the merge engine, and keeps an append-only
//! ledger of every operation for the run summary.

use crate::merger::{DecisionProvider, MergeEngine};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Kind of effect recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    Create,
    Update,
    Skip,
    Mkdir,
}

impl OperationKind {
    fn tag(&self) -> &'static str {
        match self {
            OperationKind::Create => "[CREATE]",
            OperationKind::Update => "[UPDATE]",
            OperationKind::Skip => "[SKIP]  ",
            OperationKind::Mkdir => "[MKDIR] ",
        }
    }
}

/// One ledger entry
#[derive(Debug, Clone)]
pub struct FileOperation {
    pub kind: OperationKind,
    pub path: PathBuf,
    /// Final bytes involved in the operation (empty for mkdir)
    pub content: String,
    /// Whether the path existed before the operation
    pub existing: bool,
}

/// File writer with dry-run, force, skip and merge modes
pub struct Writer {
    pub dry_run: bool,
    pub force: bool,
    pub verbose: bool,
    pub merge_mode: bool,
    operations: Vec<FileOperation>,
    engine: MergeEngine,
}

impl Writer {
    pub fn new(dry_run: bool, force: bool, verbose: bool) -> Self {
        Writer {
            dry_run,
            force,
            verbose,
            merge_mode: false,
            operations: Vec::new(),
            engine: MergeEngine::new(force, verbose),
        }
    }

    pub fn with_merge(mut self, merge_mode: bool) -> Self {
        self.merge_mode = merge_mode;
        self
    }

    /// Access the merge engine for configuration (merge-all, strategies)
    pub fn engine_mut(&mut self) -> &mut MergeEngine {
        &mut self.engine
    }

    pub fn operations(&self) -> &[FileOperation] {
        &self.operations
    }

    /// Write a full artifact
    ///
    /// Existing files flow through the merge engine when merge mode is on;
    /// otherwise force overwrites and the default skips. Parent directories
    /// are created as needed. Under dry-run everything is recorded and
    /// nothing is written.
    pub fn write_file(
        &mut self,
        path: &Path,
        content: &str,
        provider: &mut dyn DecisionProvider,
    ) -> anyhow::Result<()> {
        let exists = path.exists();
        let mut final_content = content.to_string();

        if self.merge_mode && exists && !self.force {
            let outcome = self
                .engine
                .merge_file(path, content, provider)
                .map_err(|e| anyhow::anyhow!("merge failed for {path:?}: {e}"))?;
            if let Some(diagnostic) = &outcome.diagnostic {
                println!("[SKIP]   {diagnostic}");
            }
            if !outcome.should_write {
                self.record(OperationKind::Skip, path, content, true);
                return Ok(());
            }
            if let Some(merged) = outcome.content {
                final_content = merged;
            }
        }

        let kind = if exists {
            if self.force || self.merge_mode {
                OperationKind::Update
            } else {
                self.record(OperationKind::Skip, path, content, true);
                return Ok(());
            }
        } else {
            OperationKind::Create
        };

        self.record(kind, path, &final_content, exists);

        if self.dry_run {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("failed to create directory {parent:?}: {e}"))?;
        }
        std::fs::write(path, final_content)
            .map_err(|e| anyhow::anyhow!("failed to write file {path:?}: {e}"))?;
        Ok(())
    }

    /// Collaborator-patch path for shared files
    ///
    /// Contract:
    /// - missing file + `initial_generator` → synthesize initial content,
    ///   then proceed as if it had existed;
    /// - `sentinel` already present → no-op (the patch was applied by an
    ///   earlier entity or an earlier run);
    /// - otherwise apply `mutator` and write according to mode.
    pub fn update_file_idempotent(
        &mut self,
        path: &Path,
        sentinel: &str,
        mutator: impl FnOnce(&str) -> anyhow::Result<String>,
        initial_generator: Option<&dyn Fn() -> String>,
    ) -> anyhow::Result<()> {
        let (current, synthesized) = match std::fs::read_to_string(path) {
            Ok(content) => (content, false),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let Some(generator) = initial_generator else {
                    debug!(path = %path.display(), "collaborator file missing and no initial content generator");
                    self.record(OperationKind::Skip, path, "", false);
                    return Ok(());
                };
                (generator(), true)
            }
            Err(e) => return Err(anyhow::anyhow!("failed to read {path:?}: {e}")),
        };

        if current.contains(sentinel) {
            if synthesized {
                // The initial content already carries this patch, but the
                // file itself does not exist yet.
                return self.write_collaborator(path, &current);
            }
            self.log(OperationKind::Skip, path, " (already contains pattern)");
            self.record_silent(OperationKind::Skip, path, &current, true);
            return Ok(());
        }

        let updated = mutator(&current)?;
        self.write_collaborator(path, &updated)
    }

    /// Write a patched collaborator file
    ///
    /// Patches are computed against the file's real current content, so an
    /// existing file is always an update here; the skip mode only guards
    /// full-artifact writes. Localization merging also lands here because
    /// its merged content already incorporates the existing file.
    pub fn write_collaborator(&mut self, path: &Path, content: &str) -> anyhow::Result<()> {
        let exists = path.exists();
        let kind = if exists {
            OperationKind::Update
        } else {
            OperationKind::Create
        };
        self.record(kind, path, content, exists);
        if self.dry_run {
            return Ok(());
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Ensure a directory exists, recording the effect under dry-run
    pub fn ensure_directory(&mut self, path: &Path) -> anyhow::Result<()> {
        if self.dry_run {
            self.record(OperationKind::Mkdir, path, "", path.exists());
            return Ok(());
        }
        std::fs::create_dir_all(path)?;
        Ok(())
    }

    fn record(&mut self, kind: OperationKind, path: &Path, content: &str, existing: bool) {
        self.log(kind, path, "");
        self.record_silent(kind, path, content, existing);
    }

    fn record_silent(&mut self, kind: OperationKind, path: &Path, content: &str, existing: bool) {
        self.operations.push(FileOperation {
            kind,
            path: path.to_path_buf(),
            content: content.to_string(),
            existing,
        });
    }

    fn log(&self, kind: OperationKind, path: &Path, suffix: &str) {
        if self.verbose || self.dry_run {
            println!("{} {}{}", kind.tag(), path.display(), suffix);
        }
    }

    /// Print the run summary: per-kind counts plus mode banners
    pub fn print_summary(&self) {
        if self.operations.is_empty() {
            println!("No operations performed.");
            return;
        }
        let mut created = 0usize;
        let mut updated = 0usize;
        let mut skipped = 0usize;
        for op in &self.operations {
            match op.kind {
                OperationKind::Create => created += 1,
                OperationKind::Update => updated += 1,
                OperationKind::Skip => skipped += 1,
                OperationKind::Mkdir => {}
            }
        }
        println!("\n=== Summary ===");
        println!("Created: {created}");
        println!("Updated: {updated}");
        println!("Skipped: {skipped}");
        println!("Total:   {}", self.operations.len());
        if self.merge_mode {
            println!(
                "Structured-data merge strategy: {}",
                self.engine.json_strategy.as_str()
            );
        }
        if self.dry_run {
            println!("\nDRY RUN: No files were actually modified.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::merger::{Conflict, FileKind, MergeDecision, Resolution};
    use std::time::{SystemTime, UNIX_EPOCH};

    /// Provider that always merges and keeps existing on conflicts
    struct AutoMerge;

    impl DecisionProvider for AutoMerge {
        fn choose_decision(
            &mut self,
            _path: &Path,
            _kind: FileKind,
        ) -> anyhow::Result<MergeDecision> {
            Ok(MergeDecision::Merge)
        }
        fn apply_decision_to_all(&mut self) -> anyhow::Result<bool> {
            Ok(false)
        }
        fn resolve(
            &mut self,
            _conflict: &Conflict,
            _index: usize,
            _total: usize,
        ) -> anyhow::Result<Resolution> {
            Ok(Resolution::KeepExisting)
        }
        fn apply_resolution_to_all_of_kind(&mut self) -> anyhow::Result<bool> {
            Ok(false)
        }
    }

    fn temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("writer_{}_{}", std::process::id(), nanos));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_create_records_and_writes() {
        let dir = temp_dir();
        let path = dir.join("sub").join("file.cs");
        let mut writer = Writer::new(false, false, false);
        writer.write_file(&path, "content", &mut AutoMerge).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "content");
        assert_eq!(writer.operations().len(), 1);
        assert_eq!(writer.operations()[0].kind, OperationKind::Create);
        assert!(!writer.operations()[0].existing);
    }

    #[test]
    fn test_default_mode_skips_existing() {
        let dir = temp_dir();
        let path = dir.join("file.cs");
        std::fs::write(&path, "original").unwrap();
        let mut writer = Writer::new(false, false, false);
        writer.write_file(&path, "regenerated", &mut AutoMerge).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "original");
        assert_eq!(writer.operations()[0].kind, OperationKind::Skip);
    }

    #[test]
    fn test_force_overwrites_existing() {
        let dir = temp_dir();
        let path = dir.join("file.cs");
        std::fs::write(&path, "original").unwrap();
        let mut writer = Writer::new(false, true, false);
        writer.write_file(&path, "regenerated", &mut AutoMerge).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "regenerated");
        assert_eq!(writer.operations()[0].kind, OperationKind::Update);
    }

    #[test]
    fn test_dry_run_records_without_writing() {
        let dir = temp_dir();
        let path = dir.join("file.cs");
        let mut writer = Writer::new(true, false, false);
        writer.write_file(&path, "content", &mut AutoMerge).unwrap();
        assert!(!path.exists());
        assert_eq!(writer.operations().len(), 1);
        assert_eq!(writer.operations()[0].kind, OperationKind::Create);
    }

    #[test]
    fn test_idempotent_update_applies_once() {
        let dir = temp_dir();
        let path = dir.join("CatalogDbContext.cs");
        std::fs::write(&path, "class CatalogDbContext {\n}\n").unwrap();
        let mut writer = Writer::new(false, false, false);

        let mutate = |content: &str| {
            Ok(content.replace(
                "class CatalogDbContext {",
                "class CatalogDbContext {\n    DbSet<Order> Orders { get; set; }",
            ))
        };
        writer
            .update_file_idempotent(&path, "DbSet<Order>", mutate, None)
            .unwrap();
        let after_first = std::fs::read_to_string(&path).unwrap();
        assert!(after_first.contains("DbSet<Order>"));

        // Second application is a no-op thanks to the sentinel
        writer
            .update_file_idempotent(
                &path,
                "DbSet<Order>",
                |_| panic!("mutator must not run"),
                None,
            )
            .unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), after_first);
        assert_eq!(writer.operations().last().unwrap().kind, OperationKind::Skip);
    }

    #[test]
    fn test_idempotent_update_synthesizes_initial_content() {
        let dir = temp_dir();
        let path = dir.join("CatalogPermissions.cs");
        let mut writer = Writer::new(false, false, false);
        let initial = || "class CatalogPermissions {\n}\n".to_string();
        writer
            .update_file_idempotent(
                &path,
                "ProductManagement",
                |content| {
                    Ok(content.replace(
                        "class CatalogPermissions {",
                        "class CatalogPermissions {\n    class ProductManagement {}",
                    ))
                },
                Some(&initial),
            )
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ProductManagement"));
        assert_eq!(writer.operations()[0].kind, OperationKind::Create);
    }

    #[test]
    fn test_idempotent_update_writes_initial_content_carrying_the_sentinel() {
        let dir = temp_dir();
        let path = dir.join("CatalogPermissions.cs");
        let mut writer = Writer::new(false, false, false);
        // The synthesized registry already embeds this entity's fragment.
        let initial = || "class CatalogPermissions {\n    class ProductManagement {}\n}\n".to_string();
        writer
            .update_file_idempotent(
                &path,
                "ProductManagement",
                |_| panic!("mutator must not run when the sentinel is present"),
                Some(&initial),
            )
            .unwrap();
        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("ProductManagement"));
    }

    #[test]
    fn test_idempotent_update_missing_file_without_generator_skips() {
        let dir = temp_dir();
        let path = dir.join("Missing.cs");
        let mut writer = Writer::new(false, false, false);
        writer
            .update_file_idempotent(&path, "x", |c| Ok(c.to_string()), None)
            .unwrap();
        assert!(!path.exists());
        assert_eq!(writer.operations()[0].kind, OperationKind::Skip);
    }

    #[test]
    fn test_merge_mode_merges_existing_entity() {
        let dir = temp_dir().join("Entities");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("Product.cs");
        let existing = "namespace X\n{\n    public class Product : Entity<Guid>\n    {\n        public string Name { get; set; }\n    }\n}\n";
        std::fs::write(&path, existing).unwrap();
        let regenerated = "namespace X\n{\n    public class Product : Entity<Guid>\n    {\n        public string Name { get; set; }\n\n        public int Stock { get; set; }\n    }\n}\n";
        let mut writer = Writer::new(false, false, false).with_merge(true);
        writer.write_file(&path, regenerated, &mut AutoMerge).unwrap();
        let merged = std::fs::read_to_string(&path).unwrap();
        assert!(merged.contains("public string Name { get; set; }"));
        assert!(merged.contains("public int Stock { get; set; }"));
        assert_eq!(writer.operations()[0].kind, OperationKind::Update);
    }
}
