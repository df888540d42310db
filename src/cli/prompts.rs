//! Terminal decision provider.
//!
//! The merge engine drives the [`DecisionProvider`] trait; this is the
//! production implementation over stdin/stdout. Tests use scripted
//! providers instead, so nothing in the engine depends on a terminal.

use crate::merger::{format_conflict, Conflict, DecisionProvider, FileKind, MergeDecision, Resolution};
use std::io::{self, BufRead, Write};
use std::path::Path;

/// Prompts on the terminal for merge decisions and conflict resolutions
#[derive(Default)]
pub struct ConsoleDecisionProvider;

impl ConsoleDecisionProvider {
    pub fn new() -> Self {
        ConsoleDecisionProvider
    }

    fn read_choice(&self, prompt: &str, options: &[&str], default: usize) -> anyhow::Result<usize> {
        println!("{prompt}");
        for (i, option) in options.iter().enumerate() {
            let marker = if i == default { "*" } else { " " };
            println!("  {}{} {}", i + 1, marker, option);
        }
        print!("> ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Ok(default);
        }
        match trimmed.parse::<usize>() {
            Ok(n) if n >= 1 && n <= options.len() => Ok(n - 1),
            _ => Ok(default),
        }
    }

    fn read_confirm(&self, prompt: &str) -> anyhow::Result<bool> {
        print!("{prompt} [y/N] ");
        io::stdout().flush()?;
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        Ok(matches!(line.trim(), "y" | "Y" | "yes"))
    }
}

impl DecisionProvider for ConsoleDecisionProvider {
    fn choose_decision(&mut self, path: &Path, kind: FileKind) -> anyhow::Result<MergeDecision> {
        let choice = self.read_choice(
            &format!(
                "File exists: {} ({}). What would you like to do?",
                path.display(),
                kind.display_name()
            ),
            &[
                "Merge intelligently (recommended)",
                "Overwrite with new content",
                "Skip this file",
                "Show diff first",
            ],
            0,
        )?;
        Ok(match choice {
            0 => MergeDecision::Merge,
            1 => MergeDecision::Overwrite,
            2 => MergeDecision::Skip,
            3 => MergeDecision::ShowDiff,
            _ => MergeDecision::Skip,
        })
    }

    fn apply_decision_to_all(&mut self) -> anyhow::Result<bool> {
        self.read_confirm("Apply this decision to all remaining files?")
    }

    fn resolve(
        &mut self,
        conflict: &Conflict,
        index: usize,
        total: usize,
    ) -> anyhow::Result<Resolution> {
        print!("{}", format_conflict(conflict, index, total));
        let choice = self.read_choice(
            "How would you like to resolve this conflict?",
            &[
                "Keep existing",
                "Use new",
                "Keep both (rename new)",
                "Skip this conflict",
            ],
            0,
        )?;
        Ok(match choice {
            0 => Resolution::KeepExisting,
            1 => Resolution::UseNew,
            2 => Resolution::KeepBoth,
            3 => Resolution::Skip,
            _ => Resolution::KeepExisting,
        })
    }

    fn apply_resolution_to_all_of_kind(&mut self) -> anyhow::Result<bool> {
        self.read_confirm("Apply this resolution to all remaining conflicts of this type?")
    }
}
