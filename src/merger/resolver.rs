//! Conflict resolution.
//!
//! The engine never reads the terminal itself; it drives a
//! [`DecisionProvider`] supplied by the CLI layer. Tests implement the
//! trait with a scripted queue so conflict scenarios run deterministically.

use super::classifier::FileKind;
use super::conflict::{Conflict, ConflictKind, MergeDecision, Resolution};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

/// Interactive surface of the merge engine
///
/// The production implementation prompts on the terminal; tests supply a
/// scripted queue of answers.
pub trait DecisionProvider {
    /// Per-file decision for an existing file
    fn choose_decision(&mut self, path: &Path, kind: FileKind) -> anyhow::Result<MergeDecision>;

    /// After the first decision: apply it to every remaining file this run?
    fn apply_decision_to_all(&mut self) -> anyhow::Result<bool>;

    /// Resolve one conflict; `index` and `total` are for display
    fn resolve(&mut self, conflict: &Conflict, index: usize, total: usize)
        -> anyhow::Result<Resolution>;

    /// After a resolution: apply it to remaining conflicts of the same kind?
    fn apply_resolution_to_all_of_kind(&mut self) -> anyhow::Result<bool>;
}

/// Collect a resolution per conflict, honoring the batch policy
///
/// After each answer (except the last) the provider may elect to propagate
/// that resolution to every remaining conflict of the same kind.
pub fn resolve_batch(
    provider: &mut dyn DecisionProvider,
    conflicts: &[Conflict],
) -> anyhow::Result<HashMap<usize, Resolution>> {
    let mut resolutions = HashMap::new();
    let total = conflicts.len();
    let mut index = 0;
    while index < total {
        if resolutions.contains_key(&index) {
            index += 1;
            continue;
        }
        let mut resolution = provider.resolve(&conflicts[index], index, total)?;
        while resolution == Resolution::ShowContext {
            resolution = provider.resolve(&conflicts[index], index, total)?;
        }
        resolutions.insert(index, resolution);

        if index < total - 1 && provider.apply_resolution_to_all_of_kind()? {
            let kind = conflicts[index].kind;
            for (j, conflict) in conflicts.iter().enumerate().skip(index + 1) {
                if conflict.kind == kind {
                    resolutions.insert(j, resolution);
                }
            }
        }
        index += 1;
    }
    Ok(resolutions)
}

/// Apply resolutions to the existing content
///
/// Unresolved indices default to keep-existing, so a user who aborts a
/// batch mid-way never loses edits.
pub fn apply_resolutions(
    existing: &str,
    conflicts: &[Conflict],
    resolutions: &HashMap<usize, Resolution>,
) -> String {
    let mut result = existing.to_string();
    for (i, conflict) in conflicts.iter().enumerate() {
        let resolution = resolutions.get(&i).copied().unwrap_or(Resolution::KeepExisting);
        match resolution {
            Resolution::KeepExisting | Resolution::Skip | Resolution::ShowContext => {}
            Resolution::UseNew => {
                result = result.replacen(&conflict.existing_code, &conflict.new_code, 1);
            }
            Resolution::KeepBoth => {
                let renamed = rename_fragment(&conflict.new_code, conflict.kind);
                result = insert_after(&result, &conflict.existing_code, &renamed);
            }
        }
    }
    result
}

/// Insert `new_code` right after the first occurrence of `existing_code`
fn insert_after(content: &str, existing_code: &str, new_code: &str) -> String {
    match content.find(existing_code) {
        Some(index) => {
            let end = index + existing_code.len();
            format!("{}\n\n{}{}", &content[..end], new_code, &content[end..])
        }
        None => content.to_string(),
    }
}

static PROPERTY_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([\w?>]+)\s+(\w+)\s*\{\s*get;").unwrap());

static METHOD_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\w+)\s*\(").unwrap());

static CLASS_NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"class\s+(\w+)").unwrap());

/// Rename the salient identifier of a fragment with a `2` suffix
///
/// This is a lexical rewrite of the declaration site only; usages inside
/// the fragment or elsewhere in the file are not rewritten. Good enough for
/// keep-both, documented as approximate.
pub fn rename_fragment(code: &str, kind: ConflictKind) -> String {
    match kind {
        ConflictKind::DuplicateProperty => {
            if let Some(caps) = PROPERTY_NAME_RE.captures(code) {
                let name = caps[2].to_string();
                return code.replacen(&name, &format!("{name}2"), 1);
            }
            code.to_string()
        }
        ConflictKind::DuplicateMethod => {
            if let Some(caps) = METHOD_NAME_RE.captures(code) {
                let name = caps[1].to_string();
                return code.replacen(
                    &format!("{name}("),
                    &format!("{name}2("),
                    1,
                );
            }
            code.to_string()
        }
        ConflictKind::DuplicateClass => {
            if let Some(caps) = CLASS_NAME_RE.captures(code) {
                let name = caps[1].to_string();
                return code.replacen(
                    &format!("class {name}"),
                    &format!("class {name}2"),
                    1,
                );
            }
            code.to_string()
        }
        ConflictKind::DifferentValue | ConflictKind::Structural => format!("{code}_New"),
    }
}

/// Render a conflict for terminal display
pub fn format_conflict(conflict: &Conflict, index: usize, total: usize) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "\nConflict {} of {}: {} ({})\n",
        index + 1,
        total,
        conflict.description,
        conflict.kind
    ));
    if let Some(line) = conflict.line {
        out.push_str(&format!("Line: {line}\n"));
    }
    out.push_str("\nExisting code:\n");
    for line in conflict.existing_code.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push_str("\nNew code:\n");
    for line in conflict.new_code.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out
}
