//! Structural strategy: declaration-level merge of class files.
//!
//! Operates on the shallow model from [`super::csharp`]. Properties merge
//! by name, methods by normalized signature; using directives merge as an
//! ordered set union. Statements inside bodies are never touched; a
//! diverging body is a conflict for the user, not a textual merge.

use super::classifier::FileKind;
use super::conflict::{Conflict, ConflictKind};
use super::csharp::{self, CsClass};

/// Outcome of a structural merge attempt
pub enum StructuralOutcome {
    /// Merged text plus any conflicts (text is the existing content when
    /// conflicts are present)
    Merged(String, Vec<Conflict>),
    /// One side did not yield a type declaration; the caller downgrades to
    /// a skip with a diagnostic
    Unmergeable(String),
}

/// Merge `new_content` into `existing` at declaration level
pub fn merge(existing: &str, new_content: &str, kind: FileKind) -> StructuralOutcome {
    let Some(existing_class) = csharp::parse_class(existing) else {
        return StructuralOutcome::Unmergeable(
            "existing file has no parseable class declaration".to_string(),
        );
    };
    let Some(new_class) = csharp::parse_class(new_content) else {
        return StructuralOutcome::Unmergeable(
            "rendered content has no parseable class declaration".to_string(),
        );
    };

    let conflicts = detect_conflicts(&existing_class, &new_class);
    if !conflicts.is_empty() {
        return StructuralOutcome::Merged(existing.to_string(), conflicts);
    }

    let mut result = merge_usings_text(existing, new_content);
    result = insert_missing_properties(&result, &existing_class, &new_class);
    result = insert_missing_methods(&result, &existing_class, &new_class, kind);
    StructuralOutcome::Merged(result, Vec::new())
}

/// Conflicts: same property name with a different type, or same method
/// signature with a different (whitespace-normalized) body.
fn detect_conflicts(existing: &CsClass, new: &CsClass) -> Vec<Conflict> {
    let mut conflicts = Vec::new();

    for new_prop in &new.properties {
        if let Some(existing_prop) = existing.find_property(&new_prop.name) {
            if existing_prop.type_name != new_prop.type_name {
                conflicts.push(Conflict {
                    kind: ConflictKind::DuplicateProperty,
                    description: format!(
                        "Property '{}' exists with different type",
                        new_prop.name
                    ),
                    existing_code: existing_prop.raw.clone(),
                    new_code: new_prop.raw.clone(),
                    line: Some(existing_prop.line),
                    identifier: new_prop.name.clone(),
                });
            }
            // Attribute-only differences on an otherwise identical
            // declaration are treated as identical.
        }
    }

    for new_method in &new.methods {
        if let Some(existing_method) = existing.find_method(&new_method.signature) {
            if normalize_ws(&existing_method.body) != normalize_ws(&new_method.body) {
                conflicts.push(Conflict {
                    kind: ConflictKind::DuplicateMethod,
                    description: format!(
                        "Method '{}' exists with different implementation",
                        new_method.name
                    ),
                    existing_code: existing_method.raw.clone(),
                    new_code: new_method.raw.clone(),
                    line: Some(existing_method.line),
                    identifier: new_method.signature.clone(),
                });
            }
        }
    }

    conflicts
}

/// Replace the existing using block with the ordered union of both sides
fn merge_usings_text(existing: &str, new_content: &str) -> String {
    let existing_usings = csharp::extract_usings(existing);
    let new_usings = csharp::extract_usings(new_content);
    let merged = csharp::merge_usings(&existing_usings, &new_usings);
    if merged == existing_usings {
        return existing.to_string();
    }

    let lines: Vec<&str> = existing.lines().collect();
    let last_using_index = lines
        .iter()
        .rposition(|line| line.trim_start().starts_with("using ") && line.trim_end().ends_with(';'));
    let Some(last_using) = last_using_index else {
        // No using block to replace; prepend the union
        let block: String = merged.iter().map(|u| format!("using {u};\n")).collect();
        return format!("{block}{existing}");
    };

    let first_using_index = lines
        .iter()
        .position(|line| line.trim_start().starts_with("using ") && line.trim_end().ends_with(';'))
        .unwrap_or(0);

    let mut out: Vec<String> = lines[..first_using_index]
        .iter()
        .map(|s| s.to_string())
        .collect();
    for u in &merged {
        out.push(format!("using {u};"));
    }
    out.extend(lines[last_using + 1..].iter().map(|s| s.to_string()));
    let mut joined = out.join("\n");
    if existing.ends_with('\n') && !joined.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Splice properties absent from the existing class
///
/// Anchor: after the last existing auto-property, or immediately after the
/// class opening brace when the class has none.
fn insert_missing_properties(content: &str, existing: &CsClass, new: &CsClass) -> String {
    let to_add: Vec<String> = new
        .properties
        .iter()
        .filter(|p| !existing.has_property(&p.name))
        .map(|p| format!("    {}", p.raw.trim()))
        .collect();
    if to_add.is_empty() {
        return content.to_string();
    }

    let lines: Vec<&str> = content.lines().collect();
    let mut insert_index = lines
        .iter()
        .rposition(|line| line.contains("{ get;"))
        .map(|i| i + 1);

    if insert_index.is_none() {
        // After the class opening brace
        if let Some(class_line) = lines
            .iter()
            .position(|line| line.contains(&format!("class {}", existing.name)))
        {
            insert_index = lines[class_line..]
                .iter()
                .position(|line| line.contains('{'))
                .map(|offset| class_line + offset + 1);
        }
    }

    let Some(index) = insert_index else {
        return content.to_string();
    };
    let mut out: Vec<String> = lines[..index].iter().map(|s| s.to_string()).collect();
    out.extend(to_add);
    out.extend(lines[index..].iter().map(|s| s.to_string()));
    let mut joined = out.join("\n");
    if content.ends_with('\n') && !joined.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Splice methods absent from the existing class before its closing brace
fn insert_missing_methods(
    content: &str,
    existing: &CsClass,
    new: &CsClass,
    kind: FileKind,
) -> String {
    let to_add: Vec<String> = new
        .methods
        .iter()
        .filter(|m| {
            // Constructor parameter contracts on entities are user-owned.
            if kind == FileKind::Entity && m.name == existing.name {
                return false;
            }
            !existing.has_method(&m.signature)
        })
        .map(|m| {
            let indented: String = m
                .raw
                .trim()
                .lines()
                .map(|l| {
                    if l.is_empty() {
                        String::new()
                    } else {
                        format!("        {}", l.trim_start_matches("        "))
                    }
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!("\n{indented}")
        })
        .collect();
    if to_add.is_empty() {
        return content.to_string();
    }

    let Some(close_index) = class_closing_brace_line(content, &existing.name) else {
        return content.to_string();
    };

    let lines: Vec<&str> = content.lines().collect();
    let mut out: Vec<String> = lines[..close_index].iter().map(|s| s.to_string()).collect();
    out.extend(to_add);
    out.extend(lines[close_index..].iter().map(|s| s.to_string()));
    let mut joined = out.join("\n");
    if content.ends_with('\n') && !joined.ends_with('\n') {
        joined.push('\n');
    }
    joined
}

/// Line index of the class's closing brace, found by depth counting from
/// the declaration
fn class_closing_brace_line(content: &str, class_name: &str) -> Option<usize> {
    let lines: Vec<&str> = content.lines().collect();
    let mut depth: i64 = 0;
    let mut in_class = false;
    for (i, line) in lines.iter().enumerate() {
        if !in_class && line.contains(&format!("class {class_name}")) {
            in_class = true;
        }
        if in_class {
            depth += line.matches('{').count() as i64;
            depth -= line.matches('}').count() as i64;
            if depth == 0 && line.trim() == "}" {
                return Some(i);
            }
        }
    }
    None
}

fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
