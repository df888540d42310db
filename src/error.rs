use std::fmt;

/// Fatal generation error
///
/// Returned by the schema validator, the topology detector and the template
/// loader when the run cannot continue. Soft events (optional template
/// missing, unmergeable file) are logged and skipped instead of raising one
/// of these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GenError {
    /// The schema violates a structural or semantic rule
    SchemaInvalid {
        /// Human-readable description of the violation
        message: String,
    },
    /// No solution file and no project descriptors were found
    SolutionNotFound {
        /// Directory the search started from
        start_dir: String,
    },
    /// A required layer project is absent from the solution
    ///
    /// Only the Domain layer is required; the diagnostic lists every
    /// classified and unclassified project so the user can see why
    /// classification failed.
    LayerMissing {
        /// Projects recognized as ABP layers, as "Name (Role)" pairs
        detected: Vec<String>,
        /// Projects that did not match any layer pattern
        unknown: Vec<String>,
    },
    /// A required template could not be resolved in any location
    TemplateMissing {
        /// Logical template name
        name: String,
        /// Target framework the lookup ran under
        target: String,
    },
}

impl fmt::Display for GenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GenError::SchemaInvalid { message } => {
                write!(f, "schema validation failed: {message}")
            }
            GenError::SolutionNotFound { start_dir } => {
                write!(
                    f,
                    "no solution or project files found starting from '{start_dir}'"
                )
            }
            GenError::LayerMissing { detected, unknown } => {
                writeln!(f, "Domain project not found in solution")?;
                if !detected.is_empty() {
                    writeln!(f, "Detected projects: {}", detected.join(", "))?;
                }
                if !unknown.is_empty() {
                    writeln!(
                        f,
                        "Unknown projects (not recognized as ABP layers): {}",
                        unknown.join(", ")
                    )?;
                }
                writeln!(f)?;
                writeln!(f, "Expected project naming patterns:")?;
                writeln!(f, "  - Domain: '*.Domain' or 'Domain'")?;
                writeln!(f, "  - Domain.Shared: '*.Domain.Shared' or 'Domain.Shared'")?;
                writeln!(f, "  - Application: '*.Application' or 'Application'")?;
                writeln!(
                    f,
                    "  - Application.Contracts: '*.Application.Contracts' or 'Application.Contracts'"
                )?;
                write!(f, "  - HttpApi: '*.HttpApi' or 'HttpApi'")
            }
            GenError::TemplateMissing { name, target } => {
                write!(
                    f,
                    "template '{name}' not found for target '{target}' in any location"
                )
            }
        }
    }
}

impl std::error::Error for GenError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_missing_lists_projects() {
        let err = GenError::LayerMissing {
            detected: vec!["Acme.Application (Application)".to_string()],
            unknown: vec!["Acme.Tools".to_string()],
        };
        let text = err.to_string();
        assert!(text.contains("Domain project not found"));
        assert!(text.contains("Acme.Application (Application)"));
        assert!(text.contains("Acme.Tools"));
        assert!(text.contains("Expected project naming patterns"));
    }

    #[test]
    fn test_template_missing_display() {
        let err = GenError::TemplateMissing {
            name: "entity".to_string(),
            target: "abp9-monolith".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "template 'entity' not found for target 'abp9-monolith' in any location"
        );
    }
}
