use super::Schema;
use std::path::Path;

/// Load a generation schema from a file
///
/// Supports both JSON and YAML by extension. The returned schema has not
/// been validated; call [`Schema::validate`] before handing it to the
/// generators.
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not parse as a
/// schema document.
pub fn load_schema(path: &Path) -> anyhow::Result<Schema> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("failed to read schema file {path:?}: {e}"))?;
    let is_yaml = path
        .extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
    let schema: Schema = if is_yaml {
        serde_yaml::from_str(&content)?
    } else {
        serde_json::from_str(&content)?
    };
    Ok(schema)
}

/// Serialize a schema back to pretty-printed JSON
pub fn save_schema(schema: &Schema, path: &Path) -> anyhow::Result<()> {
    let data = serde_json::to_string_pretty(schema)?;
    std::fs::write(path, data)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{DbProvider, EntityKind, PrimaryKeyType};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_file(name: &str, content: &str) -> std::path::PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("schema_test_{}_{}", std::process::id(), nanos));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_load_json_schema() {
        let path = temp_file(
            "schema.json",
            r#"{
                "solution": {
                    "name": "Acme",
                    "moduleName": "Catalog",
                    "primaryKeyType": "Guid",
                    "dbProvider": "efcore"
                },
                "entities": [
                    {
                        "name": "Product",
                        "entityType": "FullAuditedAggregateRoot",
                        "properties": [
                            { "name": "Name", "type": "string", "isRequired": true, "maxLength": 128 }
                        ]
                    }
                ]
            }"#,
        );
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.solution.name, "Acme");
        assert_eq!(schema.solution.primary_key_type, Some(PrimaryKeyType::Guid));
        assert_eq!(schema.solution.db_provider, Some(DbProvider::EfCore));
        assert_eq!(schema.entities.len(), 1);
        assert_eq!(schema.entities[0].kind(), EntityKind::FullAuditedAggregateRoot);
        assert_eq!(schema.entities[0].properties[0].max_length, Some(128));
    }

    #[test]
    fn test_load_yaml_schema() {
        let path = temp_file(
            "schema.yaml",
            "solution:\n  name: Acme\n  moduleName: Catalog\nentities:\n  - name: Product\n    properties:\n      - name: Name\n        type: string\n",
        );
        let schema = load_schema(&path).unwrap();
        assert_eq!(schema.solution.module_name, "Catalog");
        assert_eq!(schema.entities[0].properties[0].type_name, "string");
    }

    #[test]
    fn test_load_rejects_invalid_enum_value() {
        let path = temp_file(
            "bad.json",
            r#"{ "solution": { "name": "A", "moduleName": "B", "primaryKeyType": "int128" } }"#,
        );
        assert!(load_schema(&path).is_err());
    }

    #[test]
    fn test_load_missing_file() {
        assert!(load_schema(Path::new("/nonexistent/schema.json")).is_err());
    }
}
