use super::classifier::{classify_file, FileKind};
use std::path::{Path, PathBuf};

/// Existence and classification of a target path
#[derive(Debug, Clone)]
pub struct FileExistence {
    pub path: PathBuf,
    pub exists: bool,
    pub kind: FileKind,
    pub size: u64,
}

/// Probe a path for existence and classify it
///
/// Classification runs only for existing files; a missing path reports
/// `FileKind::Unknown` with size zero.
pub fn check_file(path: &Path) -> std::io::Result<FileExistence> {
    match std::fs::metadata(path) {
        Ok(meta) => Ok(FileExistence {
            path: path.to_path_buf(),
            exists: true,
            kind: classify_file(path),
            size: meta.len(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileExistence {
            path: path.to_path_buf(),
            exists: false,
            kind: FileKind::Unknown,
            size: 0,
        }),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{SystemTime, UNIX_EPOCH};

    #[test]
    fn test_check_missing_file() {
        let result = check_file(Path::new("/nonexistent/ProductDto.cs")).unwrap();
        assert!(!result.exists);
        assert_eq!(result.kind, FileKind::Unknown);
    }

    #[test]
    fn test_check_existing_file() {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("exist_{}_{}", std::process::id(), nanos));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("ProductDto.cs");
        std::fs::write(&path, "public class ProductDto {}").unwrap();
        let result = check_file(&path).unwrap();
        assert!(result.exists);
        assert_eq!(result.kind, FileKind::Dto);
        assert!(result.size > 0);
    }
}
