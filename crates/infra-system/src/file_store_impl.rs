// Local filesystem store
// reason: std::fs for file I/O, serde_json for the JSON helpers
use serde::Serialize;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::Path;
use tracing::{error, info, warn};

use hostkit_core::error::{AppError, Result};
use hostkit_core::port::FileStore;

/// FileStore backed by the local filesystem
#[derive(Debug, Default, Clone)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        Self
    }
}

/// Map NotFound to AppError::NotFound, keep everything else as Io
fn io_error(path: &Path, err: std::io::Error) -> AppError {
    if err.kind() == ErrorKind::NotFound {
        AppError::NotFound(path.display().to_string())
    } else {
        AppError::Io(err)
    }
}

impl FileStore for LocalFileStore {
    fn read_to_string(&self, path: &Path) -> Result<String> {
        match fs::read_to_string(path) {
            Ok(content) => {
                info!(path = %path.display(), bytes = content.len(), "File read successfully");
                Ok(content)
            }
            Err(e) => {
                error!(path = %path.display(), error = %e, "Error reading file");
                Err(io_error(path, e))
            }
        }
    }

    fn write_string(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error writing file");
            io_error(path, e)
        })?;

        info!(path = %path.display(), bytes = content.len(), "File written successfully");
        Ok(())
    }

    fn append_string(&self, path: &Path, content: &str) -> Result<()> {
        let appended = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .and_then(|mut file| file.write_all(content.as_bytes()));

        appended.map_err(|e| {
            error!(path = %path.display(), error = %e, "Error appending to file");
            io_error(path, e)
        })?;

        info!(path = %path.display(), bytes = content.len(), "File appended successfully");
        Ok(())
    }

    fn read_json(&self, path: &Path) -> Result<serde_json::Value> {
        let content = self.read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error decoding JSON file");
            AppError::Serialization(e)
        })
    }

    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error encoding JSON data");
            AppError::Serialization(e)
        })?;

        let content = String::from_utf8(buf)
            .map_err(|e| AppError::Internal(format!("JSON output is not UTF-8: {}", e)))?;
        self.write_string(path, &content)
    }

    fn exists(&self, path: &Path) -> bool {
        let exists = path.exists();
        info!(path = %path.display(), exists = %exists, "File exists check");
        exists
    }

    fn delete_file(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            warn!(path = %path.display(), "File not found for deletion");
            return Err(AppError::NotFound(path.display().to_string()));
        }

        fs::remove_file(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error deleting file");
            io_error(path, e)
        })?;

        info!(path = %path.display(), "File deleted");
        Ok(())
    }

    fn create_dir_all(&self, path: &Path) -> Result<()> {
        if path.is_dir() {
            info!(path = %path.display(), "Directory already exists");
            return Ok(());
        }

        fs::create_dir_all(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error creating directory");
            io_error(path, e)
        })?;

        info!(path = %path.display(), "Directory created");
        Ok(())
    }

    fn delete_dir_all(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            warn!(path = %path.display(), "Directory not found for deletion");
            return Err(AppError::NotFound(path.display().to_string()));
        }

        fs::remove_dir_all(path).map_err(|e| {
            error!(path = %path.display(), error = %e, "Error deleting directory");
            io_error(path, e)
        })?;

        info!(path = %path.display(), "Directory deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_write_then_read_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.txt");
        let store = LocalFileStore::new();

        store.write_string(&path, "Hello, host!").unwrap();
        assert_eq!(store.read_to_string(&path).unwrap(), "Hello, host!");

        store.write_string(&path, "overwritten").unwrap();
        store.append_string(&path, " and appended").unwrap();
        assert_eq!(
            store.read_to_string(&path).unwrap(),
            "overwritten and appended"
        );
    }

    #[test]
    fn test_read_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = LocalFileStore::new().read_to_string(&dir.path().join("missing.txt"));
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_json_uses_four_space_indent() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");
        let store = LocalFileStore::new();
        let value = json!({"kernel": "6.6.1", "arch": "x86_64"});

        store.write_json(&path, &value).unwrap();

        let raw = store.read_to_string(&path).unwrap();
        assert!(raw.contains("\n    \"kernel\": \"6.6.1\""));
        assert_eq!(store.read_json(&path).unwrap(), value);
    }

    #[test]
    fn test_invalid_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        let store = LocalFileStore::new();
        store.write_string(&path, "{not json").unwrap();

        assert!(matches!(
            store.read_json(&path),
            Err(AppError::Serialization(_))
        ));
    }

    #[test]
    fn test_exists_and_delete_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gone.txt");
        let store = LocalFileStore::new();

        store.write_string(&path, "x").unwrap();
        assert!(store.exists(&path));

        store.delete_file(&path).unwrap();
        assert!(!store.exists(&path));
        assert!(matches!(
            store.delete_file(&path),
            Err(AppError::NotFound(_))
        ));
    }

    #[test]
    fn test_directory_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/c");
        let store = LocalFileStore::new();

        store.create_dir_all(&nested).unwrap();
        // Idempotent
        store.create_dir_all(&nested).unwrap();
        store.write_string(&nested.join("f.txt"), "x").unwrap();

        let top = dir.path().join("a");
        store.delete_dir_all(&top).unwrap();
        assert!(!store.exists(&top));
        assert!(matches!(
            store.delete_dir_all(&top),
            Err(AppError::NotFound(_))
        ));
    }
}
