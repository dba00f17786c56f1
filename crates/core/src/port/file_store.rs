// File/JSON store port
// Thin contract over the host filesystem; every operation logs its outcome

use std::path::Path;

use crate::error::Result;

/// File and directory operations
///
/// Implementations:
/// - LocalFileStore: std::fs + serde_json
pub trait FileStore: Send + Sync {
    /// Read a whole UTF-8 file
    ///
    /// # Errors
    /// - AppError::NotFound if the file does not exist
    /// - AppError::Io on any other read failure
    fn read_to_string(&self, path: &Path) -> Result<String>;

    /// Create or truncate a file and write `content`
    fn write_string(&self, path: &Path, content: &str) -> Result<()>;

    /// Append `content`, creating the file if needed
    fn append_string(&self, path: &Path, content: &str) -> Result<()>;

    /// Read and parse a JSON document
    ///
    /// # Errors
    /// - AppError::Serialization if the content is not valid JSON
    fn read_json(&self, path: &Path) -> Result<serde_json::Value>;

    /// Write a JSON document, pretty-printed with 4-space indentation
    fn write_json(&self, path: &Path, value: &serde_json::Value) -> Result<()>;

    fn exists(&self, path: &Path) -> bool;

    /// Remove a file
    ///
    /// # Errors
    /// - AppError::NotFound if the file does not exist
    fn delete_file(&self, path: &Path) -> Result<()>;

    /// Create a directory and its parents; succeeds if it already exists
    fn create_dir_all(&self, path: &Path) -> Result<()>;

    /// Remove a directory and everything below it
    ///
    /// # Errors
    /// - AppError::NotFound if the directory does not exist
    fn delete_dir_all(&self, path: &Path) -> Result<()>;
}
