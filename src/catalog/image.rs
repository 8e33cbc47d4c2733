//! Image list entries.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use crate::catalog::CatalogEntry;
use crate::catalog::error::CatalogError;

/// Supported image extensions
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "xpm", "bmp", "tiff", "tif"];

/// Check if a path has a supported image extension
pub fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// An image the user can open for annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageEntry {
    /// File name including extension; unique within the image list
    name: String,
    /// Full path to the image
    path: PathBuf,
    /// When the file was created (or last modified, where creation time is
    /// not available)
    created: Option<SystemTime>,
}

impl ImageEntry {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>, created: Option<SystemTime>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            created,
        }
    }

    /// Build an entry from a file on disk, reading its date from metadata.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or(CatalogError::EmptyName { kind: Self::KIND })?;

        let metadata = std::fs::metadata(path).map_err(|e| CatalogError::io(path, e))?;
        if !metadata.is_file() {
            return Err(CatalogError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::InvalidInput, "not a regular file"),
            ));
        }
        let created = metadata.created().or_else(|_| metadata.modified()).ok();

        Ok(Self::new(name, path, created))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created(&self) -> Option<SystemTime> {
        self.created
    }
}

impl CatalogEntry for ImageEntry {
    const KIND: &'static str = "image";

    fn name(&self) -> &str {
        &self.name
    }

    fn date(&self) -> Option<SystemTime> {
        self.created
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_image_extensions() {
        assert!(is_image_file(Path::new("/a/b/photo.JPG")));
        assert!(is_image_file(Path::new("scan.png")));
        assert!(!is_image_file(Path::new("notes.txt")));
        assert!(!is_image_file(Path::new("no_extension")));
    }

    #[test]
    fn test_entry_from_path_reads_metadata() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("street.png");
        fs::write(&path, b"not really a png").unwrap();

        let entry = ImageEntry::from_path(&path).unwrap();
        assert_eq!(entry.name(), "street.png");
        assert_eq!(entry.path(), path.as_path());
        assert!(entry.created().is_some());
    }

    #[test]
    fn test_entry_from_missing_path() {
        let dir = tempdir().unwrap();
        let result = ImageEntry::from_path(&dir.path().join("gone.png"));
        assert!(matches!(result, Err(CatalogError::Io { .. })));
    }
}
