//! Annotation files registered for quick loading.

use std::path::{Path, PathBuf};

use crate::catalog::CatalogEntry;
use crate::catalog::error::CatalogError;

/// An annotation file known to the session, listed by file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationFileEntry {
    name: String,
    path: PathBuf,
}

impl AnnotationFileEntry {
    /// Create an entry named after the file name of `path`.
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .filter(|n| !n.is_empty())
            .ok_or(CatalogError::EmptyName { kind: Self::KIND })?;
        Ok(Self {
            name: name.to_string(),
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CatalogEntry for AnnotationFileEntry {
    const KIND: &'static str = "annotation file";

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_after_file() {
        let entry = AnnotationFileEntry::from_path(Path::new("/data/labels/img_01.json")).unwrap();
        assert_eq!(entry.name(), "img_01.json");
        assert_eq!(entry.path(), Path::new("/data/labels/img_01.json"));
    }

    #[test]
    fn test_path_without_file_name() {
        assert!(matches!(
            AnnotationFileEntry::from_path(Path::new("/")),
            Err(CatalogError::EmptyName { .. })
        ));
    }
}
