//! Class list and its backing file.
//!
//! The class file holds one class name per line. New classes are appended;
//! deleting a class rewrites the whole file through a temporary file.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::catalog::error::CatalogError;
use crate::catalog::{AddReport, Catalog, CatalogEntry, SortOrder};
use crate::persist::write_atomic;

/// A class label shapes can be tagged with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    name: String,
}

impl ClassEntry {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl CatalogEntry for ClassEntry {
    const KIND: &'static str = "class";

    fn name(&self) -> &str {
        &self.name
    }
}

/// Read class names from a class file, skipping blank lines.
pub fn read_class_file(path: &Path) -> Result<Vec<String>, CatalogError> {
    let contents = std::fs::read_to_string(path).map_err(|e| CatalogError::io(path, e))?;
    Ok(contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// The class list, mirrored to a class file once one is opened.
#[derive(Debug, Clone, Default)]
pub struct ClassCatalog {
    classes: Catalog<ClassEntry>,
    file: Option<PathBuf>,
}

impl ClassCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn classes(&self) -> &Catalog<ClassEntry> {
        &self.classes
    }

    /// Path of the attached class file, if any.
    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    /// Load classes from `path` and attach it as the class file.
    ///
    /// Names already in the list are refused and reported, the rest are
    /// added. Later creations and deletions are written to this file.
    pub fn open_file(&mut self, path: &Path) -> Result<AddReport, CatalogError> {
        let names = read_class_file(path)?;
        self.file = Some(path.to_path_buf());

        let mut report = AddReport::new();
        for name in names {
            let outcome = self.classes.insert(ClassEntry::new(name.clone()));
            report.record(&name, outcome);
        }

        log::info!(
            "Opened class file {:?}: {} classes added, {} duplicates",
            path,
            report.added.len(),
            report.duplicates.len()
        );
        Ok(report)
    }

    /// Add a new class and append it to the class file.
    ///
    /// Duplicates are refused and leave both the list and the file unchanged.
    /// Without an attached file the class is only kept in memory.
    pub fn create(&mut self, name: &str) -> Result<(), CatalogError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(CatalogError::EmptyName {
                kind: ClassEntry::KIND,
            });
        }
        if self.classes.contains(name) {
            return Err(CatalogError::duplicate(ClassEntry::KIND, name));
        }

        if let Some(path) = &self.file {
            append_line(path, name)?;
        } else {
            log::debug!("No class file open, keeping class '{}' in memory", name);
        }

        self.classes.insert(ClassEntry::new(name))?;
        log::info!("Created class '{}'", name);
        Ok(())
    }

    /// Remove a class and rewrite the class file without it.
    ///
    /// Only lines that match the name exactly are dropped. The file is
    /// replaced atomically, so a failed write leaves the old file in place
    /// and the class in the list.
    pub fn delete(&mut self, name: &str) -> Result<ClassEntry, CatalogError> {
        if !self.classes.contains(name) {
            return Err(CatalogError::not_found(ClassEntry::KIND, name));
        }

        if let Some(path) = &self.file {
            let kept: Vec<String> = read_class_file(path)?
                .into_iter()
                .filter(|line| line != name)
                .collect();
            let mut contents = kept.join("\n");
            if !contents.is_empty() {
                contents.push('\n');
            }
            write_atomic(path, contents.as_bytes()).map_err(|e| CatalogError::io(path, e))?;
        }

        let removed = self.classes.remove(name)?;
        log::info!("Deleted class '{}'", name);
        Ok(removed)
    }

    /// Re-order the class list.
    pub fn sort(&mut self, order: SortOrder) {
        self.classes.sort(order);
    }
}

fn append_line(path: &Path, line: &str) -> Result<(), CatalogError> {
    let needs_newline = match std::fs::read(path) {
        Ok(bytes) => bytes.last().is_some_and(|b| *b != b'\n'),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => false,
        Err(e) => return Err(CatalogError::io(path, e)),
    };

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| CatalogError::io(path, e))?;
    let prefix = if needs_newline { "\n" } else { "" };
    writeln!(file, "{}{}", prefix, line).map_err(|e| CatalogError::io(path, e))
}
