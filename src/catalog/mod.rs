//! Named lists the user picks from: images, classes and annotation files.
//!
//! Every list is a [`Catalog`] that refuses duplicate names and can be
//! re-sorted in place. The class list is additionally mirrored to a
//! newline-delimited class file on disk (see [`ClassCatalog`]).

mod annotation_file;
mod class;
mod error;
mod image;

use std::cmp::Ordering;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};

pub use annotation_file::AnnotationFileEntry;
pub use class::{ClassCatalog, ClassEntry, read_class_file};
pub use error::CatalogError;
pub use image::{IMAGE_EXTENSIONS, ImageEntry, is_image_file};

/// Something that can live in a [`Catalog`].
pub trait CatalogEntry {
    /// What the entry is called in messages (`"image"`, `"class"`).
    const KIND: &'static str;

    /// Unique name of the entry within its catalog.
    fn name(&self) -> &str;

    /// Date used by the date sort orders. Entries without one sort last.
    fn date(&self) -> Option<SystemTime> {
        None
    }
}

/// Sort orders offered for catalog lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    NameAscending,
    NameDescending,
    /// Oldest first.
    DateAscending,
    /// Newest first.
    DateDescending,
}

impl SortOrder {
    /// Get the display name for this order.
    pub fn name(&self) -> &'static str {
        match self {
            SortOrder::NameAscending => "Name Ascending",
            SortOrder::NameDescending => "Name Descending",
            SortOrder::DateAscending => "Date Ascending",
            SortOrder::DateDescending => "Date Descending",
        }
    }
}

/// Outcome of adding several entries at once.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct AddReport {
    /// Names that were added.
    pub added: Vec<String>,
    /// Names refused because they were already present.
    pub duplicates: Vec<String>,
    /// Inputs that could not be turned into entries, with the reason.
    pub skipped: Vec<String>,
}

impl AddReport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one insertion.
    pub fn record(&mut self, name: &str, outcome: Result<(), CatalogError>) {
        match outcome {
            Ok(()) => self.added.push(name.to_string()),
            Err(CatalogError::Duplicate { .. }) => self.duplicates.push(name.to_string()),
            Err(e) => self.skipped.push(format!("{}: {}", name, e)),
        }
    }

    /// User-facing notices for everything that was not added.
    pub fn notices(&self, kind: &str) -> Vec<String> {
        self.duplicates
            .iter()
            .map(|name| format!("The {} {} already exists!", name, kind))
            .chain(self.skipped.iter().cloned())
            .collect()
    }
}

/// Ordered list of uniquely named entries.
#[derive(Debug, Clone)]
pub struct Catalog<T> {
    entries: Vec<T>,
}

impl<T> Default for Catalog<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<T: CatalogEntry> Catalog<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry, refusing names that are already present.
    pub fn insert(&mut self, entry: T) -> Result<(), CatalogError> {
        if self.contains(entry.name()) {
            log::debug!("Refusing duplicate {} '{}'", T::KIND, entry.name());
            return Err(CatalogError::duplicate(T::KIND, entry.name()));
        }
        log::trace!("Catalog: added {} '{}'", T::KIND, entry.name());
        self.entries.push(entry);
        Ok(())
    }

    /// Remove an entry by name.
    pub fn remove(&mut self, name: &str) -> Result<T, CatalogError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.name() == name)
            .ok_or_else(|| CatalogError::not_found(T::KIND, name))?;
        Ok(self.entries.remove(index))
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.iter().find(|e| e.name() == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Entries in display order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Names in display order.
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Re-order the entries. The sort is stable.
    ///
    /// Names compare case-insensitively, falling back to exact comparison so
    /// the order is deterministic.
    pub fn sort(&mut self, order: SortOrder) {
        match order {
            SortOrder::NameAscending => self.entries.sort_by(|a, b| compare_names(a, b)),
            SortOrder::NameDescending => self.entries.sort_by(|a, b| compare_names(b, a)),
            SortOrder::DateAscending => {
                self.entries.sort_by(|a, b| compare_dates(a.date(), b.date(), false))
            }
            SortOrder::DateDescending => {
                self.entries.sort_by(|a, b| compare_dates(a.date(), b.date(), true))
            }
        }
        log::debug!("Sorted {} {} entries by {}", self.entries.len(), T::KIND, order.name());
    }
}

fn compare_names<T: CatalogEntry>(a: &T, b: &T) -> Ordering {
    a.name()
        .to_lowercase()
        .cmp(&b.name().to_lowercase())
        .then_with(|| a.name().cmp(b.name()))
}

fn compare_dates(a: Option<SystemTime>, b: Option<SystemTime>, newest_first: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if newest_first => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;

    fn image(name: &str, age_days: Option<u64>) -> ImageEntry {
        let created = age_days.map(|d| SystemTime::UNIX_EPOCH + Duration::from_secs(1_000_000 - d * 86_400));
        ImageEntry::new(name, PathBuf::from(format!("/images/{}", name)), created)
    }

    fn names<T: CatalogEntry>(catalog: &Catalog<T>) -> Vec<String> {
        catalog.names().into_iter().map(String::from).collect()
    }

    #[test]
    fn test_duplicate_is_refused() {
        let mut classes = Catalog::new();
        classes.insert(ClassEntry::new("Car")).unwrap();

        let err = classes.insert(ClassEntry::new("Car")).unwrap_err();
        assert!(matches!(err, CatalogError::Duplicate { .. }));
        assert_eq!(err.to_string(), "The Car class already exists");
        assert_eq!(classes.len(), 1);
    }

    #[test]
    fn test_remove_unknown_is_error() {
        let mut classes: Catalog<ClassEntry> = Catalog::new();
        assert!(matches!(
            classes.remove("Bus"),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_sort_by_name() {
        let mut catalog = Catalog::new();
        for name in ["banana.png", "Apple.png", "cherry.png", "apple.png"] {
            catalog.insert(image(name, None)).unwrap();
        }

        catalog.sort(SortOrder::NameAscending);
        assert_eq!(
            names(&catalog),
            vec!["Apple.png", "apple.png", "banana.png", "cherry.png"]
        );

        catalog.sort(SortOrder::NameDescending);
        assert_eq!(
            names(&catalog),
            vec!["cherry.png", "banana.png", "apple.png", "Apple.png"]
        );
    }

    #[test]
    fn test_sort_by_date_undated_last() {
        let mut catalog = Catalog::new();
        catalog.insert(image("new.png", Some(1))).unwrap();
        catalog.insert(image("unknown.png", None)).unwrap();
        catalog.insert(image("old.png", Some(10))).unwrap();
        catalog.insert(image("mid.png", Some(5))).unwrap();

        catalog.sort(SortOrder::DateAscending);
        assert_eq!(
            names(&catalog),
            vec!["old.png", "mid.png", "new.png", "unknown.png"]
        );

        catalog.sort(SortOrder::DateDescending);
        assert_eq!(
            names(&catalog),
            vec!["new.png", "mid.png", "old.png", "unknown.png"]
        );
    }

    #[test]
    fn test_add_report_notices() {
        let mut catalog = Catalog::new();
        let mut report = AddReport::new();
        for name in ["a.png", "b.png", "a.png"] {
            report.record(name, catalog.insert(image(name, None)));
        }
        assert_eq!(report.added, vec!["a.png", "b.png"]);
        assert_eq!(report.duplicates, vec!["a.png"]);
        assert_eq!(
            report.notices("image"),
            vec!["The a.png image already exists!"]
        );
    }
}
