//! Editing session: the entry point a UI layer talks to.
//!
//! A [`Session`] owns the annotation [`Scene`] of the open image together with
//! the image, class and annotation-file lists, and keeps them consistent:
//! opening an image clears the scene, choosing a class sets the label for new
//! shapes, and the drawing tools stay disabled until there is something to
//! annotate.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::catalog::{
    AddReport, AnnotationFileEntry, Catalog, CatalogEntry, CatalogError, ClassCatalog, ClassEntry,
    ImageEntry, SortOrder, is_image_file,
};
use crate::config::AppConfig;
use crate::format::{self, ExportResult, FormatError, FormatWarning};
use crate::keybindings::KeyBindings;
use crate::scene::{EditingMode, KeyEvent, PointerEvent, Scene, VisibleShape};

/// Errors surfaced by session operations.
#[derive(Error, Debug)]
pub enum SessionError {
    /// Reading or writing an annotation file failed
    #[error(transparent)]
    Format(#[from] FormatError),

    /// A catalog refused the operation
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    /// The toolbar is disabled until an image and a class are chosen
    #[error("The {mode} tool needs an open image and an active class")]
    ToolbarDisabled {
        /// Requested mode name
        mode: &'static str,
    },
}

/// State of one annotation session.
#[derive(Debug, Default)]
pub struct Session {
    scene: Scene,
    images: Catalog<ImageEntry>,
    classes: ClassCatalog,
    annotation_files: Catalog<AnnotationFileEntry>,
    keybindings: KeyBindings,
    /// Name of the image shown in the scene
    current_image: Option<String>,
    /// Whether a class was picked from the class list
    class_active: bool,
    /// Whether an annotation file was loaded into the scene
    annotations_loaded: bool,
    /// Folder annotation files go to unless the caller picks a path
    annotation_folder: Option<PathBuf>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a session using the keybindings and preferences in `config`.
    ///
    /// The configured class file is opened right away. A class file that
    /// can't be read is logged and skipped, the session starts without it.
    pub fn with_config(config: &AppConfig) -> Self {
        let preferences = &config.preferences;
        let keybindings = config.keybindings.to_keybindings();
        for conflict in keybindings.conflicts() {
            log::warn!("Keybindings: {}", conflict);
        }

        let scene = Scene::with_settings(keybindings.scene_settings(preferences.hit_tolerance));
        let mut session = Self {
            scene,
            keybindings,
            annotation_folder: preferences.annotation_folder.clone(),
            ..Self::default()
        };

        if let Some(path) = &preferences.class_file {
            if let Err(e) = session.open_class_file(path) {
                log::warn!("Could not open class file {:?}: {}", path, e);
            }
        }
        session
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    pub fn keybindings(&self) -> &KeyBindings {
        &self.keybindings
    }

    /// Replace the keybindings; the scene picks up the new modifier keys.
    pub fn set_keybindings(&mut self, keybindings: KeyBindings) {
        let tolerance = self.scene.settings().hit_tolerance;
        self.scene.set_settings(keybindings.scene_settings(tolerance));
        self.keybindings = keybindings;
    }

    /// Shapes to draw, including the in-progress draft.
    pub fn visible_shapes(&self) -> impl Iterator<Item = VisibleShape<'_>> {
        self.scene.visible_shapes()
    }

    // ========================================================================
    // Annotation Files
    // ========================================================================

    /// Replace the scene's shapes with those in an annotation file.
    ///
    /// Returns the warnings for entries that were skipped.
    pub fn load_annotations(&mut self, path: &Path) -> Result<Vec<FormatWarning>, SessionError> {
        let imported = format::load_annotations(path)?;
        for warning in &imported.warnings {
            log::warn!("{:?}: {}", path, warning);
        }

        self.scene.replace_shapes(imported.shapes);
        self.annotations_loaded = true;
        Ok(imported.warnings)
    }

    /// Write the scene's shapes to an annotation file.
    ///
    /// A polygon still being drawn is saved too once it has enough vertices.
    pub fn save_annotations(&self, path: &Path) -> Result<ExportResult, SessionError> {
        Ok(format::save_annotations(path, &self.scene.shapes_to_save())?)
    }

    /// Default annotation file for the open image: `<image stem>.json` in
    /// the configured annotation folder.
    pub fn default_annotation_path(&self) -> Option<PathBuf> {
        let folder = self.annotation_folder.as_ref()?;
        let image = self.images.get(self.current_image.as_deref()?)?;
        let stem = image.path().file_stem()?;
        Some(folder.join(stem).with_extension("json"))
    }

    pub fn annotation_folder(&self) -> Option<&Path> {
        self.annotation_folder.as_deref()
    }

    /// Add an annotation file to the list, refusing duplicate file names.
    pub fn register_annotation_file(&mut self, path: &Path) -> Result<(), SessionError> {
        let entry = AnnotationFileEntry::from_path(path)?;
        log::debug!("Registered annotation file {:?}", path);
        Ok(self.annotation_files.insert(entry)?)
    }

    /// Load a registered annotation file by name.
    pub fn load_registered_annotations(
        &mut self,
        name: &str,
    ) -> Result<Vec<FormatWarning>, SessionError> {
        let path = self
            .annotation_files
            .get(name)
            .map(|entry| entry.path().to_path_buf())
            .ok_or_else(|| CatalogError::not_found(AnnotationFileEntry::KIND, name))?;
        self.load_annotations(&path)
    }

    pub fn annotation_files(&self) -> &Catalog<AnnotationFileEntry> {
        &self.annotation_files
    }

    // ========================================================================
    // Images
    // ========================================================================

    /// Add image files to the image list.
    ///
    /// Files whose name is already listed are refused; paths that are not
    /// readable image files are skipped. Both are reported, not errors.
    pub fn add_images<P: AsRef<Path>>(&mut self, paths: impl IntoIterator<Item = P>) -> AddReport {
        let mut report = AddReport::new();
        for path in paths {
            let path = path.as_ref();
            let label = path.display().to_string();
            if !is_image_file(path) {
                report.skipped.push(format!("{}: not a supported image", label));
                continue;
            }
            match ImageEntry::from_path(path) {
                Ok(entry) => {
                    let name = entry.name().to_string();
                    let outcome = self.images.insert(entry);
                    report.record(&name, outcome);
                }
                Err(e) => report.record(&label, Err(e)),
            }
        }

        for notice in report.notices(ImageEntry::KIND) {
            log::warn!("{}", notice);
        }
        log::info!("Added {} images", report.added.len());
        report
    }

    /// Switch to an image. The previous image's shapes are discarded.
    pub fn open_image(&mut self, name: &str) -> Result<PathBuf, SessionError> {
        let path = self
            .images
            .get(name)
            .map(|entry| entry.path().to_path_buf())
            .ok_or_else(|| CatalogError::not_found(ImageEntry::KIND, name))?;

        self.scene.clear();
        self.current_image = Some(name.to_string());
        log::info!("Opened image '{}'", name);
        Ok(path)
    }

    pub fn current_image(&self) -> Option<&str> {
        self.current_image.as_deref()
    }

    pub fn images(&self) -> &Catalog<ImageEntry> {
        &self.images
    }

    pub fn sort_images(&mut self, order: SortOrder) {
        self.images.sort(order);
    }

    // ========================================================================
    // Classes
    // ========================================================================

    /// Load a class file and use it for later class edits.
    pub fn open_class_file(&mut self, path: &Path) -> Result<AddReport, SessionError> {
        let report = self.classes.open_file(path)?;
        for notice in report.notices(ClassEntry::KIND) {
            log::warn!("{}", notice);
        }
        Ok(report)
    }

    /// Create a class, refusing duplicates.
    pub fn create_class(&mut self, name: &str) -> Result<(), SessionError> {
        Ok(self.classes.create(name)?)
    }

    /// Delete a class from the list and the class file.
    pub fn delete_class(&mut self, name: &str) -> Result<(), SessionError> {
        self.classes.delete(name)?;
        if self.class_active && self.scene.current_class_name() == name {
            log::debug!("Deleted the active class '{}'", name);
            self.scene.set_current_class_name("");
            self.class_active = false;
            if !self.toolbar_enabled() {
                self.scene.set_mode(EditingMode::Idle);
            }
        }
        Ok(())
    }

    pub fn classes(&self) -> &ClassCatalog {
        &self.classes
    }

    /// Re-order the class list. Classes carry no dates, so only the name
    /// orders change anything.
    pub fn sort_classes(&mut self, order: SortOrder) {
        self.classes.sort(order);
    }

    /// Label given to shapes drawn from now on.
    pub fn set_active_class_name(&mut self, name: &str) {
        self.scene.set_current_class_name(name);
        self.class_active = true;
    }

    // ========================================================================
    // Tools and Input
    // ========================================================================

    /// Whether the tool modes can be used yet.
    pub fn toolbar_enabled(&self) -> bool {
        (self.current_image.is_some() && self.class_active) || self.annotations_loaded
    }

    /// Switch tools. Fails while the toolbar is disabled.
    pub fn set_mode(&mut self, mode: EditingMode) -> Result<(), SessionError> {
        if mode != EditingMode::Idle && !self.toolbar_enabled() {
            return Err(SessionError::ToolbarDisabled { mode: mode.name() });
        }
        self.scene.set_mode(mode);
        Ok(())
    }

    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.scene.handle_pointer(event);
    }

    /// Route a key event: tool hotkeys switch modes, everything else goes to
    /// the scene.
    pub fn handle_key(&mut self, event: KeyEvent) {
        if event.pressed {
            if let Some(mode) = self.keybindings.mode_for_key(event.key) {
                if let Err(e) = self.set_mode(mode) {
                    log::debug!("Ignoring hotkey: {}", e);
                }
                return;
            }
        }
        self.scene.handle_key(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::model::{Geometry, Shape};
    use crate::scene::Key;
    use std::fs;
    use tempfile::tempdir;

    fn session_with_image(dir: &Path) -> Session {
        let image = dir.join("street.png");
        fs::write(&image, b"png").unwrap();
        let mut session = Session::new();
        session.add_images([&image]);
        session.open_image("street.png").unwrap();
        session
    }

    fn drag(session: &mut Session, from: (f64, f64), to: (f64, f64)) {
        session.handle_pointer(PointerEvent::down(from.0, from.1));
        session.handle_pointer(PointerEvent::moved(to.0, to.1));
        session.handle_pointer(PointerEvent::up(to.0, to.1));
    }

    #[test]
    fn test_toolbar_gating() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());

        assert!(!session.toolbar_enabled());
        assert!(matches!(
            session.set_mode(EditingMode::DrawingRectangle),
            Err(SessionError::ToolbarDisabled { .. })
        ));

        session.set_active_class_name("Car");
        assert!(session.toolbar_enabled());
        session.set_mode(EditingMode::DrawingRectangle).unwrap();
        assert_eq!(session.scene().mode(), EditingMode::DrawingRectangle);
    }

    #[test]
    fn test_draw_save_and_reload() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());
        session.set_active_class_name("Car");
        session.set_mode(EditingMode::DrawingRectangle).unwrap();

        drag(&mut session, (10.0, 10.0), (110.0, 60.0));

        let path = dir.path().join("street.json");
        let saved = session.save_annotations(&path).unwrap();
        assert_eq!(saved.shapes_written, 1);

        let mut other = Session::new();
        let warnings = other.load_annotations(&path).unwrap();
        assert!(warnings.is_empty());
        assert!(other.toolbar_enabled());

        let shapes: Vec<&Shape> = other.visible_shapes().map(|v| v.shape).collect();
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].class_name, "Car");
        assert_eq!(
            shapes[0].geometry,
            Geometry::Rectangle {
                bounds: Rect::new(10.0, 10.0, 100.0, 50.0),
                rotation_degrees: 0.0,
            }
        );
    }

    #[test]
    fn test_open_image_clears_shapes() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());
        session.set_active_class_name("Car");
        session.set_mode(EditingMode::DrawingRectangle).unwrap();
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        assert_eq!(session.scene().store().len(), 1);

        session.open_image("street.png").unwrap();
        assert!(session.scene().store().is_empty());
        assert!(matches!(
            session.open_image("missing.png"),
            Err(SessionError::Catalog(CatalogError::NotFound { .. }))
        ));
    }

    #[test]
    fn test_add_images_reports_duplicates() {
        let dir = tempdir().unwrap();
        let image = dir.path().join("a.png");
        let text = dir.path().join("notes.txt");
        fs::write(&image, b"png").unwrap();
        fs::write(&text, b"txt").unwrap();

        let mut session = Session::new();
        let report = session.add_images([&image, &image, &text]);

        assert_eq!(report.added, vec!["a.png"]);
        assert_eq!(report.duplicates, vec!["a.png"]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(session.images().len(), 1);
    }

    #[test]
    fn test_create_class_twice_is_refused() {
        let mut session = Session::new();
        session.create_class("Car").unwrap();

        let err = session.create_class("Car").unwrap_err();
        assert!(matches!(
            err,
            SessionError::Catalog(CatalogError::Duplicate { .. })
        ));
        assert_eq!(err.to_string(), "The Car class already exists");
        assert_eq!(session.classes().classes().len(), 1);
    }

    #[test]
    fn test_class_file_workflow() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("obj.names");
        fs::write(&path, "Tree\nCar\n").unwrap();

        let mut session = Session::new();
        session.open_class_file(&path).unwrap();
        session.create_class("bus").unwrap();
        session.delete_class("Tree").unwrap();
        session.sort_classes(SortOrder::NameAscending);

        assert_eq!(session.classes().classes().names(), vec!["bus", "Car"]);
        assert_eq!(fs::read_to_string(&path).unwrap(), "Car\nbus\n");
    }

    #[test]
    fn test_registered_annotation_files() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("labels.json");
        fs::write(
            &path,
            r#"{"TotalShapes": 1, "objects": [{"object": "Tree", "shape": "Polygon",
                "coordinates": [0, 0, 10, 0, 10, 10, 0, 10]}]}"#,
        )
        .unwrap();

        let mut session = Session::new();
        session.register_annotation_file(&path).unwrap();
        assert!(session.register_annotation_file(&path).is_err());

        session.load_registered_annotations("labels.json").unwrap();
        assert_eq!(session.scene().store().len(), 1);
        assert!(session.load_registered_annotations("other.json").is_err());
    }

    #[test]
    fn test_hotkeys_switch_tools_once_enabled() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());

        session.handle_key(KeyEvent::pressed(Key::Char('p')));
        assert_eq!(session.scene().mode(), EditingMode::Idle);

        session.set_active_class_name("Tree");
        session.handle_key(KeyEvent::pressed(Key::Char('p')));
        assert_eq!(session.scene().mode(), EditingMode::DrawingPolygon);

        session.handle_key(KeyEvent::pressed(Key::Char('s')));
        assert_eq!(session.scene().mode(), EditingMode::Selecting);
    }

    #[test]
    fn test_save_includes_open_polygon() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());
        session.set_active_class_name("Tree");
        session.set_mode(EditingMode::DrawingPolygon).unwrap();
        for (x, y) in [(0.0, 0.0), (30.0, 0.0), (30.0, 30.0)] {
            session.handle_pointer(PointerEvent::down(x, y));
            session.handle_pointer(PointerEvent::up(x, y));
        }
        assert_eq!(session.visible_shapes().count(), 1);

        let path = dir.path().join("street.json");
        let saved = session.save_annotations(&path).unwrap();
        assert_eq!(saved.shapes_written, 1);

        let loaded = format::load_annotations(&path).unwrap();
        assert_eq!(loaded.shapes.len(), 1);
        assert_eq!(loaded.shapes[0].class_name, "Tree");
        assert_eq!(loaded.shapes[0].local_vertices().len(), 3);
        // Saving does not end the polygon
        assert!(session.scene().draft().is_some());
    }

    #[test]
    fn test_deleting_active_class_clears_it() {
        let dir = tempdir().unwrap();
        let mut session = session_with_image(dir.path());
        session.create_class("Car").unwrap();
        session.set_active_class_name("Car");
        session.set_mode(EditingMode::DrawingRectangle).unwrap();

        session.delete_class("Car").unwrap();

        assert_eq!(session.scene().current_class_name(), "");
        assert!(!session.toolbar_enabled());
        assert_eq!(session.scene().mode(), EditingMode::Idle);
        drag(&mut session, (0.0, 0.0), (50.0, 50.0));
        assert!(session.scene().store().is_empty());
    }

    #[test]
    fn test_config_opens_class_file_and_annotation_folder() {
        let dir = tempdir().unwrap();
        let class_file = dir.path().join("obj.names");
        fs::write(&class_file, "Car\nTree\n").unwrap();
        let labels = dir.path().join("labels");

        let mut config = AppConfig::new();
        config.preferences.class_file = Some(class_file);
        config.preferences.annotation_folder = Some(labels.clone());

        let mut session = Session::with_config(&config);
        assert_eq!(session.classes().classes().names(), vec!["Car", "Tree"]);
        assert_eq!(session.annotation_folder(), Some(labels.as_path()));
        assert_eq!(session.default_annotation_path(), None);

        let image = dir.path().join("street.png");
        fs::write(&image, b"png").unwrap();
        session.add_images([&image]);
        session.open_image("street.png").unwrap();
        assert_eq!(
            session.default_annotation_path(),
            Some(labels.join("street.json"))
        );
    }

    #[test]
    fn test_config_with_missing_class_file() {
        let dir = tempdir().unwrap();
        let mut config = AppConfig::new();
        config.preferences.class_file = Some(dir.path().join("missing.names"));

        let session = Session::with_config(&config);
        assert!(session.classes().classes().is_empty());
        assert!(session.classes().file().is_none());
    }

    #[test]
    fn test_config_keybindings_reach_scene() {
        let mut config = AppConfig::new();
        config.keybindings.edit_modifier = Key::Alt;
        config.preferences.hit_tolerance = 9.0;

        let session = Session::with_config(&config);
        assert_eq!(session.scene().settings().edit_modifier, Key::Alt);
        assert_eq!(session.scene().settings().hit_tolerance, 9.0);
    }
}
