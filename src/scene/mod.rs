//! Interactive annotation scene.
//!
//! The [`Scene`] owns the shapes of the open image and turns pointer and
//! keyboard input into shape edits according to the active [`EditingMode`]:
//!
//! - **Selecting**: click to select (topmost wins), drag to move the
//!   selection, drag on empty canvas for a rubber-band selection
//! - **Drawing**: lines and rectangles/trapezoids are dragged out, polygons
//!   get one vertex per click and are finalized when the mode changes
//! - **Editing**: with the edit modifier held and one shape selected, every
//!   pointer move drags the nearest corner/vertex to the pointer
//! - **Rotating**: every pointer move turns the selection towards the pointer
//!
//! Shapes still being drawn live in a single draft slot that is replaced on
//! every update and only moves into the store when finalized. Invalid
//! gestures (too small, non-convex trapezoid edits) are ignored.

mod edit;
mod event;
mod mode;


pub use edit::{Rotation, drawn_bounds, resize_towards};
pub use event::{Key, KeyEvent, PointerEvent, PointerEventKind};
pub use mode::EditingMode;

use crate::constants::{DEFAULT_HIT_TOLERANCE, MIN_POLYGON_VERTICES};
use crate::geometry::{Point, Rect};
use crate::model::{AnnotationSet, Geometry, Shape, ShapeId};

/// Key assignments and tolerances the scene needs at runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneSettings {
    /// Holding this key with one shape selected enters Editing (or Rotating).
    pub edit_modifier: Key,
    /// Removes every selected shape.
    pub delete_key: Key,
    /// Hit radius (scene units) for lines and degenerate polygons.
    pub hit_tolerance: f64,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            edit_modifier: Key::Control,
            delete_key: Key::Delete,
            hit_tolerance: DEFAULT_HIT_TOLERANCE,
        }
    }
}

/// Pointer gesture currently in progress.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
enum Gesture {
    #[default]
    None,
    /// Dragging a line out of `origin`.
    Line { origin: Point },
    /// Rubber band from `origin` to `current`.
    RubberBand { origin: Point, current: Point },
    /// Moving the selection; `last` is the previous pointer position.
    Moving { last: Point },
}

/// A shape as the renderer should draw it.
#[derive(Debug, Clone, Copy)]
pub struct VisibleShape<'a> {
    /// Store handle, `None` for the draft.
    pub id: Option<ShapeId>,
    pub shape: &'a Shape,
    pub selected: bool,
    pub is_draft: bool,
}

/// The annotation editor state machine.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    /// Mode pointer input is interpreted in.
    mode: EditingMode,
    /// Last mode chosen through [`Scene::set_mode`]; the edit modifier
    /// enters Rotating instead of Editing while this is Rotating.
    toolbar_mode: EditingMode,
    /// Whether the current Editing/Rotating mode came from the modifier key.
    modifier_active: bool,
    store: AnnotationSet,
    /// In-progress shape, replaced wholesale on every update.
    draft: Option<Shape>,
    gesture: Gesture,
    /// Rotation in progress, anchored where it started.
    rotation: Option<Rotation>,
    current_class_name: String,
    settings: SceneSettings,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: SceneSettings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    pub fn mode(&self) -> EditingMode {
        self.mode
    }

    pub fn settings(&self) -> &SceneSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: SceneSettings) {
        self.settings = settings;
    }

    pub fn store(&self) -> &AnnotationSet {
        &self.store
    }

    /// Mutable access for programmatic edits (selection, bulk changes).
    pub fn store_mut(&mut self) -> &mut AnnotationSet {
        self.rotation = None;
        &mut self.store
    }

    /// The shape currently being drawn, if any.
    pub fn draft(&self) -> Option<&Shape> {
        self.draft.as_ref()
    }

    /// Rubber band of an in-progress selection or rectangle drag.
    pub fn rubber_band(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::RubberBand { origin, current } => Some(Rect::from_corners(origin, current)),
            _ => None,
        }
    }

    pub fn current_class_name(&self) -> &str {
        &self.current_class_name
    }

    /// Class label given to shapes created from now on.
    pub fn set_current_class_name(&mut self, name: impl Into<String>) {
        self.current_class_name = name.into();
        log::debug!("Scene: current class is now '{}'", self.current_class_name);
    }

    /// Switch the toolbar mode. Any draft is finalized first.
    pub fn set_mode(&mut self, mode: EditingMode) {
        self.enter_mode(mode);
        self.toolbar_mode = mode;
        self.modifier_active = false;
        if mode.is_drawing() {
            self.store.clear_selection();
        }
    }

    /// Drop every shape and any draft; used when switching images.
    pub fn clear(&mut self) {
        self.store.clear();
        self.draft = None;
        self.gesture = Gesture::None;
        self.rotation = None;
    }

    /// Shapes to write out: the stored shapes plus the draft, if it is
    /// already a complete shape. The draft stays open for further edits.
    pub fn shapes_to_save(&self) -> AnnotationSet {
        let draft = self.draft.iter().filter(|d| is_complete(d)).cloned();
        AnnotationSet::from_shapes(self.store.shapes().cloned().chain(draft))
    }

    /// Replace all shapes, e.g. after loading an annotation file.
    pub fn replace_shapes(&mut self, shapes: impl IntoIterator<Item = Shape>) {
        self.clear();
        for shape in shapes {
            self.store.add(shape);
        }
        log::info!("Scene: loaded {} shapes", self.store.len());
    }

    /// Everything to draw: stored shapes in draw order, then the draft.
    pub fn visible_shapes(&self) -> impl Iterator<Item = VisibleShape<'_>> {
        let stored = self.store.all().map(|a| VisibleShape {
            id: Some(a.id()),
            shape: a.shape(),
            selected: a.is_selected(),
            is_draft: false,
        });
        let draft = self.draft.iter().map(|shape| VisibleShape {
            id: None,
            shape,
            selected: false,
            is_draft: true,
        });
        stored.chain(draft)
    }

    fn enter_mode(&mut self, mode: EditingMode) {
        self.finalize_draft();
        self.gesture = Gesture::None;
        self.rotation = None;
        if self.mode != mode {
            log::debug!("Scene: mode {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Move the draft into the store if it is a complete shape.
    fn finalize_draft(&mut self) {
        let Some(draft) = self.draft.take() else {
            return;
        };

        if is_complete(&draft) {
            let kind = draft.kind();
            let id = self.store.add(draft);
            log::info!("Scene: finalized {} {}", kind, id);
        } else {
            log::debug!("Scene: discarded incomplete {} draft", draft.kind());
        }
    }

    fn new_shape(&self, geometry: Geometry) -> Shape {
        Shape::new(self.current_class_name.clone(), geometry)
    }

    // ========================================================================
    // Pointer Input
    // ========================================================================

    /// Dispatch a pointer event to the matching handler.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        match event.kind {
            PointerEventKind::Down => self.on_pointer_down(event.position),
            PointerEventKind::Move => self.on_pointer_move(event.position),
            PointerEventKind::Up => self.on_pointer_up(event.position),
        }
    }

    pub fn on_pointer_down(&mut self, pos: Point) {
        log::trace!(
            "Pointer down: mode={}, pos=({:.1}, {:.1})",
            self.mode.name(),
            pos.x,
            pos.y
        );

        match self.mode {
            EditingMode::Idle | EditingMode::Editing => {}
            EditingMode::Selecting => self.begin_selection(pos),
            EditingMode::Rotating => {
                // Pick what to rotate; no move drag
                match self.store.hit_test(pos, self.settings.hit_tolerance) {
                    Some(id) => {
                        if !self.store.is_selected(id) {
                            self.store.select_only(id);
                        }
                    }
                    None => self.store.clear_selection(),
                }
            }
            EditingMode::DrawingLine => {
                self.draft = None;
                self.gesture = Gesture::Line { origin: pos };
            }
            EditingMode::DrawingRectangle | EditingMode::DrawingTrapezoid => {
                self.draft = None;
                self.gesture = Gesture::RubberBand {
                    origin: pos,
                    current: pos,
                };
            }
            EditingMode::DrawingPolygon => self.add_polygon_point(pos),
        }
    }

    pub fn on_pointer_move(&mut self, pos: Point) {
        match self.mode {
            EditingMode::Idle => {}
            EditingMode::Selecting => match &mut self.gesture {
                Gesture::Moving { last } => {
                    let (dx, dy) = (pos.x - last.x, pos.y - last.y);
                    *last = pos;
                    for id in self.store.selected_ids() {
                        if let Some(shape) = self.store.get_mut(id) {
                            shape.translate(dx, dy);
                        }
                    }
                }
                Gesture::RubberBand { current, .. } => *current = pos,
                Gesture::None | Gesture::Line { .. } => {}
            },
            EditingMode::DrawingLine => {
                if let Gesture::Line { origin } = self.gesture {
                    self.draft = Some(self.new_shape(Geometry::Line { origin, end: pos }));
                }
            }
            EditingMode::DrawingRectangle | EditingMode::DrawingTrapezoid => {
                if let Gesture::RubberBand { origin, current } = &mut self.gesture {
                    *current = pos;
                    let bounds = Rect::from_corners(*origin, pos);
                    let preview = if self.mode == EditingMode::DrawingRectangle {
                        Shape::rectangle(self.current_class_name.clone(), bounds)
                    } else {
                        Shape::trapezoid_in(self.current_class_name.clone(), bounds)
                    };
                    self.draft = Some(preview);
                }
            }
            EditingMode::DrawingPolygon => {}
            EditingMode::Editing => self.edit_selected(pos),
            EditingMode::Rotating => self.rotate_selection(pos),
        }
    }

    pub fn on_pointer_up(&mut self, pos: Point) {
        let gesture = std::mem::take(&mut self.gesture);

        match (self.mode, gesture) {
            (EditingMode::Selecting, Gesture::RubberBand { origin, .. }) => {
                let band = Rect::from_corners(origin, pos);
                if band.width > 0.0 || band.height > 0.0 {
                    for id in self.store.intersecting(&band) {
                        self.store.set_selected(id, true);
                    }
                    log::debug!(
                        "Rubber band selected {} shapes",
                        self.store.selected_count()
                    );
                }
            }
            (EditingMode::DrawingLine, Gesture::Line { origin }) => {
                self.draft = Some(self.new_shape(Geometry::Line { origin, end: pos }));
                self.finalize_draft();
            }
            (EditingMode::DrawingRectangle, Gesture::RubberBand { origin, .. }) => {
                self.draft = None;
                self.commit_drawn(origin, pos, false);
            }
            (EditingMode::DrawingTrapezoid, Gesture::RubberBand { origin, .. }) => {
                self.draft = None;
                self.commit_drawn(origin, pos, true);
            }
            _ => {}
        }
    }

    fn begin_selection(&mut self, pos: Point) {
        match self.store.hit_test(pos, self.settings.hit_tolerance) {
            Some(id) => {
                // Clicking into an existing selection keeps it so it can be moved
                if !self.store.is_selected(id) {
                    self.store.select_only(id);
                }
                self.gesture = Gesture::Moving { last: pos };
                log::debug!("Selected {}", id);
            }
            None => {
                self.store.clear_selection();
                self.gesture = Gesture::RubberBand {
                    origin: pos,
                    current: pos,
                };
            }
        }
    }

    fn commit_drawn(&mut self, origin: Point, end: Point, trapezoid: bool) {
        let Some(bounds) = drawn_bounds(origin, end) else {
            log::debug!("Ignored drag smaller than the minimum shape size");
            return;
        };

        let shape = if trapezoid {
            Shape::trapezoid_in(self.current_class_name.clone(), bounds)
        } else {
            Shape::rectangle(self.current_class_name.clone(), bounds)
        };
        let kind = shape.kind();
        let id = self.store.add(shape);
        log::info!(
            "Added {} {} at ({:.1}, {:.1}) {:.1}x{:.1}",
            kind,
            id,
            bounds.x,
            bounds.y,
            bounds.width,
            bounds.height
        );
    }

    /// Append a vertex to the draft polygon, replacing the previous draft.
    fn add_polygon_point(&mut self, pos: Point) {
        let mut vertices = match self.draft.take() {
            Some(Shape {
                geometry: Geometry::Polygon { vertices },
                ..
            }) => vertices,
            _ => Vec::new(),
        };
        vertices.push(pos);
        log::debug!("Polygon draft now has {} vertices", vertices.len());
        self.draft = Some(self.new_shape(Geometry::Polygon { vertices }));
    }

    fn rotate_selection(&mut self, pos: Point) {
        let stale = self
            .rotation
            .as_ref()
            .is_none_or(|rotation| !rotation.matches(&self.store));
        if stale {
            self.rotation = Rotation::capture(&self.store);
        }
        if let Some(rotation) = &self.rotation {
            rotation.apply(&mut self.store, pos);
        }
    }

    fn edit_selected(&mut self, pos: Point) {
        let Some(id) = self.store.single_selected() else {
            return;
        };
        let edited = self
            .store
            .get(id)
            .and_then(|shape| resize_towards(shape, pos));
        if let (Some(geometry), Some(shape)) = (edited, self.store.get_mut(id)) {
            shape.geometry = geometry;
        }
    }

    // ========================================================================
    // Keyboard Input
    // ========================================================================

    /// Dispatch a key event to the matching handler.
    pub fn handle_key(&mut self, event: KeyEvent) {
        if event.pressed {
            self.on_key_down(event.key);
        } else {
            self.on_key_up(event.key);
        }
    }

    pub fn on_key_down(&mut self, key: Key) {
        if key == self.settings.delete_key {
            let removed = self.store.remove_selected();
            if !removed.is_empty() {
                log::info!("Deleted {} selected shapes", removed.len());
            }
        }

        if key == self.settings.edit_modifier && !self.modifier_active {
            if self.store.single_selected().is_none() {
                log::trace!("Edit modifier ignored: exactly one shape must be selected");
                return;
            }
            let target = if self.toolbar_mode == EditingMode::Rotating {
                EditingMode::Rotating
            } else {
                EditingMode::Editing
            };
            self.enter_mode(target);
            self.modifier_active = true;
        }
    }

    pub fn on_key_up(&mut self, key: Key) {
        if key == self.settings.edit_modifier && self.modifier_active {
            self.enter_mode(EditingMode::Selecting);
            self.modifier_active = false;
        }
    }
}

/// Whether a draft is a shape worth keeping.
fn is_complete(draft: &Shape) -> bool {
    match &draft.geometry {
        Geometry::Polygon { vertices } => vertices.len() >= MIN_POLYGON_VERTICES,
        Geometry::Line { origin, end } => origin != end,
        // Rectangle/trapezoid drafts are only previews of a drag
        Geometry::Rectangle { .. } | Geometry::Trapezoid { .. } => false,
    }
}
