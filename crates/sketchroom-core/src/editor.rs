//! Interaction state machine.
//!
//! The [`Editor`] owns the shape store, camera, tool manager and selection.
//! Hosts feed it [`PointerEvent`]s and [`KeyEvent`]s; every committed local
//! mutation comes back as a [`ShapeMessage`] for the caller to broadcast.
//! Remote mutations go in through [`Editor::apply_remote`].

use crate::camera::Camera;
use crate::input::{KeyEvent, MouseButton, PointerEvent, is_space};
use crate::protocol::ShapeMessage;
use crate::selection::{ManipulationState, pick_handle};
use crate::shapes::{Shape, ShapeId};
use crate::store::ShapeStore;
use crate::tools::{ToolKind, ToolManager};
use kurbo::Point;

/// Host-provided prompts for tools that need user input.
pub trait Prompts {
    /// Text content for a new text shape at `at` (world coordinates).
    /// `None` cancels.
    fn text_content(&mut self, at: Point) -> Option<String>;

    /// Confirm clearing the whole canvas.
    fn confirm_clear(&mut self) -> bool;
}

/// Current interaction.
#[derive(Debug, Clone, Default)]
pub enum Interaction {
    #[default]
    Idle,
    /// A shape is being stretched from an anchor; see [`Editor::preview`].
    Drawing,
    DraggingMove(ManipulationState),
    DraggingResize(ManipulationState),
    /// Panning; `last` is the previous pointer in screen coordinates.
    Panning { last: Point },
}

impl Interaction {
    pub fn is_idle(&self) -> bool {
        matches!(self, Interaction::Idle)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Interaction::Idle => "idle",
            Interaction::Drawing => "drawing",
            Interaction::DraggingMove(_) => "dragging-move",
            Interaction::DraggingResize(_) => "dragging-resize",
            Interaction::Panning { .. } => "panning",
        }
    }
}

/// Canvas editing state driven by input events.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    store: ShapeStore,
    camera: Camera,
    tools: ToolManager,
    selection: Option<ShapeId>,
    interaction: Interaction,
    space_held: bool,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ShapeStore {
        &self.store
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera access for hosts (fit to content, reset).
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn tools(&self) -> &ToolManager {
        &self.tools
    }

    /// Tool manager access for changing the active style.
    pub fn tools_mut(&mut self) -> &mut ToolManager {
        &mut self.tools
    }

    pub fn current_tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn selection(&self) -> Option<&ShapeId> {
        self.selection.as_ref()
    }

    /// The selected shape, if it is still in the store.
    pub fn selected_shape(&self) -> Option<&Shape> {
        self.selection.as_ref().and_then(|id| self.store.get(id))
    }

    pub fn interaction(&self) -> &Interaction {
        &self.interaction
    }

    pub fn space_held(&self) -> bool {
        self.space_held
    }

    /// Shape being drawn, not yet in the store.
    pub fn preview(&self) -> Option<Shape> {
        match self.interaction {
            Interaction::Drawing => self.tools.preview_shape(),
            _ => None,
        }
    }

    /// Select a tool. An in-progress drawing is cancelled.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tools.set_tool(tool);
        if matches!(self.interaction, Interaction::Drawing) {
            self.interaction = Interaction::Idle;
        }
        if tool != ToolKind::Select {
            self.selection = None;
        }
    }

    /// Handle a pointer event. Returns the committed mutation, if any.
    pub fn handle_pointer_event(
        &mut self,
        event: &PointerEvent,
        prompts: &mut dyn Prompts,
    ) -> Option<ShapeMessage> {
        match *event {
            PointerEvent::Down { position, button } => self.pointer_down(position, button, prompts),
            PointerEvent::Move { position } => {
                self.pointer_move(position);
                None
            }
            PointerEvent::Up { position, .. } => self.pointer_up(position),
            PointerEvent::Scroll { position, delta } => {
                self.camera.scroll_zoom(position, delta.y);
                None
            }
        }
    }

    /// Handle a keyboard event. Returns true if the key was consumed.
    pub fn handle_key_event(&mut self, event: &KeyEvent) -> bool {
        match event {
            KeyEvent::Pressed { key, modifiers } => {
                if is_space(key) {
                    self.space_held = true;
                    return true;
                }
                if modifiers.command() {
                    return match key.to_ascii_lowercase().as_str() {
                        "z" if modifiers.shift => self.redo(),
                        "z" => self.undo(),
                        "y" => self.redo(),
                        _ => false,
                    };
                }
                match ToolKind::from_key(key) {
                    Some(tool) => {
                        self.set_tool(tool);
                        true
                    }
                    None => false,
                }
            }
            KeyEvent::Released { key } => {
                if is_space(key) {
                    self.space_held = false;
                    true
                } else {
                    false
                }
            }
        }
    }

    fn pointer_down(
        &mut self,
        position: Point,
        button: MouseButton,
        prompts: &mut dyn Prompts,
    ) -> Option<ShapeMessage> {
        if button == MouseButton::Middle || (self.space_held && button == MouseButton::Left) {
            self.tools.cancel();
            self.interaction = Interaction::Panning { last: position };
            return None;
        }
        if button != MouseButton::Left || !self.interaction.is_idle() {
            return None;
        }

        let world = self.camera.screen_to_world(position);
        match self.tools.current_tool {
            ToolKind::Select => {
                self.begin_select(world);
                None
            }
            tool if tool.is_drawing() => {
                self.tools.begin(world);
                self.interaction = Interaction::Drawing;
                None
            }
            ToolKind::Eraser => {
                let id = self.store.shape_at(world)?.id().clone();
                self.store.commit_remove(&id)?;
                if self.selection.as_ref() == Some(&id) {
                    self.selection = None;
                }
                Some(ShapeMessage::Delete(id))
            }
            ToolKind::Text => {
                let content = prompts.text_content(world)?;
                if content.is_empty() {
                    return None;
                }
                let shape = self.tools.text_shape(world, content);
                self.store.commit_insert(shape.clone());
                Some(ShapeMessage::Create(shape))
            }
            ToolKind::Clear => {
                if !prompts.confirm_clear() {
                    return None;
                }
                self.store.commit_clear();
                self.selection = None;
                Some(ShapeMessage::Clear)
            }
            _ => None,
        }
    }

    fn begin_select(&mut self, world: Point) {
        // Handles of the selected shape win over body hits.
        if let Some(shape) = self.selected_shape() {
            if let Some(handle) = pick_handle(shape, world, self.camera.zoom) {
                let state = ManipulationState::new(Some(handle), world, shape.clone());
                self.interaction = Interaction::DraggingResize(state);
                return;
            }
        }

        match self.store.shape_at(world) {
            Some(shape) => {
                self.selection = Some(shape.id().clone());
                let state = ManipulationState::new(None, world, shape.clone());
                self.interaction = Interaction::DraggingMove(state);
            }
            None => self.selection = None,
        }
    }

    fn pointer_move(&mut self, position: Point) {
        let world = self.camera.screen_to_world(position);
        match &mut self.interaction {
            Interaction::Idle => {}
            Interaction::Drawing => self.tools.update(world),
            Interaction::DraggingMove(state) | Interaction::DraggingResize(state) => {
                let live = state.update(world).clone();
                // Absent when removed remotely; the drag keeps its own copy.
                self.store.replace(&state.shape_id, live);
            }
            Interaction::Panning { last } => {
                self.camera.pan(position - *last);
                *last = position;
            }
        }
    }

    fn pointer_up(&mut self, position: Point) -> Option<ShapeMessage> {
        let world = self.camera.screen_to_world(position);
        match std::mem::take(&mut self.interaction) {
            Interaction::Idle | Interaction::Panning { .. } => None,
            Interaction::Drawing => {
                let shape = self.tools.end(world)?;
                self.store.commit_insert(shape.clone());
                Some(ShapeMessage::Create(shape))
            }
            Interaction::DraggingMove(mut state) | Interaction::DraggingResize(mut state) => {
                state.update(world);
                self.finish_drag(state)
            }
        }
    }

    fn finish_drag(&mut self, state: ManipulationState) -> Option<ShapeMessage> {
        if !state.is_modified() {
            return None;
        }
        let shape = state.live_shape;
        if self.store.commit_drag(&state.original_shape, shape.clone()) {
            Some(ShapeMessage::Update(shape))
        } else {
            log::warn!(
                "Shape {} was removed while being dragged; re-inserting it",
                state.shape_id
            );
            self.selection = Some(state.shape_id);
            Some(ShapeMessage::Create(shape))
        }
    }

    /// Undo the last local commit. Never broadcast.
    pub fn undo(&mut self) -> bool {
        let done = self.store.undo();
        self.prune_selection();
        done
    }

    /// Redo the last undone commit. Never broadcast.
    pub fn redo(&mut self) -> bool {
        let done = self.store.redo();
        self.prune_selection();
        done
    }

    /// Apply a mutation received from another client. No history is
    /// recorded, and saved undo/redo states see the change too; updates and
    /// deletes for unknown ids are ignored.
    pub fn apply_remote(&mut self, message: ShapeMessage) {
        log::debug!("Applying remote {}", message.kind());
        self.store.apply_remote(&message);
        self.prune_selection();
    }

    /// Seed the store with persisted shapes (load path).
    pub fn seed(&mut self, shapes: Vec<Shape>) {
        self.store.seed(shapes);
    }

    fn prune_selection(&mut self) {
        if let Some(id) = &self.selection {
            if !self.store.contains(id) {
                self.selection = None;
            }
        }
    }
}
