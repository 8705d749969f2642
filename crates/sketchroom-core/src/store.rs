//! Ordered shape store with snapshot-based undo/redo.
//!
//! Raw operations (`insert`, `replace`, `remove`, `clear`) never touch history;
//! they write live drag previews. The `commit_*` family records the prior
//! sequence first, so every user-committed action can be undone. Mutations
//! from other clients go through `apply_remote`, which also rewrites the saved
//! undo and redo states so that undo never reverts someone else's change.

use crate::protocol::ShapeMessage;
use crate::shapes::{Shape, ShapeId};
use kurbo::Point;
use std::collections::HashSet;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 100;

/// Shapes in paint order (back to front) plus undo/redo stacks.
#[derive(Debug, Clone, Default)]
pub struct ShapeStore {
    shapes: Vec<Shape>,
    undo_stack: Vec<Vec<Shape>>,
    redo_stack: Vec<Vec<Shape>>,
    /// Ids deleted before the persisted shapes were seeded.
    removed: HashSet<ShapeId>,
    /// A clear happened before seeding.
    cleared: bool,
}

impl ShapeStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current shape sequence.
    pub fn snapshot(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    pub fn get(&self, id: &ShapeId) -> Option<&Shape> {
        self.shapes.iter().find(|s| s.id() == id)
    }

    pub fn contains(&self, id: &ShapeId) -> bool {
        self.position(id).is_some()
    }

    fn position(&self, id: &ShapeId) -> Option<usize> {
        self.shapes.iter().position(|s| s.id() == id)
    }

    /// Topmost shape under `point`.
    pub fn shape_at(&self, point: Point) -> Option<&Shape> {
        self.shapes.iter().rev().find(|s| s.hit_test(point))
    }

    /// Append a shape. An id that is already present is replaced in place so
    /// ids stay unique.
    pub fn insert(&mut self, shape: Shape) {
        match self.position(shape.id()) {
            Some(idx) => self.shapes[idx] = shape,
            None => self.shapes.push(shape),
        }
    }

    /// Replace the shape with `id`, keeping its position. Returns false (and
    /// changes nothing) if the id is absent.
    pub fn replace(&mut self, id: &ShapeId, shape: Shape) -> bool {
        match self.position(id) {
            Some(idx) => {
                self.shapes[idx] = shape;
                true
            }
            None => false,
        }
    }

    /// Remove the shape with `id`.
    pub fn remove(&mut self, id: &ShapeId) -> Option<Shape> {
        self.position(id).map(|idx| self.shapes.remove(idx))
    }

    /// Remove every shape.
    pub fn clear(&mut self) {
        self.shapes.clear();
    }

    /// Apply a mutation from another client to the current sequence and to
    /// every saved undo/redo state. No history entry is recorded.
    pub fn apply_remote(&mut self, message: &ShapeMessage) {
        message.apply_to(&mut self.shapes);
        for state in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            message.apply_to(state);
        }
        self.note_removal(message);
    }

    fn note_removal(&mut self, message: &ShapeMessage) {
        match message {
            ShapeMessage::Delete(id) => {
                self.removed.insert(id.clone());
            }
            ShapeMessage::Clear => self.cleared = true,
            ShapeMessage::Create(_) | ShapeMessage::Update(_) => {}
        }
    }

    /// Seed with persisted shapes. Shapes already applied from live messages
    /// win; seeded shapes that are new go underneath them. Shapes deleted or
    /// cleared before seeding stay gone.
    pub fn seed(&mut self, shapes: Vec<Shape>) {
        let mut seeded: Vec<Shape> = Vec::with_capacity(shapes.len());
        if !self.cleared {
            for shape in shapes {
                if self.removed.contains(shape.id())
                    || seeded.iter().any(|s| s.id() == shape.id())
                {
                    continue;
                }
                seeded.push(shape);
            }
        }
        self.removed.clear();
        self.cleared = false;

        underlay(&mut self.shapes, &seeded);
        for state in self.undo_stack.iter_mut().chain(self.redo_stack.iter_mut()) {
            underlay(state, &seeded);
        }
    }

    /// Record `prior` as a history entry and clear redo.
    fn record(&mut self, prior: Vec<Shape>) {
        self.undo_stack.push(prior);
        self.redo_stack.clear();
        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Push the current state to the undo stack (call before making changes).
    pub fn push_undo(&mut self) {
        self.record(self.shapes.clone());
    }

    pub fn commit_insert(&mut self, shape: Shape) {
        self.push_undo();
        self.insert(shape);
    }

    pub fn commit_replace(&mut self, id: &ShapeId, shape: Shape) -> bool {
        if !self.contains(id) {
            return false;
        }
        self.push_undo();
        self.replace(id, shape)
    }

    pub fn commit_remove(&mut self, id: &ShapeId) -> Option<Shape> {
        if !self.contains(id) {
            return None;
        }
        self.push_undo();
        self.removed.insert(id.clone());
        self.remove(id)
    }

    pub fn commit_clear(&mut self) {
        self.push_undo();
        self.cleared = true;
        self.clear();
    }

    /// Commit the end of a drag whose live previews were written with
    /// `replace`. The history entry is the current sequence with the dragged
    /// shape reverted to `original`. Returns false when the shape had been
    /// removed meanwhile and is re-inserted instead.
    pub fn commit_drag(&mut self, original: &Shape, shape: Shape) -> bool {
        let id = shape.id().clone();
        match self.position(&id) {
            Some(idx) => {
                let mut prior = self.shapes.clone();
                prior[idx] = original.clone();
                self.record(prior);
                self.shapes[idx] = shape;
                true
            }
            None => {
                self.push_undo();
                self.shapes.push(shape);
                false
            }
        }
    }

    /// Undo the last committed change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self) -> bool {
        match self.undo_stack.pop() {
            Some(prior) => {
                let current = std::mem::replace(&mut self.shapes, prior);
                self.redo_stack.push(current);
                true
            }
            None => false,
        }
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self) -> bool {
        match self.redo_stack.pop() {
            Some(next) => {
                let current = std::mem::replace(&mut self.shapes, next);
                self.undo_stack.push(current);
                true
            }
            None => false,
        }
    }

    /// Check if undo is available.
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    /// Check if redo is available.
    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }
}

/// Put `seeded` shapes missing from `state` underneath it.
fn underlay(state: &mut Vec<Shape>, seeded: &[Shape]) {
    let mut merged: Vec<Shape> = seeded
        .iter()
        .filter(|s| !state.iter().any(|live| live.id() == s.id()))
        .cloned()
        .collect();
    merged.append(state);
    *state = merged;
}
