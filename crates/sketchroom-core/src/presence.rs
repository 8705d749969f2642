//! Ephemeral presence: remote cursors and the room roster.

use crate::protocol::RosterEntry;
use kurbo::Point;
use std::collections::HashMap;

/// Last known pointer of a remote user, in world coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteCursor {
    pub user_id: String,
    pub name: String,
    pub position: Point,
}

/// Presence state for one room. No history, no undo.
#[derive(Debug, Clone, Default)]
pub struct Presence {
    cursors: HashMap<String, RemoteCursor>,
    roster: Vec<RosterEntry>,
}

impl Presence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the cursor entry for `user_id` wholesale.
    pub fn update_cursor(&mut self, user_id: String, name: String, position: Point) {
        self.cursors.insert(
            user_id.clone(),
            RemoteCursor {
                user_id,
                name,
                position,
            },
        );
    }

    /// Replace the roster. Cursors of users no longer listed are dropped.
    pub fn set_roster(&mut self, users: Vec<RosterEntry>) {
        self.cursors
            .retain(|id, _| users.iter().any(|u| &u.user_id == id));
        self.roster = users;
    }

    pub fn roster(&self) -> &[RosterEntry] {
        &self.roster
    }

    pub fn cursor(&self, user_id: &str) -> Option<&RemoteCursor> {
        self.cursors.get(user_id)
    }

    pub fn cursors(&self) -> impl Iterator<Item = &RemoteCursor> {
        self.cursors.values()
    }

    pub fn clear(&mut self) {
        self.cursors.clear();
        self.roster.clear();
    }
}
