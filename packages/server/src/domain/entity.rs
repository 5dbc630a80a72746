//! Entities of the membership domain.

use serde::Serialize;

use super::value_object::{ConnectionId, DisplayName, RoomKey, Timestamp};

/// A connection paired with the name it uses inside one room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Member {
    pub connection_id: ConnectionId,
    pub display_name: DisplayName,
    /// When the connection first joined the room (kept across renames)
    pub joined_at: Timestamp,
}

impl Member {
    pub fn new(connection_id: ConnectionId, display_name: DisplayName, joined_at: Timestamp) -> Self {
        Self {
            connection_id,
            display_name,
            joined_at,
        }
    }
}

/// A named group of members, kept in join order.
///
/// A room only exists while it has at least one member; the registry removes
/// it as soon as the last member leaves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Room {
    pub key: RoomKey,
    pub members: Vec<Member>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(key: RoomKey, created_at: Timestamp) -> Self {
        Self {
            key,
            members: Vec::new(),
            created_at,
        }
    }

    pub fn member(&self, connection_id: &ConnectionId) -> Option<&Member> {
        self.members
            .iter()
            .find(|m| &m.connection_id == connection_id)
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.member(connection_id).is_some()
    }

    /// Whether a member other than `connection_id` already uses `name`
    pub fn is_name_taken(&self, name: &DisplayName, connection_id: &ConnectionId) -> bool {
        self.members
            .iter()
            .any(|m| &m.display_name == name && &m.connection_id != connection_id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
