//! Room registry: the in-memory membership store.
//!
//! The registry maps room keys to rooms and enforces the membership policy:
//!
//! - at most `max_rooms` rooms exist at once (rooms that already exist keep
//!   accepting joins)
//! - at most `max_room_size` members per room
//! - display names are unique within a room
//! - a room exists only while it has members
//!
//! Every operation is all-or-nothing: a rejected join leaves the registry
//! untouched. Results are reported as a [`RoomTransition`] so callers never
//! need to re-check whether a room was created or removed.

use std::collections::{BTreeMap, btree_map::Entry};

use super::{
    entity::{Member, Room},
    error::JoinError,
    value_object::{ConnectionId, DisplayName, RoomKey, Timestamp},
};

/// Default global room cap
pub const DEFAULT_MAX_ROOMS: usize = 1;

/// Default per-room member cap
pub const DEFAULT_MAX_ROOM_SIZE: usize = 2;

/// Capacity limits applied by the registry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomLimits {
    pub max_rooms: usize,
    pub max_room_size: usize,
}

impl Default for RoomLimits {
    fn default() -> Self {
        Self {
            max_rooms: DEFAULT_MAX_ROOMS,
            max_room_size: DEFAULT_MAX_ROOM_SIZE,
        }
    }
}

/// What happened to a room as the result of a registry operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoomTransition {
    /// The room did not exist and was created by this join
    Created(Vec<Member>),
    /// The member list changed (member added, removed or renamed)
    Updated(Vec<Member>),
    /// The room exists but its member list did not change
    Unchanged(Vec<Member>),
    /// The last member left and the room was removed
    Deleted,
    /// The room does not exist; nothing happened
    Absent,
}

impl RoomTransition {
    /// Current member list of the room, if the room still exists.
    pub fn members(&self) -> Option<&[Member]> {
        match self {
            Self::Created(members) | Self::Updated(members) | Self::Unchanged(members) => {
                Some(members)
            }
            Self::Deleted | Self::Absent => None,
        }
    }

    pub fn into_members(self) -> Option<Vec<Member>> {
        match self {
            Self::Created(members) | Self::Updated(members) | Self::Unchanged(members) => {
                Some(members)
            }
            Self::Deleted | Self::Absent => None,
        }
    }
}

/// In-memory mapping from room key to room.
#[derive(Debug, Clone, Default)]
pub struct RoomRegistry {
    rooms: BTreeMap<RoomKey, Room>,
    limits: RoomLimits,
}

impl RoomRegistry {
    pub fn new(limits: RoomLimits) -> Self {
        Self {
            rooms: BTreeMap::new(),
            limits,
        }
    }

    pub fn limits(&self) -> RoomLimits {
        self.limits
    }

    /// Add `connection_id` to `room_key` under `display_name`.
    ///
    /// Checks are applied in this order against the state before the call:
    ///
    /// 1. a new room cannot be created once `max_rooms` rooms exist
    /// 2. the name must not be used by another member of the room
    /// 3. a connection that is already a member is renamed in place
    ///    (the size limit does not apply)
    /// 4. otherwise the room must have fewer than `max_room_size` members
    ///
    /// `joined_at` is recorded for new members and, if the room is created,
    /// as its creation time.
    ///
    /// # Errors
    ///
    /// Returns a [`JoinError`] describing the violated policy. The registry is
    /// not modified in that case.
    pub fn try_join(
        &mut self,
        room_key: RoomKey,
        connection_id: ConnectionId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<RoomTransition, JoinError> {
        let room = self.rooms.get(&room_key);

        if room.is_none() && self.rooms.len() >= self.limits.max_rooms {
            return Err(JoinError::RoomCapExceeded);
        }
        if room.is_some_and(|r| r.is_name_taken(&display_name, &connection_id)) {
            return Err(JoinError::NameTaken);
        }
        let is_member = room.is_some_and(|r| r.contains(&connection_id));
        let size = room.map_or(0, Room::len);
        if !is_member && size >= self.limits.max_room_size {
            return Err(JoinError::RoomFull {
                max_room_size: self.limits.max_room_size,
            });
        }

        match self.rooms.entry(room_key) {
            Entry::Occupied(mut entry) => {
                let room = entry.get_mut();
                match room
                    .members
                    .iter_mut()
                    .find(|m| m.connection_id == connection_id)
                {
                    Some(member) if member.display_name == display_name => {
                        Ok(RoomTransition::Unchanged(room.members.clone()))
                    }
                    Some(member) => {
                        member.display_name = display_name;
                        Ok(RoomTransition::Updated(room.members.clone()))
                    }
                    None => {
                        room.members
                            .push(Member::new(connection_id, display_name, joined_at));
                        Ok(RoomTransition::Updated(room.members.clone()))
                    }
                }
            }
            Entry::Vacant(entry) => {
                let mut room = Room::new(entry.key().clone(), joined_at);
                room.members
                    .push(Member::new(connection_id, display_name, joined_at));
                let members = room.members.clone();
                entry.insert(room);
                Ok(RoomTransition::Created(members))
            }
        }
    }

    /// Remove `connection_id` from `room_key`.
    ///
    /// Idempotent: leaving a room the connection is not in, or a room that
    /// does not exist, changes nothing. The room is deleted when its last
    /// member leaves.
    pub fn leave(&mut self, room_key: &RoomKey, connection_id: &ConnectionId) -> RoomTransition {
        let Some(room) = self.rooms.get_mut(room_key) else {
            return RoomTransition::Absent;
        };

        let before = room.len();
        room.members.retain(|m| &m.connection_id != connection_id);

        if room.is_empty() {
            self.rooms.remove(room_key);
            return RoomTransition::Deleted;
        }
        if room.len() == before {
            RoomTransition::Unchanged(room.members.clone())
        } else {
            RoomTransition::Updated(room.members.clone())
        }
    }

    /// Remove `connection_id` from every room it belongs to.
    ///
    /// Returns one entry per affected room, in room key order. Rooms the
    /// connection was not a member of are not touched and not reported.
    pub fn disconnect_all(&mut self, connection_id: &ConnectionId) -> Vec<(RoomKey, RoomTransition)> {
        self.rooms_of(connection_id)
            .into_iter()
            .map(|key| {
                let transition = self.leave(&key, connection_id);
                (key, transition)
            })
            .collect()
    }

    /// Keys of the rooms `connection_id` is currently a member of
    pub fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomKey> {
        self.rooms
            .values()
            .filter(|room| room.contains(connection_id))
            .map(|room| room.key.clone())
            .collect()
    }

    pub fn room(&self, room_key: &RoomKey) -> Option<&Room> {
        self.rooms.get(room_key)
    }

    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.rooms.values()
    }

    pub fn contains_room(&self, room_key: &RoomKey) -> bool {
        self.rooms.contains_key(room_key)
    }

    /// Number of rooms currently present
    pub fn len(&self) -> usize {
        self.rooms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rooms.is_empty()
    }
}
