//! Repository trait
//!
//! Data access interface required by the domain layer. The in-memory
//! implementation is provided by the infrastructure layer.

use async_trait::async_trait;

use super::{
    entity::Room,
    error::JoinError,
    registry::{RoomLimits, RoomTransition},
    value_object::{ConnectionId, DisplayName, RoomKey, Timestamp},
};

/// Room Repository trait
///
/// Each method is atomic with respect to the others: the membership checks
/// and the mutation of one call are never interleaved with another call.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Add a connection to a room (see [`super::RoomRegistry::try_join`])
    async fn try_join(
        &self,
        room_key: RoomKey,
        connection_id: ConnectionId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<RoomTransition, JoinError>;

    /// Remove a connection from one room
    async fn leave(&self, room_key: &RoomKey, connection_id: &ConnectionId) -> RoomTransition;

    /// Remove a connection from every room it belongs to
    async fn disconnect_all(&self, connection_id: &ConnectionId) -> Vec<(RoomKey, RoomTransition)>;

    /// Snapshot of a single room
    async fn get_room(&self, room_key: &RoomKey) -> Option<Room>;

    /// Snapshot of every room, ordered by room key
    async fn get_rooms(&self) -> Vec<Room>;

    async fn limits(&self) -> RoomLimits;
}
