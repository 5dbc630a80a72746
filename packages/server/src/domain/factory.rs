//! Factories for server-assigned identifiers.

use uuid::Uuid;

use super::value_object::ConnectionId;

/// Generates a fresh `ConnectionId` for every accepted WebSocket.
pub struct ConnectionIdFactory;

impl ConnectionIdFactory {
    pub fn generate() -> ConnectionId {
        // A hyphenated UUID is never empty, so construction cannot fail.
        ConnectionId(Uuid::new_v4().to_string())
    }
}
