//! Conversion logic between DTOs and domain entities.

use hiroma_shared::time::timestamp_to_rfc3339;

use crate::domain::{Member, Room};
use crate::infrastructure::dto::{http, websocket};

// ========================================
// Domain Entity → WebSocket DTO
// ========================================

impl From<&Member> for websocket::MemberInfo {
    fn from(member: &Member) -> Self {
        Self {
            id: member.connection_id.as_str().to_string(),
            name: member.display_name.as_str().to_string(),
        }
    }
}

impl From<&[Member]> for websocket::UserListMessage {
    fn from(members: &[Member]) -> Self {
        Self::new(members.iter().map(websocket::MemberInfo::from).collect())
    }
}

// ========================================
// Domain Entity → HTTP DTO
// ========================================

impl From<&Member> for http::MemberDetailDto {
    fn from(member: &Member) -> Self {
        Self {
            id: member.connection_id.as_str().to_string(),
            name: member.display_name.as_str().to_string(),
            joined_at: timestamp_to_rfc3339(member.joined_at.value()),
        }
    }
}

impl From<Room> for http::RoomSummaryDto {
    fn from(room: Room) -> Self {
        Self {
            id: room.key.into_string(),
            members: room
                .members
                .into_iter()
                .map(|m| m.display_name.into_string())
                .collect(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}

impl From<Room> for http::RoomDetailDto {
    fn from(room: Room) -> Self {
        Self {
            members: room.members.iter().map(http::MemberDetailDto::from).collect(),
            id: room.key.into_string(),
            created_at: timestamp_to_rfc3339(room.created_at.value()),
        }
    }
}
