//! WebSocket frame DTOs.
//!
//! Every frame is a JSON text message with an `event` name and a `data`
//! payload. Requests that expect an acknowledgment carry a numeric `ack` id
//! which is echoed back in the matching `ack` frame.
//!
//! ```text
//! client -> server  {"event":"join-room","data":{"room":"A","userName":"alice"},"ack":1}
//! server -> client  {"event":"ack","ack":1,"data":{"success":true}}
//! server -> room    {"event":"user-list","data":[{"id":"...","name":"alice"}]}
//! client -> server  {"event":"leave-room","data":"A"}
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Event names used on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventName {
    Connected,
    JoinRoom,
    LeaveRoom,
    UserList,
    Ack,
    Error,
}

// ========================================
// Client -> Server
// ========================================

/// Raw envelope of a client frame, before the payload is interpreted
#[derive(Debug, Deserialize)]
struct ClientFrame {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
    #[serde(default)]
    ack: Option<u64>,
}

/// Payload of `join-room`.
///
/// Missing fields deserialize as empty strings so that they are rejected by
/// value object validation and answered with a failed ack.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinRoomPayload {
    #[serde(default)]
    pub room: String,
    #[serde(default)]
    pub user_name: String,
}

/// A parsed client request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    JoinRoom {
        payload: JoinRoomPayload,
        ack: Option<u64>,
    },
    /// A `join-room` whose payload could not be decoded.
    ///
    /// Kept apart from [`FrameError`] so the rejection can still be answered
    /// on the request's ack id.
    MalformedJoinRoom {
        reason: String,
        ack: Option<u64>,
    },
    LeaveRoom {
        room: String,
    },
}

/// Errors raised while parsing a client frame
#[derive(Debug, Error)]
pub enum FrameError {
    #[error("Frame is not a valid event envelope: {0}")]
    InvalidEnvelope(serde_json::Error),

    #[error("Unknown event '{0}'")]
    UnknownEvent(String),

    #[error("Invalid payload for '{event}': {source}")]
    InvalidPayload {
        event: String,
        source: serde_json::Error,
    },
}

impl ClientEvent {
    /// Parse a text frame received from a client.
    pub fn parse(text: &str) -> Result<Self, FrameError> {
        let frame: ClientFrame = serde_json::from_str(text).map_err(FrameError::InvalidEnvelope)?;
        let invalid_payload = |source| FrameError::InvalidPayload {
            event: frame.event.clone(),
            source,
        };

        match frame.event.as_str() {
            "join-room" => match serde_json::from_value(frame.data.clone()) {
                Ok(payload) => Ok(Self::JoinRoom {
                    payload,
                    ack: frame.ack,
                }),
                Err(source) => Ok(Self::MalformedJoinRoom {
                    reason: invalid_payload(source).to_string(),
                    ack: frame.ack,
                }),
            },
            "leave-room" => {
                let room = serde_json::from_value(frame.data.clone()).map_err(invalid_payload)?;
                Ok(Self::LeaveRoom { room })
            }
            other => Err(FrameError::UnknownEvent(other.to_string())),
        }
    }
}

// ========================================
// Server -> Client
// ========================================

/// Sent once, right after the WebSocket is accepted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedMessage {
    pub event: EventName,
    pub data: ConnectedPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectedPayload {
    /// Connection ID assigned by the server
    pub id: String,
}

impl ConnectedMessage {
    pub fn new(id: String) -> Self {
        Self {
            event: EventName::Connected,
            data: ConnectedPayload { id },
        }
    }
}

/// One entry of a `user-list` broadcast
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: String,
    pub name: String,
}

/// Current member list of a room, broadcast to every member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserListMessage {
    pub event: EventName,
    pub data: Vec<MemberInfo>,
}

impl UserListMessage {
    pub fn new(members: Vec<MemberInfo>) -> Self {
        Self {
            event: EventName::UserList,
            data: members,
        }
    }
}

/// Result of a `join-room` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JoinAck {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl JoinAck {
    pub fn accepted() -> Self {
        Self {
            success: true,
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: Some(message.into()),
        }
    }
}

/// Acknowledgment sent to the requesting connection only
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AckMessage {
    pub event: EventName,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ack: Option<u64>,
    pub data: JoinAck,
}

impl AckMessage {
    pub fn new(ack: Option<u64>, data: JoinAck) -> Self {
        Self {
            event: EventName::Ack,
            ack,
            data,
        }
    }
}

/// Reply to a frame that could not be understood
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorMessage {
    pub event: EventName,
    pub data: ErrorPayload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub message: String,
}

impl ErrorMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            event: EventName::Error,
            data: ErrorPayload {
                message: message.into(),
            },
        }
    }
}
