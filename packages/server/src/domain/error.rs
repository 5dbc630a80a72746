//! Domain error types.

use thiserror::Error;

/// Validation errors raised while constructing value objects
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Connection ID must not be empty.")]
    ConnectionIdEmpty,

    #[error("Room name must not be empty.")]
    RoomKeyEmpty,

    #[error("Room name must not start or end with whitespace.")]
    RoomKeyPadded,

    #[error("Room name is too long ({actual} characters, at most {max} allowed).")]
    RoomKeyTooLong { max: usize, actual: usize },

    #[error("Name must not be empty.")]
    DisplayNameEmpty,

    #[error("Name is too long ({actual} characters, at most {max} allowed).")]
    DisplayNameTooLong { max: usize, actual: usize },
}

/// Policy rejections of a join request.
///
/// The `Display` output is sent to the requesting client as-is.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// The registry already holds the maximum number of rooms and the
    /// requested room does not exist yet
    #[error("New room cannot be created. Please try after sometime.")]
    RoomCapExceeded,

    /// Another member of the room already uses the requested name
    #[error("Name already exists in this room. Please choose a different name.")]
    NameTaken,

    /// The room already holds `max_room_size` members
    #[error("Room is Full! Only {max_room_size} people are allowed in a room.")]
    RoomFull { max_room_size: usize },
}

/// Errors raised while pushing frames to connections
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MessagePushError {
    #[error("Connection '{0}' is not registered")]
    ConnectionNotFound(String),

    #[error("Failed to push message: {0}")]
    PushFailed(String),
}
