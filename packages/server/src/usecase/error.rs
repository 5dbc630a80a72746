//! UseCase layer error types.

use thiserror::Error;

use crate::domain::ValueObjectError;

/// Errors of [`super::GetRoomDetailUseCase`]
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Invalid room key: {0}")]
    InvalidRoomKey(#[from] ValueObjectError),

    #[error("Room not found")]
    RoomNotFound,
}
