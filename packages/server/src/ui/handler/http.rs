//! HTTP API endpoint handlers (read-only inspection of the registry).

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};

use crate::{
    infrastructure::dto::http::{HealthDto, RoomDetailDto, RoomSummaryDto},
    ui::state::AppState,
    usecase::GetRoomDetailError,
};

/// Health check endpoint
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthDto> {
    let rooms = state.get_rooms_usecase.execute().await;
    let limits = state.get_rooms_usecase.limits().await;
    Json(HealthDto {
        status: "ok".to_string(),
        rooms: rooms.len(),
        max_rooms: limits.max_rooms,
        max_room_size: limits.max_room_size,
    })
}

/// Get list of rooms
pub async fn get_rooms(State(state): State<Arc<AppState>>) -> Json<Vec<RoomSummaryDto>> {
    let rooms = state.get_rooms_usecase.execute().await;

    // Domain Model から DTO への変換
    Json(rooms.into_iter().map(RoomSummaryDto::from).collect())
}

/// Get room detail by key
pub async fn get_room_detail(
    State(state): State<Arc<AppState>>,
    Path(room_key): Path<String>,
) -> Result<Json<RoomDetailDto>, StatusCode> {
    match state.get_room_detail_usecase.execute(room_key).await {
        Ok(room) => Ok(Json(RoomDetailDto::from(room))),
        Err(GetRoomDetailError::InvalidRoomKey(e)) => {
            tracing::debug!("Invalid room key requested: {}", e);
            Err(StatusCode::BAD_REQUEST)
        }
        Err(GetRoomDetailError::RoomNotFound) => Err(StatusCode::NOT_FOUND),
    }
}
