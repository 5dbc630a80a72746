//! Shared state of the axum handlers.

use std::sync::Arc;

use crate::{
    config::HeartbeatConfig,
    ui::session::SessionHandle,
    usecase::{GetRoomDetailUseCase, GetRoomsUseCase},
};

/// Shared application state
pub struct AppState {
    /// Entry point of the session coordinator event loop
    pub session: SessionHandle,
    /// Liveness settings applied to every WebSocket
    pub heartbeat: HeartbeatConfig,
    /// GetRoomsUseCase（部屋一覧取得のユースケース）
    pub get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（部屋詳細取得のユースケース）
    pub get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
}
