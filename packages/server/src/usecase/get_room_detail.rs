//! UseCase: 部屋詳細の取得

use std::sync::Arc;

use crate::domain::{Room, RoomKey, RoomRepository};

use super::error::GetRoomDetailError;

/// 部屋詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 部屋詳細を取得
    ///
    /// # Errors
    ///
    /// * `InvalidRoomKey` - 部屋名として不正な文字列
    /// * `RoomNotFound` - 部屋が存在しない（空になって削除された場合を含む）
    pub async fn execute(&self, room_key: String) -> Result<Room, GetRoomDetailError> {
        let room_key = RoomKey::try_from(room_key)?;
        self.repository
            .get_room(&room_key)
            .await
            .ok_or(GetRoomDetailError::RoomNotFound)
    }
}
