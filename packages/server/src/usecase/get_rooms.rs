//! UseCase: 部屋一覧の取得

use std::sync::Arc;

use crate::domain::{Room, RoomLimits, RoomRepository};

/// 部屋一覧取得のユースケース
pub struct GetRoomsUseCase {
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(repository: Arc<dyn RoomRepository>) -> Self {
        Self { repository }
    }

    /// 現在存在する全ての部屋（部屋名順）
    pub async fn execute(&self) -> Vec<Room> {
        self.repository.get_rooms().await
    }

    /// 設定されている上限
    pub async fn limits(&self) -> RoomLimits {
        self.repository.limits().await
    }
}
