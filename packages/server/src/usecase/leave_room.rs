//! UseCase: 部屋からの退出
//!
//! 退出は冪等で、失敗することはありません。最後のメンバーが退出した部屋は
//! 削除され、通知先が存在しないためブロードキャストも行いません。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Member, MessagePushError, MessagePusher, RoomKey, RoomRepository,
    RoomTransition,
};

use super::broadcast;

/// 部屋退出のユースケース
pub struct LeaveRoomUseCase {
    repository: Arc<dyn RoomRepository>,
    message_pusher: Arc<dyn MessagePusher>,
}

impl LeaveRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 部屋からの退出を実行
    ///
    /// # Returns
    ///
    /// 部屋がまだ存在する場合は `Some(メンバー一覧)`、削除された・存在しない場合は `None`
    pub async fn execute(&self, room_key: &RoomKey, connection_id: &ConnectionId) -> Option<Vec<Member>> {
        let transition = self.repository.leave(room_key, connection_id).await;
        if transition == RoomTransition::Deleted {
            tracing::info!("Room '{}' is empty and has been deleted", room_key);
        }
        transition.into_members()
    }

    /// 退出後のメンバー一覧を残りのメンバーにブロードキャスト
    pub async fn broadcast_user_list(
        &self,
        members: &[Member],
        message: &str,
    ) -> Result<(), MessagePushError> {
        broadcast::broadcast_user_list(self.message_pusher.as_ref(), members, message).await
    }
}
