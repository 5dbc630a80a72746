//! UseCase: 接続の切断
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - DisconnectConnectionUseCase::execute() メソッド
//! - 切断した接続が所属していた全ての部屋から削除されること
//!
//! ### どのような状況を想定しているか
//! - 正常系：他のメンバーが残る部屋からの切断
//! - エッジケース：唯一のメンバーの切断（部屋の削除）、複数の部屋への同時所属
//! - 異常系：どの部屋にも所属していない接続の切断

use std::sync::Arc;

use crate::domain::{
    ConnectionId, Member, MessagePushError, MessagePusher, RoomKey, RoomRepository,
};

use super::broadcast;

/// 接続切断のユースケース
pub struct DisconnectConnectionUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
}

impl DisconnectConnectionUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
        }
    }

    /// 接続切断を実行
    ///
    /// 全ての部屋から接続を削除し、MessagePusher から登録解除する。
    ///
    /// # Returns
    ///
    /// 影響を受けた部屋ごとの `(部屋, 残りのメンバー一覧)`。部屋が削除された場合は `None`。
    pub async fn execute(&self, connection_id: &ConnectionId) -> Vec<(RoomKey, Option<Vec<Member>>)> {
        let affected = self.repository.disconnect_all(connection_id).await;
        self.message_pusher.unregister_client(connection_id).await;

        affected
            .into_iter()
            .map(|(room_key, transition)| (room_key, transition.into_members()))
            .collect()
    }

    /// 残りのメンバーに user-list をブロードキャスト
    pub async fn broadcast_user_list(
        &self,
        members: &[Member],
        message: &str,
    ) -> Result<(), MessagePushError> {
        broadcast::broadcast_user_list(self.message_pusher.as_ref(), members, message).await
    }
}
