//! UseCase: 部屋への参加
//!
//! ## テスト実装の作業記録
//!
//! ### 何をテストしているか
//! - JoinRoomUseCase::execute() メソッド
//! - 参加成功時に返されるメンバー一覧と、拒否時のエラー
//! - 参加者への ack 送信と部屋全体への user-list ブロードキャスト
//!
//! ### どのような状況を想定しているか
//! - 正常系：新規参加、同じ接続による再参加（リネーム）
//! - 異常系：名前の重複、部屋の満員、部屋数上限
//! - エッジケース：拒否後に状態が変化していないこと

use std::sync::Arc;

use hiroma_shared::time::Clock;

use crate::domain::{
    ConnectionId, DisplayName, JoinError, Member, MessagePushError, MessagePusher, RoomKey,
    RoomRepository, Timestamp,
};

use super::broadcast;

/// 部屋参加のユースケース
pub struct JoinRoomUseCase {
    /// Repository（データアクセス層の抽象化）
    repository: Arc<dyn RoomRepository>,
    /// MessagePusher（メッセージ通知の抽象化）
    message_pusher: Arc<dyn MessagePusher>,
    /// 参加時刻の取得元
    clock: Arc<dyn Clock>,
}

impl JoinRoomUseCase {
    pub fn new(
        repository: Arc<dyn RoomRepository>,
        message_pusher: Arc<dyn MessagePusher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            repository,
            message_pusher,
            clock,
        }
    }

    /// 部屋への参加を実行
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<Member>)` - 参加後の部屋のメンバー一覧（参加順）
    /// * `Err(JoinError)` - ポリシーにより拒否された（状態は変化しない）
    pub async fn execute(
        &self,
        room_key: RoomKey,
        connection_id: ConnectionId,
        display_name: DisplayName,
    ) -> Result<Vec<Member>, JoinError> {
        let joined_at = Timestamp::new(self.clock.now_millis());
        let transition = self
            .repository
            .try_join(room_key.clone(), connection_id.clone(), display_name, joined_at)
            .await?;

        tracing::debug!(
            "Connection '{}' joined room '{}': {:?}",
            connection_id,
            room_key,
            transition
        );

        // 参加に成功した場合、部屋は必ず存在する
        Ok(transition.into_members().unwrap_or_default())
    }

    /// 参加リクエストの結果（ack）を参加者本人にだけ送信
    pub async fn acknowledge(
        &self,
        connection_id: &ConnectionId,
        message: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher.push_to(connection_id, message).await
    }

    /// 更新後のメンバー一覧を部屋の全メンバー（参加者本人を含む）にブロードキャスト
    pub async fn broadcast_user_list(
        &self,
        members: &[Member],
        message: &str,
    ) -> Result<(), MessagePushError> {
        broadcast::broadcast_user_list(self.message_pusher.as_ref(), members, message).await
    }
}
