//! UseCase: 接続の受け付け
//!
//! 新しい接続の送信チャンネルを MessagePusher に登録し、割り当てた
//! ConnectionId を通知します。接続しただけではどの部屋にも参加しません。

use std::sync::Arc;

use crate::domain::{ConnectionId, MessagePushError, MessagePusher, PusherChannel};

/// 接続受け付けのユースケース
pub struct ConnectConnectionUseCase {
    message_pusher: Arc<dyn MessagePusher>,
}

impl ConnectConnectionUseCase {
    pub fn new(message_pusher: Arc<dyn MessagePusher>) -> Self {
        Self { message_pusher }
    }

    /// 接続を登録し、`greeting` を送信する
    ///
    /// # Arguments
    ///
    /// * `connection_id` - サーバーが割り当てた接続 ID
    /// * `sender` - 接続へのフレーム送信用チャンネル
    /// * `greeting` - 登録直後に送信するフレーム（JSON）
    pub async fn execute(
        &self,
        connection_id: ConnectionId,
        sender: PusherChannel,
        greeting: &str,
    ) -> Result<(), MessagePushError> {
        self.message_pusher
            .register_client(connection_id.clone(), sender)
            .await;
        self.message_pusher.push_to(&connection_id, greeting).await
    }
}
