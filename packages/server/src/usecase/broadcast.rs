//! 参加・退出・切断で共通のメンバー一覧ブロードキャスト

use crate::domain::{Member, MessagePushError, MessagePusher};

/// `message` を部屋の全メンバーに参加順で送信
pub(super) async fn broadcast_user_list(
    message_pusher: &dyn MessagePusher,
    members: &[Member],
    message: &str,
) -> Result<(), MessagePushError> {
    let targets = members.iter().map(|m| m.connection_id.clone()).collect();
    message_pusher.broadcast(targets, message).await
}
