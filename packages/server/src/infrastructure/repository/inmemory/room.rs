//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `RoomRegistry` を Mutex で保護し、プロセス内のストアとして使用します。
//! 再起動をまたいだ永続化は行いません。

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, DisplayName, JoinError, Room, RoomKey, RoomLimits, RoomRegistry,
    RoomRepository, RoomTransition, Timestamp,
};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    registry: Mutex<RoomRegistry>,
}

impl InMemoryRoomRepository {
    /// 指定した上限で空の InMemoryRoomRepository を作成
    pub fn new(limits: RoomLimits) -> Self {
        Self {
            registry: Mutex::new(RoomRegistry::new(limits)),
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn try_join(
        &self,
        room_key: RoomKey,
        connection_id: ConnectionId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Result<RoomTransition, JoinError> {
        let mut registry = self.registry.lock().await;
        registry.try_join(room_key, connection_id, display_name, joined_at)
    }

    async fn leave(&self, room_key: &RoomKey, connection_id: &ConnectionId) -> RoomTransition {
        let mut registry = self.registry.lock().await;
        registry.leave(room_key, connection_id)
    }

    async fn disconnect_all(&self, connection_id: &ConnectionId) -> Vec<(RoomKey, RoomTransition)> {
        let mut registry = self.registry.lock().await;
        registry.disconnect_all(connection_id)
    }

    async fn get_room(&self, room_key: &RoomKey) -> Option<Room> {
        let registry = self.registry.lock().await;
        registry.room(room_key).cloned()
    }

    async fn get_rooms(&self) -> Vec<Room> {
        let registry = self.registry.lock().await;
        registry.rooms().cloned().collect()
    }

    async fn limits(&self) -> RoomLimits {
        self.registry.lock().await.limits()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - InMemoryRoomRepository が RoomRegistry の操作を正しく委譲すること
    // - スナップショット（get_room / get_rooms）がストアの状態を反映すること
    //
    // 【なぜこのテストが必要か】
    // - Repository は UseCase から呼ばれるデータアクセス層の中核
    // - ポリシー判定そのものは RoomRegistry のテストで検証済みのため、
    //   ここでは委譲と状態の受け渡しを確認する
    // ========================================

    fn create_test_repository() -> InMemoryRoomRepository {
        InMemoryRoomRepository::new(RoomLimits {
            max_rooms: 2,
            max_room_size: 2,
        })
    }

    fn key(value: &str) -> RoomKey {
        RoomKey::new(value.to_string()).unwrap()
    }

    fn conn(value: &str) -> ConnectionId {
        ConnectionId::new(value.to_string()).unwrap()
    }

    fn name(value: &str) -> DisplayName {
        DisplayName::new(value.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_try_join_creates_room() {
        // テスト項目: 参加すると部屋が作成され、スナップショットに反映される
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let result = repo
            .try_join(key("lobby"), conn("c1"), name("alice"), Timestamp::new(1000))
            .await;

        // then (期待する結果):
        assert!(matches!(result, Ok(RoomTransition::Created(_))));
        let room = repo.get_room(&key("lobby")).await.unwrap();
        assert_eq!(room.members.len(), 1);
        assert_eq!(room.created_at, Timestamp::new(1000));
    }

    #[tokio::test]
    async fn test_try_join_error_leaves_state_unchanged() {
        // テスト項目: 参加が拒否された場合、ストアの状態は変わらない
        // given (前提条件):
        let repo = create_test_repository();
        repo.try_join(key("lobby"), conn("c1"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();

        // when (操作):
        let result = repo
            .try_join(key("lobby"), conn("c2"), name("alice"), Timestamp::new(2000))
            .await;

        // then (期待する結果):
        assert_eq!(result, Err(JoinError::NameTaken));
        assert_eq!(repo.get_room(&key("lobby")).await.unwrap().members.len(), 1);
    }

    #[tokio::test]
    async fn test_leave_last_member_removes_room() {
        // テスト項目: 最後のメンバーが退出すると部屋がストアから消える
        // given (前提条件):
        let repo = create_test_repository();
        repo.try_join(key("lobby"), conn("c1"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();

        // when (操作):
        let result = repo.leave(&key("lobby"), &conn("c1")).await;

        // then (期待する結果):
        assert_eq!(result, RoomTransition::Deleted);
        assert!(repo.get_room(&key("lobby")).await.is_none());
        assert!(repo.get_rooms().await.is_empty());
    }

    #[tokio::test]
    async fn test_disconnect_all_reports_each_room() {
        // テスト項目: 切断時に所属していた全ての部屋の結果が返される
        // given (前提条件):
        let repo = create_test_repository();
        repo.try_join(key("a"), conn("c1"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();
        repo.try_join(key("b"), conn("c1"), name("alice"), Timestamp::new(1000))
            .await
            .unwrap();
        repo.try_join(key("b"), conn("c2"), name("bob"), Timestamp::new(1000))
            .await
            .unwrap();

        // when (操作):
        let result = repo.disconnect_all(&conn("c1")).await;

        // then (期待する結果):
        assert_eq!(result.len(), 2);
        assert_eq!(result[0], (key("a"), RoomTransition::Deleted));
        assert_eq!(result[1].0, key("b"));
        assert_eq!(result[1].1.members().map(|m| m.len()), Some(1));

        let rooms = repo.get_rooms().await;
        assert_eq!(rooms.len(), 1);
        assert_eq!(rooms[0].key, key("b"));
    }

    #[tokio::test]
    async fn test_limits_are_exposed() {
        // テスト項目: 設定した上限が取得できる
        // given (前提条件):
        let repo = create_test_repository();

        // when (操作):
        let limits = repo.limits().await;

        // then (期待する結果):
        assert_eq!(limits.max_rooms, 2);
        assert_eq!(limits.max_room_size, 2);
    }
}
