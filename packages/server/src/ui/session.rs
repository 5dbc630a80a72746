//! Session coordinator: the single event loop that owns room membership.
//!
//! WebSocket handlers never touch the registry themselves. They forward
//! connection lifecycle events and raw client frames to the coordinator over
//! an unbounded channel; the coordinator processes one event at a time, to
//! completion, so membership changes and the broadcasts they trigger are
//! never interleaved.
//!
//! ```text
//! ws handler --SessionEvent--> SessionCoordinator --> UseCase --> RoomRepository
//!                                     |
//!                                     +--> MessagePusher (ack / user-list)
//! ```

use std::sync::Arc;

use serde::Serialize;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    domain::{
        ConnectionId, DisplayName, Member, MessagePusher, PusherChannel, RoomKey,
        ValueObjectError,
    },
    infrastructure::dto::websocket::{
        AckMessage, ClientEvent, ConnectedMessage, ErrorMessage, JoinAck, JoinRoomPayload,
        UserListMessage,
    },
    usecase::{
        ConnectConnectionUseCase, DisconnectConnectionUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    },
};

/// Events delivered by the transport, in arrival order
#[derive(Debug)]
pub enum SessionEvent {
    /// A WebSocket was accepted
    Connected {
        connection_id: ConnectionId,
        sender: PusherChannel,
    },
    /// A text frame arrived from a connection
    Frame {
        connection_id: ConnectionId,
        text: String,
    },
    /// The transport closed (client close, error or idle timeout)
    Disconnected { connection_id: ConnectionId },
}

/// Cloneable entry point used by the transport to feed the coordinator
#[derive(Debug, Clone)]
pub struct SessionHandle {
    tx: mpsc::UnboundedSender<SessionEvent>,
}

impl SessionHandle {
    pub fn connected(&self, connection_id: ConnectionId, sender: PusherChannel) {
        self.send(SessionEvent::Connected {
            connection_id,
            sender,
        });
    }

    pub fn frame(&self, connection_id: ConnectionId, text: String) {
        self.send(SessionEvent::Frame {
            connection_id,
            text,
        });
    }

    pub fn disconnected(&self, connection_id: ConnectionId) {
        self.send(SessionEvent::Disconnected { connection_id });
    }

    fn send(&self, event: SessionEvent) {
        if let Err(e) = self.tx.send(event) {
            tracing::error!("Session coordinator is gone, dropping event: {:?}", e.0);
        }
    }
}

/// Dispatches session events to the use cases
pub struct SessionCoordinator {
    connect_connection_usecase: Arc<ConnectConnectionUseCase>,
    join_room_usecase: Arc<JoinRoomUseCase>,
    leave_room_usecase: Arc<LeaveRoomUseCase>,
    disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
    /// Used for protocol-level replies (malformed frames)
    message_pusher: Arc<dyn MessagePusher>,
}

impl SessionCoordinator {
    pub fn new(
        connect_connection_usecase: Arc<ConnectConnectionUseCase>,
        join_room_usecase: Arc<JoinRoomUseCase>,
        leave_room_usecase: Arc<LeaveRoomUseCase>,
        disconnect_connection_usecase: Arc<DisconnectConnectionUseCase>,
        message_pusher: Arc<dyn MessagePusher>,
    ) -> Self {
        Self {
            connect_connection_usecase,
            join_room_usecase,
            leave_room_usecase,
            disconnect_connection_usecase,
            message_pusher,
        }
    }

    /// Start the event loop on the current runtime.
    ///
    /// The loop ends once every [`SessionHandle`] has been dropped.
    pub fn spawn(self) -> (SessionHandle, JoinHandle<()>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(self.run(rx));
        (SessionHandle { tx }, task)
    }

    async fn run(self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        tracing::debug!("Session coordinator started");
        while let Some(event) = rx.recv().await {
            self.handle(event).await;
        }
        tracing::debug!("Session coordinator stopped");
    }

    /// Process one event to completion
    pub async fn handle(&self, event: SessionEvent) {
        match event {
            SessionEvent::Connected {
                connection_id,
                sender,
            } => self.on_connect(connection_id, sender).await,
            SessionEvent::Frame {
                connection_id,
                text,
            } => self.on_frame(connection_id, &text).await,
            SessionEvent::Disconnected { connection_id } => self.on_disconnect(connection_id).await,
        }
    }

    async fn on_connect(&self, connection_id: ConnectionId, sender: PusherChannel) {
        let Some(greeting) = encode(&ConnectedMessage::new(connection_id.to_string())) else {
            return;
        };
        match self
            .connect_connection_usecase
            .execute(connection_id.clone(), sender, &greeting)
            .await
        {
            Ok(()) => tracing::info!("Connection '{}' registered", connection_id),
            Err(e) => tracing::warn!("Failed to greet connection '{}': {}", connection_id, e),
        }
    }

    async fn on_frame(&self, connection_id: ConnectionId, text: &str) {
        match ClientEvent::parse(text) {
            Ok(ClientEvent::JoinRoom { payload, ack }) => {
                self.on_join_room(connection_id, payload, ack).await
            }
            Ok(ClientEvent::MalformedJoinRoom { reason, ack }) => {
                tracing::info!("Rejected join-room from '{}': {}", connection_id, reason);
                self.send_ack(&connection_id, ack, JoinAck::rejected(reason))
                    .await;
            }
            Ok(ClientEvent::LeaveRoom { room }) => self.on_leave_room(connection_id, room).await,
            Err(e) => {
                tracing::warn!("Invalid frame from '{}': {}", connection_id, e);
                if let Some(reply) = encode(&ErrorMessage::new(e.to_string()))
                    && let Err(e) = self.message_pusher.push_to(&connection_id, &reply).await
                {
                    tracing::warn!("Failed to reply to '{}': {}", connection_id, e);
                }
            }
        }
    }

    async fn on_join_room(
        &self,
        connection_id: ConnectionId,
        payload: JoinRoomPayload,
        ack: Option<u64>,
    ) {
        let (room_key, display_name) = match parse_join_request(payload) {
            Ok(request) => request,
            Err(e) => {
                tracing::info!("Rejected join-room from '{}': {}", connection_id, e);
                self.send_ack(&connection_id, ack, JoinAck::rejected(e.to_string()))
                    .await;
                return;
            }
        };

        match self
            .join_room_usecase
            .execute(room_key.clone(), connection_id.clone(), display_name)
            .await
        {
            Ok(members) => {
                tracing::info!(
                    "Connection '{}' joined room '{}' ({} members)",
                    connection_id,
                    room_key,
                    members.len()
                );
                self.send_ack(&connection_id, ack, JoinAck::accepted()).await;
                if let Some(message) = encode(&UserListMessage::from(members.as_slice()))
                    && let Err(e) = self
                        .join_room_usecase
                        .broadcast_user_list(&members, &message)
                        .await
                {
                    tracing::warn!("Failed to broadcast user-list of '{}': {}", room_key, e);
                }
            }
            Err(e) => {
                tracing::info!(
                    "Connection '{}' could not join room '{}': {}",
                    connection_id,
                    room_key,
                    e
                );
                self.send_ack(&connection_id, ack, JoinAck::rejected(e.to_string()))
                    .await;
            }
        }
    }

    async fn on_leave_room(&self, connection_id: ConnectionId, room: String) {
        let room_key = match RoomKey::try_from(room) {
            Ok(room_key) => room_key,
            Err(e) => {
                tracing::debug!("Ignoring leave-room from '{}': {}", connection_id, e);
                return;
            }
        };

        let Some(members) = self
            .leave_room_usecase
            .execute(&room_key, &connection_id)
            .await
        else {
            return;
        };
        tracing::info!("Connection '{}' left room '{}'", connection_id, room_key);
        if let Some(message) = encode(&UserListMessage::from(members.as_slice()))
            && let Err(e) = self
                .leave_room_usecase
                .broadcast_user_list(&members, &message)
                .await
        {
            tracing::warn!("Failed to broadcast user-list of '{}': {}", room_key, e);
        }
    }

    async fn on_disconnect(&self, connection_id: ConnectionId) {
        let affected = self
            .disconnect_connection_usecase
            .execute(&connection_id)
            .await;
        tracing::info!(
            "Connection '{}' disconnected ({} rooms affected)",
            connection_id,
            affected.len()
        );

        for (room_key, members) in affected {
            let Some(members) = members else {
                tracing::info!("Room '{}' is empty and has been deleted", room_key);
                continue;
            };
            self.broadcast_after_disconnect(&room_key, &members).await;
        }
    }

    async fn broadcast_after_disconnect(&self, room_key: &RoomKey, members: &[Member]) {
        let Some(message) = encode(&UserListMessage::from(members)) else {
            return;
        };
        if let Err(e) = self
            .disconnect_connection_usecase
            .broadcast_user_list(members, &message)
            .await
        {
            tracing::warn!("Failed to broadcast user-list of '{}': {}", room_key, e);
        }
    }

    async fn send_ack(&self, connection_id: &ConnectionId, ack: Option<u64>, result: JoinAck) {
        let Some(message) = encode(&AckMessage::new(ack, result)) else {
            return;
        };
        if let Err(e) = self
            .join_room_usecase
            .acknowledge(connection_id, &message)
            .await
        {
            tracing::warn!("Failed to acknowledge '{}': {}", connection_id, e);
        }
    }
}

fn parse_join_request(
    payload: JoinRoomPayload,
) -> Result<(RoomKey, DisplayName), ValueObjectError> {
    let room_key = RoomKey::try_from(payload.room)?;
    let display_name = DisplayName::try_from(payload.user_name)?;
    Ok((room_key, display_name))
}

fn encode<T: Serialize>(frame: &T) -> Option<String> {
    serde_json::to_string(frame)
        .inspect_err(|e| tracing::error!("Failed to serialize frame: {}", e))
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        domain::RoomLimits,
        infrastructure::{
            dto::websocket::{EventName, MemberInfo},
            message_pusher::WebSocketMessagePusher,
            repository::InMemoryRoomRepository,
        },
    };
    use hiroma_shared::time::FixedClock;
    use serde_json::Value;

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - SessionCoordinator が接続・フレーム・切断イベントを正しく処理すること
    // - 参加者本人への ack と、部屋全体への user-list の送信順序と宛先
    //
    // 【なぜこのテストが必要か】
    // - 通知の契約（誰に・何を・どの順で送るか）はこのモジュールが決める
    // - 実際の Repository / MessagePusher を組み合わせて検証する
    // ========================================

    struct TestClient {
        id: ConnectionId,
        rx: mpsc::UnboundedReceiver<String>,
    }

    impl TestClient {
        /// Next frame as JSON, if one is queued
        fn next_frame(&mut self) -> Option<Value> {
            self.rx
                .try_recv()
                .ok()
                .map(|text| serde_json::from_str(&text).unwrap())
        }

        fn drain(&mut self) -> Vec<Value> {
            std::iter::from_fn(|| self.next_frame()).collect()
        }
    }

    fn create_coordinator(limits: RoomLimits) -> SessionCoordinator {
        let repository = Arc::new(InMemoryRoomRepository::new(limits));
        let pusher = Arc::new(WebSocketMessagePusher::new());
        SessionCoordinator::new(
            Arc::new(ConnectConnectionUseCase::new(pusher.clone())),
            Arc::new(JoinRoomUseCase::new(
                repository.clone(),
                pusher.clone(),
                Arc::new(FixedClock::new(1000)),
            )),
            Arc::new(LeaveRoomUseCase::new(repository.clone(), pusher.clone())),
            Arc::new(DisconnectConnectionUseCase::new(repository, pusher.clone())),
            pusher,
        )
    }

    async fn connect(coordinator: &SessionCoordinator, id: &str) -> TestClient {
        let id = ConnectionId::new(id.to_string()).unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        coordinator
            .handle(SessionEvent::Connected {
                connection_id: id.clone(),
                sender: tx,
            })
            .await;
        let mut client = TestClient { id, rx };
        let greeting = client.next_frame().unwrap();
        assert_eq!(greeting["event"], "connected");
        assert_eq!(greeting["data"]["id"], client.id.as_str());
        client
    }

    async fn send(coordinator: &SessionCoordinator, client: &TestClient, text: &str) {
        coordinator
            .handle(SessionEvent::Frame {
                connection_id: client.id.clone(),
                text: text.to_string(),
            })
            .await;
    }

    async fn join(coordinator: &SessionCoordinator, client: &TestClient, room: &str, name: &str) {
        let frame = serde_json::json!({
            "event": "join-room",
            "data": { "room": room, "userName": name },
            "ack": 1,
        });
        send(coordinator, client, &frame.to_string()).await;
    }

    fn user_list_names(frame: &Value) -> Vec<String> {
        let message: UserListMessage = serde_json::from_value(frame.clone()).unwrap();
        assert_eq!(message.event, EventName::UserList);
        message.data.into_iter().map(|m| m.name).collect()
    }

    #[tokio::test]
    async fn test_join_sends_ack_then_user_list() {
        // テスト項目: 参加成功時、本人に ack が送られた後に user-list が届く
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;

        // when (操作):
        join(&coordinator, &alice, "A", "alice").await;

        // then (期待する結果):
        let frames = alice.drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(
            frames[0],
            serde_json::json!({"event": "ack", "ack": 1, "data": {"success": true}})
        );
        let message: UserListMessage = serde_json::from_value(frames[1].clone()).unwrap();
        assert_eq!(
            message.data,
            vec![MemberInfo {
                id: "c1".to_string(),
                name: "alice".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn test_default_scenario_over_the_wire() {
        // テスト項目: MAX_ROOMS=1, MAX_ROOM_SIZE=2 のシナリオで ack と通知が正しく送られる
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;
        let mut bob = connect(&coordinator, "c2").await;
        let mut carol = connect(&coordinator, "c3").await;
        let mut dave = connect(&coordinator, "c4").await;

        // when (操作):
        join(&coordinator, &alice, "A", "alice").await;
        join(&coordinator, &bob, "A", "bob").await;
        join(&coordinator, &carol, "A", "carol").await;
        join(&coordinator, &dave, "B", "dave").await;

        // then (期待する結果):
        let alice_frames = alice.drain();
        assert_eq!(alice_frames.len(), 3);
        assert_eq!(user_list_names(&alice_frames[2]), vec!["alice", "bob"]);

        let bob_frames = bob.drain();
        assert_eq!(bob_frames[0]["data"]["success"], true);
        assert_eq!(user_list_names(&bob_frames[1]), vec!["alice", "bob"]);

        let carol_frames = carol.drain();
        assert_eq!(carol_frames.len(), 1);
        assert_eq!(carol_frames[0]["data"]["success"], false);
        assert!(
            carol_frames[0]["data"]["message"]
                .as_str()
                .unwrap()
                .starts_with("Room is Full!")
        );

        let dave_frames = dave.drain();
        assert_eq!(dave_frames.len(), 1);
        assert!(
            dave_frames[0]["data"]["message"]
                .as_str()
                .unwrap()
                .starts_with("New room cannot be created")
        );
    }

    #[tokio::test]
    async fn test_rejected_join_is_not_broadcast() {
        // テスト項目: 名前の重複で拒否された参加は本人にだけ通知され、他のメンバーには届かない
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;
        let mut impostor = connect(&coordinator, "c2").await;
        join(&coordinator, &alice, "A", "alice").await;
        alice.drain();

        // when (操作):
        join(&coordinator, &impostor, "A", "alice").await;

        // then (期待する結果):
        assert!(alice.drain().is_empty());
        let frames = impostor.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(
            frames[0]["data"]["message"],
            "Name already exists in this room. Please choose a different name."
        );
    }

    #[tokio::test]
    async fn test_invalid_join_payload_is_rejected_via_ack() {
        // テスト項目: 名前が空の join-room は ack で拒否される
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;

        // when (操作):
        send(
            &coordinator,
            &alice,
            r#"{"event":"join-room","data":{"room":"A","userName":""},"ack":5}"#,
        )
        .await;

        // then (期待する結果):
        let frames = alice.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["ack"], 5);
        assert_eq!(frames[0]["data"]["success"], false);
        assert_eq!(frames[0]["data"]["message"], "Name must not be empty.");
    }

    #[tokio::test]
    async fn test_undecodable_join_payload_is_rejected_via_ack() {
        // テスト項目: data が無い・型が合わない join-room も error ではなく ack で拒否される
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;

        // when (操作):
        send(&coordinator, &alice, r#"{"event":"join-room","ack":3}"#).await;
        send(
            &coordinator,
            &alice,
            r#"{"event":"join-room","data":{"room":5,"userName":"x"},"ack":4}"#,
        )
        .await;

        // then (期待する結果):
        let frames = alice.drain();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0]["event"], "ack");
        assert_eq!(frames[0]["ack"], 3);
        assert_eq!(frames[0]["data"]["success"], false);
        assert!(frames[0]["data"]["message"].is_string());
        assert_eq!(frames[1]["event"], "ack");
        assert_eq!(frames[1]["ack"], 4);
        assert_eq!(frames[1]["data"]["success"], false);
    }

    #[tokio::test]
    async fn test_malformed_frame_gets_error_reply() {
        // テスト項目: 解析できないフレームには送信者にだけ error が返される
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;
        let mut bob = connect(&coordinator, "c2").await;

        // when (操作):
        send(&coordinator, &alice, "not json").await;

        // then (期待する結果):
        let frames = alice.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(frames[0]["event"], "error");
        assert!(bob.drain().is_empty());
    }

    #[tokio::test]
    async fn test_leave_broadcasts_to_remaining_members() {
        // テスト項目: 退出すると残りのメンバーに user-list が送られ、退出者には送られない
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;
        let mut bob = connect(&coordinator, "c2").await;
        join(&coordinator, &alice, "A", "alice").await;
        join(&coordinator, &bob, "A", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        send(&coordinator, &alice, r#"{"event":"leave-room","data":"A"}"#).await;

        // then (期待する結果):
        assert!(alice.drain().is_empty());
        let frames = bob.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(user_list_names(&frames[0]), vec!["bob"]);
    }

    #[tokio::test]
    async fn test_disconnect_broadcasts_and_cleans_up() {
        // テスト項目: 切断すると残りのメンバーに通知され、空になった部屋は再作成できる
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let mut alice = connect(&coordinator, "c1").await;
        let mut bob = connect(&coordinator, "c2").await;
        join(&coordinator, &alice, "A", "alice").await;
        join(&coordinator, &bob, "A", "bob").await;
        alice.drain();
        bob.drain();

        // when (操作):
        coordinator
            .handle(SessionEvent::Disconnected {
                connection_id: alice.id.clone(),
            })
            .await;
        coordinator
            .handle(SessionEvent::Disconnected {
                connection_id: bob.id.clone(),
            })
            .await;

        // then (期待する結果):
        let frames = bob.drain();
        assert_eq!(frames.len(), 1);
        assert_eq!(user_list_names(&frames[0]), vec!["bob"]);

        // 部屋 A は削除されているので、部屋数上限 1 でも部屋 B を作成できる
        let mut carol = connect(&coordinator, "c3").await;
        join(&coordinator, &carol, "B", "carol").await;
        assert_eq!(carol.drain()[0]["data"]["success"], true);
    }

    #[tokio::test]
    async fn test_spawned_loop_processes_events_in_order() {
        // テスト項目: spawn したイベントループがハンドル経由のイベントを到着順に処理する
        // given (前提条件):
        let coordinator = create_coordinator(RoomLimits::default());
        let (handle, task) = coordinator.spawn();
        let id = ConnectionId::new("c1".to_string()).unwrap();
        let (tx, mut rx) = mpsc::unbounded_channel();

        // when (操作):
        handle.connected(id.clone(), tx);
        handle.frame(
            id.clone(),
            r#"{"event":"join-room","data":{"room":"A","userName":"alice"},"ack":1}"#.to_string(),
        );
        handle.disconnected(id);
        drop(handle);
        task.await.unwrap();

        // then (期待する結果):
        let events: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok())
            .map(|text| {
                let frame: Value = serde_json::from_str(&text).unwrap();
                frame["event"].as_str().unwrap().to_string()
            })
            .collect();
        assert_eq!(events, vec!["connected", "ack", "user-list"]);
    }
}
