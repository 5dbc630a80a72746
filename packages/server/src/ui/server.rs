//! Server execution logic.

use std::sync::Arc;

use axum::{Router, routing::get};
use hiroma_shared::time::SystemClock;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    config::{HeartbeatConfig, ServerConfig},
    infrastructure::{message_pusher::WebSocketMessagePusher, repository::InMemoryRoomRepository},
    usecase::{
        ConnectConnectionUseCase, DisconnectConnectionUseCase, GetRoomDetailUseCase,
        GetRoomsUseCase, JoinRoomUseCase, LeaveRoomUseCase,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    session::SessionCoordinator,
    signal::shutdown_signal,
    state::AppState,
};

/// Room membership server
///
/// # Example
///
/// ```ignore
/// let server = Server::from_config(&config);
/// server.run("127.0.0.1".to_string(), 3000).await?;
/// ```
pub struct Server {
    /// Event loop owning every membership change
    session_coordinator: SessionCoordinator,
    /// GetRoomsUseCase（部屋一覧取得のユースケース）
    get_rooms_usecase: Arc<GetRoomsUseCase>,
    /// GetRoomDetailUseCase（部屋詳細取得のユースケース）
    get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
    heartbeat: HeartbeatConfig,
}

impl Server {
    pub fn new(
        session_coordinator: SessionCoordinator,
        get_rooms_usecase: Arc<GetRoomsUseCase>,
        get_room_detail_usecase: Arc<GetRoomDetailUseCase>,
        heartbeat: HeartbeatConfig,
    ) -> Self {
        Self {
            session_coordinator,
            get_rooms_usecase,
            get_room_detail_usecase,
            heartbeat,
        }
    }

    /// Wire the in-memory implementations together
    pub fn from_config(config: &ServerConfig) -> Self {
        // Initialize dependencies in order:
        // 1. Repository
        // 2. MessagePusher
        // 3. UseCases
        // 4. Session coordinator

        // 1. Create Repository (in-memory store)
        let repository = Arc::new(InMemoryRoomRepository::new(config.limits));

        // 2. Create MessagePusher (WebSocket implementation)
        let message_pusher = Arc::new(WebSocketMessagePusher::new());

        // 3. Create UseCases
        let connect_connection_usecase =
            Arc::new(ConnectConnectionUseCase::new(message_pusher.clone()));
        let join_room_usecase = Arc::new(JoinRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
            Arc::new(SystemClock),
        ));
        let leave_room_usecase = Arc::new(LeaveRoomUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        ));
        let disconnect_connection_usecase = Arc::new(DisconnectConnectionUseCase::new(
            repository.clone(),
            message_pusher.clone(),
        ));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(repository.clone()));
        let get_room_detail_usecase = Arc::new(GetRoomDetailUseCase::new(repository));

        // 4. Create the session coordinator
        let session_coordinator = SessionCoordinator::new(
            connect_connection_usecase,
            join_room_usecase,
            leave_room_usecase,
            disconnect_connection_usecase,
            message_pusher,
        );

        Self::new(
            session_coordinator,
            get_rooms_usecase,
            get_room_detail_usecase,
            config.heartbeat,
        )
    }

    /// Start the session coordinator and build the router.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn into_router(self) -> Router {
        let (session, _coordinator_task) = self.session_coordinator.spawn();

        let app_state = Arc::new(AppState {
            session,
            heartbeat: self.heartbeat,
            get_rooms_usecase: self.get_rooms_usecase,
            get_room_detail_usecase: self.get_room_detail_usecase,
        });

        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_key}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .with_state(app_state)
    }

    /// Run the room membership server
    ///
    /// # Arguments
    ///
    /// * `host` - The host address to bind to (e.g., "127.0.0.1")
    /// * `port` - The port number to bind to (e.g., 3000)
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the specified address or
    /// if there's an error during server execution.
    pub async fn run(self, host: String, port: u16) -> Result<(), Box<dyn std::error::Error>> {
        let app = self.into_router();

        // Bind the server to the host and port
        let bind_addr = format!("{}:{}", host, port);
        let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

        // Start the server
        tracing::info!(
            "Room membership server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        // Set up graceful shutdown signal handler
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");

        Ok(())
    }
}
