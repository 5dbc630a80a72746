//! MessagePusher trait
//!
//! Abstraction over "send this frame to these connections". The use case
//! layer depends only on this trait; the WebSocket implementation lives in
//! the infrastructure layer.

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{error::MessagePushError, value_object::ConnectionId};

/// Outbound channel of one connection
pub type PusherChannel = mpsc::UnboundedSender<String>;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessagePusher: Send + Sync {
    /// Register the outbound channel of a connection
    async fn register_client(&self, connection_id: ConnectionId, sender: PusherChannel);

    /// Forget the outbound channel of a connection
    async fn unregister_client(&self, connection_id: &ConnectionId);

    /// Push a frame to one connection
    async fn push_to(
        &self,
        connection_id: &ConnectionId,
        content: &str,
    ) -> Result<(), MessagePushError>;

    /// Push the same frame to every target.
    ///
    /// Targets that are gone are skipped; a broadcast never fails because of
    /// a single connection.
    async fn broadcast(
        &self,
        targets: Vec<ConnectionId>,
        content: &str,
    ) -> Result<(), MessagePushError>;
}
