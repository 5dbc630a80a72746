//! Domain layer: membership model, policy and the ports used by use cases.

pub mod entity;
pub mod error;
pub mod factory;
pub mod message_pusher;
pub mod registry;
pub mod repository;
pub mod value_object;

pub use entity::{Member, Room};
pub use error::{JoinError, MessagePushError, ValueObjectError};
pub use factory::ConnectionIdFactory;
pub use message_pusher::{MessagePusher, PusherChannel};
pub use registry::{RoomLimits, RoomRegistry, RoomTransition};
pub use repository::RoomRepository;
pub use value_object::{ConnectionId, DisplayName, RoomKey, Timestamp};

#[cfg(test)]
pub use message_pusher::MockMessagePusher;
