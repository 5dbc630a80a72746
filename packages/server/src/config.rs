//! Server configuration, read once at process start.

use std::time::Duration;

use thiserror::Error;

use crate::domain::RoomLimits;

/// Default ping interval of the WebSocket heartbeat (seconds)
pub const DEFAULT_PING_INTERVAL_SECS: u64 = 20;

/// Default idle timeout after which a silent connection is dropped (seconds)
pub const DEFAULT_IDLE_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("MAX_ROOMS must be at least 1")]
    ZeroMaxRooms,

    #[error("MAX_ROOM_SIZE must be at least 1")]
    ZeroMaxRoomSize,

    #[error(
        "Idle timeout ({idle_timeout:?}) must be longer than the ping interval ({ping_interval:?})"
    )]
    IdleTimeoutTooShort {
        ping_interval: Duration,
        idle_timeout: Duration,
    },

    #[error("Idle timeout ({idle_timeout:?}) requires a ping interval")]
    IdleTimeoutWithoutPing { idle_timeout: Duration },
}

/// Liveness settings of a WebSocket connection.
///
/// The server pings every connection at `ping_interval` and closes it when
/// nothing (not even a pong) has been received for `idle_timeout`. Closing
/// runs the regular disconnect cleanup, so stale members do not linger in
/// their rooms. `None` disables the respective mechanism; an idle timeout
/// is only accepted together with pings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatConfig {
    pub ping_interval: Option<Duration>,
    pub idle_timeout: Option<Duration>,
}

impl HeartbeatConfig {
    /// Build from seconds, where `0` disables the mechanism
    pub fn from_secs(ping_interval_secs: u64, idle_timeout_secs: u64) -> Self {
        let non_zero = |secs: u64| (secs > 0).then(|| Duration::from_secs(secs));
        Self {
            ping_interval: non_zero(ping_interval_secs),
            idle_timeout: non_zero(idle_timeout_secs),
        }
    }

    /// No pings, no idle timeout: a connection is only cleaned up when the
    /// transport reports it closed
    pub fn disabled() -> Self {
        Self {
            ping_interval: None,
            idle_timeout: None,
        }
    }
}

impl Default for HeartbeatConfig {
    fn default() -> Self {
        Self::from_secs(DEFAULT_PING_INTERVAL_SECS, DEFAULT_IDLE_TIMEOUT_SECS)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub limits: RoomLimits,
    pub heartbeat: HeartbeatConfig,
}

impl ServerConfig {
    /// Check the settings that cannot be expressed by the types alone
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.max_rooms == 0 {
            return Err(ConfigError::ZeroMaxRooms);
        }
        if self.limits.max_room_size == 0 {
            return Err(ConfigError::ZeroMaxRoomSize);
        }
        match self.heartbeat {
            HeartbeatConfig {
                ping_interval: None,
                idle_timeout: Some(idle_timeout),
            } => Err(ConfigError::IdleTimeoutWithoutPing { idle_timeout }),
            HeartbeatConfig {
                ping_interval: Some(ping_interval),
                idle_timeout: Some(idle_timeout),
            } if idle_timeout <= ping_interval => Err(ConfigError::IdleTimeoutTooShort {
                ping_interval,
                idle_timeout,
            }),
            _ => Ok(()),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            limits: RoomLimits::default(),
            heartbeat: HeartbeatConfig::default(),
        }
    }
}
