//! Data Transfer Objects (DTOs) for the membership server.
//!
//! DTOs are organized by protocol:
//! - `websocket`: WebSocket frames
//! - `http`: HTTP API response DTOs

pub mod conversion;
pub mod http;
pub mod websocket;
