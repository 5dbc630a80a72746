//! Axum handlers.

pub mod http;
pub mod websocket;

pub use http::{get_room_detail, get_rooms, health_check};
pub use websocket::websocket_handler;
