//! UI layer: the axum server, its handlers and the session coordinator.

mod handler;
mod server;
pub mod session;
mod signal;
pub mod state;

pub use server::Server;
