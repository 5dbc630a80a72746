//! Real-time room membership server.
//!
//! Clients connect over WebSocket, join named rooms under a display name and
//! receive the current member list of their rooms whenever it changes.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
