//! Utilities shared by the Hiroma binaries: logging setup and time helpers.

pub mod logger;
pub mod time;
