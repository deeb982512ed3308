//! ftclient library
//!
//! Two-connection file transfer client: a control connection carries one
//! command, a data connection accepted from the server carries the reply.

pub mod cli;
pub mod client;
pub mod command;
pub mod config;
pub mod control;
pub mod data;
pub mod dispatch;
pub mod error;
pub mod logger;
pub mod protocol;
pub mod stream_io;
