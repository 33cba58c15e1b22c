//! chat-server
//!
//! Multi-client async TCP server for the chat service.

pub mod config;
pub mod dispatch;
pub mod server;
pub mod types;

// internal module, not re-exported
mod session;
