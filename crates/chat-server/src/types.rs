//! Shared types for the chat TCP server.
//!
//! This module defines:
//! - channel aliases between a session task and its writer task
//! - `SessionContext`: the typed per-connection identity handed to
//!   the dispatcher and every handler

use std::net::SocketAddr;

use chat_core::{SessionRx, SessionTx};

/// Outbound frames from the server to a given connection.
///
/// The sending half is what the registry stores for broadcast; the
/// receiving half is owned by the connection's writer task.
pub type OutboundTx = SessionTx;
pub type OutboundRx = SessionRx;

/// Identity of the connection a request arrived on.
///
/// Handlers receive this instead of the socket itself: `peer` is the
/// registry key, `outbound` is how a login can hand the registry a
/// channel into this connection's writer task. Whether the connection
/// is authenticated is answered by the registry, not carried here.
#[derive(Debug, Clone)]
pub struct SessionContext {
    /// Remote endpoint; registry key for this connection.
    pub peer: SocketAddr,

    /// Frame channel into this connection's writer task.
    pub outbound: OutboundTx,
}
