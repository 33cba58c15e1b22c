//! Session records: one per authenticated connection.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::color::ColorCode;

/// Maximum display-name length accepted at registration.
pub const MAX_USERNAME_LEN: usize = 14;

/// Outbound channel handle for one connection.
///
/// Carries already-encoded wire frames; the receiving end is owned by
/// that connection's writer task, which is the sole writer to the
/// underlying socket. Sending is non-blocking, so broadcast loops never
/// stall on a slow peer.
pub type SessionTx = mpsc::UnboundedSender<Vec<u8>>;
pub type SessionRx = mpsc::UnboundedReceiver<Vec<u8>>;

/// One registered chat session.
///
/// Exists only between a successful login and the matching
/// unregister; an accepted-but-unauthenticated connection has no
/// `Session`. The registry keys sessions by `peer`, not by name,
/// since the remote endpoint outlives any name the user picks.
#[derive(Debug, Clone)]
pub struct Session {
    /// Remote endpoint of the backing connection; registry key.
    pub peer: SocketAddr,

    /// Display name, unique among registered sessions.
    pub username: String,

    /// Palette color, unique among registered sessions.
    pub color: ColorCode,

    /// Frame channel into this session's writer task.
    pub outbound: SessionTx,
}

impl Session {
    /// Queue an encoded frame for delivery to this session's socket.
    ///
    /// A send failure means the writer task is already gone; the
    /// lifecycle cleanup for that connection handles removal, so the
    /// result only says whether the frame was accepted.
    pub fn send_frame(&self, frame: Vec<u8>) -> bool {
        self.outbound.send(frame).is_ok()
    }
}
