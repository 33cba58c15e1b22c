//! TCP listener and top-level server wiring.
//!
//! This module:
//! - Listens on the configured address/port.
//! - Accepts new TCP connections, subject to the max-clients cap.
//! - Spawns one session task per connection.
//!
//! The per-connection logic lives in the `session` module; request
//! routing lives in `dispatch`. The registry behind the dispatcher is
//! the only state shared between session tasks.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use chat_core::SessionRegistry;
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::config::Config;
use crate::dispatch::Dispatcher;
use crate::session;

/// A bound chat server, ready to accept connections.
///
/// Split from [`run`] so callers (and the scenario tests) can bind
/// port 0 and read back the ephemeral address before serving.
pub struct ChatServer {
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    max_clients: usize,
}

impl ChatServer {
    /// Bind the listener and build the dispatcher + registry.
    pub async fn bind(config: &Config) -> Result<Self> {
        let listener = TcpListener::bind(config.socket_addr_string()).await?;
        let registry = Arc::new(SessionRegistry::new());

        Ok(ChatServer {
            listener,
            dispatcher: Arc::new(Dispatcher::new(registry)),
            max_clients: config.max_clients,
        })
    }

    /// Address the listener actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections forever, one session task each.
    pub async fn serve(self) -> Result<()> {
        info!("listening on {}", self.listener.local_addr()?);

        loop {
            let (stream, peer) = self.listener.accept().await?;

            if self.dispatcher.registry().count() >= self.max_clients {
                warn!(
                    "rejecting connection from {}: max_clients ({}) reached",
                    peer, self.max_clients
                );
                // Just drop the stream; the client sees the close.
                continue;
            }

            info!("new client from {}", peer);

            let dispatcher = Arc::clone(&self.dispatcher);
            tokio::spawn(async move {
                session::run_session(dispatcher, stream, peer).await;
            });
        }
    }
}

/// Run the TCP server with the given configuration.
pub async fn run(config: Config) -> Result<()> {
    ChatServer::bind(&config).await?.serve().await
}
