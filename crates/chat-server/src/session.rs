//! Per-connection lifecycle: read loop, dispatch, disconnect cleanup.
//!
//! Each accepted connection gets one task running [`run_session`]:
//! - the stream is split; a writer task owns the write half and drains
//!   the connection's outbound frame channel,
//! - the read loop accumulates bytes and decodes one envelope per
//!   newline-terminated line, so envelopes may span reads,
//! - every decoded request goes through the dispatcher and the
//!   response is queued back on the outbound channel.
//!
//! Any read failure, EOF, or malformed envelope ends the loop, and the
//! one cleanup path runs: unregister if a session exists for this
//! connection key, broadcast the departure notice, let the writer task
//! drain and close the socket.

use std::net::SocketAddr;
use std::sync::Arc;

use chat_protocol::{decode_request, encode_response, Action, Response};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::OwnedReadHalf;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dispatch::{broadcast, Dispatcher};
use crate::types::{OutboundRx, OutboundTx, SessionContext};

/// Drive one connection from accept to close.
pub async fn run_session(dispatcher: Arc<Dispatcher>, stream: TcpStream, peer: SocketAddr) {
    let (mut read_stream, mut write_stream) = stream.into_split();
    let (out_tx, mut out_rx): (OutboundTx, OutboundRx) = mpsc::unbounded_channel();

    // Writer task: sole writer to this socket. Ends when every sender
    // clone (ours and the registry's) is gone and the queue is drained.
    let writer = tokio::spawn(async move {
        while let Some(frame) = out_rx.recv().await {
            if let Err(err) = write_stream.write_all(&frame).await {
                debug!("write failed: {}", err);
                break;
            }
        }
    });

    let ctx = SessionContext {
        peer,
        outbound: out_tx,
    };

    read_loop(&dispatcher, &ctx, &mut read_stream).await;
    cleanup(&dispatcher, peer);

    // Drop our sender so the writer drains, then closes the socket.
    drop(ctx);
    let _ = writer.await;
}

/// Read and dispatch envelopes until the connection dies.
async fn read_loop(dispatcher: &Dispatcher, ctx: &SessionContext, read_stream: &mut OwnedReadHalf) {
    let mut buffer = Vec::new();
    let mut temp_buf = [0u8; 1024];

    loop {
        match read_stream.read(&mut temp_buf).await {
            Ok(0) => {
                debug!("{} closed the connection", ctx.peer);
                return;
            }
            Ok(n) => {
                buffer.extend_from_slice(&temp_buf[..n]);

                while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                    let line: Vec<u8> = buffer.drain(..=newline_pos).collect();
                    if line.iter().all(|b| b.is_ascii_whitespace()) {
                        continue;
                    }

                    let request = match decode_request(&line) {
                        Ok(request) => request,
                        Err(err) => {
                            // Protocol violation: report once, then close
                            // rather than try to resynchronize the stream.
                            warn!("{} sent a malformed envelope: {}", ctx.peer, err);
                            send_response(ctx, &Response::error(Action::Unknown, "invalid request"));
                            return;
                        }
                    };

                    debug!("{} -> {}", ctx.peer, request.name);
                    let response = dispatcher.dispatch(ctx, &request);
                    if !send_response(ctx, &response) {
                        return;
                    }
                }
            }
            Err(err) => {
                debug!("{} read error: {}", ctx.peer, err);
                return;
            }
        }
    }
}

/// Queue a response on this connection's outbound channel.
fn send_response(ctx: &SessionContext, response: &Response) -> bool {
    match encode_response(response) {
        Ok(frame) => ctx.outbound.send(frame).is_ok(),
        Err(err) => {
            warn!("failed to encode response for {}: {}", ctx.peer, err);
            false
        }
    }
}

/// Remove this connection's session, if any, and tell the others.
///
/// Safe to reach from every exit path: a second unregister for the
/// same key is a no-op (`NotFound`), so a logout followed by a drop
/// only produces the anonymous notice.
fn cleanup(dispatcher: &Dispatcher, peer: SocketAddr) {
    let registry = dispatcher.registry();

    let notice = match registry.unregister(peer) {
        Ok(session) => format!("{} disconnected from the chat", session.username),
        Err(_) => format!("server disconnected from client: {}", peer),
    };

    info!("{}", notice);
    broadcast(registry, None, &Response::departure(notice));
}
