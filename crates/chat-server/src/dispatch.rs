//! Request dispatcher and the built-in action handlers.
//!
//! The dispatcher owns the shared [`SessionRegistry`] and an immutable
//! table mapping action names to handler functions. The table is built
//! once at startup and never mutated, so dispatch itself takes no lock;
//! only the registry calls inside a handler do.
//!
//! Handlers are plain `fn` values: pure in their inputs except for the
//! documented registry effect (login and logout mutate it, the rest
//! only read it).

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use chat_core::SessionRegistry;
use chat_protocol::{encode_response, format_broadcast, Action, Request, Response};
use serde_json::Value;
use tracing::{error, info};

use crate::types::SessionContext;

/// One request handler: `(registry, connection identity, payload) -> response`.
pub type Handler = fn(&SessionRegistry, &SessionContext, &Value) -> Response;

/// Routes decoded requests to their handlers by action name.
pub struct Dispatcher {
    registry: Arc<SessionRegistry>,
    handlers: HashMap<Action, Handler>,
}

impl Dispatcher {
    /// Build the dispatcher with the five built-in actions.
    pub fn new(registry: Arc<SessionRegistry>) -> Self {
        let mut handlers: HashMap<Action, Handler> = HashMap::new();
        handlers.insert(Action::Login, login);
        handlers.insert(Action::Logout, logout);
        handlers.insert(Action::SendMessage, send_message);
        handlers.insert(Action::GetUsers, get_users);
        handlers.insert(Action::GetUsersCount, get_users_count);

        Dispatcher { registry, handlers }
    }

    /// The shared registry this dispatcher routes through.
    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    /// Route one request to its handler and return the response.
    ///
    /// Total: an unroutable name produces an error response tagged
    /// `unknown`, never a panic.
    pub fn dispatch(&self, ctx: &SessionContext, request: &Request) -> Response {
        let handler = Action::from_request_name(&request.name)
            .and_then(|action| self.handlers.get(&action));

        match handler {
            Some(handler) => handler(&self.registry, ctx, &request.payload),
            None => Response::error(Action::Unknown, "unknown action"),
        }
    }
}

/// Push a response to every registered session except `exclude`.
///
/// Encodes once, then sends the frame over each session's outbound
/// channel from a registry snapshot; no lock is held while sending and
/// sends never block, so a stalled peer only delays itself.
pub fn broadcast(registry: &SessionRegistry, exclude: Option<SocketAddr>, response: &Response) {
    let frame = match encode_response(response) {
        Ok(frame) => frame,
        Err(err) => {
            error!("failed to encode broadcast: {}", err);
            return;
        }
    };

    for session in registry.snapshot() {
        if Some(session.peer) == exclude {
            continue;
        }
        session.send_frame(frame.clone());
    }
}

fn login(registry: &SessionRegistry, ctx: &SessionContext, payload: &Value) -> Response {
    let Some(username) = payload.as_str() else {
        return Response::error(Action::Login, "empty username");
    };

    match registry.register(ctx.peer, username, ctx.outbound.clone()) {
        Ok(session) => {
            info!("{} logged in as {:?}", session.peer, session.username);
            Response::ok(
                Action::Login,
                format!("welcome to the chat, {}", session.username),
            )
        }
        Err(err) => Response::error(Action::Login, err.to_string()),
    }
}

fn logout(registry: &SessionRegistry, ctx: &SessionContext, _payload: &Value) -> Response {
    match registry.unregister(ctx.peer) {
        Ok(session) => {
            info!("{} logged out as {:?}", session.peer, session.username);
            let notice = format!("{} left the chat", session.username);
            broadcast(registry, None, &Response::departure(notice));
            Response::ok(Action::Logout, "you have left the chat")
        }
        Err(err) => Response::error(Action::Logout, err.to_string()),
    }
}

fn send_message(registry: &SessionRegistry, ctx: &SessionContext, payload: &Value) -> Response {
    let sender = match registry.lookup(ctx.peer) {
        Ok(session) => session,
        Err(_) => {
            return Response::error(
                Action::SendMessage,
                "you must be logged in to send messages in chat",
            )
        }
    };

    let Some(text) = payload.as_str() else {
        return Response::error(Action::SendMessage, "invalid payload");
    };

    let line = format_broadcast(&sender.username, sender.color, text);
    // The sender renders its own local echo; never relay back to it.
    broadcast(
        registry,
        Some(sender.peer),
        &Response::ok(Action::SendMessage, line),
    );

    Response::ok(Action::SendMessage, "")
}

fn get_users(registry: &SessionRegistry, _ctx: &SessionContext, _payload: &Value) -> Response {
    let names: Vec<Value> = registry
        .snapshot()
        .into_iter()
        .map(|session| Value::String(session.username))
        .collect();

    Response::ok(Action::GetUsers, names)
}

fn get_users_count(registry: &SessionRegistry, _ctx: &SessionContext, _payload: &Value) -> Response {
    Response::ok(Action::GetUsersCount, registry.count() as u64)
}
