//! Request/response envelopes exchanged over a connection.
//!
//! Both shapes are deliberately loose on the payload side: `payload`
//! is arbitrary JSON whose concrete type depends on the action
//! (string for login/logout/errors, list of strings for `get_users`,
//! integer for `get_users_count`).

use chat_core::ColorCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::Action;

/// One client request.
///
/// `name` stays a plain string here: an unknown action must reach the
/// dispatcher and come back as a tagged error response, not fail
/// decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Request {
    pub name: String,
    #[serde(default)]
    pub payload: Value,
}

/// One server response, solicited or pushed.
///
/// `err` flags a handler-level failure; transport failures never
/// travel in an envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub name: String,
    pub err: bool,
    #[serde(default)]
    pub payload: Value,
}

impl Request {
    pub fn new(action: Action, payload: impl Into<Value>) -> Self {
        Request {
            name: action.as_name().to_string(),
            payload: payload.into(),
        }
    }
}

impl Response {
    /// Successful response for `action`.
    pub fn ok(action: Action, payload: impl Into<Value>) -> Self {
        Response {
            name: action.as_name().to_string(),
            err: false,
            payload: payload.into(),
        }
    }

    /// Error response for `action` with a human-readable reason.
    pub fn error(action: Action, reason: impl Into<String>) -> Self {
        Response {
            name: action.as_name().to_string(),
            err: true,
            payload: Value::String(reason.into()),
        }
    }

    /// Unsolicited departure notice pushed to remaining sessions.
    pub fn departure(notice: impl Into<String>) -> Self {
        Response {
            name: Action::ClientDisconnected.as_name().to_string(),
            err: false,
            payload: Value::String(notice.into()),
        }
    }
}

/// Render a relayed chat line: the sender's name in its assigned
/// color, then the message in the terminal's default color.
pub fn format_broadcast(username: &str, color: ColorCode, text: &str) -> String {
    format!(
        "{}{}{}: {}",
        color.as_str(),
        username,
        ColorCode::Default.as_str(),
        text
    )
}
