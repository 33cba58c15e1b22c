//! chat-protocol
//!
//! Wire-level envelopes for the chat service.
//!
//! This crate turns logical requests/responses into bytes and back:
//!
//! - [`action`]     : action-name vocabulary
//! - [`envelope`]   : `Request` / `Response` shapes
//! - [`json_codec`] : newline-delimited JSON framing

pub mod action;
pub mod envelope;
pub mod json_codec;

pub use action::Action;
pub use envelope::{format_broadcast, Request, Response};
pub use json_codec::{
    decode_request, decode_response, encode_request, encode_response, ProtocolError,
};
