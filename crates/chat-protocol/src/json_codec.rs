// crates/chat-protocol/src/json_codec.rs

//! Newline-delimited JSON framing.
//!
//! One envelope per `\n`-terminated line. The delimiter is the only
//! framing: envelopes may be split across socket reads, and several
//! may arrive in one read.
//!
//! Encoders append the trailing newline; decoders accept a line with
//! or without it.

use thiserror::Error;

use crate::envelope::{Request, Response};

/// Wire-level decode failure. Fatal to the connection that sent it.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed envelope: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Encode a request as one wire frame (JSON line).
pub fn encode_request(request: &Request) -> Result<Vec<u8>, ProtocolError> {
    let mut frame = serde_json::to_vec(request)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Encode a response as one wire frame (JSON line).
pub fn encode_response(response: &Response) -> Result<Vec<u8>, ProtocolError> {
    let mut frame = serde_json::to_vec(response)?;
    frame.push(b'\n');
    Ok(frame)
}

/// Decode one frame into a request.
pub fn decode_request(frame: &[u8]) -> Result<Request, ProtocolError> {
    Ok(serde_json::from_slice(trim_line(frame))?)
}

/// Decode one frame into a response.
pub fn decode_response(frame: &[u8]) -> Result<Response, ProtocolError> {
    Ok(serde_json::from_slice(trim_line(frame))?)
}

fn trim_line(frame: &[u8]) -> &[u8] {
    let mut end = frame.len();
    while end > 0 && (frame[end - 1] == b'\n' || frame[end - 1] == b'\r') {
        end -= 1;
    }
    &frame[..end]
}
