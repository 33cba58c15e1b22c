// crates/chat-protocol/tests/envelope_wire.rs
//
// Wire-shape checks: field names and payload typing seen by clients,
// plus the decode failures the server treats as protocol violations.

use chat_core::ColorCode;
use chat_protocol::{
    decode_request, decode_response, encode_request, encode_response, format_broadcast, Action,
    Request, Response,
};
use serde_json::json;

#[test]
fn request_decodes_from_the_documented_shape() {
    let request = decode_request(br#"{"name":"login","payload":"alice"}"#).unwrap();
    assert_eq!(request.name, "login");
    assert_eq!(request.payload, json!("alice"));
}

#[test]
fn request_constructor_spells_the_wire_name() {
    let request = Request::new(Action::SendMessage, "hello");
    let frame = encode_request(&request).unwrap();

    let decoded = decode_request(&frame).unwrap();
    assert_eq!(decoded.name, "send_message");
    assert_eq!(decoded.payload, json!("hello"));
}

#[test]
fn request_payload_defaults_to_null_when_absent() {
    let request = decode_request(br#"{"name":"get_users"}"#).unwrap();
    assert_eq!(request.payload, serde_json::Value::Null);
}

#[test]
fn malformed_bytes_are_a_protocol_error() {
    assert!(decode_request(b"not json at all").is_err());
    assert!(decode_request(br#"{"payload":"missing name"}"#).is_err());
}

#[test]
fn response_frame_is_one_json_line() {
    let response = Response::ok(Action::GetUsersCount, 2);
    let frame = encode_response(&response).unwrap();

    assert_eq!(frame.last(), Some(&b'\n'));
    // Exactly one delimiter, at the end: frames never split mid-line.
    assert_eq!(frame.iter().filter(|b| **b == b'\n').count(), 1);

    let decoded = decode_response(&frame).unwrap();
    assert_eq!(decoded, response);
}

#[test]
fn error_response_carries_the_reason_as_string_payload() {
    let response = Response::error(Action::Login, "user already exists");
    assert!(response.err);
    assert_eq!(response.name, "login");
    assert_eq!(response.payload, json!("user already exists"));
}

#[test]
fn departure_notice_uses_the_push_only_action_name() {
    let response = Response::departure("alice disconnected from the chat");
    assert_eq!(response.name, "client_disconnected");
    assert!(!response.err);

    // Clients cannot request the push-only names.
    assert_eq!(Action::from_request_name("client_disconnected"), None);
    assert_eq!(Action::from_request_name("unknown"), None);
}

#[test]
fn request_names_round_trip_through_the_vocabulary() {
    for action in [
        Action::Login,
        Action::Logout,
        Action::SendMessage,
        Action::GetUsers,
        Action::GetUsersCount,
    ] {
        assert_eq!(Action::from_request_name(action.as_name()), Some(action));
    }
    assert_eq!(Action::from_request_name("make_coffee"), None);
}

#[test]
fn broadcast_line_wraps_the_name_in_the_sender_color() {
    let line = format_broadcast("alice", ColorCode::Red, "hello");
    assert_eq!(line, "\x1b[31malice\x1b[39m: hello");
}
