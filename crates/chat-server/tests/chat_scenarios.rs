// crates/chat-server/tests/chat_scenarios.rs
//
// End-to-end scenarios against a live server on an ephemeral port:
// login uniqueness, user listing, relay with sender exclusion,
// departure notices, and protocol-violation handling.

use std::net::SocketAddr;
use std::time::Duration;

use chat_protocol::{decode_response, encode_request, Action, Request, Response};
use chat_server::config::Config;
use chat_server::server::ChatServer;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::time::timeout;

const RECV_TIMEOUT: Duration = Duration::from_secs(2);

async fn start_server() -> SocketAddr {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients: 64,
    };

    let server = ChatServer::bind(&config).await.expect("bind");
    let addr = server.local_addr().expect("local addr");

    tokio::spawn(async move {
        let _ = server.serve().await;
    });

    addr
}

struct TestClient {
    write: OwnedWriteHalf,
    lines: Lines<BufReader<OwnedReadHalf>>,
}

impl TestClient {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.expect("connect");
        let (read, write) = stream.into_split();

        TestClient {
            write,
            lines: BufReader::new(read).lines(),
        }
    }

    async fn send(&mut self, request: &Request) {
        let frame = encode_request(request).expect("encode");
        self.write.write_all(&frame).await.expect("send");
    }

    async fn send_raw(&mut self, bytes: &[u8]) {
        self.write.write_all(bytes).await.expect("send raw");
    }

    async fn recv(&mut self) -> Response {
        let line = timeout(RECV_TIMEOUT, self.lines.next_line())
            .await
            .expect("response before timeout")
            .expect("read line")
            .expect("connection still open");
        decode_response(line.as_bytes()).expect("decode response")
    }

    /// `None` once the server has closed the connection (a reset
    /// counts as closed too).
    async fn recv_eof(&mut self) -> Option<String> {
        timeout(RECV_TIMEOUT, self.lines.next_line())
            .await
            .expect("eof before timeout")
            .unwrap_or(None)
    }

    async fn request(&mut self, action: Action, payload: &str) -> Response {
        self.send(&Request::new(action, payload)).await;
        self.recv().await
    }

    async fn login(&mut self, name: &str) -> Response {
        self.request(Action::Login, name).await
    }

    async fn count(&mut self) -> u64 {
        let response = self.request(Action::GetUsersCount, "").await;
        assert!(!response.err);
        response.payload.as_u64().expect("count payload")
    }
}

#[tokio::test]
async fn login_then_list_users_in_registration_order() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    let welcome = alice.login("alice").await;
    assert!(!welcome.err);
    assert_eq!(welcome.name, "login");
    assert_eq!(welcome.payload, json!("welcome to the chat, alice"));

    assert!(!bob.login("bob").await.err);

    let users = alice.request(Action::GetUsers, "").await;
    assert_eq!(users.payload, json!(["alice", "bob"]));
    assert_eq!(alice.count().await, 2);
}

#[tokio::test]
async fn duplicate_login_is_refused_without_touching_the_registry() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut impostor = TestClient::connect(addr).await;

    assert!(!alice.login("alice").await.err);

    let refused = impostor.login("alice").await;
    assert!(refused.err);
    assert!(refused
        .payload
        .as_str()
        .unwrap()
        .contains("already exists"));

    assert_eq!(alice.count().await, 1);

    // The refused connection stays usable and may retry.
    assert!(!impostor.login("someone else").await.err);
    assert_eq!(alice.count().await, 2);
}

#[tokio::test]
async fn empty_login_name_is_refused() {
    let addr = start_server().await;

    let mut client = TestClient::connect(addr).await;
    let refused = client.login("").await;

    assert!(refused.err);
    assert_eq!(refused.payload, json!("empty username"));
    assert_eq!(client.count().await, 0);
}

#[tokio::test]
async fn unclean_disconnect_broadcasts_a_named_departure() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    assert!(!alice.login("alice").await.err);
    assert!(!bob.login("bob").await.err);

    // Socket dropped without a logout.
    drop(alice);

    let notice = bob.recv().await;
    assert_eq!(notice.name, "client_disconnected");
    assert!(!notice.err);
    assert!(notice.payload.as_str().unwrap().contains("alice"));

    assert_eq!(bob.count().await, 1);
}

#[tokio::test]
async fn send_message_requires_login_and_reaches_no_one() {
    let addr = start_server().await;

    let mut observer = TestClient::connect(addr).await;
    assert!(!observer.login("observer").await.err);

    let mut anon = TestClient::connect(addr).await;
    let refused = anon.request(Action::SendMessage, "hi there").await;
    assert!(refused.err);
    assert!(refused
        .payload
        .as_str()
        .unwrap()
        .contains("must be logged in"));

    // If the refused message had been relayed, it would already sit in
    // the observer's queue, ahead of this count reply.
    let reply = observer.request(Action::GetUsersCount, "").await;
    assert_eq!(reply.name, "get_users_count");
    assert_eq!(reply.payload, json!(1));
}

#[tokio::test]
async fn chat_message_is_relayed_to_everyone_but_the_sender() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;
    let mut carol = TestClient::connect(addr).await;

    assert!(!alice.login("alice").await.err);
    assert!(!bob.login("bob").await.err);
    assert!(!carol.login("carol").await.err);

    let ack = alice.request(Action::SendMessage, "hello everyone").await;
    assert!(!ack.err);
    assert_eq!(ack.payload, json!(""));

    for peer in [&mut bob, &mut carol] {
        let relayed = peer.recv().await;
        assert_eq!(relayed.name, "send_message");
        let line = relayed.payload.as_str().unwrap();
        assert!(line.starts_with('\u{1b}'));
        assert!(line.contains("alice\u{1b}[39m: hello everyone"));
    }

    // The sender got only the ack; its next reply is the count, not a
    // relayed copy of its own message.
    let reply = alice.request(Action::GetUsersCount, "").await;
    assert_eq!(reply.name, "get_users_count");
    assert_eq!(reply.payload, json!(3));
}

#[tokio::test]
async fn logout_unregisters_and_notifies_the_rest() {
    let addr = start_server().await;

    let mut alice = TestClient::connect(addr).await;
    let mut bob = TestClient::connect(addr).await;

    assert!(!alice.login("alice").await.err);
    assert!(!bob.login("bob").await.err);

    let goodbye = bob.request(Action::Logout, "").await;
    assert!(!goodbye.err);

    let notice = alice.recv().await;
    assert_eq!(notice.name, "client_disconnected");
    assert_eq!(notice.payload, json!("bob left the chat"));
    assert_eq!(alice.count().await, 1);

    // Logged out but still connected: may log back in under a free name.
    assert!(!bob.login("bob again").await.err);
    assert_eq!(alice.count().await, 2);
}

#[tokio::test]
async fn logout_without_login_is_an_error() {
    let addr = start_server().await;

    let mut anon = TestClient::connect(addr).await;
    let refused = anon.request(Action::Logout, "").await;

    assert!(refused.err);
    assert_eq!(refused.name, "logout");
}

#[tokio::test]
async fn unknown_action_gets_a_tagged_error_and_keeps_the_connection() {
    let addr = start_server().await;

    let mut client = TestClient::connect(addr).await;
    let response = client.request(Action::Login, "alice").await;
    assert!(!response.err);

    client
        .send(&Request {
            name: "make_coffee".to_string(),
            payload: json!(null),
        })
        .await;
    let response = client.recv().await;
    assert_eq!(response.name, "unknown");
    assert!(response.err);
    assert_eq!(response.payload, json!("unknown action"));

    // Business error: the connection is still serving requests.
    assert_eq!(client.count().await, 1);
}

#[tokio::test]
async fn malformed_envelope_is_answered_once_then_closed() {
    let addr = start_server().await;

    let mut client = TestClient::connect(addr).await;
    client.send_raw(b"this is not json\n").await;

    let response = client.recv().await;
    assert_eq!(response.name, "unknown");
    assert!(response.err);
    assert_eq!(response.payload, json!("invalid request"));

    assert_eq!(client.recv_eof().await, None);

    // No session ever existed, so the registry is untouched.
    let mut fresh = TestClient::connect(addr).await;
    assert_eq!(fresh.count().await, 0);
}

#[tokio::test]
async fn full_server_drops_new_connections_at_accept() {
    let config = Config {
        bind_addr: "127.0.0.1".to_string(),
        port: 0,
        max_clients: 1,
    };
    let server = ChatServer::bind(&config).await.expect("bind");
    let addr = server.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = server.serve().await;
    });

    let mut only = TestClient::connect(addr).await;
    assert!(!only.login("only").await.err);

    // Accepted after the cap is reached: the stream is dropped without
    // a response.
    let mut rejected = TestClient::connect(addr).await;
    assert_eq!(rejected.recv_eof().await, None);
}

#[tokio::test]
async fn envelopes_split_across_writes_still_decode() {
    let addr = start_server().await;

    let mut client = TestClient::connect(addr).await;
    let frame = encode_request(&Request::new(Action::Login, "alice")).expect("encode");
    let (head, tail) = frame.split_at(frame.len() / 2);

    client.send_raw(head).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    client.send_raw(tail).await;

    let welcome = client.recv().await;
    assert!(!welcome.err);
    assert_eq!(welcome.payload, json!("welcome to the chat, alice"));
}

#[tokio::test]
async fn two_envelopes_in_one_write_both_get_answered() {
    let addr = start_server().await;

    let mut client = TestClient::connect(addr).await;
    let mut bytes = encode_request(&Request::new(Action::Login, "alice")).expect("encode");
    bytes.extend(encode_request(&Request::new(Action::GetUsersCount, "")).expect("encode"));

    client.send_raw(&bytes).await;

    assert_eq!(client.recv().await.name, "login");
    let count = client.recv().await;
    assert_eq!(count.name, "get_users_count");
    assert_eq!(count.payload, json!(1));
}
