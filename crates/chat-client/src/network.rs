// crates/chat-client/src/network.rs

use anyhow::Result;
use chat_protocol::{decode_response, encode_request, Request, Response};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tracing::{debug, info};

/// Connection to the chat server.
///
/// Used whole during the login phase (one request, one reply), then
/// split so a listener task can consume pushes while the input loop
/// keeps sending. There is no reconnect: a lost connection means
/// redialing and logging in again.
pub struct ServerConnection {
    reader: ResponseStream,
    writer: RequestSink,
}

/// Reading half: one decoded response per newline-delimited frame.
pub struct ResponseStream {
    lines: Lines<BufReader<OwnedReadHalf>>,
}

/// Writing half: encodes and sends requests.
pub struct RequestSink {
    write: OwnedWriteHalf,
}

impl ServerConnection {
    pub async fn connect(addr: &str) -> Result<Self> {
        info!("connecting to {}...", addr);
        let stream = TcpStream::connect(addr).await?;
        stream.set_nodelay(true)?;
        info!("connected");

        let (read, write) = stream.into_split();
        Ok(ServerConnection {
            reader: ResponseStream {
                lines: BufReader::new(read).lines(),
            },
            writer: RequestSink { write },
        })
    }

    pub async fn send(&mut self, request: &Request) -> Result<()> {
        self.writer.send(request).await
    }

    pub async fn recv(&mut self) -> Result<Option<Response>> {
        self.reader.recv().await
    }

    /// Split into independently-owned halves for concurrent use.
    pub fn split(self) -> (RequestSink, ResponseStream) {
        (self.writer, self.reader)
    }
}

impl ResponseStream {
    /// Next response from the server; `None` once the connection is gone.
    pub async fn recv(&mut self) -> Result<Option<Response>> {
        loop {
            match self.lines.next_line().await? {
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => {
                    let response = decode_response(line.as_bytes())?;
                    debug!("received {}", response.name);
                    return Ok(Some(response));
                }
                None => return Ok(None),
            }
        }
    }
}

impl RequestSink {
    pub async fn send(&mut self, request: &Request) -> Result<()> {
        let frame = encode_request(request)?;
        self.write.write_all(&frame).await?;
        self.write.flush().await?;
        debug!("sent {}", request.name);
        Ok(())
    }
}
