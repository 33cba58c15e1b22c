// crates/chat-client/src/main.rs

mod network;

use anyhow::Result;
use chat_core::{ColorCode, MAX_USERNAME_LEN};
use chat_protocol::{Action, Request, Response};
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::network::{ResponseStream, ServerConnection};

#[derive(Parser)]
#[clap(name = "chat-client")]
#[clap(about = "Terminal client for the chat service")]
struct Cli {
    /// Server address
    #[clap(short, long, default_value = "127.0.0.1:5000")]
    server: String,

    /// Log in with this name instead of prompting
    #[clap(short, long)]
    username: Option<String>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        tracing_subscriber::fmt::init();
    }

    let mut connection = ServerConnection::connect(&cli.server).await?;
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    if !login(&mut connection, &mut stdin, cli.username).await? {
        return Ok(());
    }

    println!("commands: :users  :count  :logout  :quit — anything else is sent to the chat");

    let (mut sink, stream) = connection.split();
    let listener = tokio::spawn(listen_to_server(stream));

    while let Some(line) = stdin.next_line().await? {
        let input = line.trim();
        if input.is_empty() {
            continue;
        }

        match input {
            ":users" => sink.send(&Request::new(Action::GetUsers, "")).await?,
            ":count" => sink.send(&Request::new(Action::GetUsersCount, "")).await?,
            ":logout" => sink.send(&Request::new(Action::Logout, "")).await?,
            ":quit" => {
                let _ = sink.send(&Request::new(Action::Logout, "")).await;
                break;
            }
            command if command.starts_with(':') => {
                print_warning(&format!("unknown command {:?}", command));
            }
            message => {
                sink.send(&Request::new(Action::SendMessage, message)).await?;
                println!("me: {}", message);
            }
        }
    }

    listener.abort();
    Ok(())
}

/// Repeat login attempts until the server accepts a name.
///
/// Returns `false` on stdin EOF before any login succeeded.
async fn login(
    connection: &mut ServerConnection,
    stdin: &mut Lines<BufReader<Stdin>>,
    preset: Option<String>,
) -> Result<bool> {
    let mut preset = preset;

    loop {
        let username = match preset.take() {
            Some(name) => name,
            None => {
                println!("choose a username (max {} chars):", MAX_USERNAME_LEN);
                match stdin.next_line().await? {
                    Some(line) => line.trim().to_string(),
                    None => return Ok(false),
                }
            }
        };

        // Pre-checks the server enforces anyway; saves a round trip.
        if username.is_empty() {
            print_warning("empty username");
            continue;
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            print_warning("username too long");
            continue;
        }

        connection
            .send(&Request::new(Action::Login, username.as_str()))
            .await?;

        match connection.recv().await? {
            Some(response) if response.err => {
                print_warning(response.payload.as_str().unwrap_or("login failed"));
            }
            Some(response) => {
                println!(
                    "{}{}{}",
                    ColorCode::Green,
                    response.payload.as_str().unwrap_or("logged in"),
                    ColorCode::Default
                );
                return Ok(true);
            }
            None => {
                print_warning("connection to the server was lost");
                return Ok(false);
            }
        }
    }
}

/// Print everything the server pushes until the connection dies.
async fn listen_to_server(mut stream: ResponseStream) {
    loop {
        match stream.recv().await {
            Ok(Some(response)) => render(&response),
            Ok(None) | Err(_) => {
                print_warning("connection to the server was lost");
                std::process::exit(1);
            }
        }
    }
}

/// One printed line per server response worth showing.
fn render(response: &Response) {
    if response.err {
        print_warning(response.payload.as_str().unwrap_or("request failed"));
        return;
    }

    match Action::from_request_name(&response.name) {
        Some(Action::SendMessage) => {
            // Our own sends are acked with an empty payload; the local
            // echo already covered those.
            if let Some(line) = response.payload.as_str() {
                if !line.is_empty() {
                    println!("{}", line);
                }
            }
        }
        Some(Action::GetUsers) => {
            let users: Vec<&str> = response
                .payload
                .as_array()
                .map(|names| names.iter().filter_map(|n| n.as_str()).collect())
                .unwrap_or_default();
            println!("users in chat: {}", users.join(", "));
        }
        Some(Action::GetUsersCount) => {
            println!("users online: {}", response.payload);
        }
        Some(Action::Logout) => {
            println!("{}", response.payload.as_str().unwrap_or("logged out"));
        }
        _ if response.name == Action::ClientDisconnected.as_name() => {
            println!(
                "{}{}{}",
                ColorCode::Yellow,
                response.payload.as_str().unwrap_or("a client disconnected"),
                ColorCode::Default
            );
        }
        _ => tracing::debug!("ignoring response {:?}", response.name),
    }
}

fn print_warning(text: &str) {
    println!("{}warning:{} {}", ColorCode::Red, ColorCode::Default, text);
}
