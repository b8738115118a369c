//! Chatline - terminal client for a real-time chat backend
//!
//! Keeps a local set of conversations, talks to the backend over a
//! reconnecting websocket, and mirrors the conversation list through the
//! backend's REST endpoints.

mod command;
mod config;
mod controller;
mod conversation;
mod remote;
mod router;
mod store;
mod transport;

#[cfg(test)]
pub mod testing;

use command::{Command, HELP};
use config::ChatConfig;
use controller::{ProductionSession, SendOutcome, SessionUpdate};
use conversation::Sender;
use remote::HttpRemoteStore;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use transport::WebSocketConnector;

#[derive(Debug, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr; stdout belongs to the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatline=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = ChatConfig::from_env();
    tracing::info!(
        server_url = %config.server_url,
        ws_url = %config.ws_url,
        reconnect_delay_ms = %config.reconnect_delay.as_millis(),
        "Starting chat client"
    );

    let remote = HttpRemoteStore::new(&config.server_url, config.request_timeout)?;
    let mut session = ProductionSession::new(&config, remote, WebSocketConnector::new());

    println!("{HELP}");
    if let Some(update) = session.open() {
        render_update(&update);
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => match line {
                Ok(Some(line)) => {
                    if run_command(&mut session, Command::parse(&line)) == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    tracing::error!(error = %e, "Failed to read input");
                    break;
                }
            },
            Some(event) = session.next_event() => {
                if let Some(update) = session.handle_event(event) {
                    render_update(&update);
                }
            }
        }
    }

    if let Some(update) = session.shutdown() {
        render_update(&update);
    }
    Ok(())
}

fn run_command(session: &mut ProductionSession, command: Command) -> Flow {
    match command {
        Command::Say(text) => match session.send_message(&text) {
            SendOutcome::Sent {
                conversation_id,
                created,
            } => {
                if created {
                    println!("[started conversation {conversation_id}]");
                }
                if session.is_pending() {
                    println!("[waiting for reply]");
                }
            }
            SendOutcome::Empty => {}
            SendOutcome::NotConnected => println!(
                "[connection {}, message discarded]",
                session.connection_status()
            ),
            SendOutcome::Unsent { .. } => println!("[connection lost, message not delivered]"),
        },
        Command::New(seed) => {
            let id = session.new_conversation(&seed);
            println!("[started conversation {id}]");
        }
        Command::List => {
            let active = session.active_conversation_id();
            if session.conversations().is_empty() {
                println!("[no conversations]");
            }
            for conversation in session.conversations() {
                let marker = if Some(conversation.id()) == active { '*' } else { ' ' };
                println!("{marker} {}  {}", conversation.id(), conversation.title());
            }
        }
        Command::Resume(id) => match session.resume(&id) {
            Ok(()) => {
                if let Some(conversation) = session.active_conversation() {
                    println!("[resumed \"{}\"]", conversation.title());
                }
                for message in session.visible_messages() {
                    println!("{}> {}", speaker(message.sender), message.text);
                }
            }
            Err(e) => println!("[{e}]"),
        },
        Command::Delete(id) => match session.delete_conversation(&id) {
            Ok(()) => println!("[deleted {id}]"),
            Err(e) => println!("[{e}]"),
        },
        Command::Help => println!("{HELP}"),
        Command::Quit => return Flow::Quit,
        Command::Invalid(reason) => println!("[{reason}]"),
    }
    Flow::Continue
}

fn render_update(update: &SessionUpdate) {
    match update {
        SessionUpdate::Reply { message, .. } => {
            println!("{}> {}", speaker(message.sender), message.text);
        }
        SessionUpdate::ConnectionChanged(status) => println!("[connection {status}]"),
        SessionUpdate::ConversationsLoaded { count } => println!("[{count} conversations loaded]"),
        SessionUpdate::ConversationDeleted { id, remote_ok } => {
            if !remote_ok {
                println!("[server did not confirm deletion of {id}]");
            }
        }
    }
}

fn speaker(sender: Sender) -> &'static str {
    match sender {
        Sender::User => "you",
        Sender::Assistant => "ai",
    }
}
