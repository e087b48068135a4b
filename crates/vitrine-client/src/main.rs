//! # vitrine-client
//!
//! Terminal client for the Vitrine messaging API, mainly used for
//! development and smoke-testing a running server.  `watch` doubles as a
//! reference implementation of the polling contract: thread refresh every
//! [`THREAD_POLL_SECS`] seconds, unread badge every
//! [`UNREAD_POLL_SECS`] seconds.
//!
//! [`THREAD_POLL_SECS`]: vitrine_shared::constants::THREAD_POLL_SECS
//! [`UNREAD_POLL_SECS`]: vitrine_shared::constants::UNREAD_POLL_SECS

mod api;
mod poller;

use std::sync::{Arc, Mutex};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vitrine_shared::constants::{THREAD_POLL_SECS, UNREAD_POLL_SECS};
use vitrine_shared::protocol::{MessageDto, UserRef};
use vitrine_shared::UserId;

use crate::api::ApiClient;
use crate::poller::Poller;

#[derive(Parser)]
#[command(name = "vitrine-client", about = "Terminal client for the Vitrine messaging API")]
struct Cli {
    /// Base URL of the Vitrine server.
    #[arg(long, default_value = "http://127.0.0.1:8080", env = "VITRINE_SERVER")]
    server: String,

    /// Act as this user (UUID).
    #[arg(long, env = "VITRINE_USER")]
    user: UserId,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List conversations, most recently active first.
    Conversations,
    /// Print the transcript with a peer (marks their messages read).
    Thread { peer: UserId },
    /// Send a message to a peer.
    Send { peer: UserId, body: String },
    /// Follow a thread, polling for new messages until Ctrl+C.
    Watch { peer: UserId },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    let cli = Cli::parse();
    let client = ApiClient::new(cli.server, cli.user);

    match cli.command {
        Command::Conversations => {
            let conversations = client.conversations().await?;
            if conversations.is_empty() {
                println!("No conversations.");
            }
            for conv in conversations {
                let badge = if conv.unread_count > 0 {
                    format!(" [{} unread]", conv.unread_count)
                } else {
                    String::new()
                };
                println!(
                    "{}{}  --  {} ({})",
                    display_name(&conv.other_user),
                    badge,
                    conv.last_message.body,
                    conv.last_message.created_at.format("%Y-%m-%d %H:%M"),
                );
            }
        }
        Command::Thread { peer } => {
            for message in client.thread(peer).await? {
                print_message(&message, cli.user);
            }
        }
        Command::Send { peer, body } => {
            let message = client.send(peer, &body).await?;
            println!("sent {}", message.id);
        }
        Command::Watch { peer } => {
            watch(client, cli.user, peer).await?;
        }
    }

    Ok(())
}

/// Poll the thread and the unread badge until interrupted.
async fn watch(client: ApiClient, me: UserId, peer: UserId) -> anyhow::Result<()> {
    let client = Arc::new(client);
    // The transcript is append-only, so a high-water mark is enough to
    // know which messages are new.
    let seen = Arc::new(Mutex::new(0usize));

    let thread_client = client.clone();
    let thread_seen = seen.clone();
    let thread_poll = Poller::every_secs(THREAD_POLL_SECS).spawn(move || {
        let client = thread_client.clone();
        let seen = thread_seen.clone();
        async move {
            match client.thread(peer).await {
                Ok(messages) => {
                    let mut seen = seen.lock().expect("poller lock");
                    for message in &messages[*seen..] {
                        print_message(message, me);
                    }
                    *seen = messages.len();
                }
                Err(e) => tracing::warn!(error = %e, "thread poll failed"),
            }
        }
    });

    let unread_client = client.clone();
    let unread_poll = Poller::every_secs(UNREAD_POLL_SECS).spawn(move || {
        let client = unread_client.clone();
        async move {
            match client.unread_count().await {
                Ok(count) if count > 0 => println!("-- {count} unread elsewhere --"),
                Ok(_) => {}
                Err(e) => tracing::warn!(error = %e, "unread poll failed"),
            }
        }
    });

    tokio::signal::ctrl_c().await?;
    thread_poll.stop();
    unread_poll.stop();
    Ok(())
}

fn print_message(message: &MessageDto, me: UserId) {
    let who = if message.sender_id == me { "you" } else { "them" };
    println!(
        "[{}] {}: {}",
        message.created_at.format("%H:%M:%S"),
        who,
        message.body
    );
}

fn display_name(user: &UserRef) -> String {
    match (&user.first_name, &user.email) {
        (Some(name), _) => name.clone(),
        (None, Some(email)) => email.clone(),
        (None, None) => user.id.to_string(),
    }
}
