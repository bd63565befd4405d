//! Event Logger Example
//!
//! Logs every event a bot receives until Ctrl+C.
//!
//! By default the events are dispatched to one handler per kind. With `--raw`
//! the bot hands out undecoded events instead and the loop logs their
//! discriminant and payload as received.
//!
//! # Usage
//!
//! ```bash
//! ICQBOT_API__TOKEN=001.xxx cargo run --package event-logger
//! cargo run --package event-logger -- --config ./icqbot.toml --raw
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use icqbot::prelude::*;
use icqbot::runtime::ConfigLoader;

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Config file; the default search paths are used when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Config profile, overriding ICQBOT_PROFILE.
    #[arg(short, long)]
    profile: Option<String>,

    /// Log undecoded events instead of dispatching them.
    #[arg(long)]
    raw: bool,
}

// ============================================================================
// Handlers
// ============================================================================

fn handlers() -> HandlerTable {
    HandlerTable::builder()
        .on_new_message(|msg| async move {
            info!(
                chat = %msg.chat.chat_id,
                from = %msg.from.user_id,
                parts = msg.parts.len(),
                "[new] {}",
                msg.text.as_deref().unwrap_or("")
            );
        })
        .on_edited_message(|msg| async move {
            info!(
                chat = %msg.chat.chat_id,
                msg_id = %msg.msg_id,
                "[edited] {}",
                msg.text.as_deref().unwrap_or("")
            );
        })
        .on_deleted_message(|msg| async move {
            info!(chat = %msg.chat.chat_id, msg_id = %msg.msg_id, "[deleted]");
        })
        .on_pinned_message(|msg| async move {
            info!(chat = %msg.chat.chat_id, msg_id = %msg.msg_id, "[pinned]");
        })
        .on_unpinned_message(|msg| async move {
            info!(chat = %msg.chat.chat_id, msg_id = %msg.msg_id, "[unpinned]");
        })
        .on_new_chat_members(|joined| async move {
            let names: Vec<&str> = joined
                .new_members
                .iter()
                .map(|m| m.first_name.as_deref().unwrap_or(&m.user_id))
                .collect();
            info!(chat = %joined.chat.chat_id, "[joined] {}", names.join(", "));
        })
        .on_left_chat_members(|left| async move {
            let names: Vec<&str> = left
                .left_members
                .iter()
                .map(|m| m.first_name.as_deref().unwrap_or(&m.user_id))
                .collect();
            info!(chat = %left.chat.chat_id, "[left] {}", names.join(", "));
        })
        .on_error(|err| warn!(error = %err, "Bot error"))
        .build()
}

// ============================================================================
// Main Entry Point
// ============================================================================

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut loader = ConfigLoader::new();
    if let Some(profile) = &args.profile {
        loader = loader.profile(profile);
    }
    if let Some(path) = &args.config {
        loader = loader.file(path);
    }
    let config = loader.load()?;

    init_from_config(&config.logging);

    let bot = Bot::from_config(&config)?;
    let cancel = CancellationToken::new();

    let shutdown = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Ctrl+C received, shutting down");
        }
        shutdown.cancel();
    });

    if args.raw {
        let mut events = bot.poll_events(cancel)?;
        while let Some(event) = events.recv().await {
            info!(
                event_id = event.id,
                kind = %event.event_type,
                "{}",
                event.raw_payload()
            );
        }
        events.finish().await?;
    } else {
        let summary = bot.handle_events(handlers(), cancel).await?;
        info!(
            handled = summary.handled,
            unhandled = summary.unhandled,
            dropped = summary.dropped,
            skipped = summary.skipped,
            "Done"
        );
    }

    Ok(())
}
