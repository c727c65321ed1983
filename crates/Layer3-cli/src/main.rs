//! Mirror CLI - Main entry point
//!
//! Replays a recorded gateway feed (one JSON frame per line) through the
//! event bus and prints what ended up in the entity store.

mod replay;

use clap::Parser;
use mirror_core::events::{GuildDelete, GuildJoin, InteractionCreate, MessageCreate, Ready};
use mirror_core::{ConnectionState, MirrorConfig};
use mirror_foundation::{EmitterConfig, MIRROR_CONFIG_FILE};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, BufReader};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Mirror - replay a gateway feed into an in-memory entity store
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Feed file (newline-delimited JSON frames); reads stdin when omitted
    input: Option<PathBuf>,

    /// JSON config file (defaults to ./mirror.json when present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Message ring buffer size (0 = keep every message)
    #[arg(long)]
    max_messages: Option<usize>,

    /// Print store stats as JSON instead of text
    #[arg(long)]
    json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = if args.debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_target(false).with_writer(std::io::stderr))
        .init();

    let config = build_config(&args)?;
    let state = ConnectionState::new(config);
    attach_log_listeners(&state);

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.input {
        Some(path) => Box::new(BufReader::new(tokio::fs::File::open(path).await?)),
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let summary = replay::replay(&state, reader).await?;
    info!(%summary, "Replay finished");

    let stats = state.cache().stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
    } else {
        println!("{}", stats);
    }
    Ok(())
}

/// Config file first, then command line overrides
fn build_config(args: &Args) -> anyhow::Result<MirrorConfig> {
    let mut config = match &args.config {
        Some(path) => MirrorConfig::load(path)?,
        None => MirrorConfig::load_optional(MIRROR_CONFIG_FILE)?.unwrap_or_default(),
    };

    if let Some(max) = args.max_messages {
        let max = if max == 0 { None } else { Some(max) };
        let cache = config.cache.clone().with_max_messages(max);
        config = config.with_cache(cache);
    }
    if args.debug {
        let emitter = EmitterConfig {
            debug_mode: true,
            ..config.emitter.clone()
        };
        config = config.with_emitter(emitter);
    }
    Ok(config)
}

fn attach_log_listeners(state: &Arc<ConnectionState>) {
    let emitter = state.emitter();

    emitter.on::<Ready, _, _>("log-ready", |event| async move {
        info!(user = %event.user.display_name(), guilds = event.guilds.len(), "Ready");
        Ok(())
    });
    emitter.on::<GuildJoin, _, _>("log-guild-join", |event| async move {
        info!(guild_id = %event.guild.id, name = ?event.guild.name, "Joined guild");
        Ok(())
    });
    emitter.on::<GuildDelete, _, _>("log-guild-delete", |event| async move {
        info!(guild_id = %event.guild_id, "Left guild");
        Ok(())
    });
    emitter.on::<MessageCreate, _, _>("log-message", |event| async move {
        info!(
            message_id = %event.message.id,
            author = %event.message.author.display_name(),
            "Message"
        );
        Ok(())
    });
    emitter.on::<InteractionCreate, _, _>("log-interaction", |event| async move {
        info!(
            interaction_id = %event.interaction.id,
            custom_id = ?event.interaction.custom_id(),
            "Interaction"
        );
        Ok(())
    });
}
