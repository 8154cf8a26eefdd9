mod config;
mod tui;

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use env_logger::{Env, Target};
use tokio::sync::mpsc;

use quizroom::{Channel, DEFAULT_ENDPOINT, QuizClient};

use config::ClientConfig;

#[derive(Parser)]
#[command(name = "quizroom")]
#[command(about = "Terminal client for live quiz rooms")]
struct Args {
    #[arg(
        short,
        long,
        env = "QUIZROOM_ENDPOINT",
        default_value = DEFAULT_ENDPOINT,
        help = "WebSocket endpoint of the quiz server"
    )]
    endpoint: String,

    #[arg(
        long,
        default_value_t = ClientConfig::default().event_capacity,
        help = "Inbound event buffer size"
    )]
    event_capacity: usize,

    #[arg(
        long,
        default_value_t = ClientConfig::default().shutdown_timeout_ms,
        help = "Grace period for closing the socket"
    )]
    shutdown_timeout_ms: u64,

    #[arg(long, help = "Write logs to this file")]
    log_file: Option<PathBuf>,

    #[arg(short, long, help = "Prefill the player name")]
    name: Option<String>,
}

impl From<Args> for ClientConfig {
    fn from(args: Args) -> Self {
        Self {
            endpoint: args.endpoint,
            event_capacity: args.event_capacity,
            shutdown_timeout_ms: args.shutdown_timeout_ms,
            log_file: args.log_file,
            player_name: args.name,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ClientConfig::from(Args::parse());
    init_logging(config.log_file.as_deref())?;

    let mut channel = Channel::new(config.channel());
    let connected = channel.connect(&config.endpoint).await;
    let (mut client, snapshots) = QuizClient::new(channel);

    let events = match connected {
        Ok(events) => {
            log::info!("Connected to {}", config.endpoint);
            Some(events)
        }
        Err(e) => {
            log::error!("Failed to connect: {}", e);
            client.connection_failed(&e);
            None
        }
    };

    let (intents, intent_rx) = mpsc::channel(32);
    let runner = tokio::spawn(client.run(events, intent_rx));

    let result = tui::run(snapshots, intents, config.player_name.clone()).await;
    runner.await.context("client task failed")?;

    if let Err(e) = result {
        eprintln!("TUI error: {}", e);
        return Err(e.into());
    }

    log::info!("Exiting");
    Ok(())
}

fn init_logging(log_file: Option<&Path>) -> anyhow::Result<()> {
    let mut builder = match log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            let mut builder = env_logger::Builder::from_env(Env::default().default_filter_or("warn"));
            builder.target(Target::Pipe(Box::new(file)));
            builder
        }
        None => env_logger::Builder::from_env(Env::default().default_filter_or("off")),
    };
    builder.init();
    Ok(())
}
