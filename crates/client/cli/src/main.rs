//! Operator console: drives the game runtime with JSON lines.
//!
//! Requests are read from stdin one per line and every reply is written to
//! stdout as a single JSON line. Logs go to stderr.
mod config;
mod session;

use anyhow::{Context, Result};
use clap::Parser;
use game_content::{ContentFactory, LoadedGame};
use runtime::{LogSink, Runtime};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use config::{CliArgs, CliConfig};
use session::Session;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args = CliArgs::parse();
    let config = CliConfig::from_env().with_args(&args);

    setup_logging();

    let game = load_game(&config)?;
    let runtime = Runtime::builder()
        .config(config.runtime_config())
        .catalog(game.catalog)
        .initial_state(game.state)
        .sink(LogSink)
        .build()
        .await
        .context("failed to start runtime")?;

    tracing::info!(
        tick_seconds = config.tick_seconds,
        command_buffer = config.command_buffer,
        "runtime ready"
    );

    serve(Session::new(runtime.handle())).await?;

    runtime.shutdown().await.context("runtime did not stop cleanly")?;
    tracing::info!("runtime stopped");
    Ok(())
}

fn load_game(config: &CliConfig) -> Result<LoadedGame> {
    match &config.data_dir {
        Some(dir) => ContentFactory::new(dir).load_game(),
        None => ContentFactory::embedded(),
    }
}

/// Answer stdin line by line until it closes.
async fn serve(session: Session) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await.context("failed to read stdin")? {
        if line.trim().is_empty() {
            continue;
        }

        let reply = session.process(&line).await?;
        let mut out = serde_json::to_vec(&reply).context("failed to encode reply")?;
        out.push(b'\n');
        stdout.write_all(&out).await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Setup logging to stderr, keeping stdout for replies
fn setup_logging() {
    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}
