//! Operator configuration: environment first, command-line flags on top.
use std::env;
use std::path::PathBuf;

use clap::Parser;
use runtime::RuntimeConfig;

/// Settings needed to load content and start a runtime.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CliConfig {
    /// Directory holding `catalog.ron`, `config.toml` and `scenario.ron`.
    /// The bundled game is used when unset.
    pub data_dir: Option<PathBuf>,
    pub tick_seconds: u64,
    pub command_buffer: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        let runtime = RuntimeConfig::default();
        Self {
            data_dir: None,
            tick_seconds: runtime.tick_seconds,
            command_buffer: runtime.command_buffer_size,
        }
    }
}

impl CliConfig {
    /// Construct configuration from process environment variables.
    ///
    /// Environment variables:
    /// - `GAME_DATA_DIR` - Content directory (default: bundled game)
    /// - `GAME_TICK_SECONDS` - Wall-clock seconds per tick (default: 60)
    /// - `GAME_COMMAND_BUFFER` - Runtime command queue size (default: 32)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        config.data_dir = lookup("GAME_DATA_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        if let Some(seconds) = parse(lookup("GAME_TICK_SECONDS")) {
            config.tick_seconds = seconds;
        }

        if let Some(capacity) = parse::<usize>(lookup("GAME_COMMAND_BUFFER")) {
            config.command_buffer = capacity.max(1);
        }

        config
    }

    /// Apply explicit flags over the environment values.
    #[must_use]
    pub fn with_args(mut self, args: &CliArgs) -> Self {
        if let Some(dir) = &args.data_dir {
            self.data_dir = Some(dir.clone());
        }
        if args.embedded {
            self.data_dir = None;
        }
        if let Some(seconds) = args.tick_seconds {
            self.tick_seconds = seconds;
        }
        if let Some(capacity) = args.command_buffer {
            self.command_buffer = capacity.max(1);
        }
        self
    }

    pub fn runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            command_buffer_size: self.command_buffer,
            tick_seconds: self.tick_seconds,
            ..RuntimeConfig::default()
        }
    }
}

/// Drive the game engine with JSON lines on stdin
#[derive(Parser, Debug, Default)]
#[command(name = "client-cli")]
#[command(version)]
pub struct CliArgs {
    /// Content directory (overrides GAME_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Ignore any content directory and play the bundled game
    #[arg(long, conflicts_with = "data_dir")]
    pub embedded: bool,

    /// Wall-clock seconds per tick (overrides GAME_TICK_SECONDS)
    #[arg(long)]
    pub tick_seconds: Option<u64>,

    /// Runtime command queue size (overrides GAME_COMMAND_BUFFER)
    #[arg(long)]
    pub command_buffer: Option<usize>,
}

fn parse<T>(value: Option<String>) -> Option<T>
where
    T: std::str::FromStr,
{
    value?.trim().parse().ok()
}
