//! Meme Proxy
//!
//! A forward HTTP proxy that relays ordinary traffic in slow, paced chunks
//! and swaps images for memes.
//!
//! # Architecture Overview
//!
//! ```text
//!                          ┌──────────────────────────────────────────────────────┐
//!                          │                      MEME PROXY                       │
//!                          │                                                       │
//!     Client Request       │  ┌─────────┐    ┌─────────┐    ┌──────────┐          │
//!     ─────────────────────┼─▶│   net   │───▶│  http   │───▶│ routing  │          │
//!                          │  │listener │    │ server  │    │  router  │          │
//!                          │  └─────────┘    └─────────┘    └────┬─────┘          │
//!                          │                                     │                 │
//!                          │          ┌───────────────┬──────────┼─────────┐       │
//!                          │          ▼               ▼          ▼         ▼       │
//!                          │    ┌──────────┐   ┌──────────┐ ┌─────────┐ ┌───────┐  │
//!     Client Response      │    │easter egg│   │meme image│ │ overlay │ │forward│  │
//!     ◀────────────────────┼────│  (pool)  │   │  (pool)  │ │(buffer) │ │(paced)│◀─┼── Origin
//!                          │    └──────────┘   └──────────┘ └─────────┘ └───────┘  │
//!                          │                                                       │
//!                          │  Cross-cutting: config · observability · lifecycle    │
//!                          └──────────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;

use meme_proxy::config::{self, ImageMode, ObservabilityConfig, ProxyConfig};
use meme_proxy::lifecycle::startup;
use meme_proxy::observability::logging;

/// Command-line overrides. Each flag wins over the config file.
#[derive(Parser, Debug)]
#[command(name = "meme-proxy", version)]
#[command(about = "A forward HTTP proxy that slows pages down and replaces images with memes", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults are used when omitted.
    #[arg(short, long, env = "MEME_PROXY_CONFIG")]
    config: Option<PathBuf>,

    /// Address to listen on, e.g. 127.0.0.1:8080.
    #[arg(long, env = "MEME_PROXY_BIND")]
    bind: Option<String>,

    /// Bytes per relayed chunk.
    #[arg(long, env = "MEME_PROXY_CHUNK_SIZE")]
    chunk_size: Option<usize>,

    /// Pause after each relayed chunk, in milliseconds.
    #[arg(long, env = "MEME_PROXY_CHUNK_DELAY_MS")]
    chunk_delay_ms: Option<u64>,

    /// Directory holding substitute images.
    #[arg(long, env = "MEME_PROXY_FOLDER")]
    folder: Option<PathBuf>,

    /// `substitute` or `overlay`.
    #[arg(long, env = "MEME_PROXY_MODE")]
    mode: Option<ImageMode>,
}

impl Cli {
    fn apply(self, config: &mut ProxyConfig) {
        if let Some(bind) = self.bind {
            config.listener.bind_address = bind;
        }
        if let Some(size) = self.chunk_size {
            config.relay.chunk_size = size;
        }
        if let Some(delay) = self.chunk_delay_ms {
            config.relay.chunk_delay_ms = delay;
        }
        if let Some(folder) = self.folder {
            config.images.folder = folder;
        }
        if let Some(mode) = self.mode {
            config.images.mode = mode;
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => match config::load_config(path) {
            Ok(config) => config,
            Err(e) => {
                logging::init_logging(&ObservabilityConfig::default());
                tracing::error!(path = %path.display(), error = %e, "Failed to load configuration");
                return ExitCode::FAILURE;
            }
        },
        None => ProxyConfig::default(),
    };
    cli.apply(&mut config);

    logging::init_logging(&config.observability);

    if let Err(errors) = config::validate_config(&config) {
        for e in &errors {
            tracing::error!(error = %e, "Invalid configuration");
        }
        return ExitCode::FAILURE;
    }

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        bind_address = %config.listener.bind_address,
        chunk_size = config.relay.chunk_size,
        chunk_delay_ms = config.relay.chunk_delay_ms,
        image_folder = %config.images.folder.display(),
        image_mode = %config.images.mode,
        "Configuration loaded"
    );

    match startup::run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "Proxy failed");
            ExitCode::FAILURE
        }
    }
}
