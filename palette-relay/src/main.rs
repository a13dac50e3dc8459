use anyhow::Result;
use clap::Parser;
use palette_relay::config::Config;
use palette_relay::llm::GeminiProvider;
use palette_relay::{Relay, RelayServer};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "palette-relay")]
#[command(author, version)]
#[command(
    about = "Relay that turns a theme into an AI-generated colour palette",
    long_about = "Accepts POST /api/generate with {\"theme\": ...}, asks the Gemini \
                  generateContent API for a five-colour palette and returns the JSON \
                  object found in the model's answer."
)]
struct Cli {
    /// Path to a TOML config file (overrides ./palette-relay.toml and the global config)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long, env = "PALETTE_RELAY_HOST")]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Write a config file with default values to this path and exit
    #[arg(long, value_name = "PATH")]
    init_config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_filter = if cli.verbose {
        "palette_relay=debug"
    } else {
        "palette_relay=info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    if let Some(path) = cli.init_config {
        Config::create_default_config(&path)?;
        println!("Wrote default config to {}", path.display());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    let api_key = config.upstream.resolve_api_key();
    if api_key.is_none() {
        tracing::warn!(
            "{} is not set and no upstream.api_key is configured; upstream calls will fail",
            config.upstream.api_key_env
        );
    }

    let provider = GeminiProvider::new(
        config.upstream.api_base.clone(),
        api_key,
        config.upstream.model.clone(),
        config.upstream.timeout(),
    )?;

    let relay = Relay::new(Arc::new(provider), config.upstream.timeout())
        .with_generation_config(config.upstream.generation_config())
        .with_strategy(config.extraction.strategy)
        .with_validation(config.extraction.validate);

    let listener = RelayServer::bind(&config.server.bind_address()).await?;
    let server = RelayServer::new(relay, config.server.max_body_bytes);

    server
        .serve_with_shutdown(listener, async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await
}
