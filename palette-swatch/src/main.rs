use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;
use palette_swatch::clipboard::SystemClipboard;
use palette_swatch::ui::{app::EMPTY_THEME_MESSAGE, plain, App};
use palette_swatch::{Appearance, PreferenceStore, RelayClient, DEFAULT_RELAY_URL};
use std::fs::{self, OpenOptions};
use std::io;
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "palette-swatch")]
#[command(author, version)]
#[command(about = "Describe a theme, get a five-colour palette as swatches")]
struct Cli {
    /// Theme to generate right away (required with --plain)
    theme: Option<String>,

    /// Generate endpoint of the relay
    #[arg(long, env = "PALETTE_RELAY_URL", default_value = DEFAULT_RELAY_URL)]
    relay_url: String,

    /// Seconds to wait for the relay before giving up
    #[arg(long, default_value_t = 60)]
    timeout_secs: u64,

    /// Print the palette to stdout and exit instead of opening the UI
    #[arg(long)]
    plain: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn env_filter(verbose: bool) -> EnvFilter {
    let default_filter = if verbose {
        "palette_swatch=debug"
    } else {
        "palette_swatch=info"
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter))
}

/// The alternate screen owns stdout, so the UI logs to a file in the cache dir.
fn init_file_logging(verbose: bool) {
    let Some(dir) = dirs::cache_dir().map(|d| d.join("palette-swatch")) else {
        return;
    };
    if fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join("palette-swatch.log"))
    else {
        return;
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter(verbose))
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let client = RelayClient::new(&cli.relay_url, Duration::from_secs(cli.timeout_secs))
        .context("Failed to build HTTP client")?;

    if cli.plain {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter(cli.verbose))
            .with_writer(io::stderr)
            .init();
        return run_plain(&client, cli.theme.as_deref()).await;
    }

    init_file_logging(cli.verbose);

    let preferences = match PreferenceStore::default_path().map(PreferenceStore::open) {
        Some(Ok(store)) => Some(store),
        Some(Err(e)) => {
            tracing::warn!("Ignoring unreadable preferences: {:#}", e);
            None
        }
        None => None,
    };

    let mut app = App::new(
        client,
        Box::new(SystemClipboard::new()),
        preferences,
        Appearance::detect_system(),
    );

    if let Some(theme) = cli.theme {
        app.set_input(theme);
        app.start_generation();
    }

    app.run().await
}

async fn run_plain(client: &RelayClient, theme: Option<&str>) -> Result<()> {
    let theme = theme.unwrap_or_default();
    if theme.trim().is_empty() {
        bail!(EMPTY_THEME_MESSAGE);
    }

    tracing::debug!("Requesting palette from {}", client.endpoint());
    let palette = client
        .generate(theme)
        .await
        .map_err(|e| anyhow!("Sorry, there was an error. ({})", e))?;

    let mut stdout = io::stdout().lock();
    plain::write_palette(&mut stdout, &palette, true)?;
    Ok(())
}
