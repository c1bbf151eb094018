//! eve-guess server - resolves free-text EVE Online names over HTTP.

use anyhow::{Context, Result};
use clap::Parser;
use eve_guess::{GuessConfig, Guesser};
use eve_guess_server::server;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "eve-guess-server")]
#[command(about = "Resolve approximate EVE Online names to ESI entities")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "3000")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Directory for cached universe snapshots
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,

    /// UTC hour of the daily cache refresh
    #[arg(long, default_value = "12", value_parser = clap::value_parser!(u32).range(0..24))]
    refresh_hour: u32,

    /// ESI base URL
    #[arg(long, default_value = eve_guess::config::NetworkConfig::ESI_BASE_URL)]
    esi_base_url: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Set up logging; RUST_LOG wins over --debug when set.
    let log_level = if args.debug { "debug" } else { "info" };
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    info!("Starting eve-guess server");
    info!("Data directory: {}", args.data_dir.display());

    let config = GuessConfig {
        data_dir: args.data_dir,
        refresh_hour_utc: args.refresh_hour,
        esi_base_url: args.esi_base_url,
        ..GuessConfig::default()
    };
    let guesser = Guesser::new(config)?;

    // Without a first catalog there is nothing to serve.
    let report = guesser
        .refresh_now()
        .await
        .context("Initial universe cache load failed")?;
    info!(
        "Universe cache ready (version {})",
        report.version.as_deref().unwrap_or("unknown")
    );

    let refresh = guesser.start_refresh_loop();
    info!("Next cache refresh at {}", guesser.next_refresh_at());

    let addr = server::start_server(guesser, &args.host, args.port).await?;
    info!("Server running on http://{}", addr);

    tokio::signal::ctrl_c().await?;
    info!("Shutdown signal received, exiting");
    refresh.stop().await;

    Ok(())
}
