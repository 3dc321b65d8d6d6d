use anyhow::{Context, Result};
use caption_relay::correction::{CorrectionWorker, GeminiCorrector, SentenceCorrector};
use caption_relay::{create_router, AppState, Config, RelayHub};
use clap::Parser;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};

#[derive(Debug, Parser)]
#[command(name = "caption-relay", about = "Live transcription relay server")]
struct Args {
    /// Config file path (extension optional)
    #[arg(long, default_value = "config/caption-relay")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let cfg = Config::load(&args.config)?;

    info!("caption-relay v0.1.0");
    info!("Loaded config: {}", cfg.service.name);
    if cfg.correction.api_key.is_none() {
        warn!("GEMINI_API_KEY not set, corrections will fail with error verdicts");
    }

    let (correction_tx, correction_rx) = mpsc::unbounded_channel();
    let hub = Arc::new(RelayHub::new(correction_tx));

    let corrector: Arc<dyn SentenceCorrector> =
        Arc::new(GeminiCorrector::from_config(&cfg.correction));
    let worker = CorrectionWorker::new(corrector, Arc::clone(&hub));
    tokio::spawn(worker.run(correction_rx));

    let state = AppState::new(Arc::clone(&hub));
    let app = create_router(state, &cfg.service.assets_path);

    let addr: SocketAddr = format!("{}:{}", cfg.service.bind, cfg.service.port)
        .parse()
        .context("failed to parse listen address")?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind TCP listener")?;

    info!("WebSocket endpoint at ws://{}/ws", addr);
    info!("Web interface available at http://{}", addr);
    info!("Waiting for connections...");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(hub))
        .await
        .context("server error")?;

    info!("Server closed");
    Ok(())
}

/// Resolve on ctrl-c, closing peer connections before the server exits
async fn shutdown_signal(hub: Arc<RelayHub>) {
    if tokio::signal::ctrl_c().await.is_err() {
        return;
    }
    info!("Shutting down gracefully...");
    hub.close_all().await;
}
