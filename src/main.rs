use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "voxscribe", about = "Speech-to-text HTTP service")]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Override `server.port`
    #[arg(short, long)]
    port: Option<u16>,

    /// Override `general.log_level`
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = voxscribe_core::AppConfig::load_from_file(&cli.config)
        .with_context(|| format!("failed to load config from {:?}", cli.config))?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    if let Some(level) = cli.log_level {
        config.general.log_level = level;
    }

    let env_filter = EnvFilter::try_new(&config.general.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = tracing_subscriber::Registry::default()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        );

    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "voxscribe starting");

    let registry = voxscribe_engine::EngineRegistry::new();
    tracing::debug!(
        recognizers = ?registry.list_recognizers(),
        vads = ?registry.list_vads(),
        "engine registry ready"
    );

    // model loading and warm-up block; keep them off the async workers
    let engines = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || -> Result<_> {
            let engines = voxscribe_engine::Engines::load(&config, &registry).with_context(|| {
                format!(
                    "failed to load EN engine '{}'",
                    config.engines.en.engine
                )
            })?;
            engines.warm_up();
            Ok(Arc::new(engines))
        })
        .await
        .context("engine loader task failed")??
    };

    let transcriber = Arc::new(voxscribe_engine::Transcriber::from_config(
        Arc::clone(&engines),
        &config.transcription,
    ));
    let state = voxscribe_server::AppState::new(
        transcriber,
        voxscribe_server::ServiceInfo::new(voxscribe_engine::RUNTIME),
    );
    let router = voxscribe_server::create_router(
        state,
        voxscribe_server::RouterLimits::from(&config.server),
    );

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!(
        addr = %addr,
        vad = engines.vad_enabled(),
        ru = engines.dispatcher().is_available(voxscribe_core::Language::Ru),
        "listening"
    );

    let outcome = voxscribe_server::serve(
        listener,
        router,
        voxscribe_server::shutdown_signal(),
        Duration::from_secs(config.server.shutdown_grace_secs),
    )
    .await
    .context("server error")?;

    drop(engines);
    tracing::info!(?outcome, "voxscribe stopped");
    Ok(())
}
