mod application;
mod domain;
mod infrastructure;

use anyhow::Context;
use application::batch_service::BatchService;
use application::config::AppConfig;
use clap::{Parser, Subcommand};
use domain::batch::{Outcome, ProgressEvent};
use infrastructure::axum_handler::{router, AppState};
use infrastructure::font_resolver::FileSystemFontResolver;
use infrastructure::image_processor::DefaultImageProcessor;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn, Level};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[arg(short, long, default_value = "info", global = true)]
    log_level: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Process every image in the raw directory (default if no command specified)
    Run,
    /// Create the raw, done, archive and assets directories
    Setup,
    /// Serve the preview and batch endpoints over HTTP
    Serve {
        #[arg(short, long)]
        port: Option<u16>,

        #[arg(long)]
        host: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };
    // RUST_LOG, when set, takes precedence over --log-level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = AppConfig::load(&cli.config)?;
    let fonts = FileSystemFontResolver::new(config.fonts.clone())?;
    let processor = DefaultImageProcessor::new(Arc::new(fonts));
    let service = Arc::new(BatchService::new(Arc::new(processor)));

    match cli.command {
        Some(Commands::Setup) => setup(&service, &config).await,
        Some(Commands::Serve { port, host }) => serve(service, config, host, port).await,
        Some(Commands::Run) | None => run(&service, &config).await,
    }
}

async fn setup(service: &BatchService, config: &AppConfig) -> anyhow::Result<()> {
    let created = service.setup_directories(&config.directories.all()).await?;
    if created.is_empty() {
        info!("All directories already exist");
    }
    info!(
        "Put photos in {:?} and overlays in {:?}",
        config.directories.raw, config.directories.assets
    );
    Ok(())
}

async fn run(service: &BatchService, config: &AppConfig) -> anyhow::Result<()> {
    let inputs = service
        .discover_inputs(&config.directories.raw)
        .await
        .with_context(|| format!("run `setup` first to create {:?}", config.directories.raw))?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let reporter = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            log_progress(event);
        }
    });

    let summary = service.run_batch(config.batch_request(inputs), Some(tx)).await?;
    // The sender is dropped with run_batch, so the reporter drains and exits.
    if let Err(e) = reporter.await {
        warn!("Progress reporter stopped: {}", e);
    }

    info!(
        "Finished: {} of {} processed, {} failed. Output in {:?}",
        summary.processed, summary.total, summary.failed, config.directories.done
    );
    Ok(())
}

fn log_progress(event: ProgressEvent) {
    match event {
        ProgressEvent::Started { total } => info!("Processing {} images", total),
        ProgressEvent::FileFinished { index, total, result } => match result.outcome {
            Outcome::Success { output } => {
                info!("[{}/{}] {:?} -> {:?}", index + 1, total, result.path, output)
            }
            Outcome::Failure { reason } => {
                error!("[{}/{}] {:?} failed: {}", index + 1, total, result.path, reason)
            }
        },
        ProgressEvent::Finished { processed, failed } => {
            info!("Batch complete: {} processed, {} failed", processed, failed)
        }
    }
}

async fn serve(
    service: Arc<BatchService>,
    config: AppConfig,
    host: Option<String>,
    port: Option<u16>,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("invalid listen address {}:{}", host, port))?;

    let app = router(AppState {
        batch_service: service,
        config: Arc::new(config),
    });

    info!("Listening on {}", addr);
    axum::Server::bind(&addr)
        .serve(app.into_make_service())
        .await?;
    Ok(())
}
