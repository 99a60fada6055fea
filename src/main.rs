use std::error::Error;
use std::path::PathBuf;
use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::{BoxMakeWriter, MakeWriterExt};
use tracing_subscriber::EnvFilter;

use seqgen::chat;
use seqgen::config::{LoggingConfig, Settings};
use seqgen::inference::InferenceEngine;
use seqgen::server::ApiServer;

#[derive(Parser)]
#[command(name = "seqgen", version, about = "Serve a pretrained sequence-to-sequence model over HTTP")]
struct Cli {
    /// Directory holding default.toml / local.toml
    #[arg(long, default_value = "config")]
    config_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Load the model and serve POST /generate (default)
    Serve,
    /// Interactive prompt against a running server
    Chat {
        /// Server base URL; derived from the server settings when omitted
        #[arg(long)]
        url: Option<String>,
    },
}

/// Sets up the global subscriber: a daily rolling file under `logging.directory`,
/// mirrored to stdout when `to_stdout` is set.
fn init_logging(config: &LoggingConfig, to_stdout: bool) -> WorkerGuard {
    let file_appender = tracing_appender::rolling::RollingFileAppender::new(
        tracing_appender::rolling::Rotation::DAILY,
        &config.directory,
        "seqgen",
    );
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let writer = if to_stdout {
        BoxMakeWriter::new(non_blocking.and(std::io::stdout))
    } else {
        BoxMakeWriter::new(non_blocking)
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase()));

    let builder = tracing_subscriber::fmt()
        .with_writer(writer)
        .with_env_filter(filter)
        // Plain output for the log files
        .with_ansi(false)
        .with_line_number(true)
        .with_file(true)
        .with_thread_ids(true)
        .with_target(false);

    if config.json {
        builder.json().init();
    } else {
        builder.init();
    }

    guard
}

/// Main entry point for seqgen
///
/// - `serve` (default): loads the model, then starts the HTTP server. A model that
///   fails to load stops the process before anything is bound.
/// - `chat`: interactive prompt against a running server.
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    let cli = Cli::parse();
    let settings = Settings::load_from(&cli.config_dir)?;
    let command = cli.command.unwrap_or(Command::Serve);

    let _guard = init_logging(&settings.logging, matches!(command, Command::Serve));
    info!("seqgen starting up...");
    info!("Log directory: {}", settings.logging.directory.display());

    match command {
        Command::Serve => {
            let engine = {
                let settings = settings.clone();
                tokio::task::spawn_blocking(move || InferenceEngine::load(&settings)).await?
            };
            let engine = match engine {
                Ok(engine) => engine,
                Err(e) => {
                    error!("Failed to load model: {:#}", e);
                    return Err(e.into());
                }
            };

            let server = ApiServer::new(engine, settings.server.host.clone(), settings.server.port);
            if let Err(e) = server.start().await {
                error!("Server error: {}", e);
                return Err(e);
            }
        }
        Command::Chat { url } => {
            let url = url.unwrap_or_else(|| chat::server_url(&settings.server));
            chat::chat_loop(&url).await?;
        }
    }

    Ok(())
}
