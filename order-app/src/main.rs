use std::{
    io::{self, Write},
    path::PathBuf,
};

use anyhow::Context;
use clap::{Parser, Subcommand};
use order_app::{Notice, OrderApp, bootstrap, logging};
use order_core::export::Rasterizer;
use tracing::{debug, info};

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Cake order form for the bakery.
///
/// Restores the saved order from the configured store, then reports on it,
/// exports it as an image, sends it to the bakery, or clears it.
#[derive(Debug, Parser)]
struct Cli {
    /// Configuration file. Defaults to `order-form/config.toml` in the
    /// platform config directory.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log filter for this run, e.g. `debug` or `order_core=trace`.
    #[arg(long)]
    log_level: Option<String>,

    /// Append logs to this file for this run.
    #[arg(long, conflicts_with = "no_log_file")]
    log_file: Option<PathBuf>,

    /// Do not write the configured log file.
    #[arg(long)]
    no_log_file: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Show the saved order and any required fields still missing.
    Status,
    /// Render the order as an image and save it to the download directory.
    Export,
    /// Open WhatsApp with the order pre-filled for the bakery.
    Send,
    /// Reset every field except the form date.
    Clear {
        /// Skip the confirmation prompt.
        #[arg(long)]
        yes: bool,
    },
}

// ─── rasterizer ──────────────────────────────────────────────────────────────

#[cfg(not(feature = "chrome"))]
struct NoRenderer;

#[cfg(not(feature = "chrome"))]
#[async_trait::async_trait]
impl Rasterizer for NoRenderer {
    async fn rasterize(
        &self,
        _document: &order_core::export::OrderDocument,
        _options: &order_core::export::CaptureOptions,
    ) -> Result<Vec<u8>, order_core::export::CaptureError> {
        Err(order_core::export::CaptureError::Render(
            "this build has no renderer; rebuild with the `chrome` feature".to_string(),
        ))
    }
}

#[cfg(feature = "chrome")]
async fn open_app(config: order_app::AppConfig) -> OrderApp<impl Rasterizer> {
    OrderApp::with_chrome(config).await
}

#[cfg(not(feature = "chrome"))]
async fn open_app(config: order_app::AppConfig) -> OrderApp<impl Rasterizer> {
    OrderApp::open(config, NoRenderer).await
}

// ─── helpers ─────────────────────────────────────────────────────────────────

fn confirm(prompt: &str) -> anyhow::Result<bool> {
    print!("{prompt} [y/N] ");
    io::stdout().flush()?;
    let mut answer = String::new();
    io::stdin()
        .read_line(&mut answer)
        .context("failed to read confirmation")?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

fn report(notice: Notice) -> anyhow::Result<()> {
    match notice {
        Notice::Success(message) => {
            info!("{message}");
            Ok(())
        }
        Notice::Error(message) => anyhow::bail!(message),
    }
}

fn status<R: Rasterizer>(app: &OrderApp<R>) {
    let state = app.session().state();
    let name = if state.name().is_empty() { "(no name yet)" } else { state.name() };
    info!(date = state.date(), "order for {name}");

    let missing = app.session().missing_fields();
    if missing.is_empty() {
        info!("order is complete and ready to send");
    } else {
        let labels: Vec<_> = missing.iter().map(|field| field.label()).collect();
        info!("still required: {}", labels.join(", "));
    }
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = bootstrap(cli.config.as_deref())?;
    if let Some(level) = &cli.log_level {
        logging::set_log_level(level)?;
    }
    if let Some(path) = &cli.log_file {
        logging::enable_file_logging(path)?;
    } else if cli.no_log_file {
        logging::disable_file_logging();
    }

    debug!(backend = %config.store.backend, location = %config.store.location, "opening order");
    let mut app = open_app(config).await;

    match cli.command.unwrap_or(Command::Status) {
        Command::Status => status(&app),
        Command::Export => report(app.export().await)?,
        Command::Send => report(app.send_to_vendor())?,
        Command::Clear { yes } => {
            let confirmed = yes || confirm("Clear the whole order form?")?;
            report(app.clear_confirmed(confirmed).await)?;
        }
    }

    Ok(())
}
