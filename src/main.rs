mod checker;
mod config;
mod error;
mod output;
mod parser;
mod probe;
mod probe_result;
mod reporter;
mod telegram;
mod web;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{debug, error, info};

use config::{Config, Mode};
use output::ConsoleReporter;
use parser::ConnectionTarget;
use reporter::CheckReporter;
use telegram::TelegramReporter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let level = if config.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    config.validate()?;

    // Startup misconfiguration is fatal before any probe runs.
    let target = parser::parse_vless_uri(&config.vless_config)
        .context("failed to parse VLESS connection string")?;
    info!("target parsed: {} ({})", target.endpoint(), target.name);
    debug!("target uuid={} params={:?}", target.uuid, target.params);

    let timeout = Duration::from_secs(config.timeout);

    match config.mode {
        Mode::Web => run_web_mode(&config, target, timeout).await,
        Mode::Telegram => run_telegram_mode(&config, &target, timeout).await,
        Mode::Check => run_check_mode(&target, timeout).await,
    }
}

async fn run_web_mode(config: &Config, target: ConnectionTarget, timeout: Duration) -> Result<()> {
    let state = web::AppState {
        target: Arc::new(target),
        timeout,
    };
    web::serve(config.port, state).await
}

async fn run_telegram_mode(
    config: &Config,
    target: &ConnectionTarget,
    timeout: Duration,
) -> Result<()> {
    let token = config.bot_token.as_deref().unwrap_or_default();
    let reporter = TelegramReporter::new(token, &config.chat_ids);

    let summary = checker::run_check(target, timeout).await;
    if let Err(e) = reporter.report(&summary).await {
        error!("reporter '{}' failed: {}", reporter.name(), e);
    }
    Ok(())
}

async fn run_check_mode(target: &ConnectionTarget, timeout: Duration) -> Result<()> {
    let summary = checker::run_check(target, timeout).await;
    ConsoleReporter.report(&summary).await?;

    if !summary.is_success() {
        std::process::exit(1);
    }
    Ok(())
}
