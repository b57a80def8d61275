pub mod api;
pub mod config;
pub mod controllers;
pub mod domain;
pub mod error;
pub mod infra;
pub mod state;
pub mod background;

use crate::config::{Config, DEFAULT_LOG_FILTER};
use crate::domain::models::slot::{Period, SlotBoard};
use crate::error::AppError;
use crate::infra::factory::bootstrap_state;
use std::sync::Arc;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};
use crate::background::start_board_refresher;

/// Falls back to the default directive when `directive` does not parse.
fn file_filter(directive: &str) -> (EnvFilter, Option<String>) {
    match EnvFilter::try_new(directive) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(DEFAULT_LOG_FILTER), Some(e.to_string())),
    }
}

/// Console output follows `RUST_LOG`; the daily JSON file under `log_dir`
/// follows `log_filter`. Keep the guard alive for the life of the process.
pub fn init_logging(config: &Config) -> WorkerGuard {
    let (writer, guard) = tracing_appender::non_blocking(tracing_appender::rolling::daily(
        &config.log_dir,
        "journee-proches.log",
    ));
    let (filter, rejected) = file_filter(&config.log_filter);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .pretty()
                .with_target(false)
                .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into())),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(true)
                .with_writer(writer)
                .with_filter(filter),
        )
        .init();

    if let Some(reason) = rejected {
        warn!(directive = %config.log_filter, "Invalid log filter, using {}: {}", DEFAULT_LOG_FILTER, reason);
    }
    info!(log_dir = %config.log_dir, "Logging initialized");
    guard
}

fn log_board(board: &SlotBoard) {
    for period in [Period::Morning, Period::Afternoon] {
        let slots: Vec<_> = board.in_period(period).collect();
        info!(
            period = period.wire_key(),
            slots = slots.len(),
            persons = slots.iter().map(|s| s.registered_persons).sum::<u32>(),
            full = slots.iter().filter(|s| s.is_full()).count(),
            blocked = slots.iter().filter(|s| s.is_blocked()).count(),
            "Availability"
        );
        for slot in slots {
            info!(
                slot = %slot.label,
                agents = slot.registered_agents,
                persons = slot.registered_persons,
                remaining = %slot.remaining(),
                restricted = slot.restricted,
                blocked = slot.is_blocked(),
                "Slot"
            );
        }
    }
}

/// Follows the slot board until Ctrl-C, logging availability on every change.
pub async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    let _guard = init_logging(&config);

    let state = Arc::new(bootstrap_state(&config)?);
    let cancel = CancellationToken::new();
    let (tx, mut rx) = watch::channel(None);

    let worker = tokio::spawn(start_board_refresher(
        state.clone(),
        config.refresh_interval,
        tx,
        cancel.clone(),
    ));

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                info!("Shutdown requested");
                break;
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                if let Some(board) = rx.borrow_and_update().as_ref() {
                    log_board(board);
                }
            }
        }
    }

    cancel.cancel();
    let _ = worker.await;
    Ok(())
}
