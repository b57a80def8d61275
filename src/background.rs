use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, info_span, Instrument};

use crate::controllers::until_cancelled;
use crate::domain::models::slot::SlotBoard;
use crate::error::AppError;
use crate::state::AppState;

/// Re-fetches the slot board every `period` and publishes it when it changed.
/// A failed fetch keeps the last good board. Returns once `cancel` fires.
pub async fn start_board_refresher(
    state: Arc<AppState>,
    period: Duration,
    tx: watch::Sender<Option<SlotBoard>>,
    cancel: CancellationToken,
) {
    info!("Starting slot board refresher...");

    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {
                let span = info_span!("board_refresh");
                async {
                    match until_cancelled(&cancel, state.slot_repo.fetch_board()).await {
                        Ok(board) => {
                            let changed = tx.send_if_modified(|current| {
                                if current.as_ref() == Some(&board) {
                                    false
                                } else {
                                    *current = Some(board);
                                    true
                                }
                            });
                            debug!(changed, "Slot board refreshed");
                        }
                        Err(AppError::Cancelled) => {}
                        Err(e) => error!("Failed to refresh slot board: {}", e),
                    }
                }
                .instrument(span)
                .await;
            }
        }
    }

    info!("Slot board refresher stopped");
}
