pub mod admin_console;
pub mod check_in;
pub mod registration_form;

use std::future::Future;
use tokio_util::sync::CancellationToken;

use crate::error::AppError;

/// Awaits `fut` unless `cancel` fires first, in which case the result is
/// dropped and `AppError::Cancelled` is returned.
pub async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        res = fut => res,
    }
}
