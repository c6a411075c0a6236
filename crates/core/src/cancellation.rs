use std::future::Future;

pub use tokio_util::sync::CancellationToken;

use crate::errors::CoreError;

/// Drive `fut` to completion unless `cancel` fires first, in which case the
/// future is dropped and `CoreError::Cancelled` is returned.
pub async fn run_cancellable<F, T>(cancel: &CancellationToken, fut: F) -> Result<T, CoreError>
where
    F: Future<Output = Result<T, CoreError>>,
{
    if cancel.is_cancelled() {
        return Err(CoreError::Cancelled);
    }
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(CoreError::Cancelled),
        result = fut => result,
    }
}
