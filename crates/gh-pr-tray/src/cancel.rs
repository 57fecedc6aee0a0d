//! Cooperative cancellation helpers

use std::future::Future;
use tokio_util::sync::CancellationToken;

/// The cycle was torn down
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canceled;

/// Race `fut` against `cancel`
///
/// An already fired token wins without polling `fut` at all.
pub async fn until_canceled<F: Future>(
    cancel: &CancellationToken,
    fut: F,
) -> Result<F::Output, Canceled> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(Canceled),
        out = fut => Ok(out),
    }
}
