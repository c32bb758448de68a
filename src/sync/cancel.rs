//! Deadline and cancellation for remote calls.

use crate::error::SyncError;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Run one remote call under a timeout and the caller's cancellation token.
///
/// The call gets its own child token which is cancelled whenever this
/// function returns, whatever the outcome. On timeout or cancellation the
/// call's future is dropped, which aborts the in-flight HTTP request.
pub async fn guarded_call<T, F>(
    operation: &str,
    timeout: Duration,
    cancel: &CancellationToken,
    call: F,
) -> Result<T, SyncError>
where
    F: Future<Output = Result<T, SyncError>>,
{
    let call_token = cancel.child_token();
    let _release = call_token.clone().drop_guard();

    tokio::select! {
        result = call => result,
        _ = tokio::time::sleep(timeout) => {
            call_token.cancel();
            warn!("[Sync] {} timed out after {:?}, request aborted", operation, timeout);
            Err(SyncError::Timeout {
                operation: operation.to_string(),
                duration: timeout,
            })
        }
        _ = call_token.cancelled() => {
            warn!("[Sync] {} cancelled, request aborted", operation);
            Err(SyncError::Cancelled {
                operation: operation.to_string(),
            })
        }
    }
}
