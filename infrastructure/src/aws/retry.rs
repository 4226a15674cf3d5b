//! Bounded throttle retry
//!
//! Every adapter call goes through [`retry_throttled`]: one retry after a
//! backoff delay when the upstream reports throttling, nothing more.
//! Anything past that surfaces to the caller's section.

use aws_smithy_types::error::display::DisplayErrorContext;
use aws_smithy_types::error::metadata::ProvideErrorMetadata;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

const THROTTLE_BACKOFF: Duration = Duration::from_millis(400);

pub(crate) fn is_throttle<E: ProvideErrorMetadata>(err: &E) -> bool {
    matches!(
        err.code(),
        Some(
            "Throttling"
                | "ThrottlingException"
                | "TooManyRequestsException"
                | "RequestLimitExceeded"
        )
    )
}

/// Run `op`, retrying exactly once on a throttling response.
pub(crate) async fn retry_throttled<T, E, Fut, F>(mut op: F) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: ProvideErrorMetadata,
{
    match op().await {
        Err(err) if is_throttle(&err) => {
            debug!(code = ?err.code(), "throttled; retrying once after backoff");
            sleep(THROTTLE_BACKOFF).await;
            op().await
        }
        other => other,
    }
}

/// Render an SDK error with its full context chain.
pub(crate) fn describe_error<E>(err: E) -> String
where
    E: std::error::Error + 'static,
{
    DisplayErrorContext(err).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_smithy_types::error::ErrorMetadata;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn throttle_error() -> ErrorMetadata {
        ErrorMetadata::builder()
            .code("ThrottlingException")
            .message("Rate exceeded")
            .build()
    }

    fn hard_error() -> ErrorMetadata {
        ErrorMetadata::builder()
            .code("AccessDeniedException")
            .message("no")
            .build()
    }

    #[tokio::test]
    async fn retries_once_on_throttle() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, ErrorMetadata> = retry_throttled(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(throttle_error())
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn gives_up_after_second_throttle() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, ErrorMetadata> = retry_throttled(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(throttle_error()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn non_throttle_errors_surface_immediately() {
        let calls = AtomicUsize::new(0);
        let result: Result<u32, ErrorMetadata> = retry_throttled(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(hard_error()) }
        })
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
