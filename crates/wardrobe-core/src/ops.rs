//! ============================================================================
//! Cancellable Operations - bounded waits that also stop the work
//! ============================================================================
//! Wraps a future with a deadline and a [`CancellationToken`]. When the
//! deadline passes or the token is cancelled, the wrapped future is dropped
//! (which aborts an in-flight reqwest call) and the token is cancelled so any
//! other task sharing it can stop as well.
//! ============================================================================

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::warn;

use crate::types::WardrobeError;

/// A single abandonable unit of work
#[derive(Debug, Clone)]
pub struct CancellableOp {
    label: &'static str,
    timeout: Duration,
    token: CancellationToken,
}

impl CancellableOp {
    pub fn new(label: &'static str, timeout: Duration) -> Self {
        Self {
            label,
            timeout,
            token: CancellationToken::new(),
        }
    }

    /// Token that cancels this operation (e.g. the user pressing "cancel")
    pub fn token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Drive `fut` until it resolves, the deadline passes, or the token fires.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, WardrobeError>
    where
        F: Future<Output = Result<T, WardrobeError>>,
    {
        if self.token.is_cancelled() {
            return Err(WardrobeError::Cancelled);
        }

        tokio::select! {
            biased;

            _ = self.token.cancelled() => {
                warn!("{} cancelled", self.label);
                Err(WardrobeError::Cancelled)
            }

            outcome = tokio::time::timeout(self.timeout, fut) => match outcome {
                Ok(result) => result,
                Err(_) => {
                    warn!("{} timed out after {:?}", self.label, self.timeout);
                    self.token.cancel();
                    Err(WardrobeError::Timeout(self.timeout))
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn test_completes_before_deadline() {
        let op = CancellableOp::new("test", Duration::from_secs(5));
        let value = op
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok::<_, WardrobeError>(7)
            })
            .await;
        assert_eq!(value, Ok(7));
        assert!(!op.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_cancels_token_and_drops_work() {
        let op = CancellableOp::new("test", Duration::from_secs(30));
        let finished = Arc::new(AtomicBool::new(false));
        let flag = finished.clone();

        let result: Result<(), _> = op
            .run(async move {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                flag.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;

        assert_eq!(result, Err(WardrobeError::Timeout(Duration::from_secs(30))));
        assert!(op.is_cancelled());
        assert!(!finished.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_external_cancel_wins() {
        let op = CancellableOp::new("test", Duration::from_secs(30));
        let token = op.token();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            token.cancel();
        });
        let result: Result<(), _> = op
            .run(async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert_eq!(result, Err(WardrobeError::Cancelled));
    }

    #[tokio::test]
    async fn test_already_cancelled_never_polls() {
        let op = CancellableOp::new("test", Duration::from_secs(1));
        op.cancel();
        let polled = AtomicBool::new(false);
        let result: Result<(), _> = op
            .run(async {
                polled.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert_eq!(result, Err(WardrobeError::Cancelled));
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_second_timeout_keeps_its_length() {
        let op = CancellableOp::new("test", Duration::from_millis(250));
        let result: Result<(), _> = op
            .run(async {
                tokio::time::sleep(Duration::from_secs(1)).await;
                Ok(())
            })
            .await;
        let err = result.unwrap_err();
        assert_eq!(err, WardrobeError::Timeout(Duration::from_millis(250)));
        assert_eq!(err.to_string(), "Timed out after 250ms");
    }

    #[tokio::test]
    async fn test_inner_error_passes_through() {
        let op = CancellableOp::new("test", Duration::from_secs(1));
        let result: Result<(), _> = op
            .run(async { Err(WardrobeError::Ai("boom".into())) })
            .await;
        assert_eq!(result, Err(WardrobeError::Ai("boom".into())));
    }
}
