//! Request cancellation context.
//!
//! Every call that reaches the engine runs inside a [`RequestContext`]. The
//! context can be cancelled from a [`CancelHandle`] or expire at a deadline;
//! either way the in-flight future is dropped and the call returns
//! `SearchError::Cancelled`.

use std::future::Future;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::errors::SearchError;

/// Cancellation signal and optional deadline for engine calls.
///
/// Cloning is cheap; clones observe the same cancel signal.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Cancels every clone of the context it was created with.
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Signal cancellation. Idempotent.
    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl RequestContext {
    /// A context that is never cancelled.
    pub fn background() -> Self {
        Self::default()
    }

    /// A cancellable context and the handle that cancels it.
    pub fn with_cancel() -> (Self, CancelHandle) {
        let (tx, rx) = watch::channel(false);
        (
            Self {
                cancel: Some(rx),
                deadline: None,
            },
            CancelHandle { tx },
        )
    }

    /// Derive a context that also expires `timeout` from now.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Derive a context that also expires at `deadline`.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(existing) if existing < deadline => existing,
            _ => deadline,
        });
        self
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the context is already cancelled or past its deadline.
    pub fn is_cancelled(&self) -> bool {
        let signalled = self.cancel.as_ref().is_some_and(|rx| *rx.borrow());
        let expired = self.deadline.is_some_and(|d| Instant::now() >= d);
        signalled || expired
    }

    /// Resolve once the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context, or once the cancel handle
    /// has been dropped without cancelling.
    pub async fn cancelled(&self) {
        let signal = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        if *rx.borrow_and_update() {
                            return;
                        }
                        if rx.changed().await.is_err() {
                            std::future::pending::<()>().await;
                        }
                    }
                }
                None => std::future::pending::<()>().await,
            }
        };
        let expiry = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            _ = signal => {}
            _ = expiry => {}
        }
    }

    /// Run `fut` unless the context is cancelled first.
    ///
    /// Returns `Cancelled` without polling `fut` when the context is already
    /// done, and drops `fut` if cancellation arrives while it is pending.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, SearchError>
    where
        F: Future<Output = Result<T, SearchError>>,
    {
        if self.is_cancelled() {
            return Err(SearchError::Cancelled);
        }

        tokio::select! {
            biased;
            _ = self.cancelled() => Err(SearchError::Cancelled),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_background_runs_to_completion() {
        let ctx = RequestContext::background();

        let result = ctx.run(async { Ok::<_, SearchError>(7) }).await;
        assert_eq!(result.unwrap(), 7);
        assert!(!ctx.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_before_call_skips_future() {
        let (ctx, handle) = RequestContext::with_cancel();
        handle.cancel();

        let polled = Arc::new(AtomicBool::new(false));
        let flag = polled.clone();
        let result = ctx
            .run(async move {
                flag.store(true, Ordering::SeqCst);
                Ok::<_, SearchError>(())
            })
            .await;

        assert_eq!(result.unwrap_err(), SearchError::Cancelled);
        assert!(!polled.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_cancel_while_pending() {
        let (ctx, handle) = RequestContext::with_cancel();

        let task = tokio::spawn({
            let ctx = ctx.clone();
            async move {
                ctx.run(std::future::pending::<Result<(), SearchError>>())
                    .await
            }
        });
        tokio::task::yield_now().await;
        handle.cancel();

        assert_eq!(task.await.unwrap().unwrap_err(), SearchError::Cancelled);
        assert!(ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_expires() {
        let ctx = RequestContext::background().with_timeout(Duration::from_secs(5));

        let result = ctx
            .run(std::future::pending::<Result<(), SearchError>>())
            .await;

        assert_eq!(result.unwrap_err(), SearchError::Cancelled);
        assert!(ctx.is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_earlier_deadline_kept() {
        let ctx = RequestContext::background()
            .with_timeout(Duration::from_secs(1))
            .with_timeout(Duration::from_secs(60));

        let remaining = ctx.deadline().unwrap() - Instant::now();
        assert!(remaining <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_dropped_handle_never_cancels() {
        let (ctx, handle) = RequestContext::with_cancel();
        drop(handle);

        let result = ctx.run(async { Ok::<_, SearchError>("done") }).await;
        assert_eq!(result.unwrap(), "done");
    }
}
