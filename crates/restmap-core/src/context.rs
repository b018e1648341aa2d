//! Deadline and cancellation for discovery fetches.
//!
//! A [`FetchContext`] travels with a lookup into the cache and bounds the
//! discovery fetch it may trigger. Cancellation is signalled through a
//! [`CancelHandle`], which can be cloned into other tasks.
//!
//! # Example
//!
//! ```rust
//! use std::time::Duration;
//! use restmap_core::{CancelHandle, FetchContext};
//!
//! let handle = CancelHandle::new();
//! let ctx = FetchContext::background()
//!     .with_timeout(Duration::from_secs(5))
//!     .with_cancellation(&handle);
//!
//! // Elsewhere, e.g. on controller shutdown
//! handle.cancel();
//! assert!(ctx.is_cancelled());
//! ```

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::Instant;

use crate::{MapperError, Result};

/// Trigger side of a cancellation signal.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    inner: Arc<CancelInner>,
}

#[derive(Debug)]
struct CancelInner {
    /// Whether cancellation has been requested.
    cancelled: AtomicBool,
    /// Sender for the cancellation signal.
    tx: watch::Sender<bool>,
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelHandle {
    /// Create a handle that has not been cancelled.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            inner: Arc::new(CancelInner {
                cancelled: AtomicBool::new(false),
                tx,
            }),
        }
    }

    /// Request cancellation. Idempotent.
    pub fn cancel(&self) {
        if self
            .inner
            .cancelled
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            self.inner.tx.send_replace(true);
        }
    }

    /// Check if cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    fn signal(&self) -> CancelSignal {
        CancelSignal {
            rx: self.inner.tx.subscribe(),
        }
    }
}

/// Future side of a cancellation signal.
#[derive(Debug, Clone)]
struct CancelSignal {
    rx: watch::Receiver<bool>,
}

impl CancelSignal {
    /// Wait until cancellation is requested.
    async fn wait(mut self) {
        loop {
            if *self.rx.borrow_and_update() {
                return;
            }
            if self.rx.changed().await.is_err() {
                // Sender dropped without cancelling; never resolves.
                std::future::pending::<()>().await;
            }
        }
    }
}

/// Deadline and cancellation applied to a discovery fetch.
///
/// The default context, [`FetchContext::background`], imposes neither.
#[derive(Debug, Clone, Default)]
pub struct FetchContext {
    deadline: Option<Instant>,
    cancel: Option<CancelHandle>,
}

impl FetchContext {
    /// A context with no deadline and no cancellation.
    pub fn background() -> Self {
        Self::default()
    }

    /// Bound the context by `timeout` from now. An earlier existing
    /// deadline is kept.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Bound the context by `deadline`. An earlier existing deadline is kept.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(match self.deadline {
            Some(current) => current.min(deadline),
            None => deadline,
        });
        self
    }

    /// Attach a cancellation handle, replacing any previous one.
    #[must_use]
    pub fn with_cancellation(mut self, handle: &CancelHandle) -> Self {
        self.cancel = Some(handle.clone());
        self
    }

    /// The effective deadline, if any.
    #[inline]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Whether the attached handle has been cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelHandle::is_cancelled)
    }

    /// Run `fut` under this context.
    ///
    /// The future is dropped, not polled to completion, when the context
    /// is cancelled or its deadline passes; `operation` names it in the
    /// resulting [`MapperError::Cancelled`] or [`MapperError::Timeout`].
    pub async fn run<F, T>(&self, operation: &str, fut: F) -> Result<T>
    where
        F: Future<Output = Result<T>>,
    {
        if self.is_cancelled() {
            return Err(MapperError::Cancelled {
                operation: operation.to_string(),
            });
        }

        let cancelled = async {
            match &self.cancel {
                Some(handle) => handle.signal().wait().await,
                None => std::future::pending().await,
            }
        };
        let expired = async {
            match self.deadline {
                Some(deadline) => tokio::time::sleep_until(deadline).await,
                None => std::future::pending().await,
            }
        };

        tokio::select! {
            biased;
            () = cancelled => Err(MapperError::Cancelled {
                operation: operation.to_string(),
            }),
            () = expired => Err(MapperError::Timeout {
                operation: operation.to_string(),
            }),
            result = fut => result,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_handle_is_idempotent() {
        let handle = CancelHandle::new();
        assert!(!handle.is_cancelled());

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());
    }

    #[test]
    fn earliest_deadline_wins() {
        let short = Duration::from_millis(10);
        let long = Duration::from_secs(60);

        let a = FetchContext::background().with_timeout(short).with_timeout(long);
        let b = FetchContext::background().with_timeout(long).with_timeout(short);

        let now = Instant::now();
        assert!(a.deadline().unwrap() <= now + short);
        assert!(b.deadline().unwrap() <= now + short);
    }

    #[tokio::test]
    async fn background_runs_to_completion() {
        let ctx = FetchContext::background();
        let value = ctx.run("test", async { Ok::<_, MapperError>(42) }).await.unwrap();
        assert_eq!(value, 42);
    }

    #[tokio::test]
    async fn deadline_interrupts_future() {
        let ctx = FetchContext::background().with_timeout(Duration::from_millis(20));
        let result: Result<()> = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(MapperError::Timeout { .. })));
    }

    #[tokio::test]
    async fn cancellation_interrupts_future() {
        let handle = CancelHandle::new();
        let ctx = FetchContext::background().with_cancellation(&handle);

        let trigger = handle.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let result: Result<()> = ctx
            .run("slow", async {
                tokio::time::sleep(Duration::from_secs(10)).await;
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(MapperError::Cancelled { .. })));
    }

    #[tokio::test]
    async fn already_cancelled_never_polls() {
        let handle = CancelHandle::new();
        handle.cancel();
        let ctx = FetchContext::background().with_cancellation(&handle);

        let polled = AtomicBool::new(false);
        let result: Result<()> = ctx
            .run("never", async {
                polled.store(true, Ordering::SeqCst);
                Ok(())
            })
            .await;
        assert!(matches!(result, Err(MapperError::Cancelled { .. })));
        assert!(!polled.load(Ordering::SeqCst));
    }
}
