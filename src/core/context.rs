//! core::context
//!
//! Cooperative cancellation and deadlines for blocking operations.
//!
//! # Design
//!
//! Every operation that can block (an HTTP exchange, a backoff sleep, a
//! prompt read) is raced against a [`Context`]. When the context is cancelled
//! or its deadline passes, the operation is dropped and the context's own
//! error is returned, never the operation's result.
//!
//! A `Context` is cheap to clone. Cancellation is signalled through a
//! [`CancelHandle`] backed by a `tokio::sync::watch` channel.
//!
//! # Example
//!
//! ```
//! use argus::core::context::{Context, ContextError};
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let (ctx, handle) = Context::with_cancel();
//! handle.cancel();
//!
//! let result = ctx.run(async { 42 }).await;
//! assert_eq!(result, Err(ContextError::Canceled));
//! # });
//! ```

use std::future::{pending, Future};
use std::time::Duration;

use thiserror::Error;
use tokio::sync::watch;
use tokio::time::Instant;

/// Why a context finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context was cancelled (e.g. Ctrl-C).
    #[error("context canceled")]
    Canceled,

    /// The context deadline passed.
    #[error("context deadline exceeded")]
    DeadlineExceeded,
}

/// Cancellation and deadline scope for one command invocation.
#[derive(Debug, Clone, Default)]
pub struct Context {
    cancel: Option<watch::Receiver<bool>>,
    deadline: Option<Instant>,
}

/// Owner side of a cancellable [`Context`].
#[derive(Debug)]
pub struct CancelHandle {
    tx: watch::Sender<bool>,
}

impl CancelHandle {
    /// Cancel every context derived from this handle.
    pub fn cancel(&self) {
        // send_replace never fails, even with no receivers left.
        self.tx.send_replace(true);
    }
}

impl Context {
    /// A context that is never cancelled and has no deadline.
    pub fn background() -> Self {
        Self::default()
    }

    /// A cancellable context plus the handle that cancels it.
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

    /// Derive a context that additionally expires after `timeout`.
    ///
    /// An earlier existing deadline is kept.
    pub fn with_timeout(&self, timeout: Duration) -> Self {
        let candidate = Instant::now() + timeout;
        let deadline = match self.deadline {
            Some(existing) if existing <= candidate => existing,
            _ => candidate,
        };
        Self {
            cancel: self.cancel.clone(),
            deadline: Some(deadline),
        }
    }

    /// The deadline, if one is set.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Non-blocking check: `Some(err)` once the context is done.
    pub fn err(&self) -> Option<ContextError> {
        if let Some(rx) = &self.cancel {
            if *rx.borrow() {
                return Some(ContextError::Canceled);
            }
        }
        match self.deadline {
            Some(deadline) if Instant::now() >= deadline => Some(ContextError::DeadlineExceeded),
            _ => None,
        }
    }

    /// Resolves when the context is cancelled or its deadline passes.
    ///
    /// Never resolves for a background context.
    pub async fn done(&self) -> ContextError {
        let cancelled = async {
            match &self.cancel {
                Some(rx) => {
                    let mut rx = rx.clone();
                    loop {
                        if *rx.borrow_and_update() {
                            return;
                        }
                        if rx.changed().await.is_err() {
                            // Handle dropped without cancelling: never fires.
                            pending::<()>().await;
                        }
                    }
                }
                None => pending::<()>().await,
            }
        };

        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;
                _ = cancelled => ContextError::Canceled,
                _ = tokio::time::sleep_until(deadline) => ContextError::DeadlineExceeded,
            },
            None => {
                cancelled.await;
                ContextError::Canceled
            }
        }
    }

    /// Run `fut` unless the context finishes first.
    ///
    /// A context that is already done never polls `fut`.
    pub async fn run<F: Future>(&self, fut: F) -> Result<F::Output, ContextError> {
        if let Some(err) = self.err() {
            return Err(err);
        }
        tokio::select! {
            biased;
            err = self.done() => Err(err),
            out = fut => Ok(out),
        }
    }

    /// Sleep for `duration`, returning early with the context error.
    pub async fn sleep(&self, duration: Duration) -> Result<(), ContextError> {
        self.run(tokio::time::sleep(duration)).await
    }
}
