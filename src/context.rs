//! Operation context

use std::{future::Future, time::Duration};

use tokio::time::{Instant, sleep_until};
use tokio_util::sync::CancellationToken;

use crate::errors::StoreError;

/// Cancellation token and optional deadline carried by every cart operation.
///
/// Each storage call the engine makes is raced against both, so a caller
/// that gives up stops the operation at the next storage boundary.
#[derive(Debug, Clone, Default)]
pub struct OpContext {
    cancel: CancellationToken,
    deadline: Option<Instant>,
}

impl OpContext {
    /// Context with a fresh token and no deadline.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Context driven by an existing cancellation token.
    #[must_use]
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self {
            cancel,
            deadline: None,
        }
    }

    /// Set the deadline to `timeout` from now.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Set an absolute deadline.
    #[must_use]
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Token observed by this context.
    #[must_use]
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Deadline, if any.
    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Fail fast when the context is already cancelled or expired.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Cancelled`] or [`StoreError::DeadlineExceeded`].
    pub fn check(&self) -> Result<(), StoreError> {
        if self.cancel.is_cancelled() {
            return Err(StoreError::Cancelled);
        }

        if self.deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            return Err(StoreError::DeadlineExceeded);
        }

        Ok(())
    }

    /// Run a storage call bound to this context.
    ///
    /// The call's future is dropped as soon as the token fires or the
    /// deadline passes.
    ///
    /// # Errors
    ///
    /// Returns the call's own error, or [`StoreError::Cancelled`] /
    /// [`StoreError::DeadlineExceeded`] when the context ends first.
    pub async fn guard<T, F>(&self, call: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        self.check()?;

        match self.deadline {
            Some(deadline) => tokio::select! {
                biased;

                () = self.cancel.cancelled() => Err(StoreError::Cancelled),
                () = sleep_until(deadline) => Err(StoreError::DeadlineExceeded),
                result = call => result,
            },
            None => tokio::select! {
                biased;

                () = self.cancel.cancelled() => Err(StoreError::Cancelled),
                result = call => result,
            },
        }
    }
}
