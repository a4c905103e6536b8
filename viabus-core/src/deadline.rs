//! Per-sub-call deadlines for planning queries.
//!
//! Every store-touching sub-call carries a [`Deadline`] so one slow graph
//! search cannot stall a whole journey request. Long-running loops poll the
//! deadline periodically; expiry surfaces as [`Error::DeadlineExceeded`] for
//! that sub-call only and the caller decides whether to degrade or fail.

use std::time::{Duration, Instant};

use crate::error::Error;

/// How many loop iterations between deadline polls in hot search loops.
pub(crate) const POLL_INTERVAL: usize = 256;

#[derive(Debug, Clone, Copy)]
pub struct Deadline {
    expires_at: Option<Instant>,
}

impl Deadline {
    /// Deadline expiring after `budget` from now.
    pub fn after(budget: Duration) -> Self {
        Self {
            expires_at: Some(Instant::now() + budget),
        }
    }

    /// A deadline that never expires. Used by direct single-query callers
    /// that rely on outer request timeouts instead.
    pub fn none() -> Self {
        Self { expires_at: None }
    }

    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| Instant::now() >= at)
    }

    /// Error if expired; `what` names the sub-call for the error message.
    pub fn check(&self, what: &'static str) -> Result<(), Error> {
        if self.is_expired() {
            Err(Error::DeadlineExceeded(what))
        } else {
            Ok(())
        }
    }

    /// Remaining budget, zero once expired or `None` for unbounded deadlines.
    pub fn remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|at| at.saturating_duration_since(Instant::now()))
    }

    /// A fresh deadline with half the remaining budget, used for the single
    /// retry allowed to idempotent sub-queries.
    pub fn halved(&self) -> Self {
        match self.remaining() {
            Some(rem) => Self::after(rem / 2),
            None => Self::none(),
        }
    }
}

/// Run an idempotent read-only sub-query, retrying once with a shorter
/// deadline if the first attempt times out.
pub fn retry_once<T>(
    deadline: Deadline,
    mut call: impl FnMut(Deadline) -> Result<T, Error>,
) -> Result<T, Error> {
    match call(deadline) {
        Err(Error::DeadlineExceeded(what)) => {
            log::debug!("sub-call '{what}' timed out, retrying with half budget");
            call(deadline.halved())
        }
        other => other,
    }
}
