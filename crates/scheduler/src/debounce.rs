use std::time::Duration;
use tokio::time::{Instant, sleep_until};

/// Coalesces a burst of signals into one delayed action.
///
/// The first signal arms a deadline `window` later; signals arriving while
/// armed are absorbed. [`Debouncer::fired`] resolves at the deadline and
/// disarms, so the next signal starts a new window.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    /// Returns `true` if this signal armed a new deadline.
    pub fn signal(&mut self) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(Instant::now() + self.window);
        true
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Waits for the armed deadline; pends forever when idle.
    ///
    /// Cancel-safe: dropping the future before it resolves keeps the deadline armed.
    pub async fn fired(&mut self) {
        match self.deadline {
            Some(deadline) => {
                sleep_until(deadline).await;
                self.deadline = None;
            }
            None => std::future::pending::<()>().await,
        }
    }
}
