//! Cancellation token checked between stages.

use parking_lot::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// A token for cooperative cancellation.
///
/// Cancellation is idempotent: only the first reason is kept.
#[derive(Default)]
pub struct CancellationToken {
    cancelled: AtomicBool,
    reason: RwLock<Option<String>>,
}

impl CancellationToken {
    /// Creates a new cancellation token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation with a reason.
    ///
    /// The reason is stored before the flag is published, so an observer that
    /// sees `is_cancelled()` also sees `reason()`.
    pub fn cancel(&self, reason: impl Into<String>) {
        let mut slot = self.reason.write();
        if slot.is_some() {
            return;
        }
        *slot = Some(reason.into());
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cancels the token once `timeout` elapses.
    ///
    /// Requires a tokio runtime. Abort the returned handle to disarm the timer.
    pub fn cancel_after(self: &Arc<Self>, timeout: Duration) -> JoinHandle<()> {
        let token = Arc::clone(self);
        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            token.cancel(format!("timed out after {:.1}s", timeout.as_secs_f64()));
        })
    }

    /// Returns whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Returns the cancellation reason, if any.
    #[must_use]
    pub fn reason(&self) -> Option<String> {
        self.reason.read().clone()
    }
}

impl std::fmt::Debug for CancellationToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CancellationToken")
            .field("cancelled", &self.is_cancelled())
            .field("reason", &self.reason())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_default_not_cancelled() {
        let token = CancellationToken::new();
        assert!(!token.is_cancelled());
        assert!(token.reason().is_none());
    }

    #[test]
    fn test_first_reason_wins() {
        let token = CancellationToken::new();
        token.cancel("user pressed stop");
        token.cancel("timeout");

        assert!(token.is_cancelled());
        assert_eq!(token.reason(), Some("user pressed stop".to_string()));
    }

    #[test]
    fn test_reason_visible_once_cancelled() {
        let token = Arc::new(CancellationToken::new());
        let writers: Vec<_> = (0..4)
            .map(|i| {
                let token = Arc::clone(&token);
                std::thread::spawn(move || token.cancel(format!("writer {i}")))
            })
            .collect();

        while !token.is_cancelled() {
            std::hint::spin_loop();
        }
        assert!(token.reason().is_some());

        for writer in writers {
            writer.join().unwrap();
        }
        assert!(token.reason().unwrap().starts_with("writer "));
    }

    #[tokio::test]
    async fn test_cancel_after() {
        let token = Arc::new(CancellationToken::new());
        let handle = token.cancel_after(Duration::from_millis(10));
        handle.await.unwrap();

        assert!(token.is_cancelled());
        assert!(token.reason().unwrap().starts_with("timed out"));
    }

    #[tokio::test]
    async fn test_cancel_after_can_be_disarmed() {
        let token = Arc::new(CancellationToken::new());
        let handle = token.cancel_after(Duration::from_secs(60));
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());
        assert!(!token.is_cancelled());
    }
}
