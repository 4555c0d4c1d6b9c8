use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;

/// Cancellable deferred task. Scheduling again cancels whatever was pending,
/// so only the last of a burst of events fires.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<CancellationToken>,
    generation: u64,
}

impl Debouncer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `fire(generation)` after `delay` unless rescheduled first
    pub fn schedule<F, Fut>(&mut self, delay: Duration, fire: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let token = CancellationToken::new();
        self.pending = Some(token.clone());

        let task = fire(self.generation);
        tokio::spawn(async move {
            tokio::select! {
                _ = token.cancelled() => {}
                _ = tokio::time::sleep(delay) => task.await,
            }
        });

        self.generation
    }

    pub fn cancel(&mut self) {
        if let Some(token) = self.pending.take() {
            token.cancel();
        }
    }

    /// True only for the most recent schedule. A timer that fired just
    /// before being cancelled is stale.
    pub fn is_current(&self, generation: u64) -> bool {
        self.pending.is_some() && generation == self.generation
    }

    /// Mark the current timer as consumed
    pub fn complete(&mut self) {
        self.pending = None;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicU64, Ordering};

    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_only_last_schedule_fires() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut debouncer = Debouncer::new();

        for _ in 0..3 {
            let fired = fired.clone();
            debouncer.schedule(Duration::from_millis(300), move |generation| async move {
                fired.store(generation, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 3);
        assert!(debouncer.is_current(3));
        assert!(!debouncer.is_current(2));

        debouncer.complete();
        assert!(!debouncer.is_current(3));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let fired = Arc::new(AtomicU64::new(0));
        let mut debouncer = Debouncer::new();

        let flag = fired.clone();
        debouncer.schedule(Duration::from_millis(300), move |generation| async move {
            flag.store(generation, Ordering::SeqCst);
        });
        debouncer.cancel();

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
