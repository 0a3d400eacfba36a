// Single-shot debounce timer: a new value replaces the pending one and restarts
// the quiet period. Deadline based, so it can sit in a `tokio::select!` loop
// without spawning a task per keystroke.

use std::time::Duration;
use tokio::time::{sleep_until, Instant};

#[derive(Debug)]
pub struct Debounce<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debounce<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn push(&mut self, value: T) {
        self.pending = Some((Instant::now() + self.delay, value));
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(deadline, _)| *deadline)
    }

    pub fn take_due(&mut self, now: Instant) -> Option<T> {
        match self.deadline() {
            Some(deadline) if deadline <= now => self.cancel(),
            _ => None,
        }
    }

    // Resolves with the pending value once its quiet period has passed. Never
    // resolves while nothing is pending. Cancel safe: dropping the future keeps
    // the value queued.
    pub async fn fire(&mut self) -> T {
        loop {
            let Some(deadline) = self.deadline() else {
                return std::future::pending().await;
            };
            sleep_until(deadline).await;
            if let Some(value) = self.take_due(Instant::now()) {
                return value;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test(start_paused = true)]
    async fn newer_input_restarts_the_quiet_period() {
        let mut debounce = Debounce::new(Duration::from_millis(500));
        debounce.push("te");
        advance(Duration::from_millis(400)).await;
        assert_eq!(debounce.take_due(Instant::now()), None);

        debounce.push("tesla");
        advance(Duration::from_millis(400)).await;
        assert_eq!(debounce.take_due(Instant::now()), None);

        advance(Duration::from_millis(100)).await;
        assert_eq!(debounce.take_due(Instant::now()), Some("tesla"));
        assert!(!debounce.is_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn fire_waits_for_the_deadline() {
        let mut debounce = Debounce::new(Duration::from_millis(300));
        let start = Instant::now();
        debounce.push(42);
        assert_eq!(debounce.fire().await, 42);
        assert!(start.elapsed() >= Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn cancelled_input_never_fires() {
        let mut debounce = Debounce::new(Duration::from_millis(300));
        debounce.push(1);
        assert_eq!(debounce.cancel(), Some(1));
        let fired = tokio::time::timeout(Duration::from_secs(1), debounce.fire()).await;
        assert!(fired.is_err());
    }
}
