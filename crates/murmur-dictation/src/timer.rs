//! Single-shot silence timer.
//!
//! Some recognizer backends never deliver their own speech-timeout error, so
//! the controller arms this guard when the recognizer reports it is ready and
//! treats an expiry exactly like a backend speech-timeout. Each armed timer
//! carries a generation number; the controller compares it against the timer
//! currently armed, which makes expiries that raced a cancellation harmless.

use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;

/// A cancellable one-shot timer reporting through a channel.
///
/// On expiry the timer sends its generation number exactly once. Cancelling
/// or dropping the timer aborts the sleep task, so a cancelled timer never
/// reports.
#[derive(Debug)]
pub struct SilenceTimer {
    generation: u64,
    handle: JoinHandle<()>,
}

impl SilenceTimer {
    /// Arm a timer that fires after `duration`.
    pub fn arm(duration: Duration, generation: u64, expiry_tx: UnboundedSender<u64>) -> Self {
        let handle = tokio::spawn(async move {
            tokio::time::sleep(duration).await;
            // Receiver gone means the controller is shutting down.
            let _ = expiry_tx.send(generation);
        });
        let timeout_ms = duration.as_millis() as u64;
        tracing::debug!(generation, timeout_ms, "Silence timer armed");
        Self { generation, handle }
    }

    /// The generation this timer was armed with.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Cancel the timer. No expiry will be delivered after this returns
    /// unless the timer had already fired.
    pub fn cancel(&self) {
        self.handle.abort();
        tracing::debug!(generation = self.generation, "Silence timer cancelled");
    }
}

impl Drop for SilenceTimer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_timer_fires_with_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = SilenceTimer::arm(Duration::from_millis(20), 7, tx);

        let fired = tokio::time::timeout(Duration::from_millis(500), rx.recv())
            .await
            .expect("timer did not fire in time");
        assert_eq!(fired, Some(7));
    }

    #[tokio::test]
    async fn test_timer_fires_exactly_once() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let _timer = SilenceTimer::arm(Duration::from_millis(10), 1, tx);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(rx.try_recv().ok(), Some(1));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_cancel_prevents_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = SilenceTimer::arm(Duration::from_millis(50), 2, tx);
        timer.cancel();

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_drop_prevents_expiry() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let timer = SilenceTimer::arm(Duration::from_millis(50), 3, tx);
        drop(timer);

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_generation_accessor() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let timer = SilenceTimer::arm(Duration::from_secs(60), 42, tx);
        assert_eq!(timer.generation(), 42);
        timer.cancel();
    }

    #[tokio::test]
    async fn test_replacing_timer_keeps_only_new_generation() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let first = SilenceTimer::arm(Duration::from_millis(30), 1, tx.clone());
        first.cancel();
        let _second = SilenceTimer::arm(Duration::from_millis(30), 2, tx);

        tokio::time::sleep(Duration::from_millis(120)).await;
        assert_eq!(rx.try_recv().ok(), Some(2));
        assert!(rx.try_recv().is_err());
    }
}
