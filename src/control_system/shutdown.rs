//! Cooperative stop signal shared between the registry and one pair of control units.

use tokio::sync::watch;
use tokio::time::{sleep, Duration};

/// Registry side. Triggering is idempotent and never blocks.
#[derive(Debug)]
pub struct ShutdownSignal {
    tx: watch::Sender<bool>,
}

/// Unit side. Every hold in a control loop goes through [`ShutdownListener::hold`].
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: watch::Receiver<bool>,
}

pub fn shutdown_channel() -> (ShutdownSignal, ShutdownListener) {
    let (tx, rx) = watch::channel(false);
    (ShutdownSignal { tx }, ShutdownListener { rx })
}

impl ShutdownSignal {
    pub fn trigger(&self) {
        self.tx.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.tx.borrow()
    }
}

impl ShutdownListener {
    /// A dropped signal counts as a stop request.
    pub fn is_shutdown(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    pub async fn triggered(&mut self) {
        let _ = self.rx.wait_for(|stop| *stop).await;
    }

    /// Sleeps for `hold`. Returns `false` as soon as a stop is requested, so a
    /// unit never sleeps through the rest of a phase after being stopped.
    pub async fn hold(&mut self, hold: Duration) -> bool {
        let stopped = tokio::select! {
            _ = sleep(hold) => false,
            _ = self.triggered() => true,
        };
        !stopped && !self.is_shutdown()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn hold_completes_without_stop() {
        let (_signal, mut listener) = shutdown_channel();
        assert!(listener.hold(Duration::from_secs(25)).await);
        assert!(!listener.is_shutdown());
    }

    #[tokio::test(start_paused = true)]
    async fn stop_interrupts_hold() {
        let (signal, mut listener) = shutdown_channel();
        let started = tokio::time::Instant::now();
        let waiter = tokio::spawn(async move { listener.hold(Duration::from_secs(25)).await });
        sleep(Duration::from_secs(3)).await;
        signal.trigger();
        assert!(!waiter.await.unwrap());
        assert!(started.elapsed() < Duration::from_secs(25));
    }

    #[tokio::test]
    async fn trigger_is_idempotent() {
        let (signal, listener) = shutdown_channel();
        signal.trigger();
        signal.trigger();
        assert!(signal.is_triggered());
        assert!(listener.is_shutdown());
    }

    #[tokio::test]
    async fn dropped_signal_stops_listener() {
        let (signal, mut listener) = shutdown_channel();
        drop(signal);
        assert!(listener.is_shutdown());
        assert!(!listener.hold(Duration::from_secs(5)).await);
    }
}
