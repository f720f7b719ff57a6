#![forbid(unsafe_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// Create a trigger channel holding at most one pending scan request.
///
/// Pulses sent while a request is already pending are coalesced into it, so
/// a slow scan never builds up a backlog.
pub fn channel() -> (TriggerHandle, mpsc::Receiver<()>) {
    let (tx, rx) = mpsc::channel(1);
    let handle = TriggerHandle {
        tx,
        coalesced: Arc::new(AtomicU64::new(0)),
    };
    (handle, rx)
}

#[derive(Debug, Clone)]
pub struct TriggerHandle {
    tx: mpsc::Sender<()>,
    coalesced: Arc<AtomicU64>,
}

impl TriggerHandle {
    /// Request a scan. Returns false if the scanner has stopped.
    pub fn pulse(&self) -> bool {
        match self.tx.try_send(()) {
            Ok(()) => true,
            Err(TrySendError::Full(())) => {
                self.coalesced.fetch_add(1, Ordering::Relaxed);
                trace!("scan already pending");
                true
            }
            Err(TrySendError::Closed(())) => false,
        }
    }

    /// Number of pulses folded into an already pending request.
    pub fn coalesced(&self) -> u64 {
        self.coalesced.load(Ordering::Relaxed)
    }
}

/// Pulse `handle` every `period` until cancelled or the scanner stops.
/// The first pulse is sent immediately.
pub fn spawn_interval(
    period: Duration,
    handle: TriggerHandle,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    if !handle.pulse() {
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pending_pulses_are_coalesced() {
        let (handle, mut rx) = channel();
        assert!(handle.pulse());
        assert!(handle.pulse());
        assert!(handle.pulse());
        assert_eq!(handle.coalesced(), 2);

        assert_eq!(rx.recv().await, Some(()));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn pulse_reports_stopped_scanner() {
        let (handle, rx) = channel();
        drop(rx);
        assert!(!handle.pulse());
    }

    #[tokio::test(start_paused = true)]
    async fn interval_pulses_until_cancelled() {
        let (handle, mut rx) = channel();
        let cancel = CancellationToken::new();
        let task = spawn_interval(Duration::from_millis(100), handle, cancel.clone());

        for _ in 0..3 {
            assert_eq!(rx.recv().await, Some(()));
        }
        cancel.cancel();
        task.await.unwrap();
    }
}
