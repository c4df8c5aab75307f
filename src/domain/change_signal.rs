//! Broadcast channel for change notifications.
//!
//! [`ChangeSignal`] wraps a [`tokio::sync::broadcast`] channel carrying
//! unit events. A subsystem that owns mutable state holds a signal and
//! calls [`ChangeSignal::notify`] on every mutation; the save manager
//! subscribes so it can mark the matching saveable dirty.

use tokio::sync::broadcast;

/// Broadcast signal for "this state changed" notifications.
///
/// Backed by a `tokio::broadcast` channel. Payloads carry no data: a
/// notification only means "changed since last save", so coalescing and
/// lag-drops are harmless as long as at least one event gets through.
#[derive(Debug, Clone)]
pub struct ChangeSignal {
    sender: broadcast::Sender<()>,
}

impl ChangeSignal {
    /// Creates a new `ChangeSignal` with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Notifies all subscribers that the state changed.
    ///
    /// Returns the number of receivers that saw the notification. With
    /// no active receivers the notification is silently dropped.
    pub fn notify(&self) -> usize {
        self.sender.send(()).unwrap_or(0)
    }

    /// Creates a new receiver for future change notifications.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.sender.subscribe()
    }

    /// Returns the current number of active receivers.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for ChangeSignal {
    fn default() -> Self {
        Self::new(16)
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn notify_without_receivers_returns_zero() {
        let signal = ChangeSignal::new(16);
        assert_eq!(signal.notify(), 0);
    }

    #[tokio::test]
    async fn subscriber_receives_notification() {
        let signal = ChangeSignal::new(16);
        let mut rx = signal.subscribe();

        signal.notify();

        let received = rx.recv().await;
        assert!(received.is_ok());
    }

    #[test]
    fn receiver_count_tracks_subscribers() {
        let signal = ChangeSignal::new(16);
        assert_eq!(signal.receiver_count(), 0);

        let rx1 = signal.subscribe();
        assert_eq!(signal.receiver_count(), 1);

        let _rx2 = signal.subscribe();
        assert_eq!(signal.receiver_count(), 2);

        drop(rx1);
        assert_eq!(signal.receiver_count(), 1);
    }
}
