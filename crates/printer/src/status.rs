//! Print-in-progress status shared with the rest of the application.

use std::sync::Arc;

use log::debug;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

/// Publishes whether a print dialog is currently open.
///
/// Cloning shares the same underlying value. Independent publishers (one per
/// test, say) never see each other's updates.
#[derive(Clone, Debug)]
pub struct StatusPublisher {
    sender: Arc<watch::Sender<bool>>,
}

impl Default for StatusPublisher {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusPublisher {
    /// Publisher starting out idle (`false`).
    pub fn new() -> Self {
        let (sender, _receiver) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Set the status and notify subscribers. Returns whether the value changed;
    /// republishing the current value wakes nobody.
    pub fn publish(&self, printing: bool) -> bool {
        let changed = self.sender.send_if_modified(|current| {
            if *current == printing {
                false
            } else {
                *current = printing;
                true
            }
        });
        if changed {
            debug!(target: "printer", "printing status -> {printing}");
        }
        changed
    }

    pub fn current(&self) -> bool {
        *self.sender.borrow()
    }

    /// Subscribe; the subscription sees the current value immediately.
    pub fn subscribe(&self) -> StatusSubscription {
        StatusSubscription {
            receiver: self.sender.subscribe(),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

/// Replay-latest view of a [`StatusPublisher`].
#[derive(Clone, Debug)]
pub struct StatusSubscription {
    receiver: watch::Receiver<bool>,
}

impl StatusSubscription {
    /// Latest published value.
    pub fn current(&self) -> bool {
        *self.receiver.borrow()
    }

    /// Wait for the next change and return the new value. `None` once the
    /// publisher is gone.
    pub async fn changed(&mut self) -> Option<bool> {
        self.receiver.changed().await.ok()?;
        Some(*self.receiver.borrow_and_update())
    }

    /// Stream yielding the current value first, then every change.
    pub fn into_stream(self) -> WatchStream<bool> {
        WatchStream::new(self.receiver)
    }
}
