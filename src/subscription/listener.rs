use crate::error::{Error, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Notify;
use tracing::trace;

/// Tracks how many delivered samples a subscription has not yet consumed
#[derive(Debug, Default)]
pub struct SubscriptionListener {
    unread: AtomicUsize,
    notify: Notify,
}

impl SubscriptionListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a newly queued sample and wake waiters
    pub fn on_new_data(&self) {
        let unread = self.unread.fetch_add(1, Ordering::AcqRel) + 1;
        trace!("Listener has {} unread samples", unread);
        self.notify.notify_waiters();
    }

    /// Record that one sample left the queue
    pub fn data_taken(&self) {
        let _ = self
            .unread
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |n| n.checked_sub(1));
    }

    pub fn unread(&self) -> usize {
        self.unread.load(Ordering::Acquire)
    }

    pub fn has_data(&self) -> bool {
        self.unread() > 0
    }

    /// Wait until at least one sample is pending or `timeout` elapses
    pub async fn wait_for_data(&self, timeout: Duration) -> Result<()> {
        tokio::time::timeout(timeout, async {
            loop {
                let notified = self.notify.notified();
                if self.has_data() {
                    return;
                }
                notified.await;
            }
        })
        .await
        .map_err(|_| Error::Timeout)
    }
}
