use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::subscription::{SampleSource, SubscriptionListener};
use crate::{HistoryPolicy, IMPLEMENTATION_IDENTIFIER};
use crossbeam::queue::{ArrayQueue, SegQueue};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Statistics about one subscription's queue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionStats {
    /// Samples queued since creation
    pub samples_received: u64,
    /// Samples popped by takes
    pub samples_taken: u64,
    /// Samples overwritten before anyone took them
    pub samples_dropped: u64,
    /// Samples currently queued
    pub pending: usize,
}

enum History {
    KeepLast(ArrayQueue<Sample>),
    KeepAll(SegQueue<Sample>),
}

#[derive(Default)]
struct Counters {
    received: AtomicU64,
    taken: AtomicU64,
    dropped: AtomicU64,
}

/// Pending samples for one subscription
///
/// Delivery and take may run on different threads; both sides are lock-free.
pub struct SampleQueue {
    history: History,
    listener: Arc<SubscriptionListener>,
    counters: Counters,
}

impl SampleQueue {
    pub fn new(policy: HistoryPolicy) -> Result<Self> {
        let history = match policy {
            HistoryPolicy::KeepLast { depth: 0 } => {
                return Err(Error::InvalidConfig("History depth cannot be zero".into()));
            }
            HistoryPolicy::KeepLast { depth } => History::KeepLast(ArrayQueue::new(depth)),
            HistoryPolicy::KeepAll => History::KeepAll(SegQueue::new()),
        };

        Ok(Self {
            history,
            listener: Arc::new(SubscriptionListener::new()),
            counters: Counters::default(),
        })
    }

    pub fn listener(&self) -> &Arc<SubscriptionListener> {
        &self.listener
    }

    /// Queue a sample, overwriting the oldest one if a bounded history is full
    ///
    /// The listener is signalled before the sample becomes visible, so a
    /// concurrent take can never consume it ahead of its unread count.
    pub fn push(&self, sample: Sample) {
        self.counters.received.fetch_add(1, Ordering::Relaxed);
        self.listener.on_new_data();
        match &self.history {
            History::KeepLast(queue) => {
                if let Some(old) = queue.force_push(sample) {
                    debug!(
                        "History full, dropped sample {} from {}",
                        old.sequence_number, old.writer_guid
                    );
                    self.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    self.listener.data_taken();
                }
            }
            History::KeepAll(queue) => queue.push(sample),
        }
    }

    pub fn len(&self) -> usize {
        match &self.history {
            History::KeepLast(queue) => queue.len(),
            History::KeepAll(queue) => queue.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> SubscriptionStats {
        SubscriptionStats {
            samples_received: self.counters.received.load(Ordering::Relaxed),
            samples_taken: self.counters.taken.load(Ordering::Relaxed),
            samples_dropped: self.counters.dropped.load(Ordering::Relaxed),
            pending: self.len(),
        }
    }
}

impl SampleSource for SampleQueue {
    fn implementation_identifier(&self) -> &'static str {
        IMPLEMENTATION_IDENTIFIER
    }

    fn try_take_next(&self) -> Option<Sample> {
        match &self.history {
            History::KeepLast(queue) => queue.pop(),
            History::KeepAll(queue) => queue.pop(),
        }
    }

    fn notify_consumed(&self) {
        self.counters.taken.fetch_add(1, Ordering::Relaxed);
        self.listener.data_taken();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::Guid;
    use std::thread;

    #[test]
    fn test_keep_last_overwrites_oldest() {
        let queue = SampleQueue::new(HistoryPolicy::KeepLast { depth: 2 }).unwrap();
        let guid = Guid::new();
        for seq in 1..=3 {
            queue.push(Sample::alive(guid, seq, vec![seq as u8]));
        }

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.listener().unread(), 2);
        assert_eq!(queue.try_take_next().unwrap().sequence_number, 2);
        assert_eq!(queue.try_take_next().unwrap().sequence_number, 3);
        assert!(queue.try_take_next().is_none());
        assert!(queue.is_empty());

        let stats = queue.stats();
        assert_eq!(stats.samples_received, 3);
        assert_eq!(stats.samples_dropped, 1);
    }

    #[test]
    fn test_zero_depth_rejected() {
        assert!(matches!(
            SampleQueue::new(HistoryPolicy::KeepLast { depth: 0 }),
            Err(Error::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_concurrent_delivery_keep_all() {
        let queue = Arc::new(SampleQueue::new(HistoryPolicy::KeepAll).unwrap());
        let writers: Vec<_> = (0..4)
            .map(|_| {
                let queue = Arc::clone(&queue);
                thread::spawn(move || {
                    let guid = Guid::new();
                    for seq in 0..250 {
                        queue.push(Sample::alive(guid, seq, vec![0u8; 8]));
                    }
                })
            })
            .collect();
        for writer in writers {
            writer.join().unwrap();
        }

        let mut taken = 0;
        while queue.try_take_next().is_some() {
            queue.notify_consumed();
            taken += 1;
        }
        assert_eq!(taken, 1000);
        assert!(!queue.listener().has_data());
        assert_eq!(queue.stats().samples_taken, 1000);
    }

    #[test]
    fn test_unread_counted_before_sample_is_visible() {
        let queue = Arc::new(SampleQueue::new(HistoryPolicy::KeepLast { depth: 4 }).unwrap());
        let writer = {
            let queue = Arc::clone(&queue);
            thread::spawn(move || {
                let guid = Guid::new();
                for seq in 0..5000 {
                    queue.push(Sample::alive(guid, seq, vec![0u8; 4]));
                }
            })
        };

        // Every popped sample must still be counted as unread until consumed
        let mut finished = false;
        while !finished {
            finished = writer.is_finished();
            while queue.try_take_next().is_some() {
                assert!(queue.listener().unread() >= 1);
                queue.notify_consumed();
            }
        }
        writer.join().unwrap();

        assert!(queue.is_empty());
        assert_eq!(queue.listener().unread(), 0);
        assert!(!queue.listener().has_data());
    }

    #[test]
    fn test_consume_between_enqueue_and_next_push() {
        let queue = SampleQueue::new(HistoryPolicy::KeepLast { depth: 1 }).unwrap();
        let guid = Guid::new();

        queue.push(Sample::alive(guid, 1, vec![1u8]));
        assert!(queue.try_take_next().is_some());
        queue.notify_consumed();
        assert_eq!(queue.listener().unread(), 0);

        queue.push(Sample::alive(guid, 2, vec![2u8]));
        queue.push(Sample::alive(guid, 3, vec![3u8]));
        assert_eq!(queue.listener().unread(), queue.len());
        assert_eq!(queue.try_take_next().unwrap().sequence_number, 3);
        queue.notify_consumed();
        assert!(queue.is_empty());
        assert!(!queue.listener().has_data());
    }
}
