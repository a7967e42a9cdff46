mod sample_queue;

use crate::codec::{BincodeDecoder, Decoder};
use crate::error::{Error, Result};
use crate::sample::Sample;
use crate::subscription::{Subscription, SubscriptionId};
use crate::{SubscriptionConfig, Topic, TransportConfig, TransportStats};
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, trace, warn};

pub use sample_queue::{SampleQueue, SubscriptionStats};

/// Per-subscription bookkeeping
struct SubscriptionEntry {
    topic: Topic,
    queue: Arc<SampleQueue>,
}

/// In-process backend owning every subscription's sample queue
pub struct Transport {
    subscriptions: RwLock<HashMap<SubscriptionId, SubscriptionEntry>>,
    samples_delivered: AtomicU64,
    config: TransportConfig,
}

impl Transport {
    /// Create a new transport instance
    pub fn new(config: TransportConfig) -> Result<Self> {
        info!("Creating new transport with config: {:?}", config);

        if config.name.is_empty() {
            return Err(Error::InvalidConfig("Transport name cannot be empty".into()));
        }
        if config.max_subscriptions == 0 {
            return Err(Error::InvalidConfig(
                "Subscription limit cannot be zero".into(),
            ));
        }

        Ok(Self {
            subscriptions: RwLock::new(HashMap::new()),
            samples_delivered: AtomicU64::new(0),
            config,
        })
    }

    /// Create a subscription decoding typed messages with `decoder`
    pub fn create_subscription<T, D>(
        &self,
        config: SubscriptionConfig,
        decoder: D,
    ) -> Result<Subscription<T>>
    where
        D: Decoder<T> + 'static,
    {
        config.validate()?;
        let topic = Topic::new(&config.topic)?;

        let mut subs = self.subscriptions.write();
        if subs.len() >= self.config.max_subscriptions {
            error!(
                "Subscription limit exceeded on {}: {}",
                self.config.name, self.config.max_subscriptions
            );
            return Err(Error::SubscriptionLimitExceeded(self.config.max_subscriptions));
        }

        let queue = Arc::new(SampleQueue::new(config.history)?);
        let subscription = Subscription::new(topic.clone(), &queue, decoder)
            .with_listener(Arc::clone(queue.listener()));

        debug!(
            "Registering subscription {} on {} ({:?})",
            subscription.id().as_str(),
            topic.name(),
            config.history
        );
        subs.insert(subscription.id(), SubscriptionEntry { topic, queue });

        Ok(subscription)
    }

    /// Create a subscription decoding `bincode` payloads in the configured byte order
    pub fn create_bincode_subscription<T>(
        &self,
        config: SubscriptionConfig,
    ) -> Result<Subscription<T>>
    where
        T: DeserializeOwned + 'static,
    {
        let decoder = BincodeDecoder::new(config.endianness);
        self.create_subscription(config, decoder)
    }

    /// Remove a subscription; its handle is invalid afterwards
    pub fn destroy_subscription<T>(&self, subscription: &Subscription<T>) -> Result<()> {
        info!("Destroying subscription: {}", subscription.id().as_str());
        let mut subs = self.subscriptions.write();
        if subs.remove(&subscription.id()).is_none() {
            warn!(
                "Attempted to destroy non-existent subscription: {}",
                subscription.id().as_str()
            );
            return Err(Error::SubscriptionNotFound(subscription.id().as_str()));
        }
        Ok(())
    }

    /// Hand a sample to every subscription on `topic`
    ///
    /// Returns the number of subscriptions that received it.
    pub fn deliver(&self, topic: &str, sample: Sample) -> usize {
        self.samples_delivered.fetch_add(1, Ordering::Relaxed);
        let subs = self.subscriptions.read();
        let mut receivers = 0;
        for entry in subs.values().filter(|entry| entry.topic.name() == topic) {
            entry.queue.push(sample.clone());
            receivers += 1;
        }
        trace!(
            "Delivered sample {} on {} to {} subscriptions",
            sample.sequence_number,
            topic,
            receivers
        );
        receivers
    }

    pub fn subscription_count(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Get statistics for a single subscription
    pub fn subscription_stats<T>(&self, subscription: &Subscription<T>) -> Result<SubscriptionStats> {
        self.subscriptions
            .read()
            .get(&subscription.id())
            .map(|entry| entry.queue.stats())
            .ok_or_else(|| Error::SubscriptionNotFound(subscription.id().as_str()))
    }

    /// Get transport statistics
    pub fn stats(&self) -> TransportStats {
        let subs = self.subscriptions.read();
        let (samples_taken, samples_dropped) =
            subs.values().fold((0, 0), |(taken, dropped), entry| {
                let stats = entry.queue.stats();
                (taken + stats.samples_taken, dropped + stats.samples_dropped)
            });

        TransportStats {
            subscriptions: subs.len(),
            samples_delivered: self.samples_delivered.load(Ordering::Relaxed),
            samples_taken,
            samples_dropped,
        }
    }
}
