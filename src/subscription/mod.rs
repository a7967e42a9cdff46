mod listener;

use crate::codec::Decoder;
use crate::error::{Error, Result};
use crate::message_info::MessageInfo;
use crate::sample::Sample;
use crate::serialized::SerializedMessage;
use crate::take::{take_sample, Destination, TakeOutcome};
use crate::Topic;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use tracing::debug;
use uuid::Uuid;

pub use listener::SubscriptionListener;

/// Per-subscription queue of pending samples, fed by a transport backend
pub trait SampleSource: Send + Sync {
    /// Identifier of the backend that owns this source
    fn implementation_identifier(&self) -> &'static str;

    /// Pop the next pending sample without waiting
    fn try_take_next(&self) -> Option<Sample>;

    /// Record that one sample returned by [`try_take_next`](Self::try_take_next) was consumed
    fn notify_consumed(&self);
}

/// Unique identifier for a subscription
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionId(Uuid);

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionId {
    /// Create a new random subscription ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the string representation of the subscription ID
    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

/// Handle to a subscription of messages of type `T`
///
/// The handle does not keep its sample source alive. Once the backend drops
/// the source, takes fail with [`Error::InvalidState`].
pub struct Subscription<T> {
    id: SubscriptionId,
    implementation_identifier: &'static str,
    topic: Topic,
    source: Weak<dyn SampleSource>,
    decoder: Arc<dyn Decoder<T>>,
    listener: Option<Arc<SubscriptionListener>>,
}

impl<T> Subscription<T> {
    /// Bind a handle to `source`, tagging it with the source's implementation
    pub fn new<S, D>(topic: Topic, source: &Arc<S>, decoder: D) -> Self
    where
        S: SampleSource + 'static,
        D: Decoder<T> + 'static,
    {
        let source: Arc<dyn SampleSource> = source.clone();
        let subscription = Self {
            id: SubscriptionId::new(),
            implementation_identifier: source.implementation_identifier(),
            topic,
            source: Arc::downgrade(&source),
            decoder: Arc::new(decoder),
            listener: None,
        };
        debug!(
            "Created {} subscription {} on topic {}",
            subscription.implementation_identifier,
            subscription.id.as_str(),
            subscription.topic.name()
        );
        subscription
    }

    /// Attach the listener that tracks data availability for this subscription
    pub fn with_listener(mut self, listener: Arc<SubscriptionListener>) -> Self {
        self.listener = Some(listener);
        self
    }

    pub fn id(&self) -> SubscriptionId {
        self.id
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    pub fn implementation_identifier(&self) -> &'static str {
        self.implementation_identifier
    }

    pub fn listener(&self) -> Option<&Arc<SubscriptionListener>> {
        self.listener.as_ref()
    }

    /// Whether the listener reports unread samples
    pub fn has_data(&self) -> bool {
        self.listener.as_ref().is_some_and(|l| l.has_data())
    }

    pub(crate) fn resolve(&self) -> Result<Arc<dyn SampleSource>> {
        self.source.upgrade().ok_or_else(|| {
            Error::InvalidState(format!(
                "subscription {} on {} has no sample source",
                self.id.as_str(),
                self.topic.name()
            ))
        })
    }

    pub(crate) fn decoder(&self) -> &dyn Decoder<T> {
        self.decoder.as_ref()
    }

    /// Take the next live sample as a typed message
    pub fn take(&self, message: &mut T) -> Result<bool> {
        take_sample(self, Destination::Typed(message), None).map(TakeOutcome::is_taken)
    }

    /// Take the next live sample as a typed message, with delivery metadata
    pub fn take_with_info(&self, message: &mut T, message_info: &mut MessageInfo) -> Result<bool> {
        take_sample(self, Destination::Typed(message), Some(message_info))
            .map(TakeOutcome::is_taken)
    }

    /// Take the next live sample as raw wire bytes
    pub fn take_serialized(&self, serialized: &mut SerializedMessage) -> Result<bool> {
        take_sample(self, Destination::Serialized(serialized), None).map(TakeOutcome::is_taken)
    }

    /// Take the next live sample as raw wire bytes, with delivery metadata
    pub fn take_serialized_with_info(
        &self,
        serialized: &mut SerializedMessage,
        message_info: &mut MessageInfo,
    ) -> Result<bool> {
        take_sample(self, Destination::Serialized(serialized), Some(message_info))
            .map(TakeOutcome::is_taken)
    }

    /// Take up to `max_messages` live samples
    ///
    /// Stops early once the source is empty. Samples that are not alive are
    /// consumed without counting towards the limit.
    pub fn take_batch(&self, max_messages: usize) -> Result<Vec<(T, MessageInfo)>>
    where
        T: Default,
    {
        debug!("Attempting to take batch of up to {} messages", max_messages);
        let mut messages = Vec::with_capacity(max_messages);

        while messages.len() < max_messages {
            let mut message = T::default();
            let mut info = MessageInfo::default();
            match take_sample(self, Destination::Typed(&mut message), Some(&mut info))? {
                TakeOutcome::Taken => messages.push((message, info)),
                TakeOutcome::NotAlive => continue,
                TakeOutcome::Empty => break,
            }
        }

        Ok(messages)
    }
}
