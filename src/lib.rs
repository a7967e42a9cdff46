//! Subscription take path for a lightweight pub/sub middleware layer.
//!
//! A [`Subscription`] pulls the next pending [`Sample`] from its sample source
//! and materializes it either as a typed message (through a [`Decoder`]) or as
//! raw wire bytes copied into a [`SerializedMessage`]. Sender identity can be
//! attached to the result as [`MessageInfo`].
//!
//! The [`Transport`] is the in-process backend: it owns the per-subscription
//! queues and fans delivered samples out to them.

pub mod codec;
pub mod error;
pub mod message_info;
pub mod sample;
pub mod serialized;
pub mod subscription;
pub mod take;
pub mod transport;

use serde::{Deserialize, Serialize};

pub use codec::{BincodeDecoder, Decoder};
pub use error::{Error, Result};
pub use message_info::{Gid, MessageInfo, GID_STORAGE_SIZE};
pub use sample::{Guid, Sample, SampleKind, GUID_SIZE};
pub use serialized::SerializedMessage;
pub use subscription::{SampleSource, Subscription, SubscriptionId, SubscriptionListener};
pub use take::{take, take_serialized, take_serialized_with_info, take_with_info};
pub use transport::{SubscriptionStats, Transport};

/// Identifier stamped on every handle and gid issued by this implementation
pub const IMPLEMENTATION_IDENTIFIER: &str = "rmw_lite";

/// Maximum length for topic names
pub const MAX_TOPIC_LENGTH: usize = 256;

/// Configuration for creating a new transport
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Name of the transport, used in logs
    pub name: String,
    /// Maximum number of live subscriptions
    pub max_subscriptions: usize,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            name: "rmw_lite".to_string(),
            max_subscriptions: 1000,
        }
    }
}

/// How many undelivered samples a subscription keeps around
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HistoryPolicy {
    /// Keep the newest `depth` samples, overwriting the oldest
    KeepLast { depth: usize },
    /// Keep every sample until taken
    KeepAll,
}

impl Default for HistoryPolicy {
    fn default() -> Self {
        HistoryPolicy::KeepLast { depth: 10 }
    }
}

/// Byte order of the fixed-int wire encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Endianness {
    #[default]
    Little,
    Big,
}

/// Configuration for creating a subscription
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionConfig {
    /// Topic the subscription reads from
    pub topic: String,
    /// History kept by the subscription's sample queue
    #[serde(default)]
    pub history: HistoryPolicy,
    /// Byte order used when decoding typed messages
    #[serde(default)]
    pub endianness: Endianness,
}

impl SubscriptionConfig {
    /// Create a config for `topic` with default history and endianness
    pub fn new(topic: &str) -> Self {
        Self {
            topic: topic.to_string(),
            history: HistoryPolicy::default(),
            endianness: Endianness::default(),
        }
    }

    /// Load a config from its JSON representation
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the config for values the transport cannot honor
    pub fn validate(&self) -> Result<()> {
        Topic::new(&self.topic)?;
        if let HistoryPolicy::KeepLast { depth: 0 } = self.history {
            return Err(Error::InvalidConfig("History depth cannot be zero".into()));
        }
        Ok(())
    }
}

/// Topic for sample routing
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Topic {
    name: String,
}

impl Topic {
    /// Create a new topic
    pub fn new(name: &str) -> Result<Self> {
        if name.is_empty() {
            return Err(Error::InvalidTopic("Topic name cannot be empty".into()));
        }
        if name.len() > MAX_TOPIC_LENGTH {
            return Err(Error::TopicTooLong);
        }
        Ok(Self {
            name: name.to_string(),
        })
    }

    /// Get the topic name
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Statistics about the transport's operation
#[derive(Debug, Clone)]
pub struct TransportStats {
    /// Number of live subscriptions
    pub subscriptions: usize,
    /// Total number of samples handed to the transport
    pub samples_delivered: u64,
    /// Total number of samples consumed by takes
    pub samples_taken: u64,
    /// Total number of samples overwritten before they were taken
    pub samples_dropped: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_topic_validation() {
        assert!(Topic::new("/chatter").is_ok());
        assert!(matches!(Topic::new(""), Err(Error::InvalidTopic(_))));
        let long = "a".repeat(MAX_TOPIC_LENGTH + 1);
        assert!(matches!(Topic::new(&long), Err(Error::TopicTooLong)));
    }

    #[test]
    fn test_config_from_json() {
        let config = SubscriptionConfig::from_json(
            r#"{"topic": "/imu", "history": {"keep_last": {"depth": 3}}, "endianness": "big"}"#,
        )
        .unwrap();
        assert_eq!(config.topic, "/imu");
        assert_eq!(config.history, HistoryPolicy::KeepLast { depth: 3 });
        assert_eq!(config.endianness, Endianness::Big);

        let config = SubscriptionConfig::from_json(r#"{"topic": "/imu"}"#).unwrap();
        assert_eq!(config, SubscriptionConfig::new("/imu"));
    }

    #[test]
    fn test_config_rejects_bad_values() {
        let zero_depth = r#"{"topic": "/imu", "history": {"keep_last": {"depth": 0}}}"#;
        assert!(matches!(
            SubscriptionConfig::from_json(zero_depth),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SubscriptionConfig::from_json("not json"),
            Err(Error::InvalidConfig(_))
        ));
        assert!(matches!(
            SubscriptionConfig::from_json(r#"{"topic": ""}"#),
            Err(Error::InvalidTopic(_))
        ));
    }
}
