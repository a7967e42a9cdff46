use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid argument: {0} is null")]
    InvalidArgument(&'static str),

    #[error("Handle not from this implementation: expected {expected}, found {found}")]
    WrongImplementation {
        expected: &'static str,
        found: String,
    },

    #[error("Invalid subscription state: {0}")]
    InvalidState(String),

    #[error("Failed to allocate {requested} bytes for serialized message")]
    AllocationFailure { requested: usize },

    #[error("Failed to decode message: {0}")]
    DecodeFailure(String),

    #[error("Topic name too long")]
    TopicTooLong,

    #[error("Invalid topic name: {0}")]
    InvalidTopic(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Subscription limit exceeded: {0}")]
    SubscriptionLimitExceeded(usize),

    #[error("Subscription not found: {0}")]
    SubscriptionNotFound(String),

    #[error("Operation timeout")]
    Timeout,
}

pub type Result<T> = std::result::Result<T, Error>;
