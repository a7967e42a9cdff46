use crate::error::{Error, Result};
use tracing::warn;

/// Caller-owned growable buffer holding raw wire bytes
///
/// Storage is always `capacity` bytes long; only the first `len` bytes are
/// meaningful. `len <= capacity` holds after every mutation, and capacity is
/// never reduced.
#[derive(Debug, Clone, Default)]
pub struct SerializedMessage {
    storage: Vec<u8>,
    length: usize,
    limit: Option<usize>,
}

impl SerializedMessage {
    /// Create an empty buffer with no storage
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty buffer with `capacity` bytes of storage
    pub fn with_capacity(capacity: usize) -> Result<Self> {
        let mut message = Self::new();
        message.ensure_capacity(capacity)?;
        Ok(message)
    }

    /// Create an empty buffer whose storage may never exceed `limit` bytes
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit: Some(limit),
            ..Self::default()
        }
    }

    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The logical contents
    pub fn as_slice(&self) -> &[u8] {
        &self.storage[..self.length]
    }

    /// Grow storage to at least `capacity` bytes
    pub fn ensure_capacity(&mut self, capacity: usize) -> Result<()> {
        let current = self.storage.len();
        if capacity <= current {
            return Ok(());
        }
        if self.limit.is_some_and(|limit| capacity > limit) {
            warn!(
                "Serialized message growth to {} bytes exceeds limit {:?}",
                capacity, self.limit
            );
            return Err(Error::AllocationFailure {
                requested: capacity,
            });
        }
        self.storage
            .try_reserve_exact(capacity - current)
            .map_err(|_| Error::AllocationFailure {
                requested: capacity,
            })?;
        self.storage.resize(capacity, 0);
        Ok(())
    }

    /// Set the logical length; fails if it would exceed capacity
    pub fn set_length(&mut self, length: usize) -> Result<()> {
        if length > self.storage.len() {
            return Err(Error::InvalidState(format!(
                "length {} exceeds capacity {}",
                length,
                self.storage.len()
            )));
        }
        self.length = length;
        Ok(())
    }

    /// Replace the contents with `bytes`, growing storage as needed
    pub(crate) fn copy_from(&mut self, bytes: &[u8]) -> Result<()> {
        self.ensure_capacity(bytes.len())?;
        self.set_length(bytes.len())?;
        self.storage[..bytes.len()].copy_from_slice(bytes);
        Ok(())
    }

    /// Drop the logical contents, keeping storage
    pub fn clear(&mut self) {
        self.length = 0;
    }
}
