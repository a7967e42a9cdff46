use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::SystemTime;
use uuid::Uuid;

/// Width of an endpoint identity in bytes
pub const GUID_SIZE: usize = 16;

/// Globally unique identity of a writing endpoint
///
/// Laid out as a 12-byte participant prefix followed by a 4-byte entity id.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct Guid([u8; GUID_SIZE]);

impl Default for Guid {
    fn default() -> Self {
        Self::new()
    }
}

impl Guid {
    /// Create a new random endpoint identity
    pub fn new() -> Self {
        Self(*Uuid::new_v4().as_bytes())
    }

    /// Build an identity from its raw bytes
    pub const fn from_bytes(bytes: [u8; GUID_SIZE]) -> Self {
        Self(bytes)
    }

    /// Build an identity from a short token, zero-padded to full width
    ///
    /// Returns `None` if the token is wider than [`GUID_SIZE`].
    pub fn from_token(token: &[u8]) -> Option<Self> {
        if token.len() > GUID_SIZE {
            return None;
        }
        let mut bytes = [0u8; GUID_SIZE];
        bytes[..token.len()].copy_from_slice(token);
        Some(Self(bytes))
    }

    pub fn as_bytes(&self) -> &[u8; GUID_SIZE] {
        &self.0
    }

    pub fn prefix(&self) -> &[u8] {
        &self.0[..12]
    }

    pub fn entity_id(&self) -> &[u8] {
        &self.0[12..]
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, byte) in self.0.iter().enumerate() {
            if i == 12 {
                write!(f, "|")?;
            } else if i > 0 && i % 4 == 0 {
                write!(f, ".")?;
            }
            write!(f, "{:02x}", byte)?;
        }
        Ok(())
    }
}

/// Liveness of the instance a sample refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SampleKind {
    /// The sample carries user data
    Alive,
    /// The writer disposed of the instance
    NotAliveDisposed,
    /// The writer unregistered the instance
    NotAliveUnregistered,
}

/// One unit of data handed to a subscription by the transport
#[derive(Debug, Clone)]
pub struct Sample {
    /// Wire-format payload
    pub payload: Bytes,
    /// Liveness marker
    pub kind: SampleKind,
    /// Identity of the sending endpoint
    pub writer_guid: Guid,
    /// Writer-assigned sequence number
    pub sequence_number: u64,
    /// Time the writer produced the sample
    pub source_timestamp: SystemTime,
}

impl Sample {
    /// Create a sample carrying user data
    pub fn alive(writer_guid: Guid, sequence_number: u64, payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
            kind: SampleKind::Alive,
            writer_guid,
            sequence_number,
            source_timestamp: SystemTime::now(),
        }
    }

    /// Create a payload-less liveness notification
    pub fn not_alive(writer_guid: Guid, sequence_number: u64, kind: SampleKind) -> Self {
        Self {
            payload: Bytes::new(),
            kind,
            writer_guid,
            sequence_number,
            source_timestamp: SystemTime::now(),
        }
    }

    pub fn is_alive(&self) -> bool {
        self.kind == SampleKind::Alive
    }
}
