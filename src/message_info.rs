use crate::sample::{Sample, GUID_SIZE};
use crate::IMPLEMENTATION_IDENTIFIER;
use std::time::SystemTime;

/// Storage reserved for a publisher identity
pub const GID_STORAGE_SIZE: usize = 24;

const _: () = assert!(GUID_SIZE <= GID_STORAGE_SIZE);

/// Publisher identity tagged with the implementation that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gid {
    pub implementation_identifier: &'static str,
    pub data: [u8; GID_STORAGE_SIZE],
}

impl Default for Gid {
    fn default() -> Self {
        Self {
            implementation_identifier: "",
            data: [0u8; GID_STORAGE_SIZE],
        }
    }
}

/// Delivery metadata for a taken sample
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageInfo {
    pub publisher_gid: Gid,
    pub publication_sequence_number: u64,
    pub source_timestamp: SystemTime,
}

impl Default for MessageInfo {
    fn default() -> Self {
        Self {
            publisher_gid: Gid::default(),
            publication_sequence_number: 0,
            source_timestamp: SystemTime::UNIX_EPOCH,
        }
    }
}

impl MessageInfo {
    /// Overwrite every field from the sample's provenance
    pub(crate) fn assign(&mut self, sample: &Sample) {
        let gid = &mut self.publisher_gid;
        gid.implementation_identifier = IMPLEMENTATION_IDENTIFIER;
        gid.data = [0u8; GID_STORAGE_SIZE];
        let guid = sample.writer_guid.as_bytes();
        assert!(guid.len() <= gid.data.len());
        gid.data[..guid.len()].copy_from_slice(guid);

        self.publication_sequence_number = sample.sequence_number;
        self.source_timestamp = sample.source_timestamp;
    }
}
