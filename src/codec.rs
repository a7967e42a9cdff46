//! Typed decoding of wire payloads.
//!
//! A [`Decoder`] is chosen per message type when a subscription is created
//! and is invoked by the take path only for live samples.

use crate::error::{Error, Result};
use crate::Endianness;
use bincode::Options;
use serde::de::DeserializeOwned;
use std::marker::PhantomData;

/// Converts a wire payload into a typed message
pub trait Decoder<T>: Send + Sync {
    /// Decode `bytes` into `destination`.
    ///
    /// Implementations must leave `destination` untouched on failure.
    fn decode(&self, bytes: &[u8], destination: &mut T) -> Result<()>;
}

/// Fixed-int, length-prefixed `bincode` decoding
pub struct BincodeDecoder<T> {
    endianness: Endianness,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Default for BincodeDecoder<T> {
    fn default() -> Self {
        Self::new(Endianness::Little)
    }
}

impl<T> BincodeDecoder<T> {
    pub fn new(endianness: Endianness) -> Self {
        Self {
            endianness,
            _marker: PhantomData,
        }
    }

    pub fn endianness(&self) -> Endianness {
        self.endianness
    }
}

impl<T: DeserializeOwned> Decoder<T> for BincodeDecoder<T> {
    fn decode(&self, bytes: &[u8], destination: &mut T) -> Result<()> {
        let options = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .allow_trailing_bytes();
        let decoded = match self.endianness {
            Endianness::Little => options.with_little_endian().deserialize(bytes),
            Endianness::Big => options.with_big_endian().deserialize(bytes),
        }
        .map_err(|e| Error::DecodeFailure(e.to_string()))?;
        *destination = decoded;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Default, PartialEq, Serialize, Deserialize)]
    struct Reading {
        sensor: String,
        value: u32,
    }

    #[test]
    fn test_decodes_default_bincode_layout() {
        let reading = Reading {
            sensor: "imu".into(),
            value: 42,
        };
        let bytes = bincode::serialize(&reading).unwrap();
        // u64 little-endian length prefix for the string
        assert_eq!(&bytes[..8], &3u64.to_le_bytes());

        let mut out = Reading::default();
        BincodeDecoder::default().decode(&bytes, &mut out).unwrap();
        assert_eq!(out, reading);
    }

    #[test]
    fn test_big_endian() {
        let bytes = bincode::DefaultOptions::new()
            .with_fixint_encoding()
            .with_big_endian()
            .serialize(&0x0102_0304u32)
            .unwrap();
        assert_eq!(bytes, vec![1, 2, 3, 4]);

        let decoder = BincodeDecoder::<u32>::new(Endianness::Big);
        assert_eq!(decoder.endianness(), Endianness::Big);
        assert_eq!(BincodeDecoder::<u32>::default().endianness(), Endianness::Little);

        let mut out = 0u32;
        decoder.decode(&bytes, &mut out).unwrap();
        assert_eq!(out, 0x0102_0304);
    }

    #[test]
    fn test_malformed_payload_leaves_destination() {
        let mut out = Reading {
            sensor: "keep".into(),
            value: 1,
        };
        let err = BincodeDecoder::default()
            .decode(&[0xff, 0xff], &mut out)
            .unwrap_err();
        assert!(matches!(err, Error::DecodeFailure(_)));
        assert_eq!(out.sensor, "keep");
    }
}
