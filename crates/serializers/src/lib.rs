//! # Serializers
//!
//! Batch serialization module.
//!
//! Turns one aggregated `Batch` into one opaque `ByteBlock`. The produced
//! format is never interpreted by the pipeline core: sinks treat the bytes as
//! the unit of dispatch and nothing more.

mod wire;

use bytes::Bytes;

use contracts::{Batch, ByteBlock, SerializerConfig, Serializer, StreamerError};

use crate::wire::WireBatch;

/// JSON serializer (human-readable, larger)
pub struct JsonSerializer;

impl Serializer for JsonSerializer {
    fn name(&self) -> &str {
        "json"
    }

    fn serialize(&self, batch: &Batch) -> Result<ByteBlock, StreamerError> {
        let data = serde_json::to_vec(batch)
            .map_err(|e| StreamerError::serialize(self.name(), e.to_string()))?;
        Ok(Bytes::from(data))
    }
}

/// Bincode serializer (binary, compact)
///
/// Encodes through a flat wire form rather than `Batch` itself; see
/// [`decode_bincode`] for the matching decoder.
pub struct BincodeSerializer;

impl Serializer for BincodeSerializer {
    fn name(&self) -> &str {
        "bincode"
    }

    fn serialize(&self, batch: &Batch) -> Result<ByteBlock, StreamerError> {
        let data = bincode::serialize(&WireBatch::from(batch))
            .map_err(|e| StreamerError::serialize(self.name(), e.to_string()))?;
        Ok(Bytes::from(data))
    }
}

/// Decode a block produced by [`BincodeSerializer`] back into a batch
pub fn decode_bincode(block: &[u8]) -> Result<Batch, StreamerError> {
    let wire: WireBatch = bincode::deserialize(block)
        .map_err(|e| StreamerError::serialize("bincode", e.to_string()))?;
    wire.into_batch()
}

/// Closed constructor registry: configuration discriminator -> serializer
pub fn create_serializer(config: SerializerConfig) -> Box<dyn Serializer> {
    match config {
        SerializerConfig::Json => Box::new(JsonSerializer),
        SerializerConfig::Bincode => Box::new(BincodeSerializer),
    }
}
