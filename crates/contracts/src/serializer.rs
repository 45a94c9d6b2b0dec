//! Serializer trait - Batch to ByteBlock boundary
//!
//! Serializers are external collaborators as far as the pipeline core is
//! concerned: one `Batch` in, one opaque `ByteBlock` out. The core imposes no
//! format contract on the produced bytes.

use crate::{Batch, ByteBlock, StreamerError};

/// Batch serialization trait
pub trait Serializer: Send {
    /// Serializer name (used for logging/errors)
    fn name(&self) -> &str;

    /// Serialize one aggregated batch into an opaque byte blob
    ///
    /// # Errors
    /// Returns a `Serialize` error when the batch cannot be encoded.
    fn serialize(&self, batch: &Batch) -> Result<ByteBlock, StreamerError>;
}
