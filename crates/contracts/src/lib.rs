//! # Contracts
//!
//! Frozen interface contracts (ICD), defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Model
//! - `Event` is one facility record: field name -> typed array or explicit absence
//! - `Batch` is a stack of consecutive events' values, one array per field
//! - `ByteBlock` is an opaque serialized payload, the unit of sink dispatch

mod batch;
mod config;
mod error;
mod event;
mod serializer;
mod sink;

pub use batch::Batch;
pub use config::*;
pub use error::*;
pub use event::{ElementType, Event, FieldValue};
pub use serializer::Serializer;
pub use sink::{ByteBlock, ByteSink};
