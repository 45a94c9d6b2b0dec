//! # Event Source
//!
//! Event acquisition module.
//!
//! Responsibilities:
//! - `EventSource` trait: a lazy, finite, non-restartable event sequence
//! - `InternalEventSource`: framework-free synthetic source with per-rank
//!   event slicing, driven by configured data source generators
//! - `IncompleteEventFilter`: drops or halts on events with missing fields

mod data_sources;
mod filter;
mod internal;
mod source;

pub use data_sources::DataSource;
pub use filter::{FilterOutcome, FilterSummary, IncompleteEventFilter};
pub use internal::InternalEventSource;
pub use source::EventSource;
