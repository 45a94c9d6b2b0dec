//! # Batch Engine
//!
//! Event aggregation module.
//!
//! Responsibilities:
//! - Accumulate per-field arrays with shape/dtype invariants (`DataBatch`)
//! - Chop the event stream into fixed-size batches (`BatchingStage`)
//! - Optional shape-heuristic preprocessing (2-D padding, channel axis)

mod batch;
mod preprocess;
mod stage;

pub use batch::DataBatch;
pub use preprocess::Preprocessor;
pub use stage::BatchingStage;
