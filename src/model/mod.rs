//! Data model shared by the pipeline stages.
//!
//! [`Block`] and [`Sentence`] are transient values produced and consumed
//! within one run. [`TaskRecord`] is the first durable unit: the contract
//! between classification, aggregation and rendering.

mod block;
mod extraction;
mod metadata;
mod record;
mod sentence;

pub use block::{Block, StyleHint};
pub use extraction::{CategoryGroup, ExtractionResult, ExtractionStats};
pub use metadata::Metadata;
pub use record::{Amount, TaskRecord, UNCATEGORIZED};
pub use sentence::Sentence;
