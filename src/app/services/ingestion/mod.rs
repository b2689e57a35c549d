//! Ingestion pipeline
//!
//! Ties the decoders to the persistence collaborator:
//!
//! - [`IngestionPipeline::run_cycle`] polls cloud-backed stations through the cloud adapter
//! - [`IngestionPipeline::promote_buffered`] turns pushed telegrams into current readings
//! - [`IngestionPipeline::ingest_telegram`] decodes a pushed telegram into the buffer
//!
//! Station status is derived the same way on every path (see [`derive_status`]).

pub mod pipeline;
pub mod stats;

#[cfg(test)]
pub mod tests;

pub use pipeline::{IngestionPipeline, derive_status};
pub use stats::CycleReport;
