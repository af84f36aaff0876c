//! Consumer side: persisted records to chartable per-language series.

pub mod assemble;
pub mod slice;

pub use assemble::to_dataset;
