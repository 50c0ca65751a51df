//! wordvec - Word Embedding Loader and Exact Search
//!
//! Loads a fixed-dimension embedding table from a JSON vocabulary plus a flat
//! little-endian `f32` blob (whole or split into parts fetched concurrently),
//! and answers nearest-neighbor and analogy queries by exhaustive scoring.

pub mod error;
pub mod ingest;
pub mod metrics;
pub mod vector;

pub use error::{LoadError, Result, TransportStatus};
pub use ingest::{
    load, progress_channel, FileSource, Loader, LoaderConfig, MemorySource, ProgressFn, Source,
};
pub use metrics::QueryMetrics;
pub use vector::{EmbeddingTable, ScoredWord, WordVectors};
