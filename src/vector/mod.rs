//! Vector Module
//!
//! Embedding table, exhaustive top-K search and word vector queries.

mod embedding_store;
mod similarity;
mod table;
mod top_k;

pub use embedding_store::{ScoredWord, WordVectors};
pub use similarity::{dot_product, magnitude, normalized};
pub use table::EmbeddingTable;
pub use top_k::{clamp_top_k, Candidate, TopK};
