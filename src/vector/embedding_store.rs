//! Word Vector Store
//!
//! Read-only lookup, similarity, nearest-neighbor and analogy queries over a
//! loaded [`EmbeddingTable`]. Search is exhaustive: every row is scored.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::ingest::{self, FileSource, ProgressFn, Source};

use super::similarity::{dot_product, normalized, offset};
use super::table::EmbeddingTable;
use super::top_k::TopK;

/// A word and its score against a query
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredWord {
    pub word: String,
    pub score: f32,
}

/// Immutable word vector store
///
/// Cloning shares the underlying table.
#[derive(Debug, Clone)]
pub struct WordVectors {
    table: Arc<EmbeddingTable>,
}

impl WordVectors {
    /// Wrap a validated table
    pub fn new(table: EmbeddingTable) -> Self {
        Self {
            table: Arc::new(table),
        }
    }

    /// Load from a vocabulary file and ordered vector part files
    pub async fn load_files<P: AsRef<Path>>(
        vocab_path: impl AsRef<Path>,
        vector_paths: &[P],
        progress: Option<ProgressFn>,
    ) -> Result<Self> {
        let vocab = FileSource::new(vocab_path.as_ref());
        let parts: Vec<Arc<dyn Source>> = vector_paths
            .iter()
            .map(|p| Arc::new(FileSource::new(p.as_ref())) as Arc<dyn Source>)
            .collect();

        let table = ingest::load(&vocab, &parts, progress).await?;
        Ok(Self::new(table))
    }

    /// Underlying table
    pub fn table(&self) -> &EmbeddingTable {
        &self.table
    }

    /// Vector dimensionality
    pub fn dim(&self) -> usize {
        self.table.dim()
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Check if a word is in the vocabulary
    pub fn has(&self, word: &str) -> bool {
        self.table.row_of(word).is_some()
    }

    /// Borrow the vector for `word`
    pub fn vector_of(&self, word: &str) -> Option<&[f32]> {
        self.table.row_of(word).and_then(|row| self.table.row(row))
    }

    /// Raw dot product of two words' vectors
    ///
    /// `None` if either word is unknown or the product is not finite.
    pub fn similarity(&self, a: &str, b: &str) -> Option<f32> {
        let va = self.vector_of(a)?;
        let vb = self.vector_of(b)?;
        let score = dot_product(va, vb);
        score.is_finite().then_some(score)
    }

    /// The `top_k` highest-scoring words against `word`, excluding `word`
    pub fn nearest(&self, word: &str, top_k: usize) -> Vec<ScoredWord> {
        match self.vector_of(word) {
            Some(query) => self.nearest_by_vector(query, top_k, &[word]),
            None => Vec::new(),
        }
    }

    /// Words completing `a : b :: c : ?`
    ///
    /// Scores every row against the normalized `b - a + c`, excluding the
    /// three input words.
    pub fn analogy(&self, a: &str, b: &str, c: &str, top_k: usize) -> Vec<ScoredWord> {
        let (Some(va), Some(vb), Some(vc)) = (self.vector_of(a), self.vector_of(b), self.vector_of(c))
        else {
            return Vec::new();
        };

        let query = normalized(&offset(va, vb, vc));
        self.nearest_by_vector(&query, top_k, &[a, b, c])
    }

    /// Top-K scan over all rows against an arbitrary query vector
    pub fn nearest_by_vector(
        &self,
        query: &[f32],
        top_k: usize,
        exclude: &[&str],
    ) -> Vec<ScoredWord> {
        let mut top = TopK::with_candidates(top_k, self.table.len());

        for (row, word, vector) in self.table.rows() {
            if exclude.contains(&word) {
                continue;
            }
            top.push(row, dot_product(query, vector));
        }

        let words = self.table.words();
        top.into_sorted_vec()
            .into_iter()
            .map(|c| ScoredWord {
                word: words[c.row].clone(),
                score: c.score,
            })
            .collect()
    }
}
