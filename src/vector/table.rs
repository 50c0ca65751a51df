//! Embedding Table
//!
//! Validated, immutable word list plus flat row-major `f32` buffer.

use hashbrown::HashMap;
use std::fmt;

use crate::error::{LoadError, Result};

/// Immutable embedding table
///
/// Row `i` of the buffer holds the vector for `words[i]`. The index maps each
/// word to its row; when a word appears more than once the last row wins.
#[derive(Clone)]
pub struct EmbeddingTable {
    dim: usize,
    words: Vec<String>,
    index: HashMap<String, usize>,
    vectors: Vec<f32>,
}

impl EmbeddingTable {
    /// Build a table, checking that the buffer holds exactly
    /// `words.len() * dim` floats.
    pub fn new(dim: usize, words: Vec<String>, vectors: Vec<f32>) -> Result<Self> {
        if dim == 0 {
            return Err(LoadError::InvalidVocabulary {
                source_id: "table".to_string(),
                reason: "dim must be a positive integer".to_string(),
            });
        }
        if words.is_empty() {
            return Err(LoadError::InvalidVocabulary {
                source_id: "table".to_string(),
                reason: "word list is empty".to_string(),
            });
        }

        let expected = words.len().checked_mul(dim).ok_or_else(|| {
            LoadError::InvalidVocabulary {
                source_id: "table".to_string(),
                reason: format!("{} words x {} dims does not fit in memory", words.len(), dim),
            }
        })?;
        if vectors.len() != expected {
            return Err(LoadError::ShapeMismatch {
                expected,
                actual: vectors.len(),
            });
        }

        let mut index = HashMap::with_capacity(words.len());
        for (row, word) in words.iter().enumerate() {
            index.insert(word.clone(), row);
        }

        Ok(Self {
            dim,
            words,
            index,
            vectors,
        })
    }

    /// Vector dimensionality
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Always false for a constructed table
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Words in row order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Whole row-major buffer
    pub fn vectors(&self) -> &[f32] {
        &self.vectors
    }

    /// Row assigned to `word` by the index
    #[inline]
    pub fn row_of(&self, word: &str) -> Option<usize> {
        self.index.get(word).copied()
    }

    /// Slice of the buffer for row `row`, `None` past the last row
    #[inline]
    pub fn row(&self, row: usize) -> Option<&[f32]> {
        let start = row.checked_mul(self.dim)?;
        let end = start.checked_add(self.dim)?;
        self.vectors.get(start..end)
    }

    /// Iterate `(row, word, vector)` over every row, duplicates included
    pub fn rows(&self) -> impl Iterator<Item = (usize, &str, &[f32])> + '_ {
        self.words
            .iter()
            .zip(self.vectors.chunks_exact(self.dim))
            .enumerate()
            .map(|(row, (word, vector))| (row, word.as_str(), vector))
    }
}

impl fmt::Debug for EmbeddingTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingTable")
            .field("dim", &self.dim)
            .field("words", &self.words.len())
            .field("floats", &self.vectors.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_table_rows() {
        let table = EmbeddingTable::new(
            2,
            words(&["a", "b", "c"]),
            vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
        )
        .unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.row_of("b"), Some(1));
        assert_eq!(table.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(table.row(3), None);
        assert_eq!(table.row(usize::MAX), None);
        assert_eq!(table.row_of("z"), None);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = EmbeddingTable::new(4, words(&["a", "b", "c"]), vec![0.0; 11]).unwrap_err();
        assert!(matches!(
            err,
            LoadError::ShapeMismatch {
                expected: 12,
                actual: 11
            }
        ));
    }

    #[test]
    fn test_oversized_shape_rejected() {
        let err = EmbeddingTable::new(1 << 62, words(&["a", "b", "c", "d"]), vec![]).unwrap_err();
        match err {
            LoadError::InvalidVocabulary { reason, .. } => assert!(reason.contains("does not fit")),
            other => panic!("Expected InvalidVocabulary, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_dim_rejected() {
        let err = EmbeddingTable::new(0, words(&["a"]), vec![]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidVocabulary { .. }));
    }

    #[test]
    fn test_empty_words_rejected() {
        let err = EmbeddingTable::new(3, vec![], vec![]).unwrap_err();
        assert!(matches!(err, LoadError::InvalidVocabulary { .. }));
    }

    #[test]
    fn test_duplicate_word_last_row_wins() {
        let table =
            EmbeddingTable::new(1, words(&["x", "y", "x"]), vec![1.0, 2.0, 3.0]).unwrap();
        assert_eq!(table.row_of("x"), Some(2));
        // The shadowed row is still part of the buffer.
        assert_eq!(table.rows().count(), 3);
        assert_eq!(table.row(0), Some(&[1.0][..]));
    }

    #[test]
    fn test_debug_is_compact() {
        let table = EmbeddingTable::new(1, words(&["a"]), vec![1.0]).unwrap();
        let debug = format!("{:?}", table);
        assert!(debug.contains("dim: 1"));
        assert!(debug.contains("floats: 1"));
    }
}
