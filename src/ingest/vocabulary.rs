//! Vocabulary Descriptor
//!
//! JSON side-channel carrying the dimension and the ordered word list:
//!
//! ```json
//! { "dim": 300, "words": ["the", "of", "and"] }
//! ```
//!
//! Older exports name the list `vocab` instead of `words`; both are accepted,
//! and `words` takes precedence when a document carries both.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{LoadError, Result};

/// Shape of the embedding table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Vocabulary {
    pub dim: usize,
    pub words: Vec<String>,
}

#[derive(Deserialize)]
struct RawVocabulary {
    #[serde(default)]
    dim: Option<Value>,
    #[serde(default)]
    words: Option<Value>,
    #[serde(default)]
    vocab: Option<Value>,
}

impl Vocabulary {
    /// Parse and validate a vocabulary document
    pub fn from_json(bytes: &[u8], source_id: &str) -> Result<Self> {
        let invalid = |reason: String| LoadError::InvalidVocabulary {
            source_id: source_id.to_string(),
            reason,
        };

        let raw: RawVocabulary =
            serde_json::from_slice(bytes).map_err(|e| invalid(format!("malformed JSON: {}", e)))?;

        let dim = raw
            .dim
            .as_ref()
            .and_then(positive_integer)
            .ok_or_else(|| invalid("dim must be a positive integer".to_string()))?;

        let words = match raw.words.or(raw.vocab) {
            Some(Value::Array(items)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(word) => Ok(word),
                    other => Err(invalid(format!("word list contains a non-string entry: {}", other))),
                })
                .collect::<Result<Vec<_>>>()?,
            _ => return Err(invalid("word list is missing or not an array".to_string())),
        };

        if words.is_empty() {
            return Err(invalid("word list is empty".to_string()));
        }

        let vocab = Self { dim, words };
        if vocab.expected_floats().is_none() {
            return Err(invalid(format!(
                "{} words x {} dims does not fit in memory",
                vocab.words.len(),
                dim
            )));
        }

        Ok(vocab)
    }

    /// Floats the vector data must contain, `None` on overflow
    pub fn expected_floats(&self) -> Option<usize> {
        self.words.len().checked_mul(self.dim)
    }
}

/// Accept `300` and `300.0`, reject everything else
fn positive_integer(value: &Value) -> Option<usize> {
    if let Some(n) = value.as_u64() {
        return usize::try_from(n).ok().filter(|n| *n > 0);
    }
    let f = value.as_f64()?;
    if f.is_finite() && f.fract() == 0.0 && f >= 1.0 && f <= usize::MAX as f64 {
        Some(f as usize)
    } else {
        None
    }
}
