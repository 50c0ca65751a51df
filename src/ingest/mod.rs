//! Ingestion Pipeline
//!
//! Fetches the vocabulary, then every vector part concurrently, joins the
//! parts in caller order and validates alignment and shape before handing
//! out an [`EmbeddingTable`]. Any failure aborts the whole load.

mod assemble;
mod config;
mod progress;
mod source;
mod vocabulary;

pub use assemble::{concat_parts, decode_f32_le, FLOAT_WIDTH};
pub use config::{LoaderConfig, DEFAULT_CHUNK_SIZE};
pub use progress::{aggregate, progress_channel, ChunkProgress, ProgressFn, ProgressTracker};
pub use source::{content_type_for_path, is_markup, Body, FileSource, MemorySource, Source, SourceResponse};
pub use vocabulary::Vocabulary;

use bytes::{Bytes, BytesMut};
use futures::stream::{self, StreamExt};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::error::{LoadError, Result, TransportStatus};
use crate::vector::EmbeddingTable;

/// Conventional vocabulary file name
pub const VOCAB_FILE: &str = "vocab.json";

/// Conventional vector blob name; parts append `.part0`, `.part1`, ...
pub const VECTORS_FILE: &str = "vectors.f32";

/// Upper bound on buffer space reserved from an announced body length
const MAX_BODY_RESERVE: usize = 16 * 1024 * 1024;

/// Embedding table loader
#[derive(Debug, Clone, Default)]
pub struct Loader {
    config: LoaderConfig,
}

impl Loader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load a table from a vocabulary source and ordered vector parts
    ///
    /// `progress`, when given, receives 0 before any I/O, per-chunk ratios
    /// while parts arrive, and 1 exactly once after validation succeeds.
    pub async fn load(
        &self,
        vocabulary: &dyn Source,
        parts: &[Arc<dyn Source>],
        progress: Option<ProgressFn>,
    ) -> Result<EmbeddingTable> {
        let tracker = progress.map(|report| ProgressTracker::new(parts.len(), report));
        if let Some(tracker) = &tracker {
            tracker.start();
        }

        info!(
            vocabulary = vocabulary.id(),
            parts = parts.len(),
            "Loading word vectors"
        );

        let vocab = fetch_vocabulary(vocabulary).await?;
        debug!(
            dim = vocab.dim,
            words = vocab.words.len(),
            floats = vocab.expected_floats(),
            "Vocabulary parsed"
        );

        let buffers = self.fetch_parts(parts, tracker.as_ref()).await?;
        let floats = decode_f32_le(&concat_parts(buffers)?);

        let table = EmbeddingTable::new(vocab.dim, vocab.words, floats)?;

        if let Some(tracker) = &tracker {
            tracker.complete();
        }
        info!(
            words = table.len(),
            dim = table.dim(),
            "Word vectors loaded"
        );

        Ok(table)
    }

    async fn fetch_parts(
        &self,
        parts: &[Arc<dyn Source>],
        tracker: Option<&ProgressTracker>,
    ) -> Result<Vec<Bytes>> {
        let reject_markup = self.config.reject_markup;

        let mut fetches = stream::iter(parts.iter().enumerate())
            .map(|(slot, source)| fetch_part(slot, source.as_ref(), tracker, reject_markup))
            .buffer_unordered(self.config.fetch_limit());

        // Completion order is arbitrary; slots restore caller order.
        let mut buffers: Vec<Option<Bytes>> = vec![None; parts.len()];
        while let Some(result) = fetches.next().await {
            let (slot, bytes) = result?;
            buffers[slot] = Some(bytes);
        }

        Ok(buffers.into_iter().flatten().collect())
    }
}

/// Load with the default configuration
pub async fn load(
    vocabulary: &dyn Source,
    parts: &[Arc<dyn Source>],
    progress: Option<ProgressFn>,
) -> Result<EmbeddingTable> {
    Loader::default().load(vocabulary, parts, progress).await
}

/// Find vector files in `dir`
///
/// Returns `vectors.f32` if present, otherwise the consecutive run of
/// `vectors.f32.part0`, `vectors.f32.part1`, ... starting at zero.
pub fn discover_vector_parts(dir: &Path) -> Vec<PathBuf> {
    let single = dir.join(VECTORS_FILE);
    if single.is_file() {
        return vec![single];
    }

    (0..)
        .map(|i| dir.join(format!("{}.part{}", VECTORS_FILE, i)))
        .take_while(|path| path.is_file())
        .collect()
}

fn transport_error(source_id: &str, status: TransportStatus) -> LoadError {
    LoadError::Transport {
        source_id: source_id.to_string(),
        status,
    }
}

async fn fetch_vocabulary(source: &dyn Source) -> Result<Vocabulary> {
    let response = source
        .fetch()
        .await
        .map_err(|status| transport_error(source.id(), status))?;

    let bytes = read_body(source.id(), response, |_| {}).await?;
    Vocabulary::from_json(&bytes, source.id())
}

async fn fetch_part(
    slot: usize,
    source: &dyn Source,
    tracker: Option<&ProgressTracker>,
    reject_markup: bool,
) -> Result<(usize, Bytes)> {
    let response = source
        .fetch()
        .await
        .map_err(|status| transport_error(source.id(), status))?;

    if reject_markup {
        if let Some(content_type) = response.content_type.as_deref().filter(|ct| is_markup(ct)) {
            warn!(
                source = source.id(),
                content_type, "Vector part is markup, not binary data"
            );
            return Err(LoadError::UnexpectedContentType {
                source_id: source.id().to_string(),
                content_type: content_type.to_string(),
            });
        }
    }

    if let Some(tracker) = tracker {
        tracker.begin(slot, response.content_length);
    }

    let bytes = read_body(source.id(), response, |loaded| {
        if let Some(tracker) = tracker {
            tracker.advance(slot, loaded);
        }
    })
    .await?;

    if let Some(tracker) = tracker {
        tracker.finish(slot, bytes.len() as u64);
    }
    debug!(source = source.id(), slot, bytes = bytes.len(), "Vector part received");

    Ok((slot, bytes))
}

/// Collect a response body into one contiguous buffer
///
/// `on_chunk` gets the running byte count after every chunk.
async fn read_body(
    source_id: &str,
    response: SourceResponse,
    mut on_chunk: impl FnMut(u64),
) -> Result<Bytes> {
    let SourceResponse {
        content_length,
        body,
        ..
    } = response;

    match body {
        Body::Full(bytes) => {
            on_chunk(bytes.len() as u64);
            Ok(bytes)
        }
        Body::Stream(mut chunks) => {
            // The announced length is a hint; growth past it is allowed.
            let capacity = content_length
                .and_then(|n| usize::try_from(n).ok())
                .unwrap_or(0)
                .min(MAX_BODY_RESERVE);
            let mut buf = BytesMut::with_capacity(capacity);

            while let Some(chunk) = chunks.next().await {
                let chunk = chunk.map_err(|status| transport_error(source_id, status))?;
                buf.extend_from_slice(&chunk);
                on_chunk(buf.len() as u64);
            }

            Ok(buf.freeze())
        }
    }
}
