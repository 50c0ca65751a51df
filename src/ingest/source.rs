//! Transport Contract
//!
//! A [`Source`] delivers one artifact, either as a single buffer or as a
//! stream of byte chunks, together with an optional length and content type.
//! The pipeline only ever talks to this trait; HTTP clients, object stores
//! and the like plug in by implementing it.

use bytes::Bytes;
use futures::future::BoxFuture;
use futures::stream::{self, BoxStream};
use futures::{FutureExt, StreamExt, TryStreamExt};
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::error::TransportStatus;

use super::config::DEFAULT_CHUNK_SIZE;

/// Response body
pub enum Body {
    /// Whole payload at once
    Full(Bytes),
    /// Payload delivered progressively, in order
    Stream(BoxStream<'static, Result<Bytes, TransportStatus>>),
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Body::Full(bytes) => f.debug_tuple("Full").field(&bytes.len()).finish(),
            Body::Stream(_) => f.write_str("Stream"),
        }
    }
}

/// Successful fetch of one artifact
#[derive(Debug)]
pub struct SourceResponse {
    /// Transport-reported content classification (MIME type)
    pub content_type: Option<String>,
    /// Total byte length, when known in advance
    pub content_length: Option<u64>,
    pub body: Body,
}

/// Something that can deliver an artifact's bytes
pub trait Source: Send + Sync {
    /// Identifier used in errors and logs (URL, path, ...)
    fn id(&self) -> &str;

    /// Start fetching the artifact
    fn fetch(&self) -> BoxFuture<'_, Result<SourceResponse, TransportStatus>>;
}

/// Whether a content type names a text or markup payload
pub fn is_markup(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    mime.starts_with("text/")
        || mime == "application/xml"
        || mime == "application/xhtml+xml"
        || mime.ends_with("+xml")
}

/// Content type a file source reports, based on its extension
pub fn content_type_for_path(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("html") | Some("htm") => "text/html",
        Some("json") => "application/json",
        _ => "application/octet-stream",
    }
}

/// Local file, read in chunks
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
    id: String,
    chunk_size: usize,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            id: path.display().to_string(),
            path,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set the read size
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

impl Source for FileSource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SourceResponse, TransportStatus>> {
        async move {
            let file = File::open(&self.path).await?;
            let len = file.metadata().await?.len();

            let chunks = ReaderStream::with_capacity(file, self.chunk_size)
                .map_err(TransportStatus::from)
                .boxed();

            Ok::<_, TransportStatus>(SourceResponse {
                content_type: Some(content_type_for_path(&self.path).to_string()),
                content_length: Some(len),
                body: Body::Stream(chunks),
            })
        }
        .boxed()
    }
}

/// In-memory artifact
///
/// Delivers its bytes whole by default, or re-chunked as a stream.
#[derive(Debug, Clone)]
pub struct MemorySource {
    id: String,
    data: Bytes,
    content_type: Option<String>,
    chunk_size: Option<usize>,
    announce_length: bool,
}

impl MemorySource {
    pub fn new(id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
            content_type: None,
            chunk_size: None,
            announce_length: true,
        }
    }

    /// Report a content type
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Deliver as a stream of `chunk_size`-byte chunks
    pub fn streamed(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size.max(1));
        self
    }

    /// Do not report the length in advance
    pub fn without_length(mut self) -> Self {
        self.announce_length = false;
        self
    }

    fn chunks(&self, chunk_size: usize) -> Vec<Result<Bytes, TransportStatus>> {
        let mut chunks = Vec::with_capacity(self.data.len() / chunk_size + 1);
        let mut start = 0;
        while start < self.data.len() {
            let end = (start + chunk_size).min(self.data.len());
            chunks.push(Ok(self.data.slice(start..end)));
            start = end;
        }
        chunks
    }
}

impl Source for MemorySource {
    fn id(&self) -> &str {
        &self.id
    }

    fn fetch(&self) -> BoxFuture<'_, Result<SourceResponse, TransportStatus>> {
        let body = match self.chunk_size {
            Some(size) => Body::Stream(stream::iter(self.chunks(size)).boxed()),
            None => Body::Full(self.data.clone()),
        };

        let response = SourceResponse {
            content_type: self.content_type.clone(),
            content_length: self.announce_length.then_some(self.data.len() as u64),
            body,
        };

        futures::future::ready(Ok(response)).boxed()
    }
}
