//! Loader Configuration

/// Default read size for chunked file sources
pub const DEFAULT_CHUNK_SIZE: usize = 64 * 1024;

/// Loader configuration
#[derive(Debug, Clone)]
pub struct LoaderConfig {
    /// Maximum number of vector parts fetched at once (0 = auto-detect)
    pub max_concurrent_fetches: usize,

    /// Reject vector parts whose content type is text or markup
    pub reject_markup: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 0, // Auto-detect (num_cpus)
            reject_markup: true,
        }
    }
}

impl LoaderConfig {
    /// Set the fetch concurrency limit
    pub fn with_max_concurrent_fetches(mut self, limit: usize) -> Self {
        self.max_concurrent_fetches = limit;
        self
    }

    /// Enable or disable content-type sniffing on vector parts
    pub fn with_markup_check(mut self, enabled: bool) -> Self {
        self.reject_markup = enabled;
        self
    }

    /// Effective concurrency limit
    pub fn fetch_limit(&self) -> usize {
        if self.max_concurrent_fetches == 0 {
            num_cpus::get().max(1)
        } else {
            self.max_concurrent_fetches
        }
    }
}
