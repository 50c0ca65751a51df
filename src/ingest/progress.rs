//! Progress Aggregation
//!
//! Each vector part owns one slot. Every update rewrites that slot and folds
//! all slots into one ratio in `[0, 1]`, which is handed to the caller's
//! callback. The pipeline reports 0 before any I/O and 1 once, after the
//! table validates.

use parking_lot::Mutex;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Progress callback
pub type ProgressFn = Arc<dyn Fn(f64) + Send + Sync>;

/// Bytes seen so far for one part
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkProgress {
    pub loaded_bytes: u64,
    pub total_bytes: Option<u64>,
    pub finished: bool,
}

impl ChunkProgress {
    /// Completion of this part alone
    fn fraction(&self) -> f64 {
        match self.total_bytes {
            Some(0) | None => {
                if self.finished {
                    1.0
                } else {
                    0.0
                }
            }
            Some(total) => (self.loaded_bytes as f64 / total as f64).clamp(0.0, 1.0),
        }
    }
}

/// Fold per-part progress into one ratio
///
/// Byte-weighted when every total is known, otherwise the mean of per-part
/// fractions.
pub fn aggregate(slots: &[ChunkProgress]) -> f64 {
    if slots.is_empty() {
        return 0.0;
    }

    let known_totals: Option<Vec<u64>> = slots.iter().map(|s| s.total_bytes).collect();
    if let Some(totals) = known_totals {
        let total: u64 = totals.iter().sum();
        if total > 0 {
            let loaded: u64 = slots.iter().map(|s| s.loaded_bytes).sum();
            return (loaded as f64 / total as f64).clamp(0.0, 1.0);
        }
    }

    let sum: f64 = slots.iter().map(ChunkProgress::fraction).sum();
    (sum / slots.len() as f64).clamp(0.0, 1.0)
}

/// Shared progress state for one load
pub struct ProgressTracker {
    slots: Mutex<Vec<ChunkProgress>>,
    report: ProgressFn,
}

impl ProgressTracker {
    pub fn new(parts: usize, report: ProgressFn) -> Self {
        Self {
            slots: Mutex::new(vec![ChunkProgress::default(); parts]),
            report,
        }
    }

    /// Report 0 before any I/O
    pub fn start(&self) {
        (self.report)(0.0);
    }

    /// Record the announced length of a part
    pub fn begin(&self, slot: usize, total_bytes: Option<u64>) {
        self.update(slot, |s| s.total_bytes = total_bytes);
    }

    /// Record bytes received so far for a part
    pub fn advance(&self, slot: usize, loaded_bytes: u64) {
        self.update(slot, |s| s.loaded_bytes = loaded_bytes);
    }

    /// Mark a part fully received
    pub fn finish(&self, slot: usize, loaded_bytes: u64) {
        self.update(slot, |s| {
            s.loaded_bytes = loaded_bytes;
            s.finished = true;
        });
    }

    /// Report 1 after the load succeeded
    pub fn complete(&self) {
        (self.report)(1.0);
    }

    fn update(&self, slot: usize, apply: impl FnOnce(&mut ChunkProgress)) {
        let mut slots = self.slots.lock();
        if let Some(progress) = slots.get_mut(slot) {
            apply(progress);
        }

        // 1.0 is reserved for `complete`.
        let ratio = aggregate(&slots);
        if ratio < 1.0 {
            (self.report)(ratio);
        }
    }
}

/// Progress callback feeding an unbounded channel
///
/// Lets callers consume progress as a stream of ratios.
pub fn progress_channel() -> (ProgressFn, mpsc::UnboundedReceiver<f64>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let report: ProgressFn = Arc::new(move |ratio| {
        // Receiver may already be gone; progress is advisory.
        let _ = tx.send(ratio);
    });
    (report, rx)
}
