//! Bounded top-K selection
//!
//! Keeps at most `k` candidates sorted ascending once full. A candidate is
//! admitted only when it beats the current minimum strictly, so ties with the
//! worst kept entry never displace it.

/// Candidate row with its score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub row: usize,
    pub score: f32,
}

/// Exhaustive top-K accumulator
#[derive(Debug)]
pub struct TopK {
    k: usize,
    best: Vec<Candidate>,
}

impl TopK {
    /// `k` is clamped to at least 1
    pub fn new(k: usize) -> Self {
        Self::with_candidates(k, 0)
    }

    /// Like [`TopK::new`], reserving room for at most `candidates` entries
    pub fn with_candidates(k: usize, candidates: usize) -> Self {
        let k = k.max(1);
        Self {
            k,
            best: Vec::with_capacity(k.min(candidates)),
        }
    }

    /// Offer a candidate
    pub fn push(&mut self, row: usize, score: f32) {
        let candidate = Candidate { row, score };

        if self.best.len() < self.k {
            self.best.push(candidate);
            if self.best.len() == self.k {
                self.sort_ascending();
            }
            return;
        }

        if score <= self.best[0].score {
            return;
        }
        self.best[0] = candidate;
        self.sort_ascending();
    }

    /// Kept candidates, highest score first
    pub fn into_sorted_vec(mut self) -> Vec<Candidate> {
        self.best.sort_by(|a, b| b.score.total_cmp(&a.score));
        self.best
    }

    fn sort_ascending(&mut self) {
        self.best.sort_by(|a, b| a.score.total_cmp(&b.score));
    }
}

/// Turn a possibly fractional request into a usable `k`
///
/// Truncates toward zero, then clamps to at least 1. Non-finite input yields 1.
pub fn clamp_top_k(requested: f64) -> usize {
    if !requested.is_finite() || requested < 1.0 {
        return 1;
    }
    requested.trunc() as usize
}
