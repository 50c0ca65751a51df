//! Vector Arithmetic
//!
//! Dot product and normalization over `f32` rows.

/// Compute dot product of two vectors
///
/// Uses unrolled loop for better CPU performance.
#[inline]
pub fn dot_product(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "Vector dimensions must match");

    let len = a.len().min(b.len());
    let mut sum = 0.0f32;

    // Process 4 elements at a time (manual unrolling)
    let chunks = len / 4;
    let remainder = len % 4;

    for i in 0..chunks {
        let idx = i * 4;
        sum += a[idx] * b[idx];
        sum += a[idx + 1] * b[idx + 1];
        sum += a[idx + 2] * b[idx + 2];
        sum += a[idx + 3] * b[idx + 3];
    }

    // Handle remainder
    for i in (len - remainder)..len {
        sum += a[i] * b[i];
    }

    sum
}

/// Euclidean length of a vector
#[inline]
pub fn magnitude(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Return an L2-normalized copy of `v`.
///
/// A zero or non-finite norm yields an unmodified copy.
pub fn normalized(v: &[f32]) -> Vec<f32> {
    let norm = magnitude(v);
    if !norm.is_finite() || norm == 0.0 {
        return v.to_vec();
    }
    let inv = 1.0 / norm;
    v.iter().map(|x| x * inv).collect()
}

/// `b - a + c`, component-wise
pub fn offset(a: &[f32], b: &[f32], c: &[f32]) -> Vec<f32> {
    debug_assert!(a.len() == b.len() && b.len() == c.len());

    a.iter()
        .zip(b)
        .zip(c)
        .map(|((a, b), c)| b - a + c)
        .collect()
}
