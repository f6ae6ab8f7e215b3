// Cosine similarity between two embeddings.

use thiserror::Error;

/// The two vectors had different lengths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cannot compare a {left}-dimensional vector with a {right}-dimensional one")]
pub struct DimensionMismatch {
    pub left: usize,
    pub right: usize,
}

/// dot(a, b) / (|a| * |b|), in [-1, 1].
///
/// Either vector being all zeros gives 0.0. Unlike a clamped [0, 1]
/// overlap score, opposite vectors come out at -1.0.
///
/// Each vector is divided by its largest absolute component first, so the
/// squares stay inside f64 range for any finite input.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64, DimensionMismatch> {
    if a.len() != b.len() {
        return Err(DimensionMismatch {
            left: a.len(),
            right: b.len(),
        });
    }

    let scale_a = max_abs(a);
    let scale_b = max_abs(b);
    if scale_a == 0.0 || scale_b == 0.0 || !scale_a.is_finite() || !scale_b.is_finite() {
        return Ok(0.0);
    }

    let mut dot = 0.0_f64;
    let mut sq_a = 0.0_f64;
    let mut sq_b = 0.0_f64;
    for (x, y) in a.iter().zip(b) {
        let (x, y) = (x / scale_a, y / scale_b);
        dot += x * y;
        sq_a += x * x;
        sq_b += y * y;
    }

    // Both scaled vectors have a component of magnitude 1, so each norm
    // is at least 1.
    let sim = dot / sq_a.sqrt() / sq_b.sqrt();

    // Rounding can push identical vectors a hair past 1.0.
    Ok(sim.clamp(-1.0, 1.0))
}

fn max_abs(v: &[f64]) -> f64 {
    v.iter().fold(0.0_f64, |m, x| m.max(x.abs()))
}
