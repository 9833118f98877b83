use crate::embed::Embedding;

use super::error::{EngineError, MatrixViolation};

/// Slack allowed on the diagonal and between mirrored entries of
/// externally supplied matrices.
const TOLERANCE: f64 = 1e-9;

/// Pairwise cosine similarities, indexed by corpus position.
///
/// Square, symmetric, ones on the diagonal, every value in `[-1, 1]`.
/// Read-only once built.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    dim: usize,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    /// Build from precomputed rows, checking every matrix invariant.
    ///
    /// The diagonal and mirrored entries may differ from the ideal by
    /// rounding noise; they are snapped to exactly 1.0 and to the upper
    /// triangle's value so the stored matrix is exactly symmetric.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self, EngineError> {
        let dim = rows.len();
        let mut values = Vec::with_capacity(dim * dim);
        for row in rows {
            if row.len() != dim {
                return Err(EngineError::ShapeMismatch {
                    expected: dim,
                    found: row.len(),
                });
            }
            values.extend(row);
        }

        let invalid = |row, col, value, reason| EngineError::InvalidMatrix {
            row,
            col,
            value,
            reason,
        };
        for i in 0..dim {
            for j in 0..dim {
                let value = values[i * dim + j];
                if !value.is_finite() {
                    return Err(invalid(i, j, value, MatrixViolation::NonFinite));
                }
                if !(-1.0..=1.0).contains(&value) {
                    return Err(invalid(i, j, value, MatrixViolation::OutOfRange));
                }
            }
        }
        for i in 0..dim {
            let diagonal = values[i * dim + i];
            if (diagonal - 1.0).abs() > TOLERANCE {
                return Err(invalid(i, i, diagonal, MatrixViolation::Diagonal));
            }
            values[i * dim + i] = 1.0;
            for j in (i + 1)..dim {
                let (upper, lower) = (values[i * dim + j], values[j * dim + i]);
                if (upper - lower).abs() > TOLERANCE {
                    return Err(invalid(j, i, lower, MatrixViolation::Asymmetric));
                }
                values[j * dim + i] = upper;
            }
        }
        Ok(Self { dim, values })
    }

    pub(crate) fn from_embeddings(embeddings: &[Embedding]) -> Self {
        let dim = embeddings.len();
        let mut values = vec![0.0; dim * dim];
        for i in 0..dim {
            values[i * dim + i] = 1.0;
            for j in (i + 1)..dim {
                let sim = cosine_similarity(&embeddings[i], &embeddings[j]);
                values[i * dim + j] = sim;
                values[j * dim + i] = sim;
            }
        }
        Self { dim, values }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Panics if either index is out of range.
    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(i < self.dim && j < self.dim, "index ({i}, {j}) out of range");
        self.values[i * self.dim + j]
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.values[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> Vec<Vec<f64>> {
        (0..self.dim).map(|i| self.row(i).to_vec()).collect()
    }
}

/// Cosine similarity accumulated in f64. Zero-norm input gives 0.0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    debug_assert_eq!(a.len(), b.len());
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
