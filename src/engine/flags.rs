use serde::Serialize;

use crate::corpus::Corpus;

use super::error::EngineError;
use super::matrix::SimilarityMatrix;

pub const DEFAULT_THRESHOLD: f64 = 0.85;

/// A document pair whose similarity is strictly above the threshold.
/// `first_id` always precedes `second_id` in corpus order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlaggedPair {
    pub first_id: String,
    pub second_id: String,
    pub score: f64,
}

pub fn validate_threshold(threshold: f64) -> Result<f64, EngineError> {
    if (-1.0..=1.0).contains(&threshold) {
        Ok(threshold)
    } else {
        Err(EngineError::InvalidThreshold(threshold))
    }
}

/// Every pair `i < j` with `matrix[i][j] > threshold`, in ascending `(i, j)`
/// order. An empty result means nothing was flagged.
pub fn flag_pairs(
    corpus: &Corpus,
    matrix: &SimilarityMatrix,
    threshold: f64,
) -> Result<Vec<FlaggedPair>, EngineError> {
    validate_threshold(threshold)?;
    if matrix.dim() != corpus.len() {
        return Err(EngineError::ShapeMismatch {
            expected: corpus.len(),
            found: matrix.dim(),
        });
    }

    let docs = corpus.documents();
    let mut flagged = Vec::new();
    for i in 0..docs.len() {
        for j in (i + 1)..docs.len() {
            let score = matrix.get(i, j);
            if score > threshold {
                flagged.push(FlaggedPair {
                    first_id: docs[i].id().to_string(),
                    second_id: docs[j].id().to_string(),
                    score,
                });
            }
        }
    }
    Ok(flagged)
}
