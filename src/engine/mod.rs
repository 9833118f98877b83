pub mod error;
pub mod flags;
pub mod matrix;

use rayon::prelude::*;

use crate::corpus::{Corpus, Document};
use crate::embed::{Embedder, Embedding};
pub use error::{EmbeddingError, EmbeddingFailure, EngineError, MatrixViolation};
pub use flags::{flag_pairs, validate_threshold, FlaggedPair, DEFAULT_THRESHOLD};
pub use matrix::{cosine_similarity, SimilarityMatrix};

pub struct EngineOptions {
    /// Embedder calls in flight at once. 0 or 1 embeds sequentially.
    pub max_concurrent: usize,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { max_concurrent: 1 }
    }
}

#[derive(Debug)]
pub struct RunOutput {
    pub matrix: SimilarityMatrix,
    pub flags: Vec<FlaggedPair>,
}

/// One full comparison pass: embed, build the matrix, flag pairs.
///
/// The threshold is checked before any embedding work starts. Nothing is
/// kept between calls; a failed run is simply called again.
pub fn run(
    corpus: &Corpus,
    threshold: f64,
    embedder: &dyn Embedder,
    options: &EngineOptions,
) -> Result<RunOutput, EngineError> {
    validate_threshold(threshold)?;
    let matrix = compute_similarity(corpus, embedder, options)?;
    let flags = flag_pairs(corpus, &matrix, threshold)?;
    tracing::info!(
        documents = corpus.len(),
        flagged = flags.len(),
        threshold,
        "comparison finished"
    );
    Ok(RunOutput { matrix, flags })
}

/// Embed every document and build the pairwise cosine matrix.
///
/// All-or-nothing: if any document fails to embed, or yields a vector of the
/// wrong shape, no matrix is produced. With several failures the error for
/// the earliest document in corpus order is returned.
pub fn compute_similarity(
    corpus: &Corpus,
    embedder: &dyn Embedder,
    options: &EngineOptions,
) -> Result<SimilarityMatrix, EngineError> {
    tracing::info!(
        documents = corpus.len(),
        model = embedder.model_name(),
        "embedding corpus"
    );
    let embeddings = embed_corpus(corpus, embedder, options)?;
    tracing::debug!(dimensions = embeddings[0].len(), "building similarity matrix");
    Ok(SimilarityMatrix::from_embeddings(&embeddings))
}

fn embed_corpus(
    corpus: &Corpus,
    embedder: &dyn Embedder,
    options: &EngineOptions,
) -> Result<Vec<Embedding>, EmbeddingError> {
    let docs = corpus.documents();
    let results: Vec<Result<Embedding, EmbeddingError>> = if options.max_concurrent > 1 {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(options.max_concurrent)
            .build()
        {
            Ok(pool) => pool.install(|| {
                docs.par_iter()
                    .map(|doc| embed_document(embedder, doc))
                    .collect()
            }),
            Err(e) => {
                tracing::warn!("could not start embedding pool, embedding sequentially: {e}");
                docs.iter().map(|doc| embed_document(embedder, doc)).collect()
            }
        }
    } else {
        docs.iter().map(|doc| embed_document(embedder, doc)).collect()
    };

    // par_iter().collect() keeps corpus order, so checking here in order
    // makes the reported failure independent of completion order.
    let advertised = embedder.dimensions();
    let mut expected = (advertised > 0).then_some(advertised);
    let mut embeddings = Vec::with_capacity(results.len());
    for (doc, result) in docs.iter().zip(results) {
        let embedding = result?;
        let dims = *expected.get_or_insert(embedding.len());
        if embedding.len() != dims {
            return Err(EmbeddingError {
                id: doc.id().to_string(),
                failure: EmbeddingFailure::DimensionMismatch {
                    expected: dims,
                    found: embedding.len(),
                },
            });
        }
        embeddings.push(embedding);
    }
    Ok(embeddings)
}

fn embed_document(embedder: &dyn Embedder, doc: &Document) -> Result<Embedding, EmbeddingError> {
    let fail = |failure| EmbeddingError {
        id: doc.id().to_string(),
        failure,
    };
    let embedding = embedder
        .embed(doc.text())
        .map_err(|e| fail(EmbeddingFailure::Backend(format!("{e:#}"))))?;
    if embedding.is_empty() {
        return Err(fail(EmbeddingFailure::Empty));
    }
    if let Some(index) = embedding.iter().position(|x| !x.is_finite()) {
        return Err(fail(EmbeddingFailure::NonFinite { index }));
    }
    tracing::debug!(id = doc.id(), dimensions = embedding.len(), "embedded document");
    Ok(embedding)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use std::collections::HashMap;

    /// Looks vectors up by text; unknown text is a backend failure.
    struct Table {
        vectors: HashMap<&'static str, Vec<f32>>,
        dims: usize,
    }

    impl Table {
        fn new(entries: Vec<(&'static str, Vec<f32>)>, dims: usize) -> Self {
            Self {
                vectors: entries.into_iter().collect(),
                dims,
            }
        }
    }

    impl Embedder for Table {
        fn embed(&self, text: &str) -> Result<Embedding> {
            match self.vectors.get(text) {
                Some(v) => Ok(v.clone()),
                None => bail!("no vector for {text:?}"),
            }
        }
        fn dimensions(&self) -> usize {
            self.dims
        }
        fn model_name(&self) -> &str {
            "table"
        }
    }

    fn table() -> Table {
        Table::new(
            vec![
                ("x", vec![1.0, 0.0]),
                ("y", vec![0.0, 1.0]),
                ("xy", vec![1.0, 1.0]),
                ("short", vec![1.0]),
                ("nan", vec![f32::NAN, 1.0]),
                ("empty", vec![]),
            ],
            0,
        )
    }

    fn failed_id(err: EngineError) -> (String, EmbeddingFailure) {
        match err {
            EngineError::Embedding(e) => (e.id, e.failure),
            other => panic!("expected embedding error, got {other:?}"),
        }
    }

    #[test]
    fn run_flags_close_pairs() {
        let corpus = Corpus::from_pairs([("a", "x"), ("b", "xy"), ("c", "x")]).unwrap();
        let out = run(&corpus, 0.85, &table(), &EngineOptions::default()).unwrap();
        assert_eq!(out.matrix.dim(), 3);
        assert_eq!(out.flags.len(), 1);
        assert_eq!(out.flags[0].first_id, "a");
        assert_eq!(out.flags[0].second_id, "c");
    }

    #[test]
    fn backend_failure_names_document() {
        let corpus = Corpus::from_pairs([("a", "x"), ("b", "missing"), ("c", "y")]).unwrap();
        let err = compute_similarity(&corpus, &table(), &EngineOptions::default()).unwrap_err();
        let (id, failure) = failed_id(err);
        assert_eq!(id, "b");
        assert!(matches!(failure, EmbeddingFailure::Backend(msg) if msg.contains("missing")));
    }

    #[test]
    fn inconsistent_length_is_rejected() {
        let corpus = Corpus::from_pairs([("a", "x"), ("b", "short")]).unwrap();
        let (id, failure) =
            failed_id(compute_similarity(&corpus, &table(), &EngineOptions::default()).unwrap_err());
        assert_eq!(id, "b");
        assert_eq!(
            failure,
            EmbeddingFailure::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn advertised_dimensions_are_enforced() {
        let embedder = Table::new(vec![("x", vec![1.0, 0.0])], 3);
        let corpus = Corpus::from_pairs([("only", "x")]).unwrap();
        let (id, failure) =
            failed_id(compute_similarity(&corpus, &embedder, &EngineOptions::default()).unwrap_err());
        assert_eq!(id, "only");
        assert_eq!(
            failure,
            EmbeddingFailure::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn malformed_vectors_are_rejected() {
        let options = EngineOptions::default();
        let corpus = Corpus::from_pairs([("n", "nan")]).unwrap();
        let (_, failure) = failed_id(compute_similarity(&corpus, &table(), &options).unwrap_err());
        assert_eq!(failure, EmbeddingFailure::NonFinite { index: 0 });

        let corpus = Corpus::from_pairs([("e", "empty")]).unwrap();
        let (_, failure) = failed_id(compute_similarity(&corpus, &table(), &options).unwrap_err());
        assert_eq!(failure, EmbeddingFailure::Empty);
    }

    #[test]
    fn earliest_failure_wins_in_parallel() {
        let corpus = Corpus::from_pairs([
            ("a", "x"),
            ("b", "y"),
            ("c", "gone"),
            ("d", "x"),
            ("e", "also gone"),
        ])
        .unwrap();
        let options = EngineOptions { max_concurrent: 4 };
        for _ in 0..10 {
            let (id, _) = failed_id(compute_similarity(&corpus, &table(), &options).unwrap_err());
            assert_eq!(id, "c");
        }
    }

    #[test]
    fn parallel_and_sequential_agree() {
        let corpus =
            Corpus::from_pairs([("a", "x"), ("b", "y"), ("c", "xy"), ("d", "x")]).unwrap();
        let seq = compute_similarity(&corpus, &table(), &EngineOptions::default()).unwrap();
        let par =
            compute_similarity(&corpus, &table(), &EngineOptions { max_concurrent: 3 }).unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn invalid_threshold_fails_before_embedding() {
        // "missing" would fail to embed; the threshold error must come first.
        let corpus = Corpus::from_pairs([("a", "missing")]).unwrap();
        let err = run(&corpus, 1.5, &table(), &EngineOptions::default()).unwrap_err();
        assert_eq!(err, EngineError::InvalidThreshold(1.5));
    }
}
