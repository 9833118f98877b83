//! Deterministic embedders for integration tests.
#![allow(dead_code)]

use anyhow::{bail, Result};
use simcheck::embed::{Embedder, Embedding};

/// Bag-of-words counts over a fixed vocabulary. Words outside the
/// vocabulary are ignored, so text with no known words embeds to zeros.
pub struct BagOfWords {
    vocabulary: Vec<&'static str>,
}

impl BagOfWords {
    pub fn new(vocabulary: &[&'static str]) -> Self {
        Self {
            vocabulary: vocabulary.to_vec(),
        }
    }
}

impl Embedder for BagOfWords {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let mut counts = vec![0.0f32; self.vocabulary.len()];
        for word in text.split_whitespace() {
            let word = word.to_lowercase();
            if let Some(i) = self.vocabulary.iter().position(|v| *v == word) {
                counts[i] += 1.0;
            }
        }
        Ok(counts)
    }

    fn dimensions(&self) -> usize {
        self.vocabulary.len()
    }

    fn model_name(&self) -> &str {
        "bag-of-words"
    }
}

/// Wraps another embedder and fails for texts containing a marker.
pub struct FailOn<E> {
    pub inner: E,
    pub marker: &'static str,
}

impl<E: Embedder> Embedder for FailOn<E> {
    fn embed(&self, text: &str) -> Result<Embedding> {
        if text.contains(self.marker) {
            bail!("model rejected input");
        }
        self.inner.embed(text)
    }

    fn dimensions(&self) -> usize {
        self.inner.dimensions()
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }
}

/// Returns caller-supplied vectors in corpus order, keyed by text.
pub struct Fixed(pub Vec<(String, Vec<f32>)>);

impl Embedder for Fixed {
    fn embed(&self, text: &str) -> Result<Embedding> {
        match self.0.iter().find(|(t, _)| t == text) {
            Some((_, v)) => Ok(v.clone()),
            None => bail!("unexpected text {text:?}"),
        }
    }

    fn dimensions(&self) -> usize {
        0
    }

    fn model_name(&self) -> &str {
        "fixed"
    }
}
