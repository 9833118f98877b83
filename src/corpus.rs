use std::collections::HashSet;

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CorpusError {
    #[error("corpus has no documents")]
    Empty,
    #[error("duplicate document id `{0}`")]
    DuplicateId(String),
}

/// One document of a comparison batch. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    id: String,
    text: String,
}

impl Document {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// The ordered batch compared in one run.
///
/// Position in the corpus fixes the row/column of each document in the
/// similarity matrix and the order of flagged pairs, so input order is kept
/// exactly as given. Ids are unique and there is at least one document.
#[derive(Debug, Clone)]
pub struct Corpus {
    documents: Vec<Document>,
}

impl Corpus {
    pub fn new(documents: Vec<Document>) -> Result<Self, CorpusError> {
        if documents.is_empty() {
            return Err(CorpusError::Empty);
        }
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.id.as_str()) {
                return Err(CorpusError::DuplicateId(doc.id.clone()));
            }
        }
        Ok(Self { documents })
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, CorpusError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self::new(
            pairs
                .into_iter()
                .map(|(id, text)| Document::new(id, text))
                .collect(),
        )
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    /// Always false for a constructed corpus.
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn get(&self, index: usize) -> Option<&Document> {
        self.documents.get(index)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.documents.iter().map(|d| d.id()).collect()
    }
}
