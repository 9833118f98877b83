pub mod walker;

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};

use crate::config::{ErrorPolicy, IngestConfig, UnsupportedPolicy};
use crate::corpus::{Corpus, CorpusError, Document};
use crate::extract::{extract_text, ExtractionError};
use walker::{relative_id, walk_files, WalkConfig};

/// A source file left out of the corpus, and why.
#[derive(Debug)]
pub struct Skipped {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug)]
pub struct Ingested {
    pub corpus: Corpus,
    pub skipped: Vec<Skipped>,
}

/// Build a corpus from files and directories.
///
/// Directory contents are ordered by relative path, and inputs keep the
/// order they were given in. Skip decisions are made here, before any
/// comparison runs.
pub fn load_corpus(inputs: &[PathBuf], config: &IngestConfig) -> Result<Ingested> {
    let mut sources: Vec<(String, PathBuf)> = Vec::new();
    for input in inputs {
        let meta = std::fs::metadata(input)
            .with_context(|| format!("reading {}", input.display()))?;
        if meta.is_dir() {
            let walk_config = WalkConfig {
                recursive: config.recursive,
            };
            for path in walk_files(input, &walk_config)
                .with_context(|| format!("walking {}", input.display()))?
            {
                sources.push((relative_id(input, &path), path));
            }
        } else {
            let id = input
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| input.display().to_string());
            sources.push((id, input.clone()));
        }
    }

    let mut documents = Vec::with_capacity(sources.len());
    let mut skipped = Vec::new();

    for (id, path) in sources {
        match load_one(&path, config)? {
            Loaded::Text(text) => {
                tracing::debug!(id = %id, bytes = text.len(), "loaded document");
                documents.push(Document::new(id, text));
            }
            Loaded::Skip(reason) => {
                tracing::warn!("skipping {}: {reason}", path.display());
                skipped.push(Skipped { path, reason });
            }
        }
    }

    let corpus = match Corpus::new(documents) {
        Ok(c) => c,
        Err(CorpusError::Empty) => bail!("no documents could be loaded"),
        Err(e) => return Err(e).context("building corpus"),
    };
    tracing::info!(documents = corpus.len(), skipped = skipped.len(), "corpus loaded");
    Ok(Ingested { corpus, skipped })
}

enum Loaded {
    Text(String),
    Skip(String),
}

fn load_one(path: &Path, config: &IngestConfig) -> Result<Loaded> {
    let size = std::fs::metadata(path)
        .with_context(|| format!("reading {}", path.display()))?
        .len();
    if size > config.max_file_size {
        return Ok(Loaded::Skip(format!(
            "{size} bytes exceeds limit of {}",
            config.max_file_size
        )));
    }

    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default();

    match extract_text(path, extension) {
        Ok(text) => Ok(Loaded::Text(text)),
        Err(e @ ExtractionError::Unsupported { .. }) => match config.unsupported {
            UnsupportedPolicy::Skip => Ok(Loaded::Skip(e.to_string())),
            UnsupportedPolicy::Empty => Ok(Loaded::Text(String::new())),
            UnsupportedPolicy::Fail => Err(e.into()),
        },
        Err(e) => match config.on_error {
            ErrorPolicy::Skip => Ok(Loaded::Skip(e.to_string())),
            ErrorPolicy::Fail => Err(e.into()),
        },
    }
}
