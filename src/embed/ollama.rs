use anyhow::{bail, Context, Result};
use serde::Deserialize;

use super::{Embedder, Embedding};

pub const DEFAULT_URL: &str = "http://localhost:11434";
/// Ollama's packaging of all-MiniLM-L6-v2.
pub const DEFAULT_MODEL: &str = "all-minilm";

const MAX_PROMPT_BYTES: usize = 8192;

pub struct OllamaEmbedder {
    base_url: String,
    model: String,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

impl OllamaEmbedder {
    pub fn new(base_url: &str, model: &str) -> Result<Self> {
        let mut embedder = Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimensions: 0,
        };

        // Probe dimensions with a short test string
        let test = embedder
            .embed("test")
            .with_context(|| format!("probing model {model} at {}", embedder.base_url))?;
        if test.is_empty() {
            bail!("model {model} returned an empty embedding");
        }
        embedder.dimensions = test.len();
        tracing::debug!(model, dimensions = embedder.dimensions, "ollama embedder ready");
        Ok(embedder)
    }
}

/// Cut `text` to at most `max` bytes without splitting a UTF-8 sequence.
fn truncate_on_char_boundary(text: &str, max: usize) -> &str {
    if text.len() <= max {
        return text;
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

impl Embedder for OllamaEmbedder {
    fn embed(&self, text: &str) -> Result<Embedding> {
        let text = if text.is_empty() { " " } else { text };
        let text = truncate_on_char_boundary(text, MAX_PROMPT_BYTES);

        let url = format!("{}/api/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "prompt": text,
        });

        let result = ureq::post(&url).send_json(&body);

        let mut response = match result {
            Ok(r) => r,
            Err(ureq::Error::StatusCode(code)) => {
                bail!("ollama returned HTTP {code}");
            }
            Err(e) => {
                return Err(anyhow::anyhow!(e).context("ollama embedding request failed"));
            }
        };

        let resp: EmbeddingResponse = response
            .body_mut()
            .read_json()
            .context("parsing ollama response")?;

        Ok(resp.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}
