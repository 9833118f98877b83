pub mod ollama;

use anyhow::Result;

pub type Embedding = Vec<f32>;

/// Anything that maps text to a fixed-length vector.
///
/// Implementations must be deterministic for identical text and model
/// configuration. `embed` may be called from several threads at once.
pub trait Embedder: Send + Sync {
    fn embed(&self, text: &str) -> Result<Embedding>;
    /// Output dimensionality, or 0 when the backend does not advertise one.
    fn dimensions(&self) -> usize;
    fn model_name(&self) -> &str;
}
