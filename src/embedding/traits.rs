// Embedder trait — the swap-ready abstraction.
//
// Ranking only ever sees `dyn TextEmbedder`, so the GloVe and ONNX
// backends (and test doubles) are interchangeable.

use super::backend::{Backend, Embedding};

/// Converts text into a fixed-length embedding for one backend.
///
/// `embed` is infallible by contract: unknown words and model failures
/// degrade to zero vectors instead of errors.
pub trait TextEmbedder: Send + Sync {
    /// The backend this embedder produces vectors for.
    fn backend(&self) -> Backend;

    /// Embed a single text.
    fn embed(&self, text: &str) -> Embedding;

    /// Embed several texts, returning results in the same order.
    /// Default implementation calls `embed` sequentially.
    fn embed_batch(&self, texts: &[&str]) -> Vec<Embedding> {
        texts.iter().map(|t| self.embed(t)).collect()
    }

    /// Output dimension.
    fn dimension(&self) -> usize {
        self.backend().dimension()
    }
}
