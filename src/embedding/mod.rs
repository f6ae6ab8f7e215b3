// Embedding providers — text in, fixed-length vector out.
//
// Two interchangeable strategies sit behind the TextEmbedder trait:
// averaged GloVe word vectors and the all-MiniLM-L6-v2 sentence encoder.
// The registry hands out one shared, lazily loaded instance per backend.

pub mod backend;
pub mod encoder;
pub mod glove;
pub mod registry;
pub mod traits;

pub use backend::{Backend, Embedding, GloveDim};
pub use registry::ModelRegistry;
pub use traits::TextEmbedder;
