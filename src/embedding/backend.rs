// Backend identifiers and the Embedding value type.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Output dimension of all-MiniLM-L6-v2.
pub const MINILM_DIM: usize = 384;

/// The GloVe Twitter vector sizes we ship support for.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum GloveDim {
    D25,
    #[default]
    D50,
    D100,
}

impl GloveDim {
    pub fn dimension(self) -> usize {
        match self {
            GloveDim::D25 => 25,
            GloveDim::D50 => 50,
            GloveDim::D100 => 100,
        }
    }

    /// Short label used in file names and the UI ("50d").
    pub fn label(self) -> &'static str {
        match self {
            GloveDim::D25 => "25d",
            GloveDim::D50 => "50d",
            GloveDim::D100 => "100d",
        }
    }
}

impl FromStr for GloveDim {
    type Err = anyhow::Error;

    /// Accepts "25d"/"50d"/"100d" as well as the bare numbers.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().trim_end_matches(['d', 'D']) {
            "25" => Ok(GloveDim::D25),
            "50" => Ok(GloveDim::D50),
            "100" => Ok(GloveDim::D100),
            _ => anyhow::bail!("Unsupported GloVe dimension '{s}' (expected 25d, 50d or 100d)"),
        }
    }
}

/// Which embedding strategy produced a vector.
///
/// Vectors from different backends live in unrelated spaces, so the
/// ranker refuses to compare them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Backend {
    /// Averaged GloVe Twitter word vectors.
    Glove(GloveDim),
    /// all-MiniLM-L6-v2 sentence encoder.
    MiniLm,
}

impl Backend {
    pub const ALL: [Backend; 4] = [
        Backend::Glove(GloveDim::D25),
        Backend::Glove(GloveDim::D50),
        Backend::Glove(GloveDim::D100),
        Backend::MiniLm,
    ];

    /// Stable identifier, used as the tab name in the UI and on the API.
    pub fn id(self) -> &'static str {
        match self {
            Backend::Glove(GloveDim::D25) => "glove_25d",
            Backend::Glove(GloveDim::D50) => "glove_50d",
            Backend::Glove(GloveDim::D100) => "glove_100d",
            Backend::MiniLm => "sentence_transformer_384",
        }
    }

    pub fn dimension(self) -> usize {
        match self {
            Backend::Glove(dim) => dim.dimension(),
            Backend::MiniLm => MINILM_DIM,
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if let Some(backend) = Backend::ALL.iter().find(|b| b.id() == s) {
            return Ok(*backend);
        }
        match s {
            "minilm" | "all-MiniLM-L6-v2" | "sentence_transformer" => Ok(Backend::MiniLm),
            other => match other.strip_prefix("glove_").or_else(|| other.strip_prefix("glove")) {
                Some(dim) => Ok(Backend::Glove(dim.parse()?)),
                None => anyhow::bail!(
                    "Unknown backend '{s}'. Expected one of: {}",
                    Backend::ALL.map(|b| b.id()).join(", ")
                ),
            },
        }
    }
}

// On the wire a backend is its id string ("glove_50d").
impl Serialize for Backend {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

impl<'de> Deserialize<'de> for Backend {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// A fixed-length vector tagged with the backend that produced it.
/// Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    backend: Backend,
    values: Vec<f64>,
}

impl Embedding {
    pub fn new(backend: Backend, values: Vec<f64>) -> Self {
        Self { backend, values }
    }

    /// The zero vector at the backend's native dimension.
    pub fn zeros(backend: Backend) -> Self {
        Self {
            backend,
            values: vec![0.0; backend.dimension()],
        }
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn dimension(&self) -> usize {
        self.values.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|&v| v == 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glove_dim_parses_with_and_without_suffix() {
        assert_eq!("25d".parse::<GloveDim>().unwrap(), GloveDim::D25);
        assert_eq!("50".parse::<GloveDim>().unwrap(), GloveDim::D50);
        assert_eq!(" 100D ".parse::<GloveDim>().unwrap(), GloveDim::D100);
        assert!("200d".parse::<GloveDim>().is_err());
        assert!("".parse::<GloveDim>().is_err());
    }

    #[test]
    fn test_backend_ids_round_trip_through_from_str() {
        for backend in Backend::ALL {
            assert_eq!(backend.id().parse::<Backend>().unwrap(), backend);
        }
    }

    #[test]
    fn test_backend_aliases() {
        assert_eq!("minilm".parse::<Backend>().unwrap(), Backend::MiniLm);
        assert_eq!(
            "glove50d".parse::<Backend>().unwrap(),
            Backend::Glove(GloveDim::D50)
        );
        assert!("word2vec".parse::<Backend>().is_err());
    }

    #[test]
    fn test_backend_serializes_as_id() {
        let json = serde_json::to_string(&Backend::Glove(GloveDim::D50)).unwrap();
        assert_eq!(json, "\"glove_50d\"");
        let back: Backend = serde_json::from_str("\"sentence_transformer_384\"").unwrap();
        assert_eq!(back, Backend::MiniLm);
        assert!(serde_json::from_str::<Backend>("\"bert\"").is_err());
    }

    #[test]
    fn test_backend_dimensions() {
        assert_eq!(Backend::Glove(GloveDim::D25).dimension(), 25);
        assert_eq!(Backend::MiniLm.dimension(), MINILM_DIM);
    }

    #[test]
    fn test_zero_embedding_has_native_dimension() {
        let e = Embedding::zeros(Backend::Glove(GloveDim::D100));
        assert_eq!(e.dimension(), 100);
        assert!(e.is_zero());
    }
}
