use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::embedding::{Backend, GloveDim};

pub const DEFAULT_BIND: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8501;

/// Central configuration loaded from environment variables.
///
/// The .env file is loaded automatically at startup via dotenvy.
#[derive(Debug, Clone)]
pub struct Config {
    /// Root directory for encoder and GloVe artifacts (SEMRANK_MODEL_DIR)
    pub model_dir: PathBuf,
    /// Which GloVe vectors to use by default (SEMRANK_GLOVE_DIM)
    pub glove_dim: GloveDim,
    /// Web server bind address (SEMRANK_BIND)
    pub bind: String,
    /// Web server port (SEMRANK_PORT)
    pub port: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model_dir: crate::download::default_model_dir(),
            glove_dim: GloveDim::default(),
            bind: DEFAULT_BIND.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Every variable has a default; only malformed values are errors.
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup (env in production,
    /// a map in tests).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Self::default();

        let glove_dim = match lookup("SEMRANK_GLOVE_DIM") {
            Some(v) => v.parse().context("Invalid SEMRANK_GLOVE_DIM")?,
            None => defaults.glove_dim,
        };

        let port = match lookup("SEMRANK_PORT") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("Invalid SEMRANK_PORT '{v}'"))?,
            None => defaults.port,
        };

        Ok(Self {
            model_dir: lookup("SEMRANK_MODEL_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_dir),
            glove_dim,
            bind: lookup("SEMRANK_BIND").unwrap_or(defaults.bind),
            port,
        })
    }

    /// The backends shown side by side when none are requested:
    /// the configured GloVe size and the sentence encoder.
    pub fn default_backends(&self) -> Vec<Backend> {
        vec![Backend::Glove(self.glove_dim), Backend::MiniLm]
    }

    /// Check that a backend's artifacts are on disk.
    /// Call this before any operation that will load the backend.
    pub fn require_backend(&self, backend: Backend) -> Result<()> {
        if crate::download::backend_files_present(&self.model_dir, backend) {
            return Ok(());
        }
        match backend {
            Backend::Glove(dim) => anyhow::bail!(
                "GloVe {} vectors not found at {}\n\
                 Download {} and unpack glove.twitter.27B.{}.txt into {}",
                dim.label(),
                crate::download::glove_path(&self.model_dir, dim).display(),
                crate::download::GLOVE_SOURCE_URL,
                dim.label(),
                crate::download::glove_dir(&self.model_dir).display(),
            ),
            Backend::MiniLm => anyhow::bail!(
                "Sentence encoder not found in {}\n\
                 Run `semrank download-model` to download it.",
                crate::download::encoder_model_dir(&self.model_dir).display()
            ),
        }
    }
}
