// Load-once model handles, one per backend.
//
// Every backend gets its own async OnceCell. The first request for a
// backend loads its artifacts on a blocking thread; concurrent first
// requests wait on that same initialisation instead of loading twice.
// Once set, the handle is shared read-only for the registry's lifetime.
//
// The registry is an ordinary value owned by whoever needs it (the web
// server's AppState, the CLI command). Tests get isolation by building
// their own registry, optionally pre-seeded with stub embedders.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::OnceCell;
use tracing::info;

use super::backend::Backend;
use super::encoder::SentenceEncoder;
use super::glove::StaticVectors;
use super::traits::TextEmbedder;
use crate::download;

type Handle = Arc<dyn TextEmbedder>;

pub struct ModelRegistry {
    model_dir: PathBuf,
    cells: HashMap<Backend, OnceCell<Handle>>,
}

impl ModelRegistry {
    /// An empty registry that loads artifacts from `model_dir` on demand.
    pub fn new(model_dir: impl Into<PathBuf>) -> Self {
        Self {
            model_dir: model_dir.into(),
            cells: Backend::ALL
                .into_iter()
                .map(|b| (b, OnceCell::new()))
                .collect(),
        }
    }

    /// Pre-seed the handle for `embedder.backend()`. Replaces anything
    /// already loaded for that backend.
    pub fn with_embedder(mut self, embedder: Handle) -> Self {
        self.cells
            .insert(embedder.backend(), OnceCell::new_with(Some(embedder)));
        self
    }

    /// True when the backend is already loaded or its artifacts are on disk.
    pub fn is_available(&self, backend: Backend) -> bool {
        self.is_loaded(backend) || download::backend_files_present(&self.model_dir, backend)
    }

    pub fn is_loaded(&self, backend: Backend) -> bool {
        self.cells
            .get(&backend)
            .is_some_and(|cell| cell.initialized())
    }

    /// Shared embedder for `backend`, loading it on first use.
    ///
    /// A failed load leaves the cell empty, so a later call retries
    /// (for example after `semrank download-model` has run).
    pub async fn get(&self, backend: Backend) -> Result<Handle> {
        let cell = self
            .cells
            .get(&backend)
            .with_context(|| format!("No model slot for backend {backend}"))?;

        let handle = cell
            .get_or_try_init(|| async move {
                let model_dir = self.model_dir.clone();
                let handle = tokio::task::spawn_blocking(move || load(&model_dir, backend))
                    .await
                    .context("Model loading task panicked")??;
                info!(backend = %backend, dim = handle.dimension(), "Model loaded");
                Ok::<_, anyhow::Error>(handle)
            })
            .await?;

        Ok(Arc::clone(handle))
    }
}

/// Load the artifacts for one backend from disk.
fn load(model_dir: &Path, backend: Backend) -> Result<Handle> {
    match backend {
        Backend::Glove(dim) => {
            let path = download::glove_path(model_dir, dim);
            Ok(Arc::new(StaticVectors::load(&path, dim)?))
        }
        Backend::MiniLm => {
            let dir = download::encoder_model_dir(model_dir);
            Ok(Arc::new(SentenceEncoder::load(&dir)?))
        }
    }
}
