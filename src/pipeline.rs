// Multi-backend comparison: one ranking per requested backend.
//
// Each backend's handle comes from the registry (loaded once). The
// embedding work is CPU-bound, so it runs on spawn_blocking to keep the
// async runtime responsive for the web server.

use std::collections::HashSet;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::categories::CategorySet;
use crate::embedding::{Backend, ModelRegistry};
use crate::ranking::{rank_categories, RankingResult};

/// Rank `categories` against `text` once per backend, in `backends` order.
/// A backend listed twice is ranked once, at its first position.
///
/// A backend whose artifacts can't be loaded fails the whole comparison;
/// the caller decides whether to retry with fewer backends.
pub async fn compare(
    registry: &ModelRegistry,
    text: &str,
    categories: &CategorySet,
    backends: &[Backend],
) -> Result<Vec<RankingResult>> {
    let text: Arc<str> = Arc::from(text);
    let categories = Arc::new(categories.clone());
    let backends = unique_backends(backends);
    let mut results = Vec::with_capacity(backends.len());

    for backend in backends {
        let embedder = registry.get(backend).await?;
        let text = Arc::clone(&text);
        let categories = Arc::clone(&categories);

        let ranking = tokio::task::spawn_blocking(move || {
            rank_categories(embedder.as_ref(), &text, &categories)
        })
        .await
        .context("Ranking task panicked")??;

        debug!(
            backend = %backend,
            categories = ranking.len(),
            top = ranking.top().map(|r| r.label.as_str()).unwrap_or("-"),
            "Ranked categories"
        );
        results.push(ranking);
    }

    Ok(results)
}

/// Drop repeated backends, keeping first occurrences in order.
pub fn unique_backends(backends: &[Backend]) -> Vec<Backend> {
    let mut seen = HashSet::new();
    backends.iter().copied().filter(|b| seen.insert(*b)).collect()
}
