use std::cmp::Ordering;

use serde::Serialize;
use thiserror::Error;

use super::similarity::cosine_similarity;
use crate::categories::CategorySet;
use crate::embedding::{Backend, Embedding, TextEmbedder};

/// Comparing embeddings that don't belong together. Always a
/// configuration bug, never recovered from.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RankError {
    #[error("embedding for '{label}' has {found} dimensions, query has {expected}")]
    DimensionMismatch {
        label: String,
        expected: usize,
        found: usize,
    },
    #[error("embedding for '{label}' came from {found}, query came from {expected}")]
    BackendMismatch {
        label: String,
        expected: Backend,
        found: Backend,
    },
}

/// One category and its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Ranked {
    pub label: String,
    pub score: f64,
}

/// Categories sorted by descending similarity for a single backend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankingResult {
    pub backend: Backend,
    /// Length of the query vector every entry was compared at.
    pub dimension: usize,
    pub entries: Vec<Ranked>,
}

impl RankingResult {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The best-scoring category, if any.
    pub fn top(&self) -> Option<&Ranked> {
        self.entries.first()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|r| r.label.as_str())
    }
}

/// Score every labeled embedding against `query` and sort descending.
///
/// Every entry must share the query's backend and dimension; the first
/// one that doesn't aborts the whole ranking. An empty input yields an
/// empty ranking.
pub fn rank(
    query: &Embedding,
    labeled: &[(String, Embedding)],
) -> Result<RankingResult, RankError> {
    let mut entries = Vec::with_capacity(labeled.len());

    for (label, embedding) in labeled {
        if embedding.backend() != query.backend() {
            return Err(RankError::BackendMismatch {
                label: label.clone(),
                expected: query.backend(),
                found: embedding.backend(),
            });
        }

        let score = cosine_similarity(query.values(), embedding.values()).map_err(|e| {
            RankError::DimensionMismatch {
                label: label.clone(),
                expected: e.left,
                found: e.right,
            }
        })?;

        entries.push(Ranked {
            label: label.clone(),
            score,
        });
    }

    // sort_by is stable: equal scores keep input order. partial_cmp (not
    // total_cmp) so that 0.0 and -0.0 count as a tie.
    entries.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    Ok(RankingResult {
        backend: query.backend(),
        dimension: query.dimension(),
        entries,
    })
}

/// Embed `text` and every category with `embedder`, then rank.
pub fn rank_categories(
    embedder: &dyn TextEmbedder,
    text: &str,
    categories: &CategorySet,
) -> Result<RankingResult, RankError> {
    let query = embedder.embed(text);
    let labels: Vec<&str> = categories.iter().collect();
    let labeled: Vec<(String, Embedding)> = categories
        .labels()
        .iter()
        .cloned()
        .zip(embedder.embed_batch(&labels))
        .collect();

    rank(&query, &labeled)
}
