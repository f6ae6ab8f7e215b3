// POST /api/rank — rank categories against a sentence.
//
// Body: {"text": "...", "categories": "Flowers Colors Cars", "backends": [...]}
// `backends` is optional; without it the configured GloVe size and the
// sentence encoder are compared side by side.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::categories::CategorySet;
use crate::embedding::Backend;
use crate::output::chart::{pie_slices, DisplayMode, PieSlice};
use crate::pipeline;
use crate::ranking::{RankError, Ranked, RankingResult};
use crate::web::{api_error, AppState};

#[derive(Debug, Deserialize)]
pub struct RankRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub categories: String,
    #[serde(default)]
    pub backends: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub categories: CategorySet,
    pub mode: DisplayMode,
    pub rankings: Vec<BackendRanking>,
}

#[derive(Debug, Serialize)]
pub struct BackendRanking {
    pub backend: Backend,
    pub dimension: usize,
    pub results: Vec<Ranked>,
    pub slices: Vec<PieSlice>,
}

impl From<RankingResult> for BackendRanking {
    fn from(ranking: RankingResult) -> Self {
        let slices = pie_slices(&ranking);
        Self {
            backend: ranking.backend,
            dimension: ranking.dimension,
            results: ranking.entries,
            slices,
        }
    }
}

pub async fn rank(State(state): State<AppState>, Json(req): Json<RankRequest>) -> Response {
    let backends = match req.backends {
        Some(ids) if !ids.is_empty() => {
            match ids.iter().map(|id| id.parse()).collect::<anyhow::Result<Vec<Backend>>>() {
                Ok(b) => b,
                Err(e) => return api_error(StatusCode::BAD_REQUEST, &e.to_string()),
            }
        }
        _ => state.config.default_backends(),
    };

    for &backend in &backends {
        if !state.registry.is_available(backend) {
            let message = match state.config.require_backend(backend) {
                Err(e) => e.to_string(),
                Ok(()) => format!("Backend {backend} is not available"),
            };
            return api_error(StatusCode::SERVICE_UNAVAILABLE, &message);
        }
    }

    let categories = CategorySet::parse(&req.categories);

    match pipeline::compare(&state.registry, &req.text, &categories, &backends).await {
        Ok(rankings) => Json(RankResponse {
            categories,
            mode: DisplayMode::for_rankings(rankings.len()),
            rankings: rankings.into_iter().map(BackendRanking::from).collect(),
        })
        .into_response(),
        Err(e) if e.downcast_ref::<RankError>().is_some() => {
            tracing::error!(error = %e, "Embedding mismatch while ranking");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string())
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to load model for ranking");
            api_error(StatusCode::SERVICE_UNAVAILABLE, &format!("{e:#}"))
        }
    }
}
