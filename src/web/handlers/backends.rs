// GET /api/backends — every backend, its dimension, and whether it can run.
//
// The UI uses this to grey out tabs whose artifacts haven't been fetched.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;

use crate::embedding::Backend;
use crate::web::AppState;

pub async fn list_backends(State(state): State<AppState>) -> impl IntoResponse {
    let backends: Vec<_> = Backend::ALL
        .iter()
        .map(|&b| {
            serde_json::json!({
                "id": b,
                "dimension": b.dimension(),
                "available": state.registry.is_available(b),
                "loaded": state.registry.is_loaded(b),
            })
        })
        .collect();

    Json(serde_json::json!({
        "backends": backends,
        "default": state.config.default_backends(),
    }))
}
