// Web server — Axum backend for the ranking demo.
//
// The single-page UI is embedded at compile time via include_dir!.
// /api/* routes serve JSON; all other paths serve the UI's index.html.

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use include_dir::{include_dir, Dir};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::embedding::ModelRegistry;

pub mod handlers;

static ASSETS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/web");

/// Shared application state threaded through all Axum handlers.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ModelRegistry>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(config: Config, registry: ModelRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
            config: Arc::new(config),
        }
    }
}

/// Start the Axum web server and block until it exits.
pub async fn run_server(state: AppState) -> Result<()> {
    let addr = format!("{}:{}", state.config.bind, state.config.port);
    let app = build_router(state);

    info!("semrank demo listening on http://{addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/backends", get(handlers::backends::list_backends))
        .route("/api/rank", post(handlers::rank::rank))
        .fallback(serve_ui)
        .layer(
            CorsLayer::new()
                .allow_origin(tower_http::cors::Any)
                .allow_methods([
                    axum::http::Method::GET,
                    axum::http::Method::POST,
                    axum::http::Method::OPTIONS,
                ])
                .allow_headers([header::CONTENT_TYPE]),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (
        StatusCode::OK,
        axum::Json(serde_json::json!({ "status": "ok" })),
    )
}

/// Serve an embedded asset, falling back to index.html.
async fn serve_ui(uri: Uri) -> impl IntoResponse {
    let path = uri.path().trim_start_matches('/');

    if let Some(file) = ASSETS.get_file(path) {
        return asset_response(file.contents(), path);
    }

    match ASSETS.get_file("index.html") {
        Some(index) => asset_response(index.contents(), "index.html"),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            [(header::CONTENT_TYPE, "text/plain")],
            Body::from("Web assets not found"),
        )
            .into_response(),
    }
}

fn asset_response(contents: &'static [u8], path: &str) -> Response {
    let mime = mime_type(path);
    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, HeaderValue::from_static(mime))
        .body(Body::from(contents))
        .unwrap_or_else(|_| StatusCode::INTERNAL_SERVER_ERROR.into_response())
}

fn mime_type(path: &str) -> &'static str {
    let ext = path.rsplit('.').next().unwrap_or("");
    match ext {
        "html" => "text/html; charset=utf-8",
        "js" | "mjs" => "application/javascript",
        "css" => "text/css",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "json" => "application/json",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}

/// Typed JSON error response helper.
pub fn api_error(status: StatusCode, message: &str) -> Response {
    (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::embedding::{Backend, Embedding, GloveDim, TextEmbedder};

    /// Maps a handful of words onto 2-d axes: "rose"/"flowers" on x,
    /// "truck"/"cars" on y. Everything else is the zero vector.
    struct Axes(Backend);

    impl TextEmbedder for Axes {
        fn backend(&self) -> Backend {
            self.0
        }

        fn embed(&self, text: &str) -> Embedding {
            let mut v = [0.0, 0.0];
            for word in text.split_whitespace() {
                match word.to_lowercase().as_str() {
                    "rose" | "roses" | "flowers" => v[0] += 1.0,
                    "truck" | "trucks" | "cars" => v[1] += 1.0,
                    _ => {}
                }
            }
            Embedding::new(self.0, v.to_vec())
        }
    }

    fn state(dir: &std::path::Path) -> AppState {
        let config = Config {
            model_dir: dir.to_path_buf(),
            ..Config::default()
        };
        let registry = ModelRegistry::new(dir)
            .with_embedder(Arc::new(Axes(Backend::Glove(GloveDim::D50))))
            .with_embedder(Arc::new(Axes(Backend::MiniLm)));
        AppState::new(config, registry)
    }

    async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
        let response = app
            .oneshot(
                Request::post(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(state(dir.path()))
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_rank_defaults_to_tabbed_comparison() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({
                "text": "Roses are red",
                "categories": "Cars Flowers Weather",
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK, "body: {body}");
        assert_eq!(body["mode"], "tabbed");
        assert_eq!(body["categories"], serde_json::json!(["Cars", "Flowers", "Weather"]));
        let rankings = body["rankings"].as_array().unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0]["backend"], "glove_50d");
        // Reported from the vectors themselves, not the backend's nominal size.
        assert_eq!(rankings[0]["dimension"], 2);
        assert_eq!(rankings[1]["backend"], "sentence_transformer_384");
        assert_eq!(rankings[0]["results"][0]["label"], "Flowers");
        assert_eq!(rankings[0]["results"][0]["score"], 1.0);
        assert_eq!(rankings[0]["slices"][0]["explode"], 0.2);
    }

    #[tokio::test]
    async fn test_rank_single_backend() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({
                "text": "trucks",
                "categories": "Flowers Cars",
                "backends": ["sentence_transformer_384"],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "single");
        assert_eq!(body["rankings"][0]["results"][0]["label"], "Cars");
    }

    #[tokio::test]
    async fn test_rank_repeated_backend_gives_one_tab() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({
                "text": "roses",
                "categories": "Flowers Cars",
                "backends": ["glove_50d", "sentence_transformer_384", "glove_50d"],
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rankings = body["rankings"].as_array().unwrap();
        assert_eq!(rankings.len(), 2);
        assert_eq!(rankings[0]["backend"], "glove_50d");
        assert_eq!(rankings[1]["backend"], "sentence_transformer_384");
        assert_eq!(body["mode"], "tabbed");
    }

    #[tokio::test]
    async fn test_rank_empty_categories_is_empty_ranking() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({ "text": "roses", "categories": "  " , "backends": ["glove_50d"] }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert!(body["rankings"][0]["results"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rank_unknown_backend_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({ "text": "x", "categories": "a", "backends": ["word2vec"] }),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("word2vec"));
    }

    #[tokio::test]
    async fn test_rank_missing_artifacts_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = post_json(
            build_router(state(dir.path())),
            "/api/rank",
            serde_json::json!({ "text": "x", "categories": "a", "backends": ["glove_25d"] }),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["error"].as_str().unwrap().contains("glove.twitter.27B.25d.txt"));
    }

    #[tokio::test]
    async fn test_backends_lists_availability() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(state(dir.path()))
            .oneshot(Request::get("/api/backends").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        let backends = body["backends"].as_array().unwrap();
        assert_eq!(backends.len(), Backend::ALL.len());
        let glove_25 = backends.iter().find(|b| b["id"] == "glove_25d").unwrap();
        assert_eq!(glove_25["available"], false);
        let glove_50 = backends.iter().find(|b| b["id"] == "glove_50d").unwrap();
        assert_eq!(glove_50["available"], true);
        assert_eq!(body["default"], serde_json::json!(["glove_50d", "sentence_transformer_384"]));
    }

    #[tokio::test]
    async fn test_unknown_path_serves_index() {
        let dir = tempfile::tempdir().unwrap();
        let response = build_router(state(dir.path()))
            .oneshot(Request::get("/anything").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "text/html; charset=utf-8"
        );
    }

    #[test]
    fn test_mime_types() {
        assert_eq!(mime_type("app.js"), "application/javascript");
        assert_eq!(mime_type("index.html"), "text/html; charset=utf-8");
        assert_eq!(mime_type("blob"), "application/octet-stream");
    }
}
