//! HTTP API for the viewer.
//!
//! Provides endpoints for:
//! - Reading and changing the three layer selections
//! - Resetting all layers and refreshing the file listing
//! - The current scene (layers and viewport) and Prometheus metrics

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use layer_controller::{LayerController, LoadOutcome, Occupant, SceneMap, SelectionState};
use map_common::{CategorizedFiles, FileName, LayerSlot, ViewerError};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Mode;

pub type Controller = LayerController<SceneMap, SelectionState>;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SelectRequest {
    /// File to show, or null/empty for "none"
    #[serde(default)]
    pub file: Option<FileName>,
}

#[derive(Debug, Serialize)]
pub struct SelectionsResponse {
    pub mode: Mode,
    pub listing: CategorizedFiles,
    pub selections: SelectionState,
}

#[derive(Debug, Serialize)]
pub struct LoadResponse {
    pub slot: LayerSlot,
    pub outcome: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub occupants: Vec<Occupant>,
}

#[derive(Debug, Serialize)]
pub struct ResetResponse {
    pub removed: usize,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

// ============================================================================
// Shared State
// ============================================================================

pub struct ServerState {
    pub controller: Controller,
    pub mode: Mode,
    pub metrics: Option<PrometheusHandle>,
}

// ============================================================================
// Router
// ============================================================================

/// Create the viewer API router.
pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .route("/api/selections", get(selections_handler))
        .route("/api/selections/:slot", put(select_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/refresh", post(refresh_handler))
        .route("/api/scene", get(scene_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(Extension(state))
}

fn error_response(status: StatusCode, error: impl ToString) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn viewer_error_response(err: &ViewerError) -> Response {
    let status =
        StatusCode::from_u16(err.http_status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    error_response(status, err)
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "viewer",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /metrics - Prometheus text format
async fn metrics_handler(Extension(state): Extension<Arc<ServerState>>) -> Response {
    match &state.metrics {
        Some(handle) => handle.render().into_response(),
        None => error_response(StatusCode::NOT_FOUND, "metrics exporter not installed"),
    }
}

/// GET /api/selections - Options and current choice per slot
async fn selections_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let controller = &state.controller;
    Json(SelectionsResponse {
        mode: state.mode,
        listing: controller.listing().await,
        selections: controller.with_panel(|panel| panel.clone()).await,
    })
}

/// PUT /api/selections/:slot - Choose a file (or none) and load it
async fn select_handler(
    Extension(state): Extension<Arc<ServerState>>,
    Path(slot): Path<String>,
    Json(request): Json<SelectRequest>,
) -> Response {
    let slot: LayerSlot = match slot.parse() {
        Ok(slot) => slot,
        Err(e) => return viewer_error_response(&e),
    };

    let controller = &state.controller;
    let Some(outcome) = controller.select_and_load(slot, request.file.clone()).await else {
        let file = request.file.map(|f| f.to_string()).unwrap_or_default();
        return error_response(
            StatusCode::NOT_FOUND,
            format!("'{}' is not offered for the {} selection", file, slot),
        );
    };

    let (status, error) = match &outcome {
        LoadOutcome::Failed(e) => (
            StatusCode::from_u16(e.http_status_code()).unwrap_or(StatusCode::BAD_GATEWAY),
            Some(e.to_string()),
        ),
        _ => (StatusCode::OK, None),
    };

    let response = LoadResponse {
        slot,
        outcome: outcome.label(),
        error,
        occupants: controller.occupants(slot).await,
    };
    (status, Json(response)).into_response()
}

/// POST /api/reset - Remove every layer and reset the selections
async fn reset_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let removed = state.controller.reset_all().await;
    Json(ResetResponse { removed })
}

/// POST /api/refresh - Re-fetch the file listing
async fn refresh_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    let files = state.controller.refresh_listing().await;
    info!(selectable = files.selectable_count(), "Listing refreshed");
    Json(files)
}

/// GET /api/scene - Layers on the map and the viewport
async fn scene_handler(Extension(state): Extension<Arc<ServerState>>) -> impl IntoResponse {
    Json(state.controller.with_map(|map| map.clone()).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use layer_controller::MemoryDataSource;
    use serde_json::Value;
    use test_utils::{sample_geotiff, JAKARTA, SCENARIO_POINT_GEOJSON};
    use tower::ServiceExt;

    async fn test_router() -> Router {
        let source = MemoryDataSource::new()
            .with_file("a.tiff", sample_geotiff(JAKARTA))
            .with_file("b_point.geojson", SCENARIO_POINT_GEOJSON)
            .with_file("broken.tiff", "nope")
            .with_file("readme.txt", "hello");
        let controller = LayerController::new(
            Arc::new(source),
            SceneMap::default(),
            SelectionState::new(),
        );
        controller.refresh_listing().await;

        create_router(Arc::new(ServerState {
            controller,
            mode: Mode::Interactive,
            metrics: None,
        }))
    }

    async fn send(router: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = router
            .clone()
            .oneshot(request.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_health() {
        let router = test_router().await;
        let (status, body) = send(&router, "GET", "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["service"], "viewer");
    }

    #[tokio::test]
    async fn test_selections_listing() {
        let router = test_router().await;
        let (status, body) = send(&router, "GET", "/api/selections", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["mode"], "interactive");
        assert_eq!(body["selections"]["raster"]["options"], serde_json::json!(["a.tiff", "broken.tiff"]));
        assert_eq!(body["selections"]["point"]["options"], serde_json::json!(["b_point.geojson"]));
        assert_eq!(body["selections"]["raster"]["selected"], Value::Null);
        assert_eq!(body["listing"]["ignored"], serde_json::json!(["readme.txt"]));
    }

    #[tokio::test]
    async fn test_select_loads_layer() {
        let router = test_router().await;
        let (status, body) = send(
            &router,
            "PUT",
            "/api/selections/point",
            Some(serde_json::json!({ "file": "b_point.geojson" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "installed");
        assert_eq!(body["occupants"].as_array().unwrap().len(), 1);

        let (_, scene) = send(&router, "GET", "/api/scene", None).await;
        assert_eq!(scene["layers"][0]["style"]["popups"][0], "Value: 42");
        assert_eq!(scene["viewport"]["type"], "bounds");
    }

    #[tokio::test]
    async fn test_select_none_clears() {
        let router = test_router().await;
        send(&router, "PUT", "/api/selections/raster", Some(serde_json::json!({ "file": "a.tiff" }))).await;
        let (status, body) = send(
            &router,
            "PUT",
            "/api/selections/raster",
            Some(serde_json::json!({ "file": null })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["outcome"], "cleared");
        assert!(body["occupants"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_load_reports_error() {
        let router = test_router().await;
        send(&router, "PUT", "/api/selections/raster", Some(serde_json::json!({ "file": "a.tiff" }))).await;
        let (status, body) = send(
            &router,
            "PUT",
            "/api/selections/raster",
            Some(serde_json::json!({ "file": "broken.tiff" })),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["outcome"], "decode_error");
        assert_eq!(body["occupants"][0]["file"], "a.tiff");
    }

    #[tokio::test]
    async fn test_unknown_slot_and_file() {
        let router = test_router().await;
        let (status, _) = send(
            &router,
            "PUT",
            "/api/selections/polygon",
            Some(serde_json::json!({ "file": "a.tiff" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(
            &router,
            "PUT",
            "/api/selections/raster",
            Some(serde_json::json!({ "file": "readme.txt" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset() {
        let router = test_router().await;
        send(&router, "PUT", "/api/selections/raster", Some(serde_json::json!({ "file": "a.tiff" }))).await;

        let (_, body) = send(&router, "POST", "/api/reset", None).await;
        assert_eq!(body["removed"], 1);
        let (_, body) = send(&router, "POST", "/api/reset", None).await;
        assert_eq!(body["removed"], 0);

        let (_, scene) = send(&router, "GET", "/api/scene", None).await;
        assert!(scene["layers"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_metrics_without_exporter() {
        let router = test_router().await;
        let (status, _) = send(&router, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
