//! Data sources against a temporary directory and a local data server.

use std::time::Duration;

use axum::extract::Path;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use layer_controller::{DataSource, FsDataSource, HttpDataSource};
use map_common::{FileName, ViewerError};
use test_utils::{sample_geotiff, write_data_dir, JAKARTA, SCENARIO_POINT_GEOJSON};

// ============================================================================
// Filesystem
// ============================================================================

#[tokio::test]
async fn test_fs_listing_is_sorted() {
    let dir = write_data_dir(&[
        ("c_contour.geojson", &b"{}"[..]),
        ("a.tiff", &b"II*\0"[..]),
        ("b_point.geojson", &b"{}"[..]),
    ]);
    let source = FsDataSource::new(dir.path());

    let names = source.list_files().await.unwrap();
    let names: Vec<_> = names.iter().map(FileName::as_str).collect();
    assert_eq!(names, vec!["a.tiff", "b_point.geojson", "c_contour.geojson"]);
}

#[tokio::test]
async fn test_fs_fetch() {
    let dir = write_data_dir(&[("b_point.geojson", SCENARIO_POINT_GEOJSON.as_bytes())]);
    let source = FsDataSource::new(dir.path());

    let body = source.fetch(&FileName::from("b_point.geojson")).await.unwrap();
    assert_eq!(&body[..], SCENARIO_POINT_GEOJSON.as_bytes());

    let err = source.fetch(&FileName::from("nope.tiff")).await.unwrap_err();
    assert!(matches!(err, ViewerError::NotFound(_)));
}

#[tokio::test]
async fn test_fs_missing_directory() {
    let source = FsDataSource::new("/definitely/not/a/data/dir");
    let err = source.list_files().await.unwrap_err();
    assert!(matches!(err, ViewerError::ListingFetch(_)));
}

// ============================================================================
// HTTP
// ============================================================================

async fn serve_file(Path(name): Path<String>) -> impl IntoResponse {
    match name.as_str() {
        "a.tiff" => (StatusCode::OK, sample_geotiff(JAKARTA)).into_response(),
        "b_point.geojson" => (StatusCode::OK, SCENARIO_POINT_GEOJSON).into_response(),
        "boom.tiff" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Start a data server on an ephemeral port and return its base URL.
async fn start_data_server(listing: serde_json::Value) -> String {
    let app = Router::new()
        .route("/data/files", get(move || async move { Json(listing) }))
        .route("/data/:name", get(serve_file));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn test_http_listing_and_fetch() {
    let base = start_data_server(serde_json::json!(["a.tiff", "b_point.geojson", "readme.txt"])).await;
    let source = HttpDataSource::new(base, Duration::from_secs(5)).unwrap();

    let names = source.list_files().await.unwrap();
    assert_eq!(names.len(), 3);
    assert_eq!(names[2].as_str(), "readme.txt");

    let body = source.fetch(&FileName::from("a.tiff")).await.unwrap();
    assert_eq!(&body[..], &sample_geotiff(JAKARTA)[..]);
}

#[tokio::test]
async fn test_http_status_errors() {
    let base = start_data_server(serde_json::json!([])).await;
    let source = HttpDataSource::new(base, Duration::from_secs(5)).unwrap();

    let missing = source.fetch(&FileName::from("missing.tiff")).await.unwrap_err();
    assert!(matches!(missing, ViewerError::NotFound(_)));

    let failed = source.fetch(&FileName::from("boom.tiff")).await.unwrap_err();
    assert!(matches!(failed, ViewerError::ContentFetch { .. }));
}

#[tokio::test]
async fn test_http_listing_must_be_array() {
    let base = start_data_server(serde_json::json!({ "error": "permission denied" })).await;
    let source = HttpDataSource::new(base, Duration::from_secs(5)).unwrap();

    let err = source.list_files().await.unwrap_err();
    assert!(matches!(err, ViewerError::ListingFetch(_)));
}

#[tokio::test]
async fn test_http_unreachable_server() {
    let source = HttpDataSource::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();
    let err = source.list_files().await.unwrap_err();
    assert!(matches!(err, ViewerError::ListingFetch(_)));
}
