//! HTTP endpoints.
//!
//! Upload route plus read endpoints over the stored analytics and
//! call-quality records. All validation of uploaded files happens
//! here, before the engine is invoked; the engine itself is total.

use axum::extract::{DefaultBodyLimit, Multipart, Path, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::analysis;
use crate::error::ApiError;
use crate::models::{StoredAnalytics, StoredCallQuality, VconDocument, VconFileRecord};
use crate::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.server.max_upload_bytes;

    Router::new()
        .route("/api/upload", post(upload_vcon))
        .route("/api/files", get(all_files))
        .route("/api/files/:id", get(file_by_id))
        .route("/api/analytics", get(all_analytics))
        .route("/api/analytics/latest", get(latest_analytics))
        .route("/api/analytics/:file_id", get(analytics_by_file))
        .route("/api/call-quality/latest", get(latest_call_qualities))
        .route("/api/call-quality/:file_id", get(call_qualities_by_file))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Response for a successful upload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    message: String,
    file_id: i64,
}

/// Accept a vCon file, run the engine, persist both outputs.
///
/// The multipart field must be named "file" and carry JSON (by
/// filename extension or content type). Malformed JSON, a missing
/// top-level `vcon`/`dialog` pair, and oversized bodies are rejected
/// with distinct messages before any state is written.
async fn upload_vcon(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let limit = state.config.server.max_upload_bytes;

    // Reject declared-oversized bodies before reading them.
    if let Some(length) = declared_content_length(&headers) {
        if length > limit as u64 {
            return Err(ApiError::TooLarge(limit));
        }
    }

    let mut upload = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| ApiError::UploadRead)?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.json").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|_| ApiError::UploadRead)?;
        upload = Some((filename, content_type, bytes));
        break;
    }
    let (filename, content_type, bytes) = upload.ok_or(ApiError::MissingFile)?;

    if !filename.ends_with(".json") && content_type.as_deref() != Some("application/json") {
        return Err(ApiError::NotJson);
    }
    if bytes.len() > limit {
        return Err(ApiError::TooLarge(limit));
    }

    let data: serde_json::Value =
        serde_json::from_slice(&bytes).map_err(|_| ApiError::MalformedJson)?;
    if data.get("vcon").is_none() || data.get("dialog").is_none() {
        return Err(ApiError::InvalidVcon);
    }
    let document: VconDocument =
        serde_json::from_value(data.clone()).map_err(|_| ApiError::InvalidVcon)?;

    let file = state.storage.create_vcon_file(filename, data);

    let mut rng = state.engine_rng(file.id);
    let (analytics, qualities) = analysis::analyze(&document, file.id, &mut rng);

    let call_count = qualities.len();
    state.storage.create_analytics(analytics);
    for record in qualities {
        state.storage.create_call_quality(record);
    }
    state.storage.mark_processed(file.id);

    info!(
        file_id = file.id,
        calls = call_count,
        filename = %file.filename,
        "processed vCon upload"
    );

    Ok(Json(UploadResponse {
        message: "File uploaded and processed successfully".to_string(),
        file_id: file.id,
    }))
}

async fn all_files(State(state): State<AppState>) -> Json<Vec<VconFileRecord>> {
    Json(state.storage.all_vcon_files())
}

async fn file_by_id(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<VconFileRecord>, ApiError> {
    state
        .storage
        .vcon_file(id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("File not found".to_string()))
}

async fn all_analytics(State(state): State<AppState>) -> Json<Vec<StoredAnalytics>> {
    Json(state.storage.all_analytics())
}

async fn latest_analytics(
    State(state): State<AppState>,
) -> Result<Json<StoredAnalytics>, ApiError> {
    state
        .storage
        .latest_analytics()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No analytics data found".to_string()))
}

async fn analytics_by_file(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> Result<Json<StoredAnalytics>, ApiError> {
    state
        .storage
        .analytics_by_file(file_id)
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Analytics not found for this file".to_string()))
}

/// Call-quality records of the most recently uploaded file.
async fn latest_call_qualities(
    State(state): State<AppState>,
) -> Result<Json<Vec<StoredCallQuality>>, ApiError> {
    let all = state.storage.all_call_qualities();
    let latest_file_id = all
        .iter()
        .map(|q| q.record.file_id)
        .max()
        .ok_or_else(|| ApiError::NotFound("No call quality data found".to_string()))?;

    Ok(Json(state.storage.call_qualities_by_file(latest_file_id)))
}

async fn call_qualities_by_file(
    State(state): State<AppState>,
    Path(file_id): Path<i64>,
) -> Json<Vec<StoredCallQuality>> {
    Json(state.storage.call_qualities_by_file(file_id))
}

async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .parse::<u64>()
        .ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    const SAMPLE_VCON: &str = include_str!("../../fixtures/sample_vcon.json");
    const BOUNDARY: &str = "callsight-test-boundary";

    fn test_router() -> Router {
        let mut config = Config::default();
        config.engine.seed = Some(42);
        create_router(AppState::new(config))
    }

    fn multipart_request(filename: &str, content_type: &str, payload: &str) -> Request<Body> {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n\
             Content-Type: {content_type}\r\n\r\n\
             {payload}\r\n\
             --{BOUNDARY}--\r\n"
        );
        Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_check() {
        let response = test_router()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "healthy");
    }

    #[tokio::test]
    async fn test_upload_and_read_back() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(multipart_request("calls.json", "application/json", SAMPLE_VCON))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["fileId"], 1);

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/analytics/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let analytics = body_json(response).await;
        assert_eq!(analytics["fileId"], 1);
        assert_eq!(analytics["totalCalls"], 6);

        let response = router
            .clone()
            .oneshot(
                Request::get("/api/call-quality/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let qualities = body_json(response).await;
        assert_eq!(qualities.as_array().unwrap().len(), 6);
        assert_eq!(qualities[0]["callIndex"], 0);

        let response = router
            .oneshot(
                Request::get("/api/call-quality/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_uploaded_file_is_listed_and_marked_processed() {
        let router = test_router();

        let response = router
            .clone()
            .oneshot(multipart_request("calls.json", "application/json", SAMPLE_VCON))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = router
            .clone()
            .oneshot(Request::get("/api/files").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let files = body_json(response).await;
        assert_eq!(files.as_array().unwrap().len(), 1);
        assert_eq!(files[0]["filename"], "calls.json");
        assert_eq!(files[0]["processed"], true);

        let response = router
            .oneshot(Request::get("/api/files/99").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_upload_rejects_malformed_json() {
        let response = test_router()
            .oneshot(multipart_request("calls.json", "application/json", "{ not json"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid JSON file");
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_vcon_fields() {
        let response = test_router()
            .oneshot(multipart_request(
                "calls.json",
                "application/json",
                r#"{ "vcon": "0.0.1" }"#,
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Invalid vCon file structure");
    }

    #[tokio::test]
    async fn test_upload_rejects_non_json_file() {
        let response = test_router()
            .oneshot(multipart_request("calls.csv", "text/csv", "a,b,c"))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "Only JSON files are allowed");
    }

    #[tokio::test]
    async fn test_upload_rejects_missing_file_field() {
        let body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"other\"\r\n\r\n\
             hello\r\n\
             --{BOUNDARY}--\r\n"
        );
        let request = Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["message"], "No file uploaded");
    }

    #[tokio::test]
    async fn test_upload_rejects_declared_oversize() {
        let request = Request::post("/api/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::CONTENT_LENGTH, (100 * 1024 * 1024).to_string())
            .body(Body::empty())
            .unwrap();

        let response = test_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_latest_analytics_empty_store() {
        let response = test_router()
            .oneshot(
                Request::get("/api/analytics/latest")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["message"], "No analytics data found");
    }

    #[tokio::test]
    async fn test_call_qualities_unknown_file_is_empty_list() {
        let response = test_router()
            .oneshot(
                Request::get("/api/call-quality/42")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body, serde_json::json!([]));
    }
}
