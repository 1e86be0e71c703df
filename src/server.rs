use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, info, warn};
use url::Url;

use crate::adapters::{ResolverGateway, SnapInstaClient};
use crate::error::SnapferryError;
use crate::extract::{extract_media, ExtractedMedia};
use crate::media::{build_response, DownloadResponse};
use crate::packed;

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub version: String,
    pub ready: bool,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct DownloadQuery {
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: String,
    pub message: String,
    pub error_code: String,
}

#[derive(Clone)]
pub struct ServerState {
    pub port: u16,
    /// Optional API base override for integration tests.
    ///
    /// When set, resolver calls are routed to this base URL instead of
    /// the production host (https://snapinsta.to).
    pub api_base_override: Option<String>,

    /// Optional HTTP request timeout override (seconds) for resolver
    /// calls.
    ///
    /// This exists primarily for hermetic integration tests to validate
    /// TIMEOUT error mapping without waiting for the production default.
    pub http_timeout_secs_override: Option<u64>,
}

fn error_to_http(e: &SnapferryError) -> (StatusCode, &'static str) {
    match e {
        SnapferryError::InvalidUrl(_) => (StatusCode::BAD_REQUEST, "INVALID_URL"),
        SnapferryError::VerificationRejected(_) => {
            (StatusCode::UNPROCESSABLE_ENTITY, "VERIFICATION_REJECTED")
        }
        SnapferryError::NoMediaFound => (StatusCode::NOT_FOUND, "NO_MEDIA_FOUND"),
        SnapferryError::Timeout(_) => (StatusCode::GATEWAY_TIMEOUT, "TIMEOUT"),
        SnapferryError::DecodeFailed(_) => (StatusCode::BAD_GATEWAY, "DECODE_FAILED"),
        SnapferryError::PayloadMissing => (StatusCode::BAD_GATEWAY, "PAYLOAD_MISSING"),
        SnapferryError::InvalidJson(_) => (StatusCode::BAD_GATEWAY, "PARSE_ERROR"),
        SnapferryError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL"),
        SnapferryError::GatewayUnavailable(_) => (StatusCode::BAD_GATEWAY, "GATEWAY_UNAVAILABLE"),
    }
}

fn to_error_response(e: &SnapferryError) -> (StatusCode, Json<ErrorResponse>) {
    let (status, code) = error_to_http(e);
    (
        status,
        Json(ErrorResponse {
            status: "error".to_string(),
            message: e.to_string(),
            error_code: code.to_string(),
        }),
    )
}

async fn status_handler(State(state): State<Arc<ServerState>>) -> impl IntoResponse {
    Json(StatusResponse {
        status: "ok".to_string(),
        version: SERVER_VERSION.to_string(),
        ready: true,
        port: state.port,
    })
}

/// Decode-and-extract stage. Pure CPU work; runs off the async
/// scheduler so a pathological payload cannot stall other requests.
fn decode_and_extract(
    payload: String,
) -> Result<(Vec<ExtractedMedia>, Option<String>), SnapferryError> {
    if payload.trim().is_empty() {
        return Err(SnapferryError::NoMediaFound);
    }

    let markup = if packed::is_packed(&payload) {
        match packed::deobfuscate(&payload) {
            Some(decoded) if decoded != payload => decoded,
            // Flagged as packed but the header never matched (or the
            // parameters were unusable): total decode failure.
            _ => {
                return Err(SnapferryError::DecodeFailed(
                    "packer header not recognized".to_string(),
                ))
            }
        }
    } else {
        payload
    };

    Ok(extract_media(&markup))
}

async fn download_handler(
    State(state): State<Arc<ServerState>>,
    Query(query): Query<DownloadQuery>,
) -> Result<Json<DownloadResponse>, (StatusCode, Json<ErrorResponse>)> {
    let requested_url = query.url.trim().to_string();

    let parsed = Url::parse(&requested_url)
        .map_err(|e| to_error_response(&SnapferryError::from(e)))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(to_error_response(&SnapferryError::InvalidUrl(
            requested_url.clone(),
        )));
    }

    let api_base = state.api_base_override.as_deref();
    let timeout_secs = state.http_timeout_secs_override.unwrap_or(15);

    let client = SnapInstaClient::new_with_timeout(api_base, timeout_secs)
        .map_err(|e| to_error_response(&e))?;

    let payload = client.fetch_payload(&requested_url).await.map_err(|e| {
        warn!(error = %e, url = %requested_url, "resolver call failed");
        to_error_response(&e)
    })?;

    let packed_payload = packed::is_packed(&payload);
    debug!(payload_len = payload.len(), packed = packed_payload, "payload received");

    let (items, markup_username) = tokio::task::spawn_blocking(move || decode_and_extract(payload))
        .await
        .map_err(|e| to_error_response(&SnapferryError::Internal(e.to_string())))?
        .map_err(|e| {
            warn!(error = %e, url = %requested_url, "decode/extract failed");
            to_error_response(&e)
        })?;

    info!(media_count = items.len(), url = %requested_url, "extraction complete");

    Ok(Json(build_response(items, markup_username, &requested_url)))
}

pub fn create_router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/download", get(download_handler))
        .with_state(state)
        .layer(cors)
}

pub async fn start_server(host: &str, port: u16) -> Result<(), std::io::Error> {
    let state = Arc::new(ServerState {
        port,
        api_base_override: None,
        http_timeout_secs_override: None,
    });
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    println!("snapferry HTTP server listening on {}:{}", host, port);
    axum::serve(listener, app).await
}
