//! Axum server exposing the normalizer over HTTP and WebSocket.

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use biochem_core::{
    corpus::demo_texts, CustomMappingRequest, MappingHazard, PipelineEvent, Preprocessor, Preview,
    SynthesisRequest, TableError, VoiceProfile,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ADDR: &str = "0.0.0.0:3000";

/// Shared application state. Requests only read the preprocessor; custom
/// mappings go to a per-request clone.
struct AppState {
    preprocessor: Preprocessor,
}

#[derive(Deserialize)]
struct NormalizeRequest {
    text: String,
    #[serde(default)]
    custom_mappings: Vec<CustomMappingRequest>,
}

#[derive(Serialize)]
struct NormalizeResponse {
    text: String,
    changed: bool,
    hazards: Vec<MappingHazard>,
}

#[derive(Deserialize)]
struct PreviewRequest {
    text: String,
    #[serde(default)]
    custom_mappings: Vec<CustomMappingRequest>,
}

#[derive(Deserialize)]
struct PrepareRequest {
    text: String,
    #[serde(default)]
    voice: VoiceProfile,
    #[serde(default = "default_preprocess")]
    preprocess: bool,
}

fn default_preprocess() -> bool {
    true
}

/// Error body returned by the JSON endpoints.
enum ApiError {
    EmptyText,
    InvalidMapping(TableError),
}

impl ApiError {
    fn message(&self) -> String {
        match self {
            ApiError::EmptyText => "empty text".to_string(),
            ApiError::InvalidMapping(err) => err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::EmptyText => StatusCode::BAD_REQUEST,
            ApiError::InvalidMapping(err) => {
                warn!(error = %err, "rejected custom mappings");
                StatusCode::UNPROCESSABLE_ENTITY
            }
        };
        (status, Json(serde_json::json!({ "error": self.message() }))).into_response()
    }
}

impl From<TableError> for ApiError {
    fn from(err: TableError) -> Self {
        ApiError::InvalidMapping(err)
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let state = Arc::new(AppState {
        preprocessor: Preprocessor::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/normalize", post(normalize_handler))
        .route("/preview", post(preview_handler))
        .route("/prepare", post(prepare_handler))
        .route("/ws", get(ws_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(cors)
        .with_state(state);

    let addr = std::env::var("BIOCHEM_WEB_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "normalizer server listening");
    axum::serve(listener, app).await
}

/// Clone of the shared preprocessor with the request's mappings applied.
fn with_mappings(
    state: &AppState,
    requests: &[CustomMappingRequest],
) -> Result<(Preprocessor, Vec<MappingHazard>), ApiError> {
    let mut preprocessor = state.preprocessor.clone();
    let hazards = preprocessor.apply_requests(requests)?;
    Ok((preprocessor, hazards))
}

/// Normalization via HTTP POST (no streaming).
async fn normalize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<NormalizeRequest>,
) -> Result<Json<NormalizeResponse>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    let (preprocessor, hazards) = with_mappings(&state, &req.custom_mappings)?;

    let text = preprocessor.normalize(&req.text);
    Ok(Json(NormalizeResponse {
        changed: text != req.text,
        text,
        hazards,
    }))
}

async fn preview_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PreviewRequest>,
) -> Result<Json<Preview>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    let (preprocessor, _) = with_mappings(&state, &req.custom_mappings)?;
    Ok(Json(preprocessor.preview(&req.text)))
}

/// Builds the payload for the speech engine.
async fn prepare_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<PrepareRequest>,
) -> Result<Json<SynthesisRequest>, ApiError> {
    if req.text.trim().is_empty() {
        return Err(ApiError::EmptyText);
    }
    Ok(Json(state.preprocessor.prepare_request(&req.text, &req.voice, req.preprocess)))
}

async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(topic, text)| {
            serde_json::json!({
                "topic": topic,
                "text": text
            })
        })
        .collect();
    Json(texts)
}

async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_websocket(socket, state))
}

/// Receives texts and answers with the pipeline events of each one.
async fn handle_websocket(mut socket: WebSocket, state: Arc<AppState>) {
    info!("websocket connected");

    while let Some(Ok(msg)) = socket.recv().await {
        match msg {
            Message::Text(text) => {
                // plain text or {"text": ..., "custom_mappings": [...]}
                let (text, mappings) = match serde_json::from_str::<PreviewRequest>(&text) {
                    Ok(req) => (req.text, req.custom_mappings),
                    Err(_) => (text, vec![]),
                };
                if text.trim().is_empty() {
                    continue;
                }
                let preprocessor = match with_mappings(&state, &mappings) {
                    Ok((preprocessor, _)) => preprocessor,
                    Err(err) => {
                        let body = serde_json::json!({ "error": err.message() }).to_string();
                        if socket.send(Message::Text(body)).await.is_err() {
                            return;
                        }
                        continue;
                    }
                };
                info!(chars = text.chars().count(), "normalizing via websocket");

                let (tx, rx) = std::sync::mpsc::channel::<PipelineEvent>();
                let handle = tokio::task::spawn_blocking(move || {
                    preprocessor.normalize_streaming(&text, tx);
                });
                if let Err(err) = handle.await {
                    warn!(error = %err, "normalization task failed");
                    continue;
                }

                let events: Vec<PipelineEvent> = rx.try_iter().collect();
                for event in &events {
                    if let Ok(json) = serde_json::to_string(event) {
                        if socket.send(Message::Text(json)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            Message::Close(_) => {
                info!("websocket disconnected");
                return;
            }
            Message::Ping(payload) => {
                let _ = socket.send(Message::Pong(payload)).await;
            }
            _ => {}
        }
    }
}
