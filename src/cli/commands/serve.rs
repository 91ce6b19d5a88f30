//! HTTP shell for integration with other front-ends.
//!
//! Exposes the same credential-entry and request-entry operations as the
//! console loop. Requests run on a worker task; `/status` keeps answering
//! while one is in flight, and new requests or credential changes are refused
//! with 409 until it finishes.

use super::{build_orchestrator, transcript_source};
use crate::cli::busy::{spawn_handle, BusyFlag};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::ClipwiseError;
use crate::orchestrator::Orchestrator;
use crate::session::Session;
use crate::video::TranscriptSource;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

/// The live session and the orchestrator built from it.
struct Active {
    masked_credential: String,
    orchestrator: Arc<Orchestrator>,
}

/// Shared application state.
struct AppState {
    settings: Settings,
    transcripts: Arc<dyn TranscriptSource>,
    active: RwLock<Option<Active>>,
    busy: BusyFlag,
}

/// Run the HTTP API server.
pub async fn run_serve(
    host: Option<String>,
    port: Option<u16>,
    api_key: Option<&str>,
    settings: Settings,
) -> anyhow::Result<()> {
    let transcripts = transcript_source(&settings)?;

    let active = match settings.resolve_api_key(api_key) {
        Some(key) => match Session::validate(&key, &settings.model).await {
            Ok(session) => Some(activate(&session, &transcripts, &settings)?),
            Err(e) => {
                Output::warning(&format!("{} (submit a key with POST /session)", e));
                None
            }
        },
        None => None,
    };

    let host = host.unwrap_or_else(|| settings.server.host.clone());
    let port = port.unwrap_or(settings.server.port);

    let state = Arc::new(AppState {
        settings,
        transcripts,
        active: RwLock::new(active),
        busy: BusyFlag::new(),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = router(state).layer(cors);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("Clipwise API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Status", "GET  /status");
    Output::kv("Session", "POST /session");
    Output::kv("Ask", "POST /ask");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/status", get(status))
        .route("/session", post(submit_session))
        .route("/ask", post(ask))
        .with_state(state)
}

fn activate(
    session: &Session,
    transcripts: &Arc<dyn TranscriptSource>,
    settings: &Settings,
) -> crate::error::Result<Active> {
    Ok(Active {
        masked_credential: session.masked_credential(),
        orchestrator: build_orchestrator(session, transcripts, settings)?,
    })
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SessionRequest {
    api_key: String,
}

#[derive(Serialize)]
struct SessionResponse {
    credential: String,
}

#[derive(Deserialize)]
struct AskRequest {
    utterance: String,
}

#[derive(Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Serialize)]
struct StatusResponse {
    busy: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    busy_since: Option<DateTime<Utc>>,
    session: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    credential: Option<String>,
    model: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
        .into_response()
}

fn busy_response() -> Response {
    error_response(
        StatusCode::CONFLICT,
        "A request is still being processed. Please wait.",
    )
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let active = state.active.read().await;
    Json(StatusResponse {
        busy: state.busy.is_busy(),
        busy_since: state.busy.since(),
        session: active.is_some(),
        credential: active.as_ref().map(|a| a.masked_credential.clone()),
        model: state.settings.model.model.clone(),
    })
}

async fn submit_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SessionRequest>,
) -> Response {
    let Some(_guard) = state.busy.try_acquire() else {
        return busy_response();
    };

    let session = match Session::validate(&req.api_key, &state.settings.model).await {
        Ok(session) => session,
        Err(e @ ClipwiseError::Validation(_)) => {
            return error_response(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e) => return error_response(StatusCode::UNAUTHORIZED, e.to_string()),
    };

    match activate(&session, &state.transcripts, &state.settings) {
        Ok(active) => {
            info!("Session replaced ({})", active.masked_credential);
            let credential = active.masked_credential.clone();
            *state.active.write().await = Some(active);
            Json(SessionResponse { credential }).into_response()
        }
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn ask(State(state): State<Arc<AppState>>, Json(req): Json<AskRequest>) -> Response {
    let Some(guard) = state.busy.try_acquire() else {
        return busy_response();
    };

    let orchestrator = match state.active.read().await.as_ref() {
        Some(active) => active.orchestrator.clone(),
        None => {
            return error_response(
                StatusCode::UNAUTHORIZED,
                "No API key submitted. POST one to /session first.",
            )
        }
    };

    let outcome = spawn_handle(orchestrator, req.utterance, guard).await;

    match outcome {
        Ok(Ok(answer)) => Json(AskResponse { answer }).into_response(),
        Ok(Err(e)) if e.is_validation() => error_response(StatusCode::BAD_REQUEST, e.to_string()),
        Ok(Err(e)) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
        Err(e) => {
            warn!("Request worker stopped: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, "Request worker stopped")
        }
    }
}
