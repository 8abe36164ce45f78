use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Result;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::chart::Chart;
use crate::error::QuizError;
use crate::grade::Selection;
use crate::session::{QuizSession, SessionConfig, SessionState};

/// Sessions untouched for this long are dropped on the next insert.
pub const SESSION_TTL: Duration = Duration::from_secs(2 * 60 * 60);

struct SessionEntry {
    session: Arc<Mutex<QuizSession>>,
    touched: Instant,
}

#[derive(Clone)]
struct AppState {
    chart: Arc<Chart>,
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl AppState {
    fn new(chart: Arc<Chart>) -> Self {
        Self::with_ttl(chart, SESSION_TTL)
    }

    fn with_ttl(chart: Arc<Chart>, ttl: Duration) -> Self {
        Self {
            chart,
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    fn insert_session(&self, session: QuizSession) -> Arc<Mutex<QuizSession>> {
        let id = session.id();
        let now = Instant::now();
        let entry = Arc::new(Mutex::new(session));
        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, slot| now.duration_since(slot.touched) < self.ttl);
        let evicted = before - sessions.len();
        if evicted > 0 {
            tracing::debug!(evicted, "dropped idle sessions");
        }
        sessions.insert(
            id,
            SessionEntry {
                session: entry.clone(),
                touched: now,
            },
        );
        entry
    }

    fn get_session(&self, id: &Uuid) -> Option<Arc<Mutex<QuizSession>>> {
        let mut sessions = self.sessions.write();
        let slot = sessions.get_mut(id)?;
        slot.touched = Instant::now();
        Some(slot.session.clone())
    }

    #[cfg(test)]
    fn session_count(&self) -> usize {
        self.sessions.read().len()
    }
}

#[derive(Debug, Deserialize)]
struct StartSessionRequest {
    rounds: Option<u32>,
    seed: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct SelectionRequest {
    selection: String,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, thiserror::Error)]
enum ApiError {
    #[error("session not found")]
    NotFound,
    #[error(transparent)]
    Quiz(#[from] QuizError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Quiz(
                QuizError::InvalidSelection(_)
                | QuizError::UnknownActionKey(_)
                | QuizError::UnknownPattern { .. }
                | QuizError::InvalidFrequency { .. },
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Quiz(
                QuizError::SelectionLocked(_)
                | QuizError::AlreadyChecked
                | QuizError::NotChecked
                | QuizError::SessionComplete,
            ) => StatusCode::CONFLICT,
            ApiError::Quiz(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = Json(ErrorResponse {
            error: self.to_string(),
        });
        (status, body).into_response()
    }
}

pub async fn serve(addr: SocketAddr, chart: Arc<Chart>) -> Result<()> {
    let app = router(chart);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/sessions", post(start_session))
        .route("/sessions/:id", get(fetch_session))
        .route("/sessions/:id/selections", post(toggle_selection))
        .route("/sessions/:id/check", post(check_answers))
        .route("/sessions/:id/next", post(next_hand));

    Router::new()
        .route("/healthz", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub fn router(chart: Arc<Chart>) -> Router {
    build_router(AppState::new(chart))
}

async fn health() -> &'static str {
    "ok"
}

async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> Result<Json<SessionState>, ApiError> {
    let defaults = SessionConfig::default();
    let config = SessionConfig {
        rounds: req.rounds.unwrap_or(defaults.rounds),
        seed: req.seed,
    };

    let session = QuizSession::new(state.chart.clone(), config)?;
    let session_arc = state.insert_session(session);
    let guard = session_arc.lock();
    Ok(Json(guard.snapshot()))
}

async fn fetch_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, ApiError> {
    let session_arc = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let session = session_arc.lock();
    Ok(Json(session.snapshot()))
}

async fn toggle_selection(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SelectionRequest>,
) -> Result<Json<SessionState>, ApiError> {
    let session_arc = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let selection: Selection = req.selection.parse()?;
    let mut session = session_arc.lock();
    session.toggle(selection)?;
    Ok(Json(session.snapshot()))
}

async fn check_answers(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, ApiError> {
    let session_arc = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut session = session_arc.lock();
    session.check()?;
    Ok(Json(session.snapshot()))
}

async fn next_hand(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionState>, ApiError> {
    let session_arc = state.get_session(&id).ok_or(ApiError::NotFound)?;
    let mut session = session_arc.lock();
    session.next_round()?;
    Ok(Json(session.snapshot()))
}
