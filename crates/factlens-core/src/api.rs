//! HTTP API for the FactLens session server.
//!
//! The server holds one Analyze session and one game session and exposes
//! them to a front-end. Backend failures are also pushed to `/ws`
//! subscribers as notifications.
//!
//! # Endpoints
//!
//! - `GET /api/health` - Liveness check
//! - `GET /api/analyze` - Current Analyze view
//! - `PUT /api/analyze/input` - Set the claim text
//! - `PUT /api/analyze/image?filename=` - Attach an image (raw body)
//! - `DELETE /api/analyze/image` - Detach the image
//! - `POST /api/analyze` - Submit for analysis
//! - `GET /api/game` - Current game view
//! - `POST /api/game/drag` - Release a drag gesture
//! - `POST /api/game/swipe` - Decide by swipe direction
//! - `POST /api/game/next` - Advance to the next card
//! - `POST /api/game/reset` - Start a new game
//! - `GET /ws` - Notification stream
//!
//! # Example
//!
//! ```no_run
//! use factlens_core::{create_router, AppState, Config};
//!
//! # async fn example() -> factlens_core::Result<()> {
//! let state = AppState::from_config(Config::default())?;
//! let router = create_router(state);
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//! axum::serve(listener, router).await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{info, warn};

use crate::analysis::ImageUpload;
use crate::client::{AnalysisBackend, HttpAnalysisClient};
use crate::config::Config;
use crate::dispatcher::AnalyzeSession;
use crate::error::FactlensError;
use crate::game::{DragOutcome, GamePhase, GameSession, QuestionBank, Reveal, SwipeDirection};
use crate::notify::NotificationBroadcaster;
use crate::render::ResultView;
use crate::websocket::ws_handler;

// ============================================================================
// Request/Response Types
// ============================================================================

/// Request body for `PUT /api/analyze/input`.
#[derive(Debug, Clone, Deserialize)]
pub struct InputRequest {
    /// The claim text as typed.
    pub text: String,
}

/// Query string for `PUT /api/analyze/image`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageQuery {
    /// Original file name.
    #[serde(default)]
    pub filename: Option<String>,
}

/// Request body for `POST /api/game/drag`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DragRequest {
    /// Horizontal offset at release, in pixels.
    pub offset_x: f64,
}

/// Request body for `POST /api/game/swipe`.
#[derive(Debug, Clone, Deserialize)]
pub struct SwipeRequest {
    /// Direction of the swipe.
    pub direction: SwipeDirection,
}

/// Analyze page as seen by a front-end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeView {
    /// Claim text as typed.
    pub input_text: String,
    /// File name of the attached image.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,
    /// Whether a submission is pending.
    pub busy: bool,
    /// Whether the analyze trigger is disabled.
    pub submit_disabled: bool,
    /// Inline error message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Rendered result of the last successful submission.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultView>,
}

impl AnalyzeView {
    /// Renders the current session.
    #[must_use]
    pub fn from_session(session: &AnalyzeSession) -> Self {
        Self {
            input_text: session.input_text().to_string(),
            attachment: session.image().map(|i| i.filename.clone()),
            busy: session.is_busy(),
            submit_disabled: session.is_submit_disabled(),
            error: session.error().map(str::to_string),
            result: session.result().map(ResultView::from_result),
        }
    }
}

/// Game screen as seen by a front-end.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    /// 1-based card number.
    pub question_number: usize,
    /// Statement on the current card.
    pub question: String,
    /// Current XP.
    pub xp: u32,
    /// Current streak.
    pub streak: u32,
    /// Whether the streak badge is shown.
    pub shows_streak: bool,
    /// League header label.
    pub league: String,
    /// Logical phase of the card.
    pub phase: GamePhase,
    /// Outcome of the last decision while revealing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal: Option<Reveal>,
    /// Reveal headline while revealing.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reveal_title: Option<&'static str>,
    /// Swipe hints, left then right.
    pub hints: [&'static str; 2],
}

impl GameView {
    /// Renders the current game.
    #[must_use]
    pub fn from_session(game: &GameSession) -> Self {
        Self {
            question_number: game.question_number(),
            question: game.current_question().text.clone(),
            xp: game.xp(),
            streak: game.streak(),
            shows_streak: game.shows_streak(),
            league: game.league().label(),
            phase: game.phase(),
            reveal: game.reveal().cloned(),
            reveal_title: game.reveal_title(),
            hints: GameSession::hints(),
        }
    }
}

/// Response body for `POST /api/game/drag`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DragResponse {
    /// `true` when the card snapped back without a decision.
    pub snapped_back: bool,
    /// Game after the gesture.
    pub game: GameView,
}

/// Error response body returned on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Description of the error.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the session server.
#[derive(Clone)]
pub struct AppState {
    /// Loaded configuration.
    pub config: Config,
    /// The Analyze page session.
    pub analyze: Arc<Mutex<AnalyzeSession>>,
    /// The current game.
    pub game: Arc<Mutex<GameSession>>,
    /// Questions used when a game is reset.
    pub bank: QuestionBank,
    /// Analysis service.
    pub backend: Arc<dyn AnalysisBackend>,
    /// Toast channel, streamed over `/ws`.
    pub notifications: NotificationBroadcaster,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("questions", &self.bank.len())
            .field("subscribers", &self.notifications.receiver_count())
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// Creates state around an explicit backend and question bank.
    #[must_use]
    pub fn new(config: Config, backend: Arc<dyn AnalysisBackend>, bank: QuestionBank) -> Self {
        let notifications = NotificationBroadcaster::new(config.server.notification_capacity);
        Self {
            analyze: Arc::new(Mutex::new(AnalyzeSession::new())),
            game: Arc::new(Mutex::new(GameSession::new(bank.clone()))),
            bank,
            backend,
            notifications,
            config,
        }
    }

    /// Creates state with the HTTP client and question bank from `config`.
    ///
    /// # Errors
    ///
    /// Returns `FactlensError::QuestionBankError` if a configured question
    /// file cannot be loaded.
    pub fn from_config(config: Config) -> crate::error::Result<Self> {
        let bank = QuestionBank::from_config(&config)?;
        let backend = Arc::new(HttpAnalysisClient::from_config(&config));
        Ok(Self::new(config, backend, bank))
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// Input failed local validation.
    Validation(String),
    /// The request conflicts with the current session state.
    Conflict(String),
    /// The uploaded file is not an image.
    UnsupportedMedia(String),
    /// The analysis service failed.
    Backend(String),
    /// Anything else.
    Internal(String),
}

impl From<FactlensError> for ApiError {
    fn from(err: FactlensError) -> Self {
        match err {
            FactlensError::EmptyInput => Self::Validation(err.to_string()),
            FactlensError::AnalysisInFlight | FactlensError::InvalidStateTransition { .. } => {
                Self::Conflict(err.to_string())
            }
            FactlensError::UnsupportedImage { .. } => Self::UnsupportedMedia(err.to_string()),
            FactlensError::Transport { .. } | FactlensError::Backend { .. } => {
                Self::Backend(err.user_message())
            }
            _ => Self::Internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Conflict(msg) => (StatusCode::CONFLICT, msg),
            Self::UnsupportedMedia(msg) => (StatusCode::UNSUPPORTED_MEDIA_TYPE, msg),
            Self::Backend(msg) => (StatusCode::BAD_GATEWAY, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints and the `/ws` stream.
///
/// CORS allows any origin so a separately served front-end can connect.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/health", get(handle_health))
        .route("/analyze", get(handle_analyze_view).post(handle_submit))
        .route("/analyze/input", put(handle_set_input))
        .route(
            "/analyze/image",
            put(handle_attach_image).delete(handle_clear_image),
        )
        .route("/game", get(handle_game_view))
        .route("/game/drag", post(handle_drag))
        .route("/game/swipe", post(handle_swipe))
        .route("/game/next", post(handle_next))
        .route("/game/reset", post(handle_reset));

    Router::new()
        .nest("/api", api_routes)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Analyze Handlers
// ============================================================================

/// Handler for `GET /api/health`.
async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Handler for `GET /api/analyze`.
async fn handle_analyze_view(State(state): State<Arc<AppState>>) -> Json<AnalyzeView> {
    let session = state.analyze.lock().await;
    Json(AnalyzeView::from_session(&session))
}

/// Handler for `PUT /api/analyze/input`.
async fn handle_set_input(
    State(state): State<Arc<AppState>>,
    Json(request): Json<InputRequest>,
) -> Json<AnalyzeView> {
    let mut session = state.analyze.lock().await;
    session.set_input_text(request.text);
    Json(AnalyzeView::from_session(&session))
}

/// Handler for `PUT /api/analyze/image`.
///
/// The body is the raw file; `Content-Type` must be an image type.
async fn handle_attach_image(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ImageQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AnalyzeView>, ApiError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    let filename = query.filename.unwrap_or_else(|| "upload".to_string());

    let image = ImageUpload::new(filename, content_type, body.to_vec()).map_err(|e| {
        warn!(content_type, "Rejected non-image upload");
        ApiError::from(e)
    })?;

    let mut session = state.analyze.lock().await;
    session.attach_image(image);
    Ok(Json(AnalyzeView::from_session(&session)))
}

/// Handler for `DELETE /api/analyze/image`.
async fn handle_clear_image(State(state): State<Arc<AppState>>) -> Json<AnalyzeView> {
    let mut session = state.analyze.lock().await;
    session.clear_image();
    Json(AnalyzeView::from_session(&session))
}

/// Handler for `POST /api/analyze`.
///
/// The backend call runs in its own task, so the session is finished and
/// `busy` cleared even if this request is dropped.
async fn handle_submit(
    State(state): State<Arc<AppState>>,
) -> Result<Json<AnalyzeView>, ApiError> {
    let request = {
        let mut session = state.analyze.lock().await;
        session.begin()?
    };

    let task_state = Arc::clone(&state);
    let task = tokio::spawn(async move {
        let outcome = task_state.backend.dispatch(&request).await;
        let mut session = task_state.analyze.lock().await;
        let finished = session
            .finish(outcome, &task_state.notifications)
            .map(|_| ());
        (finished, AnalyzeView::from_session(&session))
    });

    let (finished, view) = task.await.map_err(|e| {
        warn!(error = %e, "Analysis task failed");
        ApiError::Internal(e.to_string())
    })?;
    finished?;

    info!(
        verdict = ?view.result.as_ref().map(|r| r.verdict),
        "Analysis complete"
    );
    Ok(Json(view))
}

// ============================================================================
// Game Handlers
// ============================================================================

/// Handler for `GET /api/game`.
async fn handle_game_view(State(state): State<Arc<AppState>>) -> Json<GameView> {
    let game = state.game.lock().await;
    Json(GameView::from_session(&game))
}

/// Handler for `POST /api/game/drag`.
async fn handle_drag(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DragRequest>,
) -> Result<Json<DragResponse>, ApiError> {
    let mut game = state.game.lock().await;
    let outcome = game.drag_end(request.offset_x)?;
    Ok(Json(DragResponse {
        snapped_back: outcome == DragOutcome::SnapBack,
        game: GameView::from_session(&game),
    }))
}

/// Handler for `POST /api/game/swipe`.
async fn handle_swipe(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SwipeRequest>,
) -> Result<Json<GameView>, ApiError> {
    let mut game = state.game.lock().await;
    game.decide(request.direction)?;
    Ok(Json(GameView::from_session(&game)))
}

/// Handler for `POST /api/game/next`.
async fn handle_next(State(state): State<Arc<AppState>>) -> Result<Json<GameView>, ApiError> {
    let mut game = state.game.lock().await;
    game.advance()?;
    Ok(Json(GameView::from_session(&game)))
}

/// Handler for `POST /api/game/reset`.
async fn handle_reset(State(state): State<Arc<AppState>>) -> Json<GameView> {
    let mut game = state.game.lock().await;
    *game = GameSession::new(state.bank.clone());
    info!("Game reset");
    Json(GameView::from_session(&game))
}

// ============================================================================
// Tests
// ============================================================================
