//! FactLens Core
//!
//! Submission dispatching and result rendering for the Analyze flow, the
//! Fact-or-Fake swipe game, and the session server that exposes both.

pub mod analysis;
pub mod api;
pub mod client;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod game;
pub mod notify;
pub mod render;
pub mod websocket;

pub use analysis::{
    parse_response_body, AnalysisRequest, AnalysisResult, Explanation, ImageUpload,
    RawAnalysisResponse, MAX_SCORE,
};
pub use api::{create_router, AnalyzeView, AppState, ErrorResponse, GameView};
pub use client::{AnalysisBackend, HttpAnalysisClient};
pub use config::{Config, OutputFormat, ServerConfig, API_URL_ENV};
pub use dispatcher::{select_request, AnalyzeSession};
pub use error::{normalize_error_message, FactlensError, Result};
pub use game::{
    Answer, DragOutcome, GamePhase, GameSession, GameSummary, League, Question, QuestionBank,
    Reveal, SwipeDirection, DRAG_THRESHOLD, INITIAL_XP, STREAK_BONUS, XP_PER_CORRECT,
};
pub use notify::{Notification, NotificationBroadcaster, Notifier, NoopNotifier};
pub use render::{ResultView, Verdict, VerdictVariant, MAX_EVIDENCE_ITEMS};
