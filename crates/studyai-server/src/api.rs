//! HTTP API for the artifact store.
//!
//! # Endpoints
//!
//! - `POST /api/quiz/generate` - Generate and store a quiz
//! - `GET /api/quiz/:id` - Fetch a stored quiz
//! - `POST /api/flashcards/generate` - Generate and store a flashcard set
//! - `GET /api/flashcards/:id` - Fetch a stored flashcard set
//! - `POST /api/studyguide/generate` - Generate and store a study guide
//! - `GET /api/studyguide/:id` - Fetch a stored study guide
//! - `GET /api/health` - Liveness check
//!
//! Errors are returned as `{"error": "..."}` with status 400 for invalid
//! input, 404 for unknown ids, and 500 for everything else.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use studyai_core::PlaceholderGenerator;
//! use studyai_server::{create_router, AppState};
//! use studyai_store::SqliteArtifactStore;
//!
//! # async fn example() {
//! let generator = Arc::new(PlaceholderGenerator::new());
//! let store = SqliteArtifactStore::connect("sqlite::memory:", generator)
//!     .await
//!     .unwrap();
//! store.run_migrations().await.unwrap();
//!
//! let router = create_router(AppState::new(Arc::new(store)));
//! let listener = tokio::net::TcpListener::bind("0.0.0.0:5000").await.unwrap();
//! axum::serve(listener, router).await.unwrap();
//! # }
//! ```

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use studyai_core::{
    Artifact, ArtifactKind, ArtifactStore, Difficulty, GenerationRequest, GuideFormat,
    QuestionTypeChoice, RequestOptions, StudyError,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info, warn};
use uuid::Uuid;


// ============================================================================
// Request/Response Types
// ============================================================================

const fn default_num_questions() -> u32 {
    10
}

/// Request body for `POST /api/quiz/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizGenerateRequest {
    /// What the quiz is about.
    #[serde(default)]
    pub topic: String,
    /// Question difficulty.
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Question type selection.
    #[serde(default)]
    pub question_type: QuestionTypeChoice,
    /// Number of questions.
    #[serde(default = "default_num_questions")]
    pub num_questions: u32,
}

impl From<QuizGenerateRequest> for GenerationRequest {
    fn from(body: QuizGenerateRequest) -> Self {
        Self::new(
            body.topic,
            RequestOptions::Quiz {
                difficulty: body.difficulty,
                question_type: body.question_type,
                num_questions: body.num_questions,
            },
        )
    }
}

/// Request body for `POST /api/flashcards/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlashcardGenerateRequest {
    /// What the cards cover.
    #[serde(default)]
    pub topic: String,
}

impl From<FlashcardGenerateRequest> for GenerationRequest {
    fn from(body: FlashcardGenerateRequest) -> Self {
        Self::new(body.topic, RequestOptions::FlashcardSet)
    }
}

/// Request body for `POST /api/studyguide/generate`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudyGuideGenerateRequest {
    /// Source material to condense.
    #[serde(default)]
    pub content: String,
    /// Sections to include.
    #[serde(default)]
    pub format: GuideFormat,
}

impl From<StudyGuideGenerateRequest> for GenerationRequest {
    fn from(body: StudyGuideGenerateRequest) -> Self {
        Self::new(
            body.content,
            RequestOptions::StudyGuide {
                format: body.format,
            },
        )
    }
}

/// Response body for `GET /api/health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"OK"`.
    pub status: String,
    /// Human-readable status line.
    pub message: String,
}

/// Error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message.
    pub error: String,
}

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the HTTP server.
#[derive(Clone)]
pub struct AppState {
    /// Artifact persistence.
    pub store: Arc<dyn ArtifactStore>,
}

impl AppState {
    /// Creates a new `AppState`.
    #[must_use]
    pub fn new(store: Arc<dyn ArtifactStore>) -> Self {
        Self { store }
    }
}

// ============================================================================
// API Error Type
// ============================================================================

/// Internal error type for API handlers.
#[derive(Debug)]
enum ApiError {
    /// The request body or parameters were invalid.
    BadRequest(String),
    /// No artifact with that id.
    NotFound(String),
    /// Generation or storage failed.
    Internal(String),
}

impl From<StudyError> for ApiError {
    fn from(e: StudyError) -> Self {
        match e {
            StudyError::Validation { .. } => Self::BadRequest(e.user_message()),
            StudyError::NotFound { kind, .. } => Self::NotFound(not_found_message(kind)),
            other => Self::Internal(other.user_message()),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            Self::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

fn not_found_message(kind: ArtifactKind) -> String {
    format!("{} not found", kind.label())
}

// ============================================================================
// Router Setup
// ============================================================================

/// Creates the HTTP router with all API endpoints.
///
/// The router has:
/// - All API routes under `/api`
/// - Permissive CORS for browser front ends
/// - Tracing middleware for request logging
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/quiz/generate", post(handle_generate_quiz))
        .route("/quiz/:id", get(handle_get_quiz))
        .route("/flashcards/generate", post(handle_generate_flashcards))
        .route("/flashcards/:id", get(handle_get_flashcards))
        .route("/studyguide/generate", post(handle_generate_study_guide))
        .route("/studyguide/:id", get(handle_get_study_guide))
        .route("/health", get(handle_health));

    Router::new()
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::new(state))
}

// ============================================================================
// Handlers
// ============================================================================

async fn handle_generate_quiz(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<QuizGenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Artifact>), ApiError> {
    let Json(body) = payload?;
    create(&state, body.into()).await
}

async fn handle_generate_flashcards(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<FlashcardGenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Artifact>), ApiError> {
    let Json(body) = payload?;
    create(&state, body.into()).await
}

async fn handle_generate_study_guide(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<StudyGuideGenerateRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Artifact>), ApiError> {
    let Json(body) = payload?;
    create(&state, body.into()).await
}

async fn handle_get_quiz(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>, ApiError> {
    fetch(&state, ArtifactKind::Quiz, &id).await
}

async fn handle_get_flashcards(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>, ApiError> {
    fetch(&state, ArtifactKind::FlashcardSet, &id).await
}

async fn handle_get_study_guide(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<Artifact>, ApiError> {
    fetch(&state, ArtifactKind::StudyGuide, &id).await
}

/// Handler for `GET /api/health`.
async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
        message: "StudyAI API is running".to_string(),
    })
}

async fn create(
    state: &AppState,
    request: GenerationRequest,
) -> Result<(StatusCode, Json<Artifact>), ApiError> {
    let kind = request.kind();
    info!(kind = kind.as_str(), subject_len = request.subject().len(), "Generate request");

    match state.store.create_artifact(&request).await {
        Ok(artifact) => {
            info!(id = %artifact.id, kind = kind.as_str(), "Artifact created");
            Ok((StatusCode::CREATED, Json(artifact)))
        }
        Err(e) if e.is_user_error() => {
            warn!(kind = kind.as_str(), error = %e, "Rejected generate request");
            Err(e.into())
        }
        Err(e) => {
            error!(kind = kind.as_str(), error = %e, "Artifact creation failed");
            Err(e.into())
        }
    }
}

async fn fetch(
    state: &AppState,
    kind: ArtifactKind,
    raw_id: &str,
) -> Result<Json<Artifact>, ApiError> {
    // Ids that cannot be parsed cannot exist either
    let Ok(id) = Uuid::parse_str(raw_id) else {
        info!(kind = kind.as_str(), id = raw_id, "Malformed artifact id");
        return Err(ApiError::NotFound(not_found_message(kind)));
    };

    let artifact = state.store.get_artifact(kind, id).await.map_err(|e| {
        if !matches!(e, StudyError::NotFound { .. }) {
            error!(kind = kind.as_str(), %id, error = %e, "Artifact lookup failed");
        }
        ApiError::from(e)
    })?;
    Ok(Json(artifact))
}
