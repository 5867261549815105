use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

use crate::ml_api::{predict_game_raw, predict_player_raw, PredictionError, PredictionService};
use crate::prediction::accuracy::{accuracy_report, grade, GradedPrediction};
use crate::prediction::models::Winner;
use crate::prediction::teams::{all_teams, team_by_abbreviation, team_by_id};
use crate::prediction::{parse_game_response, FieldError, GamePredictionResult, ValidationError};

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<dyn PredictionService>,
}

/// Build the Axum router for the gateway.
pub fn router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/teams", get(teams_handler))
        .route("/api/teams/:team", get(team_handler))
        .route("/api/predict/game", post(predict_game_handler))
        .route("/api/predict/player", post(predict_player_handler))
        .route("/api/accuracy", post(accuracy_handler))
        .route("/api/grade", post(grade_handler))
        .layer(cors)
        .with_state(Arc::new(state))
}

/// CORS for the configured frontend origins; `*` allows any origin.
pub fn cors_layer(origins: &[String]) -> anyhow::Result<CorsLayer> {
    if origins.iter().any(|o| o.trim() == "*") {
        return Ok(CorsLayer::permissive());
    }
    let allowed = origins
        .iter()
        .map(|o| HeaderValue::from_str(o.trim()))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

// ── Errors ────────────────────────────────────────────────────────────────────

/// HTTP rendering of a `PredictionError`.
pub struct ApiError(PredictionError);

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        ApiError(e)
    }
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError(PredictionError::Validation(e))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let timed_out = self.0.is_timeout();
        let (status, body) = match self.0 {
            PredictionError::Validation(e) => {
                debug!("Rejected request: {}", message);
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    json!({ "error": "validation_error", "message": message, "fields": e.errors }),
                )
            }
            PredictionError::ResponseShape(e) => {
                warn!("{}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({
                        "error": "response_shape_error",
                        "kind": e.kind,
                        "message": message,
                        "fields": e.errors,
                    }),
                )
            }
            PredictionError::Upstream { status, .. } => (
                StatusCode::BAD_GATEWAY,
                json!({ "error": "upstream_error", "upstream_status": status, "message": message }),
            ),
            PredictionError::MalformedBody { .. } => {
                warn!("{}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "malformed_response", "message": message }),
                )
            }
            PredictionError::Transport(_) if timed_out => {
                warn!("{}", message);
                (
                    StatusCode::GATEWAY_TIMEOUT,
                    json!({ "error": "upstream_timeout", "message": message }),
                )
            }
            PredictionError::Transport(_) => {
                warn!("{}", message);
                (
                    StatusCode::BAD_GATEWAY,
                    json!({ "error": "transport_error", "message": message }),
                )
            }
        };
        (status, Json(body)).into_response()
    }
}

/// Unwrap a JSON body, reporting an unreadable one as a `body` field error.
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(rejection) => Err(ValidationError {
            errors: vec![FieldError::new("body", rejection.body_text())],
        }
        .into()),
    }
}

// ── Handlers ──────────────────────────────────────────────────────────────────

/// GET /health
async fn health_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let upstream = match state.service.health().await {
        Ok(h) => json!({ "name": state.service.name(), "status": h.status, "model_loaded": h.model_loaded }),
        Err(e) => json!({ "name": state.service.name(), "status": "unreachable", "error": e.to_string() }),
    };
    Json(json!({
        "status": "healthy",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
        "upstream": upstream,
    }))
}

/// GET /api/teams
async fn teams_handler() -> impl IntoResponse {
    Json(all_teams())
}

/// GET /api/teams/:team, by catalog id or abbreviation
async fn team_handler(Path(key): Path<String>) -> Result<impl IntoResponse, (StatusCode, String)> {
    let team = match key.parse::<u32>() {
        Ok(id) => team_by_id(id),
        Err(_) => team_by_abbreviation(&key),
    };
    team.map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Unknown team '{}'", key)))
}

#[derive(Serialize)]
struct GamePredictionView {
    #[serde(flatten)]
    result: GamePredictionResult,
    predicted_winner: Winner,
}

/// POST /api/predict/game
async fn predict_game_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = json_body(payload)?;
    let result = predict_game_raw(state.service.as_ref(), &raw).await?;
    Ok(Json(GamePredictionView {
        predicted_winner: result.predicted_winner(),
        result,
    }))
}

/// POST /api/predict/player
async fn predict_player_handler(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let raw = json_body(payload)?;
    let result = predict_player_raw(state.service.as_ref(), &raw).await?;
    Ok(Json(result))
}

/// POST /api/accuracy with a list of `{confidence, is_correct}`
async fn accuracy_handler(
    payload: Result<Json<Vec<GradedPrediction>>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let predictions = json_body(payload)?;
    let errors: Vec<FieldError> = predictions
        .iter()
        .enumerate()
        .filter(|(_, p)| !(0.0..=1.0).contains(&p.confidence))
        .map(|(i, _)| {
            FieldError::new(
                format!("predictions[{}].confidence", i),
                "confidence out of range [0,1]",
            )
        })
        .collect();
    if !errors.is_empty() {
        return Err(ValidationError { errors }.into());
    }
    Ok(Json(accuracy_report(&predictions)))
}

#[derive(Deserialize)]
struct GradeRequest {
    /// A stored game prediction, in the prediction service's response shape
    prediction: Value,
    home_score: u32,
    away_score: u32,
}

/// POST /api/grade: score a stored game prediction against the final result.
/// `is_correct` is null for a tied game.
async fn grade_handler(
    payload: Result<Json<GradeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let req = json_body(payload)?;
    let result = parse_game_response(&req.prediction).map_err(|e| ValidationError {
        errors: e
            .errors
            .into_iter()
            .map(|f| FieldError::new(format!("prediction.{}", f.field), f.reason))
            .collect(),
    })?;
    Ok(Json(json!({
        "predicted_winner": result.predicted_winner(),
        "is_correct": grade(&result, req.home_score, req.away_score),
        "confidence": result.confidence,
    })))
}
