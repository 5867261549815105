use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use thiserror::Error;

// ── Requests ─────────────────────────────────────────────────────────────────

/// A normalized game-outcome prediction request.
///
/// Only produced by `validate_game_request`, so every instance satisfies the
/// request contract: both ids in [1,30], ids differ, `game_date` is canonical
/// UTC RFC 3339.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamePredictionRequest {
    pub home_team_id: u32,
    pub away_team_id: u32,
    /// Canonical form, e.g. "2025-12-08T19:00:00Z"
    pub game_date: String,
}

impl GamePredictionRequest {
    /// JSON body as sent to `POST /predict/game`.
    pub fn to_raw(&self) -> Value {
        json!({
            "home_team_id": self.home_team_id,
            "away_team_id": self.away_team_id,
            "game_date": self.game_date,
        })
    }
}

/// A normalized player-stat prediction request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatsRequest {
    pub player_id: u64,
    pub opponent_team_id: u32,
    pub game_date: String,
    /// Always explicit after normalization (absent/null input becomes `true`)
    pub home_game: bool,
}

impl PlayerStatsRequest {
    /// JSON body as sent to `POST /predict/player`.
    pub fn to_raw(&self) -> Value {
        json!({
            "player_id": self.player_id,
            "opponent_team_id": self.opponent_team_id,
            "game_date": self.game_date,
            "home_game": self.home_game,
        })
    }
}

// ── Results ──────────────────────────────────────────────────────────────────

/// Which response contract a prediction-service payload is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionKind {
    Game,
    Player,
}

impl PredictionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionKind::Game => "game",
            PredictionKind::Player => "player",
        }
    }

    /// Path of the prediction-service endpoint, relative to its base URL.
    pub fn endpoint_path(&self) -> &'static str {
        match self {
            PredictionKind::Game => "/predict/game",
            PredictionKind::Player => "/predict/player",
        }
    }
}

impl fmt::Display for PredictionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Winner {
    Home,
    Away,
}

/// Validated game-outcome prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GamePredictionResult {
    pub home_team_id: Option<u32>,
    pub away_team_id: Option<u32>,
    /// In [0,1]; sums with `away_win_probability` to 1.0 (±1e-6)
    pub home_win_probability: f64,
    pub away_win_probability: f64,
    pub confidence: f64,
    pub predicted_home_score: Option<u32>,
    pub predicted_away_score: Option<u32>,
    pub timestamp: Option<DateTime<Utc>>,
}

impl GamePredictionResult {
    /// Side the model favours. A dead heat goes to the away side, matching the
    /// model's strict 0.5 decision threshold for a home win.
    pub fn predicted_winner(&self) -> Winner {
        if self.home_win_probability > self.away_win_probability {
            Winner::Home
        } else {
            Winner::Away
        }
    }
}

/// Validated player stat-line prediction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerStatsResult {
    pub player_id: u64,
    pub predicted_points: f64,
    pub predicted_rebounds: f64,
    pub predicted_assists: f64,
    pub predicted_steals: Option<f64>,
    pub predicted_blocks: Option<f64>,
    pub confidence: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResult {
    Game(GamePredictionResult),
    Player(PlayerStatsResult),
}

impl PredictionResult {
    pub fn kind(&self) -> PredictionKind {
        match self {
            PredictionResult::Game(_) => PredictionKind::Game,
            PredictionResult::Player(_) => PredictionKind::Player,
        }
    }
}

// ── Errors ───────────────────────────────────────────────────────────────────

/// One rejected field and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub reason: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, reason: impl Into<String>) -> Self {
        FieldError {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(FieldError::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Input-side rejection, raised before any network call.
/// Lists every offending field, never just the first.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("invalid prediction request: {}", join_fields(.errors))]
pub struct ValidationError {
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn reason_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.reason.as_str())
    }
}

/// Output-side rejection: the prediction service answered with a payload that
/// does not meet the result contract.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("malformed {kind} prediction response: {}", join_fields(.errors))]
pub struct ResponseShapeError {
    pub kind: PredictionKind,
    pub errors: Vec<FieldError>,
}

impl ResponseShapeError {
    pub fn has_field(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }

    pub fn reason_for(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.reason.as_str())
    }
}
