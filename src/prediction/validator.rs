//! Validation and normalization at the boundary with the prediction service.
//!
//! Requests coming from UI form state are checked and coerced into canonical
//! types before anything is sent upstream; responses coming back are checked
//! against the result contract before they reach callers. Every check runs to
//! completion so a single error lists all offending fields.
//!
//! All functions here are pure: no I/O, no shared state.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, Utc};
use serde_json::{Map, Value};

use super::models::{
    FieldError, GamePredictionRequest, GamePredictionResult, PlayerStatsRequest,
    PlayerStatsResult, PredictionKind, PredictionResult, ResponseShapeError, ValidationError,
};
use super::teams::TEAM_COUNT;

/// Allowed drift of `home_win_probability + away_win_probability` from 1.0.
pub const PROBABILITY_SUM_TOLERANCE: f64 = 1e-6;

/// Offset-less date-time layouts, read as UTC.
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"];

// ── Public API ───────────────────────────────────────────────────────────────

/// Validate and normalize a raw game-prediction request.
pub fn validate_game_request(raw: &Value) -> Result<GamePredictionRequest, ValidationError> {
    let mut errors = Vec::new();
    let Some(obj) = expect_object(raw, &mut errors) else {
        return Err(ValidationError { errors });
    };

    let home = team_id(obj, "home_team_id", &mut errors);
    let away = team_id(obj, "away_team_id", &mut errors);
    let game_date = game_date(obj, &mut errors);

    if let (Some(h), Some(a)) = (home, away) {
        if h == a {
            errors.push(FieldError::new(
                "home_team_id",
                "home_team_id equals away_team_id",
            ));
            errors.push(FieldError::new(
                "away_team_id",
                "away_team_id equals home_team_id",
            ));
        }
    }

    match (home, away, game_date) {
        (Some(home_team_id), Some(away_team_id), Some(game_date)) if errors.is_empty() => {
            Ok(GamePredictionRequest {
                home_team_id,
                away_team_id,
                game_date,
            })
        }
        _ => Err(ValidationError { errors }),
    }
}

/// Validate and normalize a raw player-stats request. `home_game` defaults to
/// `true` when absent or null.
pub fn validate_player_request(raw: &Value) -> Result<PlayerStatsRequest, ValidationError> {
    let mut errors = Vec::new();
    let Some(obj) = expect_object(raw, &mut errors) else {
        return Err(ValidationError { errors });
    };

    let player_id = player_id(obj, &mut errors);
    let opponent = team_id(obj, "opponent_team_id", &mut errors);
    let game_date = game_date(obj, &mut errors);
    let home_game = match present(obj, "home_game") {
        None => Some(true),
        Some(Value::Bool(b)) => Some(*b),
        Some(_) => {
            errors.push(FieldError::new("home_game", "home_game must be a boolean"));
            None
        }
    };

    match (player_id, opponent, game_date, home_game) {
        (Some(player_id), Some(opponent_team_id), Some(game_date), Some(home_game))
            if errors.is_empty() =>
        {
            Ok(PlayerStatsRequest {
                player_id,
                opponent_team_id,
                game_date,
                home_game,
            })
        }
        _ => Err(ValidationError { errors }),
    }
}

/// Check a prediction-service payload against the contract for `kind`.
pub fn parse_prediction_response(
    raw: &Value,
    kind: PredictionKind,
) -> Result<PredictionResult, ResponseShapeError> {
    match kind {
        PredictionKind::Game => parse_game_response(raw).map(PredictionResult::Game),
        PredictionKind::Player => parse_player_response(raw).map(PredictionResult::Player),
    }
}

pub fn parse_game_response(raw: &Value) -> Result<GamePredictionResult, ResponseShapeError> {
    let mut errors = Vec::new();
    let Some(obj) = expect_object(raw, &mut errors) else {
        return Err(shape_error(PredictionKind::Game, errors));
    };

    let home_p = unit_interval(obj, "home_win_probability", &mut errors);
    let away_p = unit_interval(obj, "away_win_probability", &mut errors);
    let confidence = unit_interval(obj, "confidence", &mut errors);

    if let (Some(h), Some(a)) = (home_p, away_p) {
        let sum = h + a;
        if (sum - 1.0).abs() > PROBABILITY_SUM_TOLERANCE {
            errors.push(FieldError::new(
                "away_win_probability",
                format!(
                    "home_win_probability + away_win_probability = {sum}, expected 1.0 ± {PROBABILITY_SUM_TOLERANCE:e}"
                ),
            ));
        }
    }

    let home_team_id = optional_team_id(obj, "home_team_id", &mut errors);
    let away_team_id = optional_team_id(obj, "away_team_id", &mut errors);
    let predicted_home_score = optional_score(obj, "predicted_home_score", &mut errors);
    let predicted_away_score = optional_score(obj, "predicted_away_score", &mut errors);
    let timestamp = optional_timestamp(obj, &mut errors);

    match (home_p, away_p, confidence) {
        (Some(home_win_probability), Some(away_win_probability), Some(confidence))
            if errors.is_empty() =>
        {
            Ok(GamePredictionResult {
                home_team_id,
                away_team_id,
                home_win_probability,
                away_win_probability,
                confidence,
                predicted_home_score,
                predicted_away_score,
                timestamp,
            })
        }
        _ => Err(shape_error(PredictionKind::Game, errors)),
    }
}

pub fn parse_player_response(raw: &Value) -> Result<PlayerStatsResult, ResponseShapeError> {
    let mut errors = Vec::new();
    let Some(obj) = expect_object(raw, &mut errors) else {
        return Err(shape_error(PredictionKind::Player, errors));
    };

    let player_id = match present(obj, "player_id") {
        None => {
            errors.push(missing("player_id"));
            None
        }
        Some(v) => match v.as_u64().filter(|id| *id > 0) {
            Some(id) => Some(id),
            None => {
                errors.push(FieldError::new(
                    "player_id",
                    "player_id must be a positive integer",
                ));
                None
            }
        },
    };
    let points = non_negative(obj, "predicted_points", &mut errors);
    let rebounds = non_negative(obj, "predicted_rebounds", &mut errors);
    let assists = non_negative(obj, "predicted_assists", &mut errors);
    let steals = optional_non_negative(obj, "predicted_steals", &mut errors);
    let blocks = optional_non_negative(obj, "predicted_blocks", &mut errors);
    let confidence = unit_interval(obj, "confidence", &mut errors);
    let timestamp = optional_timestamp(obj, &mut errors);

    match (player_id, points, rebounds, assists, confidence) {
        (Some(player_id), Some(predicted_points), Some(predicted_rebounds), Some(predicted_assists), Some(confidence))
            if errors.is_empty() =>
        {
            Ok(PlayerStatsResult {
                player_id,
                predicted_points,
                predicted_rebounds,
                predicted_assists,
                predicted_steals: steals,
                predicted_blocks: blocks,
                confidence,
                timestamp,
            })
        }
        _ => Err(shape_error(PredictionKind::Player, errors)),
    }
}

/// Parse an ISO-8601 date-time. RFC 3339 with any offset is converted to UTC;
/// an offset-less date-time is read as UTC. Date-only input is rejected.
pub fn parse_date_time(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// Canonical wire form: UTC, `Z` suffix, sub-second digits only when non-zero.
pub fn canonical_date_time(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ── Shared helpers ───────────────────────────────────────────────────────────

fn expect_object<'a>(raw: &'a Value, errors: &mut Vec<FieldError>) -> Option<&'a Map<String, Value>> {
    let obj = raw.as_object();
    if obj.is_none() {
        errors.push(FieldError::new(
            "body",
            format!("expected a JSON object, got {}", type_name(raw)),
        ));
    }
    obj
}

fn shape_error(kind: PredictionKind, errors: Vec<FieldError>) -> ResponseShapeError {
    ResponseShapeError { kind, errors }
}

/// Field value, treating explicit `null` the same as absence.
fn present<'a>(obj: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    obj.get(field).filter(|v| !v.is_null())
}

fn missing(field: &str) -> FieldError {
    FieldError::new(field, format!("{field} is required"))
}

fn type_name(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ── Request-side coercion ────────────────────────────────────────────────────

/// Integer from a JSON integer, an integral float (`5.0`) or a decimal string
/// (`"5"`). Form state hands select values over as strings.
fn coerce_integer(v: &Value) -> Option<i128> {
    match v {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from))
            .or_else(|| {
                n.as_f64()
                    .filter(|f| f.is_finite() && f.fract() == 0.0)
                    .map(|f| f as i128)
            }),
        Value::String(s) => s.trim().parse::<i128>().ok(),
        _ => None,
    }
}

fn team_id(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    let Some(v) = present(obj, field) else {
        errors.push(missing(field));
        return None;
    };
    let Some(n) = coerce_integer(v) else {
        errors.push(FieldError::new(field, format!("{field} must be an integer")));
        return None;
    };
    if !(1..=i128::from(TEAM_COUNT)).contains(&n) {
        errors.push(FieldError::new(
            field,
            format!("{field} out of range [1,{TEAM_COUNT}]"),
        ));
        return None;
    }
    u32::try_from(n).ok()
}

fn player_id(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<u64> {
    let Some(v) = present(obj, "player_id") else {
        errors.push(missing("player_id"));
        return None;
    };
    match coerce_integer(v).and_then(|n| u64::try_from(n).ok()).filter(|n| *n > 0) {
        Some(id) => Some(id),
        None => {
            errors.push(FieldError::new(
                "player_id",
                "player_id must be a positive integer",
            ));
            None
        }
    }
}

fn game_date(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<String> {
    let Some(v) = present(obj, "game_date") else {
        errors.push(missing("game_date"));
        return None;
    };
    let Some(s) = v.as_str() else {
        errors.push(FieldError::new("game_date", "game_date must be a string"));
        return None;
    };
    match parse_date_time(s) {
        Some(dt) => Some(canonical_date_time(&dt)),
        None => {
            errors.push(FieldError::new(
                "game_date",
                "game_date is not a valid ISO-8601 date-time",
            ));
            None
        }
    }
}

// ── Response-side checks (no coercion) ───────────────────────────────────────

fn number(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let Some(v) = present(obj, field) else {
        errors.push(FieldError::new(field, format!("{field} is missing")));
        return None;
    };
    let n = v.as_f64();
    if n.is_none() {
        errors.push(FieldError::new(
            field,
            format!("{field} must be a number, got {}", type_name(v)),
        ));
    }
    n
}

fn unit_interval(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let p = number(obj, field, errors)?;
    if !(0.0..=1.0).contains(&p) {
        errors.push(FieldError::new(field, format!("{field} out of range [0,1]")));
        return None;
    }
    Some(p)
}

fn non_negative(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<f64> {
    let n = number(obj, field, errors)?;
    if n < 0.0 {
        errors.push(FieldError::new(field, format!("{field} must be non-negative")));
        return None;
    }
    Some(n)
}

fn optional_non_negative(
    obj: &Map<String, Value>,
    field: &str,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    present(obj, field)?;
    non_negative(obj, field, errors)
}

fn optional_team_id(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    let v = present(obj, field)?;
    match v.as_u64().filter(|id| (1..=u64::from(TEAM_COUNT)).contains(id)) {
        Some(id) => u32::try_from(id).ok(),
        None => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be an integer in [1,{TEAM_COUNT}]"),
            ));
            None
        }
    }
}

fn optional_score(obj: &Map<String, Value>, field: &str, errors: &mut Vec<FieldError>) -> Option<u32> {
    let v = present(obj, field)?;
    match v.as_u64().and_then(|s| u32::try_from(s).ok()) {
        Some(score) => Some(score),
        None => {
            errors.push(FieldError::new(
                field,
                format!("{field} must be a non-negative integer"),
            ));
            None
        }
    }
}

fn optional_timestamp(obj: &Map<String, Value>, errors: &mut Vec<FieldError>) -> Option<DateTime<Utc>> {
    let v = present(obj, "timestamp")?;
    match v.as_str().and_then(parse_date_time) {
        Some(ts) => Some(ts),
        None => {
            errors.push(FieldError::new(
                "timestamp",
                "timestamp is not a valid ISO-8601 date-time",
            ));
            None
        }
    }
}
