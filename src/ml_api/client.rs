use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::error::PredictionError;
use super::service::{PredictionService, ServiceHealth};
use crate::prediction::{
    parse_game_response, parse_player_response, FieldError, GamePredictionRequest,
    GamePredictionResult, PlayerStatsRequest, PlayerStatsResult, PredictionKind,
    ResponseShapeError,
};

/// Client for the ML prediction API (`/predict/game`, `/predict/player`).
#[derive(Clone)]
pub struct MlApiClient {
    http: Client,
    /// e.g. "http://localhost:8000/api/v1", no trailing slash
    base_url: String,
    health_url: String,
}

impl MlApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .with_context(|| format!("Invalid prediction API URL '{}'", base_url))?;
        // Health lives at the service root, outside the versioned prefix
        let health_url = parsed
            .join("/health")
            .context("Failed to derive health URL")?
            .to_string();
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(MlApiClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            health_url,
        })
    }

    fn endpoint(&self, kind: PredictionKind) -> String {
        format!("{}{}", self.base_url, kind.endpoint_path())
    }

    /// POST a normalized body and return the decoded JSON payload.
    async fn post_prediction(&self, kind: PredictionKind, body: &Value) -> Result<Value, PredictionError> {
        let url = self.endpoint(kind);
        debug!("Requesting {} prediction: {}", kind, url);

        let resp = self.http.post(&url).json(body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!("Prediction service error {} on {}: {}", status, url, body);
            return Err(PredictionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| {
            PredictionError::from(ResponseShapeError {
                kind,
                errors: vec![FieldError::new(
                    "body",
                    format!("response body is not valid JSON: {}", e),
                )],
            })
        })
    }
}

#[async_trait]
impl PredictionService for MlApiClient {
    fn name(&self) -> &str {
        "ml-api"
    }

    async fn predict_game(
        &self,
        request: &GamePredictionRequest,
    ) -> Result<GamePredictionResult, PredictionError> {
        let raw = self
            .post_prediction(PredictionKind::Game, &request.to_raw())
            .await?;
        let result = parse_game_response(&raw)?;
        check_game_echo(request, &result)?;
        info!(
            "Game prediction {} vs {}: home={:.3} away={:.3} confidence={:.3}",
            request.home_team_id,
            request.away_team_id,
            result.home_win_probability,
            result.away_win_probability,
            result.confidence
        );
        Ok(result)
    }

    async fn predict_player(
        &self,
        request: &PlayerStatsRequest,
    ) -> Result<PlayerStatsResult, PredictionError> {
        let raw = self
            .post_prediction(PredictionKind::Player, &request.to_raw())
            .await?;
        let result = parse_player_response(&raw)?;
        if result.player_id != request.player_id {
            return Err(ResponseShapeError {
                kind: PredictionKind::Player,
                errors: vec![FieldError::new(
                    "player_id",
                    format!(
                        "player_id {} does not match requested {}",
                        result.player_id, request.player_id
                    ),
                )],
            }
            .into());
        }
        info!(
            "Player prediction {}: pts={:.1} reb={:.1} ast={:.1} confidence={:.3}",
            request.player_id,
            result.predicted_points,
            result.predicted_rebounds,
            result.predicted_assists,
            result.confidence
        );
        Ok(result)
    }

    async fn health(&self) -> Result<ServiceHealth, PredictionError> {
        let resp = self.http.get(&self.health_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(PredictionError::Upstream {
                status: status.as_u16(),
                body,
            });
        }
        let text = resp.text().await?;
        serde_json::from_str(&text).map_err(|e| PredictionError::MalformedBody {
            endpoint: self.health_url.clone(),
            reason: e.to_string(),
        })
    }
}

/// The service echoes the team ids it predicted for; a mismatch means the
/// answer belongs to some other game.
fn check_game_echo(
    request: &GamePredictionRequest,
    result: &GamePredictionResult,
) -> Result<(), ResponseShapeError> {
    let mut errors = Vec::new();
    for (field, echoed, requested) in [
        ("home_team_id", result.home_team_id, request.home_team_id),
        ("away_team_id", result.away_team_id, request.away_team_id),
    ] {
        if let Some(id) = echoed.filter(|id| *id != requested) {
            errors.push(FieldError::new(
                field,
                format!("{} {} does not match requested {}", field, id, requested),
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(ResponseShapeError {
            kind: PredictionKind::Game,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ml_api::service::predict_game_raw;
    use axum::{http::StatusCode, routing::{get, post}, Json, Router};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Serve `router` on an ephemeral port; returns the versioned base URL.
    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}/api/v1", addr)
    }

    fn client(base_url: &str) -> MlApiClient {
        MlApiClient::new(base_url, Duration::from_secs(5)).unwrap()
    }

    fn game_request() -> GamePredictionRequest {
        GamePredictionRequest {
            home_team_id: 1,
            away_team_id: 2,
            game_date: "2025-12-08T19:00:00Z".into(),
        }
    }

    #[tokio::test]
    async fn test_predict_game_success() {
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(|Json(body): Json<Value>| async move {
                Json(json!({
                    "home_team_id": body["home_team_id"],
                    "away_team_id": body["away_team_id"],
                    "home_win_probability": 0.62,
                    "away_win_probability": 0.38,
                    "predicted_home_score": null,
                    "predicted_away_score": null,
                    "confidence": 0.62,
                    "timestamp": "2025-12-08T18:00:00Z",
                }))
            }),
        );
        let base = spawn_upstream(router).await;
        let result = client(&base).predict_game(&game_request()).await.unwrap();
        assert_eq!(result.home_team_id, Some(1));
        assert_eq!(result.home_win_probability, 0.62);
        assert_eq!(result.away_win_probability, 0.38);
    }

    #[tokio::test]
    async fn test_invalid_input_never_reaches_network() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    StatusCode::OK
                }
            }),
        );
        let base = spawn_upstream(router).await;
        let client = client(&base);

        let err = predict_game_raw(
            &client,
            &json!({"home_team_id": 3, "away_team_id": 40, "game_date": "not-a-date"}),
        )
        .await
        .unwrap_err();

        match err {
            PredictionError::Validation(v) => {
                assert!(v.has_field("away_team_id"));
                assert!(v.has_field("game_date"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert_eq!(hits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_bad_probabilities_are_shape_errors() {
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(|| async {
                Json(json!({
                    "home_win_probability": 0.60,
                    "away_win_probability": 0.35,
                    "confidence": 0.6,
                }))
            }),
        );
        let base = spawn_upstream(router).await;
        let err = client(&base).predict_game(&game_request()).await.unwrap_err();
        assert!(matches!(err, PredictionError::ResponseShape(ref e) if e.has_field("away_win_probability")));
    }

    #[tokio::test]
    async fn test_mismatched_echo_is_shape_error() {
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(|| async {
                Json(json!({
                    "home_team_id": 9,
                    "away_team_id": 2,
                    "home_win_probability": 0.5,
                    "away_win_probability": 0.5,
                    "confidence": 0.5,
                }))
            }),
        );
        let base = spawn_upstream(router).await;
        let err = client(&base).predict_game(&game_request()).await.unwrap_err();
        match err {
            PredictionError::ResponseShape(e) => {
                assert!(e.has_field("home_team_id"));
                assert!(!e.has_field("away_team_id"));
            }
            other => panic!("expected shape error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_shape_error() {
        let router = Router::new().route(
            "/api/v1/predict/player",
            post(|| async { "<html>oops</html>" }),
        );
        let base = spawn_upstream(router).await;
        let request = PlayerStatsRequest {
            player_id: 2544,
            opponent_team_id: 5,
            game_date: "2024-12-15T19:30:00Z".into(),
            home_game: true,
        };
        let err = client(&base).predict_player(&request).await.unwrap_err();
        assert!(matches!(err, PredictionError::ResponseShape(ref e) if e.has_field("body")));
    }

    #[tokio::test]
    async fn test_upstream_error_status() {
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Prediction failed: model not loaded",
                )
            }),
        );
        let base = spawn_upstream(router).await;
        let err = client(&base).predict_game(&game_request()).await.unwrap_err();
        match err {
            PredictionError::Upstream { status, body } => {
                assert_eq!(status, 500);
                assert!(body.contains("model not loaded"));
            }
            other => panic!("expected upstream error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_player_prediction_sends_normalized_body() {
        let router = Router::new().route(
            "/api/v1/predict/player",
            post(|Json(body): Json<Value>| async move {
                // Reject anything that is not the canonical request shape
                if body["home_game"] != json!(true) || !body["player_id"].is_u64() {
                    return Err(StatusCode::UNPROCESSABLE_ENTITY);
                }
                Ok(Json(json!({
                    "player_id": body["player_id"],
                    "predicted_points": 27.5,
                    "predicted_rebounds": 7.2,
                    "predicted_assists": 5.8,
                    "confidence": 0.85,
                    "timestamp": "2024-12-15T18:30:00Z",
                })))
            }),
        );
        let base = spawn_upstream(router).await;
        let client = client(&base);
        let result = crate::ml_api::service::predict_player_raw(
            &client,
            &json!({"player_id": "2544", "opponent_team_id": 5, "game_date": "2024-12-15T19:30:00Z"}),
        )
        .await
        .unwrap();
        assert_eq!(result.player_id, 2544);
        assert_eq!(result.predicted_points, 27.5);
    }

    #[tokio::test]
    async fn test_health_uses_service_root() {
        let router = Router::new().route(
            "/health",
            get(|| async { Json(json!({"status": "healthy", "service": "ml-api", "model_loaded": true})) }),
        );
        let base = spawn_upstream(router).await;
        let health = client(&base).health().await.unwrap();
        assert_eq!(health.status, "healthy");
        assert_eq!(health.model_loaded, Some(true));
    }

    #[tokio::test]
    async fn test_health_non_json_body_is_malformed() {
        let router = Router::new().route("/health", get(|| async { "<html>starting</html>" }));
        let base = spawn_upstream(router).await;
        let err = client(&base).health().await.unwrap_err();
        match err {
            PredictionError::MalformedBody { endpoint, .. } => assert!(endpoint.ends_with("/health")),
            other => panic!("expected malformed body, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_slow_upstream_times_out() {
        let router = Router::new().route(
            "/api/v1/predict/game",
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                StatusCode::OK
            }),
        );
        let base = spawn_upstream(router).await;
        let client = MlApiClient::new(&base, Duration::from_millis(200)).unwrap();
        let err = client.predict_game(&game_request()).await.unwrap_err();
        assert!(err.is_timeout(), "expected timeout, got {err:?}");
    }

    #[test]
    fn test_rejects_invalid_base_url() {
        assert!(MlApiClient::new("not a url", Duration::from_secs(1)).is_err());
    }
}
