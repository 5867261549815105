use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::PredictionError;
use crate::prediction::{
    validate_game_request, validate_player_request, GamePredictionRequest, GamePredictionResult,
    PlayerStatsRequest, PlayerStatsResult,
};

/// Health report of the prediction service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: Option<bool>,
}

/// Trait that every prediction backend must implement.
///
/// Only normalized request types cross this seam, so a malformed request can
/// never reach the network.
#[async_trait]
pub trait PredictionService: Send + Sync {
    async fn predict_game(
        &self,
        request: &GamePredictionRequest,
    ) -> Result<GamePredictionResult, PredictionError>;

    async fn predict_player(
        &self,
        request: &PlayerStatsRequest,
    ) -> Result<PlayerStatsResult, PredictionError>;

    async fn health(&self) -> Result<ServiceHealth, PredictionError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}

/// Validate raw caller input, then ask `service` for a game prediction.
pub async fn predict_game_raw(
    service: &dyn PredictionService,
    raw: &Value,
) -> Result<GamePredictionResult, PredictionError> {
    let request = validate_game_request(raw)?;
    service.predict_game(&request).await
}

/// Validate raw caller input, then ask `service` for a player prediction.
pub async fn predict_player_raw(
    service: &dyn PredictionService,
    raw: &Value,
) -> Result<PlayerStatsResult, PredictionError> {
    let request = validate_player_request(raw)?;
    service.predict_player(&request).await
}
