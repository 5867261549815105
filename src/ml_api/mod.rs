pub mod client;
pub mod error;
pub mod service;

pub use client::MlApiClient;
pub use error::PredictionError;
pub use service::{predict_game_raw, predict_player_raw, PredictionService, ServiceHealth};
