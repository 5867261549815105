pub mod accuracy;
pub mod models;
pub mod teams;
pub mod validator;

pub use models::{
    FieldError, GamePredictionRequest, GamePredictionResult, PlayerStatsRequest,
    PlayerStatsResult, PredictionKind, PredictionResult, ResponseShapeError, ValidationError,
};
pub use validator::{
    parse_game_response, parse_player_response, parse_prediction_response,
    validate_game_request, validate_player_request,
};
