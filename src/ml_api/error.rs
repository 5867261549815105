use thiserror::Error;

use crate::prediction::{ResponseShapeError, ValidationError};

/// Everything that can go wrong between a raw caller payload and a typed
/// prediction. Callers can tell bad input (`Validation`) from a bad upstream
/// answer (`ResponseShape`, `Upstream`) from a network problem (`Transport`).
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    ResponseShape(#[from] ResponseShapeError),

    /// Non-2xx answer from the prediction service
    #[error("prediction service returned {status}: {body}")]
    Upstream { status: u16, body: String },

    /// 2xx answer whose body could not be decoded
    #[error("malformed response from {endpoint}: {reason}")]
    MalformedBody { endpoint: String, reason: String },

    #[error("prediction service request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl PredictionError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, PredictionError::Transport(e) if e.is_timeout())
    }
}
