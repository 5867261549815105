//! Validating gateway between a sports-prediction frontend and its ML
//! prediction API.
//!
//! Raw requests from UI form state are validated and normalized before they
//! reach the prediction service, and the service's answers are checked against
//! the result contract before they reach callers.

pub mod config;
pub mod gateway;
pub mod ml_api;
pub mod prediction;
