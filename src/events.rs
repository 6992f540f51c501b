// Event types for async communication

use crate::api::ApiError;
use crate::models::PlayResponse;

#[derive(Debug)]
pub enum AppEvent {
    /// The in-flight exchange settled
    ExchangeFinished(Result<PlayResponse, ApiError>),
}
