//! HTTP mapping for handler failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use message_api_handler::HandlerError;
use tracing::error;

/// A handler failure on its way out as a 500
#[derive(Debug)]
pub struct ApiError(HandlerError);

impl From<HandlerError> for ApiError {
    fn from(err: HandlerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!("Request failed: {}", self.0);
        StatusCode::INTERNAL_SERVER_ERROR.into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
