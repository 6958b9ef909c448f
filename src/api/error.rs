use axum::{
    Json,
    extract::rejection::{BytesRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

use crate::{model::validation::ValidationError, store::StoreError};

/// Every failure reaches the client as a 500 carrying the message.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Cast to Number failed for value \"{value}\" at path \"{path}\"")]
    Cast { value: String, path: &'static str },

    #[error(transparent)]
    Query(#[from] QueryRejection),

    #[error(transparent)]
    Body(#[from] BytesRejection),
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error = self.to_string();
        error!(error = %error, "request failed");

        (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorBody { error })).into_response()
    }
}
