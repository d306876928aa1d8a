use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use muster_core::{CsvError, RepoError};
use serde::Serialize;

use crate::config::ConfigError;

/// Error returned by request handlers, rendered as `{ "error": message }`.
#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error(transparent)]
    Repo(#[from] RepoError),
    #[error("invalid roster csv: {0}")]
    Csv(#[from] CsvError),
    #[error("invalid json body: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid request body: {0}")]
    JsonRejection(#[from] JsonRejection),
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    NotFound(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Repo(RepoError::EventNotFound(_) | RepoError::PersonNotFound { .. })
            | Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Repo(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Csv(_) | Self::Json(_) | Self::JsonRejection(_) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(
                "event=http_error module=server status=error http_status={} error={}",
                status.as_u16(),
                self
            );
        }
        (
            status,
            Json(ErrorBody {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

/// Startup and serve-loop failures.
#[derive(thiserror::Error, Debug)]
pub enum ServerError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("logging error: {0}")]
    Logging(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("repository error: {0}")]
    Repo(#[from] RepoError),
    #[error("roster csv error: {0}")]
    Csv(#[from] CsvError),
}
