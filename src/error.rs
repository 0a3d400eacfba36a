// Error types: server-side `AppError` converted into JSON responses by Axum,
// and the client-side taxonomy surfaced by the listing fetcher and renderer.

use crate::models::MessageResponse;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use thiserror::Error;

pub const NOT_FOUND_MESSAGE: &str = "Car not found";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("listing not found")]
    NotFound,
    #[error("validation failed: {0}")]
    Validation(String),
    #[error(transparent)]
    InternalServerError(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::NotFound => (StatusCode::NOT_FOUND, NOT_FOUND_MESSAGE.to_string()),
            AppError::Validation(message) => {
                tracing::warn!("Rejected listing payload: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::InternalServerError(e) => {
                // Log the detailed error here, the client only sees a generic message
                tracing::error!("Internal server error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Something went wrong!".to_string())
            }
        };
        (status, Json(MessageResponse { message })).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

// --- Client-side errors ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Transport,
    Server,
    NotFound,
    Decode,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("unable to reach listing service: {0}")]
    Transport(String),
    #[error("listing service answered {status}: {body}")]
    Server { status: u16, body: String },
    #[error("listing not found")]
    NotFound,
    #[error("malformed listing response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Transport(_) => FetchErrorKind::Transport,
            FetchError::Server { .. } => FetchErrorKind::Server,
            FetchError::NotFound => FetchErrorKind::NotFound,
            FetchError::Decode(_) => FetchErrorKind::Decode,
        }
    }

    // Message shown to the user; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        match self {
            FetchError::Transport(_) => "Unable to connect to the server. Please check your connection.",
            FetchError::NotFound => "Car not found.",
            FetchError::Server { .. } | FetchError::Decode(_) => "Error loading cars. Please try again later.",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Server { status: status.as_u16(), body: e.to_string() }
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

// A display region could not be produced; callers show an inline warning instead.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("listing {id} cannot be displayed: {reason}")]
    MalformedListing { id: String, reason: &'static str },
    #[error("template failed to render: {0}")]
    Template(String),
}

impl RenderError {
    pub fn user_message(&self) -> &'static str {
        match self {
            RenderError::MalformedListing { .. } => "This listing cannot be displayed right now.",
            RenderError::Template(_) => "Error displaying cars. Please try refreshing the page.",
        }
    }
}
