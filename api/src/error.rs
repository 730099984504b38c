//! Unified error types for the Rally API
//!
//! This module defines error types for each layer:
//! - `DomainError`: Storage and validation errors
//! - `MatchmakingError`, `SubmissionError`, `RatingError`: closed failure kinds of the pure core
//! - `AppError`: Application layer errors (wraps the above for HTTP responses)

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::domain::entities::{MatchId, PlayerId};

/// Domain layer errors - storage and input validation
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {0}")]
    NotFound(String),

    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures while choosing the next match
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MatchmakingError {
    #[error("At least 4 present players are required (have {present})")]
    InsufficientPresentPlayers { present: usize },

    #[error("No valid 6-player matchup satisfies no-repeat and sit/play fairness constraints. Adjust presence and try again.")]
    NoValidMatchup,

    #[error("Unable to generate recommendation")]
    NoCandidateSet,

    #[error("Matchmaking invariant violated: {0}")]
    InvariantViolation(String),
}

/// Rejections of a client-submitted match
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SubmissionError {
    #[error("Submitted matchup is not valid: {0}")]
    InvalidShape(String),

    #[error("Matchup was used in the last {window} games. Use a different matchup.")]
    MatchupRepeated { window: usize },

    #[error("Submitted players must be present in group")]
    SubmittedPlayersNotPresent,
}

/// Rating engine failures
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RatingError {
    #[error("Missing rating for player {0}")]
    MissingRating(PlayerId),

    #[error("Doubles rating update requires exactly 2 players per team (got {team_a} and {team_b})")]
    BadTeamShape { team_a: usize, team_b: usize },

    #[error("Match {0} cannot be edited because pre-match rating snapshot is missing")]
    MissingRatingSnapshot(MatchId),
}

/// Application layer errors - used by HTTP handlers
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("{0}")]
    Matchmaking(#[from] MatchmakingError),

    #[error("{0}")]
    Submission(#[from] SubmissionError),

    #[error("{0}")]
    Rating(#[from] RatingError),

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden")]
    Forbidden,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, Option<String>) {
        match self {
            AppError::Domain(DomainError::NotFound(msg)) => {
                (StatusCode::NOT_FOUND, "Not found", Some(msg.clone()))
            }
            AppError::Domain(DomainError::AlreadyExists(msg)) => {
                (StatusCode::CONFLICT, "Already exists", Some(msg.clone()))
            }
            AppError::Domain(DomainError::Validation(msg)) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),
            AppError::Domain(DomainError::Database(msg)) => {
                tracing::error!("Database error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Domain(DomainError::Internal(msg)) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Matchmaking(MatchmakingError::InvariantViolation(msg)) => {
                tracing::error!("Matchmaking invariant violated: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::Matchmaking(e) => (
                StatusCode::BAD_REQUEST,
                "Matchmaking error",
                Some(e.to_string()),
            ),
            AppError::Submission(e) => (
                StatusCode::BAD_REQUEST,
                "Submission rejected",
                Some(e.to_string()),
            ),
            AppError::Rating(e @ RatingError::MissingRatingSnapshot(_)) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(e.to_string()))
            }
            AppError::Rating(e) => {
                tracing::error!("Rating error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
            AppError::BadRequest(msg) => {
                (StatusCode::BAD_REQUEST, "Bad request", Some(msg.clone()))
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized", None),
            AppError::Forbidden => (StatusCode::FORBIDDEN, "Forbidden", None),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "Not found", Some(msg.clone())),
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error, details) = self.parts();

        let body = Json(ErrorResponse {
            error: error.to_string(),
            details,
        });

        (status, body).into_response()
    }
}
