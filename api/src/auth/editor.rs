//! Editor access extractor
//!
//! Resolves the `:slug` group of the request and checks the bearer token
//! against it. Missing or invalid tokens are 401; a valid token for a
//! different group is 403.

use axum::{
    extract::{FromRequestParts, Path},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::domain::entities::Group;
use crate::error::AppError;
use crate::AppState;

/// A request authorized to edit `group`
#[derive(Debug, Clone)]
pub struct Editor {
    pub group: Group,
}

/// Extract the token from an `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[axum::async_trait]
impl FromRequestParts<AppState> for Editor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Path(slug) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;

        let group = state.group_service.find_by_slug(&slug).await?;
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        state.group_service.authorize_editor(&group, token)?;

        Ok(Editor { group })
    }
}
