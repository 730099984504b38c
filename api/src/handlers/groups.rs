//! Group handlers
//!
//! Endpoints for creating a group, viewing it, and unlocking editor access.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::IssuedToken;
use crate::domain::entities::{Group, Match, Player};
use crate::error::AppError;
use crate::AppState;

/// Request body for group creation
#[derive(Debug, Deserialize)]
pub struct CreateGroupRequest {
    pub name: String,
    /// Preferred URL slug; derived from the name when absent
    #[serde(default)]
    pub slug: Option<String>,
    pub pin: String,
}

#[derive(Debug, Serialize)]
pub struct GroupResponse {
    pub group: Group,
}

/// Public view of a group
#[derive(Debug, Serialize)]
pub struct GroupOverview {
    pub group: Group,
    pub players: Vec<Player>,
    /// Newest first
    pub matches: Vec<Match>,
}

#[derive(Debug, Deserialize)]
pub struct UnlockRequest {
    pub pin: String,
}

/// POST /groups
pub async fn create_group(
    State(state): State<AppState>,
    Json(request): Json<CreateGroupRequest>,
) -> Result<(StatusCode, Json<GroupResponse>), AppError> {
    let group = state
        .group_service
        .create(&request.name, request.slug.as_deref(), &request.pin)
        .await?;

    Ok((StatusCode::CREATED, Json(GroupResponse { group })))
}

/// GET /groups/:slug
///
/// Group, roster and recent match history. No authentication required.
pub async fn get_group(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<GroupOverview>, AppError> {
    let group = state.group_service.find_by_slug(&slug).await?;
    let players = state.player_service.list(&group.id).await?;
    let matches = state.match_service.history(&group.id).await?;

    Ok(Json(GroupOverview {
        group,
        players,
        matches,
    }))
}

/// POST /groups/:slug/unlock
///
/// Exchange the group PIN for an editor token.
pub async fn unlock(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(request): Json<UnlockRequest>,
) -> Result<Json<IssuedToken>, AppError> {
    let issued = state.group_service.unlock(&slug, &request.pin).await?;
    Ok(Json(issued))
}
