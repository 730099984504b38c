//! Match handlers
//!
//! Recommendation, score submission and score edits. All require an
//! editor token.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app::{SubmitOutcome, SubmittedMatch};
use crate::auth::Editor;
use crate::domain::entities::{Match, MatchId, PlayerId, Recommendation};
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct RecommendResponse {
    pub recommendation: Recommendation,
}

/// Request body for submitting a completed match
#[derive(Debug, Deserialize)]
pub struct SubmitScoreRequest {
    pub player_ids: Vec<PlayerId>,
    pub team_a: Vec<PlayerId>,
    pub team_b: Vec<PlayerId>,
    pub score_a: i64,
    pub score_b: i64,
}

impl From<SubmitScoreRequest> for SubmittedMatch {
    fn from(request: SubmitScoreRequest) -> Self {
        SubmittedMatch {
            player_ids: request.player_ids,
            team_a: request.team_a,
            team_b: request.team_b,
            score_a: request.score_a,
            score_b: request.score_b,
        }
    }
}

/// Request body for correcting a recorded score
#[derive(Debug, Deserialize)]
pub struct EditScoreRequest {
    pub match_id: Uuid,
    pub score_a: i64,
    pub score_b: i64,
}

#[derive(Debug, Serialize)]
pub struct EditScoreResponse {
    #[serde(rename = "match")]
    pub edited: Match,
}

/// POST /groups/:slug/recommend
pub async fn recommend(
    State(state): State<AppState>,
    editor: Editor,
) -> Result<Json<RecommendResponse>, AppError> {
    let recommendation = state.match_service.recommend(&editor.group.id).await?;
    Ok(Json(RecommendResponse { recommendation }))
}

/// POST /groups/:slug/submit_score
///
/// Record a match, update ratings and return the next recommendation.
pub async fn submit_score(
    State(state): State<AppState>,
    editor: Editor,
    Json(request): Json<SubmitScoreRequest>,
) -> Result<Json<SubmitOutcome>, AppError> {
    let outcome = state
        .match_service
        .submit_score(&editor.group.id, request.into())
        .await?;
    Ok(Json(outcome))
}

/// POST /groups/:slug/edit_score
pub async fn edit_score(
    State(state): State<AppState>,
    editor: Editor,
    Json(request): Json<EditScoreRequest>,
) -> Result<Json<EditScoreResponse>, AppError> {
    let edited = state
        .match_service
        .edit_score(
            &editor.group.id,
            &MatchId(request.match_id),
            request.score_a,
            request.score_b,
        )
        .await?;
    Ok(Json(EditScoreResponse { edited }))
}
