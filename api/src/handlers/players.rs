//! Player handlers
//!
//! Roster mutations. All actions require an editor token.

use axum::{extract::State, Json};
use serde::Serialize;

use crate::app::PlayerAction;
use crate::auth::Editor;
use crate::domain::entities::Player;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PlayersResponse {
    pub players: Vec<Player>,
}

/// POST /groups/:slug/players
///
/// Apply one `PlayerAction` (add, presence, update) and return the roster.
pub async fn update_players(
    State(state): State<AppState>,
    editor: Editor,
    Json(action): Json<PlayerAction>,
) -> Result<Json<PlayersResponse>, AppError> {
    let players = state.player_service.apply(&editor.group.id, action).await?;
    Ok(Json(PlayersResponse { players }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PresenceUpdate;
    use crate::test_utils::player_id;

    #[test]
    fn parse_add_action() {
        let json = r#"{"action": "add", "name": "Sam", "rating": 3.75}"#;
        let action: PlayerAction = serde_json::from_str(json).unwrap();
        assert_eq!(
            action,
            PlayerAction::Add {
                name: "Sam".to_string(),
                rating: 3.75
            }
        );
    }

    #[test]
    fn parse_presence_action() {
        let id = player_id(1);
        let json = format!(
            r#"{{"action": "presence", "updates": [{{"player_id": "{}", "is_present": false}}]}}"#,
            id
        );
        let action: PlayerAction = serde_json::from_str(&json).unwrap();
        assert_eq!(
            action,
            PlayerAction::Presence {
                updates: vec![PresenceUpdate {
                    player_id: id,
                    is_present: false
                }]
            }
        );
    }

    #[test]
    fn parse_update_action_with_only_rating() {
        let id = player_id(2);
        let json = format!(r#"{{"action": "update", "player_id": "{}", "rating": 4.0}}"#, id);
        let action: PlayerAction = serde_json::from_str(&json).unwrap();
        assert_eq!(
            action,
            PlayerAction::Update {
                player_id: id,
                name: None,
                rating: Some(4.0)
            }
        );
    }

    #[test]
    fn parse_unknown_action_fails() {
        let json = r#"{"action": "delete", "player_id": "x"}"#;
        let result: Result<PlayerAction, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
