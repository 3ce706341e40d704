//! DTO definitions for the player score query and score recording.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

use crate::{
    dao::models::{GameObjectRecord, PlayerScoreEntity},
    dto::{
        format_timestamp,
        validation::{validate_identifier, validate_name},
    },
};

/// Query string of `GET /games/getPlayerScores`.
#[derive(Debug, Default, Deserialize, IntoParams, Validate)]
#[into_params(parameter_in = Query)]
pub struct PlayerScoresQuery {
    /// Game whose input tags select the game objects.
    #[serde(default)]
    #[validate(custom(function = "validate_identifier"))]
    pub game_id: String,
    /// Player whose scores are returned.
    #[serde(default)]
    #[validate(custom(function = "validate_identifier"))]
    pub player_id: String,
    /// Embed each score's game object when exactly `true`.
    #[serde(default)]
    pub include_game_objects: Option<String>,
}

impl PlayerScoresQuery {
    /// Only the literal `true` enables embedding; any other value means false.
    pub fn include_game_objects(&self) -> bool {
        self.include_game_objects.as_deref() == Some("true")
    }
}

/// Payload recording (or overwriting) a player's score on a game object.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct RecordScoreRequest {
    #[validate(custom(function = "validate_identifier"))]
    pub player_id: String,
    #[validate(custom(function = "validate_identifier"))]
    pub game_object_id: String,
    pub score: f64,
    /// Display name stored on the player; an existing name is kept when omitted.
    #[serde(default)]
    #[validate(custom(function = "validate_name"))]
    pub player_name: Option<String>,
}

/// Response of the score query.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoresResponse {
    pub player_scores: Vec<PlayerScoreDto>,
}

/// One score record, ordered by score descending in responses.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PlayerScoreDto {
    pub player_id: String,
    pub game_object_id: String,
    pub score: f64,
    pub created_at: String,
    pub updated_at: String,
    /// Present only when `include_game_objects=true`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub game_object: Option<ScoredGameObject>,
}

/// Game object embedded in a score record, without its tags.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ScoredGameObject {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<GameObjectRecord> for ScoredGameObject {
    fn from(record: GameObjectRecord) -> Self {
        Self {
            id: record.id,
            name: record.name,
            description: record.description,
            created_at: format_timestamp(record.created_at),
            updated_at: format_timestamp(record.updated_at),
        }
    }
}

impl From<PlayerScoreEntity> for PlayerScoreDto {
    fn from(entity: PlayerScoreEntity) -> Self {
        Self {
            player_id: entity.player_id,
            game_object_id: entity.game_object_id,
            score: entity.score,
            created_at: format_timestamp(entity.created_at),
            updated_at: format_timestamp(entity.updated_at),
            game_object: entity.game_object.map(Into::into),
        }
    }
}
