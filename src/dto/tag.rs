//! DTO definitions for tag management.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::{
    dao::models::TagWithGamesEntity,
    dto::validation::{validate_identifiers, validate_name},
};

/// Payload creating a tag, optionally wired to the games it feeds.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateTagRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    /// Game identifiers this tag is an input to.
    #[serde(default)]
    #[validate(custom(function = "validate_identifiers"))]
    pub games: Vec<String>,
}

/// Replacement set of games a tag is an input to.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct SetTagGamesRequest {
    #[validate(custom(function = "validate_identifiers"))]
    pub games: Vec<String>,
}

/// Tag with the games it is an input to.
#[derive(Debug, Serialize, ToSchema)]
pub struct TagDetails {
    pub id: String,
    pub name: String,
    pub games: Vec<String>,
}

impl From<TagWithGamesEntity> for TagDetails {
    fn from(tag: TagWithGamesEntity) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            games: tag.games,
        }
    }
}
