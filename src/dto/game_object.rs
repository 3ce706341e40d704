//! DTO definitions for the game-object admin endpoints.

use serde::{Deserialize, Serialize};
use serde_with::{NoneAsEmptyString, serde_as};
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::{GameObjectEntity, GameObjectSortField, SortOrder, TagEntity},
    dto::{
        format_timestamp,
        validation::{validate_identifier, validate_identifiers, validate_name},
    },
};

/// Query string of `GET /admin/game-objects`.
#[serde_as]
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListGameObjectsParams {
    /// Case-insensitive substring matched against id, name or description.
    #[serde(default)]
    pub filter: Option<String>,
    /// Exact tag name the game objects must carry.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub sort_by: Option<GameObjectSortField>,
    #[serde(default)]
    pub sort_order: Option<SortOrder>,
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<u64>)]
    pub offset: Option<u64>,
    /// Page size, bounded by the configured maximum.
    #[serde_as(as = "NoneAsEmptyString")]
    #[serde(default)]
    #[param(value_type = Option<u64>)]
    pub limit: Option<u64>,
}

/// Query string of `GET /admin/game-objects/count`.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct GameObjectFilterParams {
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub tag: Option<String>,
}

/// Payload creating a game object. The id is assigned by the backend.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateGameObjectRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Partial update of a game object.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateGameObjectRequest {
    /// New identifier; scores and tag links follow the game object.
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    /// If not specified, the description is left untouched.
    /// If null is specified, the description is removed.
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    /// Tag ids replacing the current association set.
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateGameObjectRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

        if let Some(ref id) = self.id {
            if let Err(e) = validate_identifier(id) {
                errors.add("id", e);
            }
        }

        if let Some(ref name) = self.name {
            if let Err(e) = validate_name(name) {
                errors.add("name", e);
            }
        }

        if let Some(ref tags) = self.tags {
            if let Err(e) = validate_identifiers(tags) {
                errors.add("tags", e);
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Tag reference embedded in game objects and lists.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TagSummary {
    pub id: String,
    pub name: String,
}

/// Game object row as shown in the admin table.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameObjectSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<TagSummary>,
}

/// Total matching a listing filter, used for page-count computation.
#[derive(Debug, Serialize, ToSchema)]
pub struct GameObjectCountResponse {
    pub count: u64,
}

impl From<TagEntity> for TagSummary {
    fn from(tag: TagEntity) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
        }
    }
}

impl From<GameObjectEntity> for GameObjectSummary {
    fn from(entity: GameObjectEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            created_at: format_timestamp(entity.created_at),
            updated_at: format_timestamp(entity.updated_at),
            tags: entity.tags.into_iter().map(Into::into).collect(),
        }
    }
}
