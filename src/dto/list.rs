//! DTO definitions for list management.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::{Validate, ValidationErrors};

use crate::{
    dao::models::ListEntity,
    dto::{
        format_timestamp,
        game_object::TagSummary,
        validation::{validate_identifiers, validate_name},
    },
};

/// Payload creating a list.
#[derive(Debug, Deserialize, ToSchema, Validate)]
pub struct CreateListRequest {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Tag ids attached to the list.
    #[serde(default)]
    #[validate(custom(function = "validate_identifiers"))]
    pub tags: Vec<String>,
}

/// Partial update of a list, with the same field semantics as game objects.
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateListRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, with = "::serde_with::rust::double_option")]
    #[schema(value_type = Option<String>)]
    pub description: Option<Option<String>>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl Validate for UpdateListRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();

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

#[derive(Debug, Serialize, ToSchema)]
pub struct ListSummary {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<TagSummary>,
}

impl From<ListEntity> for ListSummary {
    fn from(entity: ListEntity) -> Self {
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
