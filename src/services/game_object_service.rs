//! Business logic behind the game-object admin table: paged listing with
//! filter and sort, plus create, partial update and delete.

use tracing::{debug, info};
use validator::Validate;

use crate::{
    dao::models::{GameObjectFilter, GameObjectListQuery, GameObjectPatch, NewGameObjectEntity},
    dto::game_object::{
        CreateGameObjectRequest, GameObjectCountResponse, GameObjectFilterParams,
        GameObjectSummary, ListGameObjectsParams, UpdateGameObjectRequest,
    },
    error::ServiceError,
    services::{normalize_optional_text, resolve_tag_ids},
    state::SharedState,
};

/// Translate query-string parameters into an immutable listing query.
fn build_list_query(
    state: &SharedState,
    params: ListGameObjectsParams,
) -> Result<GameObjectListQuery, ServiceError> {
    let config = state.config();
    let limit = params.limit.unwrap_or(config.default_page_size());
    if limit == 0 || limit > config.max_page_size() {
        return Err(ServiceError::InvalidInput(format!(
            "limit must be between 1 and {} (got {limit})",
            config.max_page_size()
        )));
    }

    Ok(GameObjectListQuery {
        filter: GameObjectFilter::new(params.filter, params.tag),
        sort_by: params.sort_by.unwrap_or_default(),
        sort_order: params.sort_order.unwrap_or_default(),
        offset: params.offset.unwrap_or(0),
        limit,
    })
}

/// Return one page of game objects matching the filter.
pub async fn list_game_objects(
    state: &SharedState,
    params: ListGameObjectsParams,
) -> Result<Vec<GameObjectSummary>, ServiceError> {
    let query = build_list_query(state, params)?;
    debug!(?query, "listing game objects");
    let game_objects = state.store().list_game_objects(query).await?;
    Ok(game_objects.into_iter().map(Into::into).collect())
}

/// Count the game objects matching the same predicate as the listing.
pub async fn count_game_objects(
    state: &SharedState,
    params: GameObjectFilterParams,
) -> Result<GameObjectCountResponse, ServiceError> {
    let filter = GameObjectFilter::new(params.filter, params.tag);
    let count = state.store().count_game_objects(filter).await?;
    Ok(GameObjectCountResponse { count })
}

pub async fn get_game_object(state: &SharedState, id: String) -> Result<GameObjectSummary, ServiceError> {
    let Some(game_object) = state.store().find_game_object(id.clone()).await? else {
        return Err(ServiceError::NotFound(format!("game object `{id}` not found")));
    };
    Ok(game_object.into())
}

pub async fn create_game_object(
    state: &SharedState,
    request: CreateGameObjectRequest,
) -> Result<GameObjectSummary, ServiceError> {
    request.validate()?;

    let created = state
        .store()
        .create_game_object(NewGameObjectEntity {
            name: request.name.trim().to_owned(),
            description: normalize_optional_text(request.description),
        })
        .await?;

    info!(id = %created.id, name = %created.name, "game object created");
    Ok(created.into())
}

/// Apply a partial update. A supplied tag list replaces the association set.
pub async fn update_game_object(
    state: &SharedState,
    id: String,
    request: UpdateGameObjectRequest,
) -> Result<GameObjectSummary, ServiceError> {
    request.validate()?;

    let tag_ids = match request.tags {
        Some(tags) => Some(resolve_tag_ids(state, tags).await?),
        None => None,
    };

    let patch = GameObjectPatch {
        id: request.id,
        name: request.name.map(|name| name.trim().to_owned()),
        description: request.description.map(normalize_optional_text),
        tag_ids,
    };

    let Some(updated) = state.store().update_game_object(id.clone(), patch).await? else {
        return Err(ServiceError::NotFound(format!("game object `{id}` not found")));
    };

    info!(id = %id, new_id = %updated.id, "game object updated");
    Ok(updated.into())
}

/// Delete a game object together with its tag links and scores.
pub async fn delete_game_object(state: &SharedState, id: String) -> Result<(), ServiceError> {
    if !state.store().delete_game_object(id.clone()).await? {
        return Err(ServiceError::NotFound(format!("game object `{id}` not found")));
    }
    info!(id = %id, "game object deleted");
    Ok(())
}
