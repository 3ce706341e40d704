use indexmap::IndexSet;
use tracing::info;
use validator::Validate;

use crate::{
    dao::models::NewTagEntity,
    dto::tag::{CreateTagRequest, SetTagGamesRequest, TagDetails},
    error::ServiceError,
    state::SharedState,
};

/// Drop repeated game ids, keeping first occurrences.
fn dedupe_games(games: Vec<String>) -> Vec<String> {
    let games: IndexSet<String> = games.into_iter().collect();
    games.into_iter().collect()
}

/// Return every tag with the games it is an input to, ordered by name.
pub async fn list_tags(state: &SharedState) -> Result<Vec<TagDetails>, ServiceError> {
    let tags = state.store().list_tags().await?;
    Ok(tags.into_iter().map(Into::into).collect())
}

pub async fn create_tag(state: &SharedState, request: CreateTagRequest) -> Result<TagDetails, ServiceError> {
    request.validate()?;

    let tag = state
        .store()
        .create_tag(NewTagEntity {
            name: request.name.trim().to_owned(),
            games: dedupe_games(request.games),
        })
        .await?;

    info!(id = %tag.id, name = %tag.name, games = tag.games.len(), "tag created");
    Ok(tag.into())
}

/// Replace the set of games a tag is an input to.
pub async fn set_tag_games(
    state: &SharedState,
    id: String,
    request: SetTagGamesRequest,
) -> Result<TagDetails, ServiceError> {
    request.validate()?;

    let Some(tag) = state
        .store()
        .set_tag_games(id.clone(), dedupe_games(request.games))
        .await?
    else {
        return Err(ServiceError::NotFound(format!("tag `{id}` not found")));
    };

    info!(id = %tag.id, games = tag.games.len(), "tag games replaced");
    Ok(tag.into())
}

/// Delete a tag and detach it from every game object and list.
pub async fn delete_tag(state: &SharedState, id: String) -> Result<(), ServiceError> {
    if !state.store().delete_tag(id.clone()).await? {
        return Err(ServiceError::NotFound(format!("tag `{id}` not found")));
    }
    info!(id = %id, "tag deleted");
    Ok(())
}
