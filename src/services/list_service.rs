use tracing::info;
use validator::Validate;

use crate::{
    dao::models::{ListPatch, NewListEntity},
    dto::list::{CreateListRequest, ListSummary, UpdateListRequest},
    error::ServiceError,
    services::{normalize_optional_text, resolve_tag_ids},
    state::SharedState,
};

pub async fn list_lists(state: &SharedState) -> Result<Vec<ListSummary>, ServiceError> {
    let lists = state.store().list_lists().await?;
    Ok(lists.into_iter().map(Into::into).collect())
}

pub async fn get_list(state: &SharedState, id: String) -> Result<ListSummary, ServiceError> {
    let Some(list) = state.store().find_list(id.clone()).await? else {
        return Err(ServiceError::NotFound(format!("list `{id}` not found")));
    };
    Ok(list.into())
}

pub async fn create_list(state: &SharedState, request: CreateListRequest) -> Result<ListSummary, ServiceError> {
    request.validate()?;
    let tag_ids = resolve_tag_ids(state, request.tags).await?;

    let list = state
        .store()
        .create_list(NewListEntity {
            name: request.name.trim().to_owned(),
            description: normalize_optional_text(request.description),
            tag_ids,
        })
        .await?;

    info!(id = %list.id, name = %list.name, "list created");
    Ok(list.into())
}

/// Apply a partial update; a supplied tag list replaces the current one.
pub async fn update_list(
    state: &SharedState,
    id: String,
    request: UpdateListRequest,
) -> Result<ListSummary, ServiceError> {
    request.validate()?;

    let tag_ids = match request.tags {
        Some(tags) => Some(resolve_tag_ids(state, tags).await?),
        None => None,
    };
    let patch = ListPatch {
        name: request.name.map(|name| name.trim().to_owned()),
        description: request.description.map(normalize_optional_text),
        tag_ids,
    };

    let Some(list) = state.store().update_list(id.clone(), patch).await? else {
        return Err(ServiceError::NotFound(format!("list `{id}` not found")));
    };

    info!(id = %id, "list updated");
    Ok(list.into())
}

pub async fn delete_list(state: &SharedState, id: String) -> Result<(), ServiceError> {
    if !state.store().delete_list(id.clone()).await? {
        return Err(ServiceError::NotFound(format!("list `{id}` not found")));
    }
    info!(id = %id, "list deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        dto::tag::CreateTagRequest,
        services::{tag_service, test_support::memory_state},
    };

    #[tokio::test]
    async fn lists_round_trip_through_crud() {
        let state = memory_state();
        let tag = tag_service::create_tag(
            &state,
            CreateTagRequest {
                name: "starter".into(),
                games: Vec::new(),
            },
        )
        .await
        .unwrap();

        let list = create_list(
            &state,
            CreateListRequest {
                name: "Starter kit".into(),
                description: Some("  ".into()),
                tags: vec![tag.id.clone()],
            },
        )
        .await
        .unwrap();
        assert_eq!(list.description, None);
        assert_eq!(list.tags[0].id, tag.id);

        let updated = update_list(
            &state,
            list.id.clone(),
            UpdateListRequest {
                name: Some("Kit".into()),
                tags: Some(Vec::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.name, "Kit");
        assert!(updated.tags.is_empty());

        assert_eq!(list_lists(&state).await.unwrap().len(), 1);
        delete_list(&state, list.id.clone()).await.unwrap();
        assert!(matches!(
            get_list(&state, list.id).await,
            Err(ServiceError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn unknown_tags_are_rejected_on_create() {
        let state = memory_state();
        let result = create_list(
            &state,
            CreateListRequest {
                name: "Broken".into(),
                description: None,
                tags: vec!["missing".into()],
            },
        )
        .await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }
}
