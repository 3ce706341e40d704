use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    middleware,
    routing::{get, put},
};

use crate::{
    dto::{
        game_object::{
            CreateGameObjectRequest, GameObjectCountResponse, GameObjectFilterParams,
            GameObjectSummary, ListGameObjectsParams, UpdateGameObjectRequest,
        },
        list::{CreateListRequest, ListSummary, UpdateListRequest},
        score::{PlayerScoreDto, RecordScoreRequest},
        tag::{CreateTagRequest, SetTagGamesRequest, TagDetails},
    },
    error::AppError,
    routes::auth::{authenticate, require_service},
    services::{game_object_service, list_service, score_service, tag_service},
    state::SharedState,
};

/// Service-only management endpoints backing the admin tables.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route(
            "/admin/game-objects",
            get(list_game_objects).post(create_game_object),
        )
        .route("/admin/game-objects/count", get(count_game_objects))
        .route(
            "/admin/game-objects/{id}",
            get(get_game_object)
                .patch(update_game_object)
                .delete(delete_game_object),
        )
        .route("/admin/tags", get(list_tags).post(create_tag))
        .route("/admin/tags/{id}", axum::routing::delete(delete_tag))
        .route("/admin/tags/{id}/games", put(set_tag_games))
        .route("/admin/lists", get(list_lists).post(create_list))
        .route(
            "/admin/lists/{id}",
            get(get_list).patch(update_list).delete(delete_list),
        )
        .route("/admin/scores", put(record_score))
        .route_layer(middleware::from_fn(require_service))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

/// Page through game objects with optional filter, tag and sort.
#[utoipa::path(
    get,
    path = "/admin/game-objects",
    tag = "admin",
    params(ListGameObjectsParams),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "One page of game objects", body = [GameObjectSummary]),
        (status = 400, description = "Limit outside the configured bounds"),
    )
)]
pub async fn list_game_objects(
    State(state): State<SharedState>,
    Query(params): Query<ListGameObjectsParams>,
) -> Result<Json<Vec<GameObjectSummary>>, AppError> {
    Ok(Json(
        game_object_service::list_game_objects(&state, params).await?,
    ))
}

/// Count the game objects matching a filter.
#[utoipa::path(
    get,
    path = "/admin/game-objects/count",
    tag = "admin",
    params(GameObjectFilterParams),
    security(("bearer" = []), ("api_key" = [])),
    responses((status = 200, description = "Matching total", body = GameObjectCountResponse))
)]
pub async fn count_game_objects(
    State(state): State<SharedState>,
    Query(params): Query<GameObjectFilterParams>,
) -> Result<Json<GameObjectCountResponse>, AppError> {
    Ok(Json(
        game_object_service::count_game_objects(&state, params).await?,
    ))
}

#[utoipa::path(
    get,
    path = "/admin/game-objects/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the game object")),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Game object", body = GameObjectSummary),
        (status = 404, description = "Unknown game object"),
    )
)]
pub async fn get_game_object(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<GameObjectSummary>, AppError> {
    Ok(Json(game_object_service::get_game_object(&state, id).await?))
}

/// Create a game object; its id is assigned by the backend.
#[utoipa::path(
    post,
    path = "/admin/game-objects",
    tag = "admin",
    request_body = CreateGameObjectRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses((status = 201, description = "Game object created", body = GameObjectSummary))
)]
pub async fn create_game_object(
    State(state): State<SharedState>,
    Json(payload): Json<CreateGameObjectRequest>,
) -> Result<(StatusCode, Json<GameObjectSummary>), AppError> {
    let created = game_object_service::create_game_object(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// Commit an inline edit. Supplied tags replace the current set.
#[utoipa::path(
    patch,
    path = "/admin/game-objects/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Current identifier of the game object")),
    request_body = UpdateGameObjectRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Updated game object", body = GameObjectSummary),
        (status = 400, description = "Invalid field or unknown tag"),
        (status = 404, description = "Unknown game object"),
        (status = 409, description = "New id already in use"),
    )
)]
pub async fn update_game_object(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateGameObjectRequest>,
) -> Result<Json<GameObjectSummary>, AppError> {
    Ok(Json(
        game_object_service::update_game_object(&state, id, payload).await?,
    ))
}

#[utoipa::path(
    delete,
    path = "/admin/game-objects/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the game object")),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 204, description = "Game object deleted"),
        (status = 404, description = "Unknown game object"),
    )
)]
pub async fn delete_game_object(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    game_object_service::delete_game_object(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/tags",
    tag = "admin",
    security(("bearer" = []), ("api_key" = [])),
    responses((status = 200, description = "All tags", body = [TagDetails]))
)]
pub async fn list_tags(State(state): State<SharedState>) -> Result<Json<Vec<TagDetails>>, AppError> {
    Ok(Json(tag_service::list_tags(&state).await?))
}

#[utoipa::path(
    post,
    path = "/admin/tags",
    tag = "admin",
    request_body = CreateTagRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 201, description = "Tag created", body = TagDetails),
        (status = 409, description = "Tag name already in use"),
    )
)]
pub async fn create_tag(
    State(state): State<SharedState>,
    Json(payload): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagDetails>), AppError> {
    let tag = tag_service::create_tag(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// Replace the games a tag is an input to.
#[utoipa::path(
    put,
    path = "/admin/tags/{id}/games",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the tag")),
    request_body = SetTagGamesRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Updated tag", body = TagDetails),
        (status = 404, description = "Unknown tag"),
    )
)]
pub async fn set_tag_games(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<SetTagGamesRequest>,
) -> Result<Json<TagDetails>, AppError> {
    Ok(Json(tag_service::set_tag_games(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/tags/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the tag")),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "Unknown tag"),
    )
)]
pub async fn delete_tag(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    tag_service::delete_tag(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    get,
    path = "/admin/lists",
    tag = "admin",
    security(("bearer" = []), ("api_key" = [])),
    responses((status = 200, description = "All lists", body = [ListSummary]))
)]
pub async fn list_lists(State(state): State<SharedState>) -> Result<Json<Vec<ListSummary>>, AppError> {
    Ok(Json(list_service::list_lists(&state).await?))
}

#[utoipa::path(
    get,
    path = "/admin/lists/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the list")),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "List", body = ListSummary),
        (status = 404, description = "Unknown list"),
    )
)]
pub async fn get_list(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<Json<ListSummary>, AppError> {
    Ok(Json(list_service::get_list(&state, id).await?))
}

#[utoipa::path(
    post,
    path = "/admin/lists",
    tag = "admin",
    request_body = CreateListRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses((status = 201, description = "List created", body = ListSummary))
)]
pub async fn create_list(
    State(state): State<SharedState>,
    Json(payload): Json<CreateListRequest>,
) -> Result<(StatusCode, Json<ListSummary>), AppError> {
    let list = list_service::create_list(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(list)))
}

#[utoipa::path(
    patch,
    path = "/admin/lists/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the list")),
    request_body = UpdateListRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Updated list", body = ListSummary),
        (status = 404, description = "Unknown list"),
    )
)]
pub async fn update_list(
    State(state): State<SharedState>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateListRequest>,
) -> Result<Json<ListSummary>, AppError> {
    Ok(Json(list_service::update_list(&state, id, payload).await?))
}

#[utoipa::path(
    delete,
    path = "/admin/lists/{id}",
    tag = "admin",
    params(("id" = String, Path, description = "Identifier of the list")),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 204, description = "List deleted"),
        (status = 404, description = "Unknown list"),
    )
)]
pub async fn delete_list(
    State(state): State<SharedState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    list_service::delete_list(&state, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Record a player's score on a game object, replacing any previous value.
#[utoipa::path(
    put,
    path = "/admin/scores",
    tag = "admin",
    request_body = RecordScoreRequest,
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Stored score", body = PlayerScoreDto),
        (status = 400, description = "Unknown game object or invalid score"),
    )
)]
pub async fn record_score(
    State(state): State<SharedState>,
    Json(payload): Json<RecordScoreRequest>,
) -> Result<Json<PlayerScoreDto>, AppError> {
    Ok(Json(score_service::record_score(&state, payload).await?))
}
