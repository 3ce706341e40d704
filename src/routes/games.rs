use axum::{
    Extension, Json, Router,
    extract::{Query, State},
    middleware,
    routing::get,
};

use crate::{
    dto::score::{PlayerScoresQuery, PlayerScoresResponse},
    error::AppError,
    routes::auth::authenticate,
    services::score_service,
    state::{SharedState, credentials::CallerIdentity},
};

/// Score queries available to service and player credentials.
pub fn router(state: SharedState) -> Router<SharedState> {
    Router::new()
        .route("/games/getPlayerScores", get(get_player_scores))
        .route_layer(middleware::from_fn_with_state(state, authenticate))
}

/// Scores a player holds on the game objects tagged as inputs to a game.
#[utoipa::path(
    get,
    path = "/games/getPlayerScores",
    tag = "games",
    params(PlayerScoresQuery),
    security(("bearer" = []), ("api_key" = [])),
    responses(
        (status = 200, description = "Scores ordered by value, highest first", body = PlayerScoresResponse),
        (status = 400, description = "Missing game_id or player_id"),
        (status = 401, description = "Missing or unknown credential"),
        (status = 403, description = "Player credential asking for another player's scores"),
    )
)]
pub async fn get_player_scores(
    State(state): State<SharedState>,
    Extension(caller): Extension<CallerIdentity>,
    Query(query): Query<PlayerScoresQuery>,
) -> Result<Json<PlayerScoresResponse>, AppError> {
    Ok(Json(
        score_service::player_scores(&state, &caller, query).await?,
    ))
}
