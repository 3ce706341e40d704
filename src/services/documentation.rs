use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the game object admin backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::games::get_player_scores,
        crate::routes::admin::list_game_objects,
        crate::routes::admin::count_game_objects,
        crate::routes::admin::get_game_object,
        crate::routes::admin::create_game_object,
        crate::routes::admin::update_game_object,
        crate::routes::admin::delete_game_object,
        crate::routes::admin::list_tags,
        crate::routes::admin::create_tag,
        crate::routes::admin::set_tag_games,
        crate::routes::admin::delete_tag,
        crate::routes::admin::list_lists,
        crate::routes::admin::get_list,
        crate::routes::admin::create_list,
        crate::routes::admin::update_list,
        crate::routes::admin::delete_list,
        crate::routes::admin::record_score,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::health::HealthStatus,
            crate::dto::game_object::GameObjectSummary,
            crate::dto::game_object::GameObjectCountResponse,
            crate::dto::game_object::CreateGameObjectRequest,
            crate::dto::game_object::UpdateGameObjectRequest,
            crate::dto::game_object::TagSummary,
            crate::dto::tag::CreateTagRequest,
            crate::dto::tag::SetTagGamesRequest,
            crate::dto::tag::TagDetails,
            crate::dto::list::CreateListRequest,
            crate::dto::list::UpdateListRequest,
            crate::dto::list::ListSummary,
            crate::dto::score::RecordScoreRequest,
            crate::dto::score::PlayerScoresResponse,
            crate::dto::score::PlayerScoreDto,
            crate::dto::score::ScoredGameObject,
            crate::dao::models::GameObjectSortField,
            crate::dao::models::SortOrder,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "games", description = "Score queries for game clients"),
        (name = "admin", description = "Game object, tag, list and score administration"),
    )
)]
pub struct ApiDoc;

/// Registers the two accepted credential headers.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
        );
        components.add_security_scheme(
            "api_key",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-api-key"))),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_the_score_query() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/games/getPlayerScores"));
        assert!(doc.paths.paths.contains_key("/admin/game-objects/{id}"));
    }
}
