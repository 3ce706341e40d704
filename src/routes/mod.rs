use axum::Router;

use crate::state::SharedState;

pub mod admin;
pub mod auth;
pub mod docs;
pub mod games;
pub mod health;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(games::router(state.clone()))
        .merge(admin::router(state.clone()));

    api_router.merge(docs::router()).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{
        config::AppConfig, dao::admin_store::memory::MemoryAdminStore, state::AppState,
    };

    const SERVICE_TOKEN: &str = "service-token";
    const PLAYER_TOKEN: &str = "player-one-token";

    fn app() -> Router {
        let config = AppConfig::default()
            .with_service_token(SERVICE_TOKEN)
            .with_player_token(PLAYER_TOKEN, "p1");
        router(AppState::new(config, Arc::new(MemoryAdminStore::new())))
    }

    fn get(uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).unwrap()
    }

    fn send_json(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("x-api-key", SERVICE_TOKEN)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    #[tokio::test]
    async fn healthcheck_needs_no_credential() {
        let (status, body) = call(&app(), get("/healthcheck", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn missing_or_unknown_credentials_are_unauthorized() {
        let app = app();
        let uri = "/games/getPlayerScores?game_id=g1&player_id=p1";

        let (missing, body) = call(&app, get(uri, None)).await;
        let (unknown, _) = call(&app, get(uri, Some("nope"))).await;

        assert_eq!(missing, StatusCode::UNAUTHORIZED);
        assert!(body["message"].is_string());
        assert_eq!(unknown, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn player_credentials_are_scoped() {
        let app = app();

        let (own, body) = call(
            &app,
            get("/games/getPlayerScores?game_id=g1&player_id=p1", Some(PLAYER_TOKEN)),
        )
        .await;
        let (other, _) = call(
            &app,
            get("/games/getPlayerScores?game_id=g1&player_id=p2", Some(PLAYER_TOKEN)),
        )
        .await;
        let (admin, _) = call(&app, get("/admin/tags", Some(PLAYER_TOKEN))).await;

        assert_eq!(own, StatusCode::OK);
        assert_eq!(body, json!({ "playerScores": [] }));
        assert_eq!(other, StatusCode::FORBIDDEN);
        assert_eq!(admin, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_query_parameters_are_bad_requests() {
        let (status, _) = call(
            &app(),
            get("/games/getPlayerScores?player_id=p1", Some(SERVICE_TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn admin_configures_data_read_by_the_score_query() {
        let app = app();

        let (status, tag) = call(
            &app,
            send_json("POST", "/admin/tags", json!({ "name": "weapons", "games": ["g1"] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, created) = call(
            &app,
            send_json("POST", "/admin/game-objects", json!({ "name": "Sword" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let tag_id = tag["id"].clone();
        let uri = format!("/admin/game-objects/{}", created["id"].as_str().unwrap());
        let (status, updated) = call(
            &app,
            send_json(
                "PATCH",
                &uri,
                json!({ "id": "sword", "description": "Sharp", "tags": [tag_id] }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["id"], "sword");
        assert_eq!(updated["tags"][0]["name"], "weapons");

        let (status, _) = call(
            &app,
            send_json(
                "PUT",
                "/admin/scores",
                json!({ "player_id": "p1", "game_object_id": "sword", "score": 42.5 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, scores) = call(
            &app,
            get(
                "/games/getPlayerScores?game_id=g1&player_id=p1&include_game_objects=true",
                Some(PLAYER_TOKEN),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let entry = &scores["playerScores"][0];
        assert_eq!(entry["gameObjectId"], "sword");
        assert_eq!(entry["score"], 42.5);
        assert_eq!(entry["gameObject"]["name"], "Sword");
        assert_eq!(entry["gameObject"]["description"], "Sharp");

        let (status, count) = call(
            &app,
            get("/admin/game-objects/count?tag=weapons", Some(SERVICE_TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count["count"], 1);
    }

    #[tokio::test]
    async fn patching_an_unknown_game_object_is_not_found() {
        let (status, _) = call(
            &app(),
            send_json("PATCH", "/admin/game-objects/ghost", json!({ "name": "Boo" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn empty_paging_parameters_fall_back_to_defaults() {
        let (status, body) = call(
            &app(),
            get("/admin/game-objects?filter=&offset=&limit=", Some(SERVICE_TOKEN)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));
    }

    #[tokio::test]
    async fn openapi_document_is_served() {
        let (status, body) = call(&app(), get("/api-doc/openapi.json", None)).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["paths"]["/games/getPlayerScores"].is_object());
    }
}
