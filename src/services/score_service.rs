//! Two-hop score resolution: a game selects tags through their "input to
//! games" relation, the tags select game objects, and the game objects select
//! the player's scores.

use tracing::{debug, info};
use validator::Validate;

use crate::{
    dao::models::ScoreUpsertEntity,
    dto::score::{PlayerScoreDto, PlayerScoresQuery, PlayerScoresResponse, RecordScoreRequest},
    error::ServiceError,
    state::{
        SharedState,
        credentials::{CallerIdentity, authorize_player_access},
    },
};

/// Resolve the scores `query.player_id` holds on the game objects relevant to `query.game_id`.
///
/// Results are ordered by score descending; ties keep the store order
/// (game object id ascending). Unknown game or player ids produce an empty list.
pub async fn player_scores(
    state: &SharedState,
    caller: &CallerIdentity,
    query: PlayerScoresQuery,
) -> Result<PlayerScoresResponse, ServiceError> {
    query.validate()?;
    authorize_player_access(caller, &query.player_id)?;

    let include_game_objects = query.include_game_objects();
    let store = state.store();

    let tag_ids = store.tag_ids_for_game(query.game_id.clone()).await?;
    if tag_ids.is_empty() {
        debug!(game_id = %query.game_id, "no tags feed this game");
        return Ok(PlayerScoresResponse {
            player_scores: Vec::new(),
        });
    }

    let game_object_ids = store.game_object_ids_with_any_tag(tag_ids).await?;
    if game_object_ids.is_empty() {
        return Ok(PlayerScoresResponse {
            player_scores: Vec::new(),
        });
    }

    let mut scores = store
        .player_scores(query.player_id, game_object_ids, include_game_objects)
        .await?;
    scores.sort_by(|left, right| right.score.total_cmp(&left.score));

    Ok(PlayerScoresResponse {
        player_scores: scores.into_iter().map(Into::into).collect(),
    })
}

/// Insert or overwrite the score of a player on a game object.
pub async fn record_score(
    state: &SharedState,
    request: RecordScoreRequest,
) -> Result<PlayerScoreDto, ServiceError> {
    request.validate()?;
    if !request.score.is_finite() {
        return Err(ServiceError::InvalidInput(
            "score must be a finite number".into(),
        ));
    }

    let game_object_id = request.game_object_id.clone();
    let Some(score) = state
        .store()
        .upsert_player_score(ScoreUpsertEntity {
            player_id: request.player_id,
            player_name: request.player_name.map(|name| name.trim().to_owned()),
            game_object_id: request.game_object_id,
            score: request.score,
        })
        .await?
    else {
        return Err(ServiceError::InvalidInput(format!(
            "game object `{game_object_id}` does not exist"
        )));
    };

    info!(
        player_id = %score.player_id,
        game_object_id = %score.game_object_id,
        score = score.score,
        "score recorded"
    );
    Ok(score.into())
}

#[cfg(test)]
mod tests {
    use time::{OffsetDateTime, format_description::well_known::Rfc3339};

    use super::*;
    use crate::{
        dto::{
            game_object::{CreateGameObjectRequest, UpdateGameObjectRequest},
            tag::CreateTagRequest,
        },
        services::{game_object_service, tag_service, test_support::memory_state},
    };

    async fn tag(state: &SharedState, name: &str, games: &[&str]) -> String {
        tag_service::create_tag(
            state,
            CreateTagRequest {
                name: name.into(),
                games: games.iter().map(|game| game.to_string()).collect(),
            },
        )
        .await
        .unwrap()
        .id
    }

    async fn game_object(state: &SharedState, id: &str, tags: &[&str]) {
        let created = game_object_service::create_game_object(
            state,
            CreateGameObjectRequest {
                name: format!("{id} name"),
                description: Some(format!("{id} description")),
            },
        )
        .await
        .unwrap();
        game_object_service::update_game_object(
            state,
            created.id,
            UpdateGameObjectRequest {
                id: Some(id.into()),
                tags: Some(tags.iter().map(|tag| tag.to_string()).collect()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    }

    async fn score(state: &SharedState, player_id: &str, game_object_id: &str, value: f64) {
        record_score(
            state,
            RecordScoreRequest {
                player_id: player_id.into(),
                game_object_id: game_object_id.into(),
                score: value,
                player_name: None,
            },
        )
        .await
        .unwrap();
    }

    fn query(game_id: &str, player_id: &str, include: bool) -> PlayerScoresQuery {
        PlayerScoresQuery {
            game_id: game_id.into(),
            player_id: player_id.into(),
            include_game_objects: include.then(|| "true".to_owned()),
        }
    }

    fn values(response: &PlayerScoresResponse) -> Vec<f64> {
        response.player_scores.iter().map(|entry| entry.score).collect()
    }

    #[tokio::test]
    async fn only_scores_on_game_objects_tagged_for_the_game_are_returned() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        let t2 = tag(&state, "t2", &["g2"]).await;
        game_object(&state, "go1", &[t1.as_str()]).await;
        game_object(&state, "go2", &[t2.as_str()]).await;
        score(&state, "p1", "go1", 5.0).await;
        score(&state, "p1", "go2", 7.0).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        assert_eq!(values(&response), [5.0]);
        assert_eq!(response.player_scores[0].game_object_id, "go1");
        assert!(response.player_scores[0].game_object.is_none());
    }

    #[tokio::test]
    async fn scores_are_sorted_descending() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        for (id, value) in [("a", 3.0), ("b", 10.0), ("c", 1.0)] {
            game_object(&state, id, &[t1.as_str()]).await;
            score(&state, "p1", id, value).await;
        }

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        assert_eq!(values(&response), [10.0, 3.0, 1.0]);
    }

    #[tokio::test]
    async fn ties_keep_game_object_order() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        for id in ["b", "a"] {
            game_object(&state, id, &[t1.as_str()]).await;
            score(&state, "p1", id, 4.0).await;
        }

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        let ids: Vec<_> = response
            .player_scores
            .iter()
            .map(|entry| entry.game_object_id.as_str())
            .collect();
        assert_eq!(ids, ["a", "b"]);
    }

    #[tokio::test]
    async fn game_objects_matching_several_tags_appear_once() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        let t2 = tag(&state, "t2", &["g1"]).await;
        game_object(&state, "go1", &[t1.as_str(), t2.as_str()]).await;
        score(&state, "p1", "go1", 2.0).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        assert_eq!(response.player_scores.len(), 1);
    }

    #[tokio::test]
    async fn game_without_tags_yields_no_scores() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["other-game"]).await;
        game_object(&state, "go1", &[t1.as_str()]).await;
        score(&state, "p1", "go1", 9.0).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        assert!(response.player_scores.is_empty());
    }

    #[tokio::test]
    async fn unknown_player_yields_no_scores() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        game_object(&state, "go1", &[t1.as_str()]).await;
        score(&state, "p1", "go1", 9.0).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p2", false))
            .await
            .unwrap();

        assert!(response.player_scores.is_empty());
    }

    #[tokio::test]
    async fn game_objects_are_embedded_on_request() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        game_object(&state, "go1", &[t1.as_str()]).await;
        score(&state, "p1", "go1", 1.5).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", true))
            .await
            .unwrap();

        let embedded = response.player_scores[0].game_object.as_ref().unwrap();
        assert_eq!(embedded.id, "go1");
        assert_eq!(embedded.name, "go1 name");
        assert_eq!(embedded.description.as_deref(), Some("go1 description"));

        let body = serde_json::to_value(&response).unwrap();
        let wire = &body["playerScores"][0]["gameObject"];
        for field in ["createdAt", "updatedAt"] {
            let value = wire[field].as_str().unwrap();
            assert!(OffsetDateTime::parse(value, &Rfc3339).is_ok(), "{field}: {value}");
        }
    }

    #[tokio::test]
    async fn player_credentials_only_read_their_own_scores() {
        let state = memory_state();
        let caller = CallerIdentity::Player {
            player_id: "p1".into(),
        };

        let own = player_scores(&state, &caller, query("g1", "p1", false)).await;
        let other = player_scores(&state, &caller, query("g1", "p2", false)).await;

        assert!(own.is_ok());
        assert!(matches!(other, Err(ServiceError::Forbidden(_))));
    }

    #[tokio::test]
    async fn blank_identifiers_are_invalid() {
        let state = memory_state();
        let result = player_scores(&state, &CallerIdentity::Service, query(" ", "p1", false)).await;
        assert!(matches!(result, Err(ServiceError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn recording_keeps_one_score_per_pair() {
        let state = memory_state();
        let t1 = tag(&state, "t1", &["g1"]).await;
        game_object(&state, "go1", &[t1.as_str()]).await;
        score(&state, "p1", "go1", 1.0).await;
        score(&state, "p1", "go1", 6.0).await;

        let response = player_scores(&state, &CallerIdentity::Service, query("g1", "p1", false))
            .await
            .unwrap();

        assert_eq!(values(&response), [6.0]);
    }

    #[tokio::test]
    async fn recording_rejects_unknown_game_objects_and_non_finite_scores() {
        let state = memory_state();
        game_object(&state, "go1", &[]).await;

        let missing = record_score(
            &state,
            RecordScoreRequest {
                player_id: "p1".into(),
                game_object_id: "nope".into(),
                score: 1.0,
                player_name: None,
            },
        )
        .await;
        let not_finite = record_score(
            &state,
            RecordScoreRequest {
                player_id: "p1".into(),
                game_object_id: "go1".into(),
                score: f64::NAN,
                player_name: None,
            },
        )
        .await;

        assert!(matches!(missing, Err(ServiceError::InvalidInput(_))));
        assert!(matches!(not_finite, Err(ServiceError::InvalidInput(_))));
    }
}
