pub mod memory;
#[cfg(feature = "sqlite-store")]
pub mod sqlite;

use std::cmp::Ordering;

use futures::future::BoxFuture;

use crate::dao::models::{
    GameObjectEntity, GameObjectFilter, GameObjectListQuery, GameObjectPatch, GameObjectSortField,
    ListEntity, ListPatch, NewGameObjectEntity, NewListEntity, NewTagEntity, PlayerScoreEntity,
    ScoreUpsertEntity, SortOrder, TagWithGamesEntity,
};
use crate::dao::storage::StorageResult;

/// Abstraction over the relational store holding game objects, tags, lists and scores.
pub trait AdminStore: Send + Sync {
    fn list_game_objects(
        &self,
        query: GameObjectListQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<GameObjectEntity>>>;
    fn count_game_objects(&self, filter: GameObjectFilter) -> BoxFuture<'static, StorageResult<u64>>;
    fn find_game_object(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>>;
    fn create_game_object(
        &self,
        game_object: NewGameObjectEntity,
    ) -> BoxFuture<'static, StorageResult<GameObjectEntity>>;
    /// Apply a patch, returning `None` when the game object does not exist.
    fn update_game_object(
        &self,
        id: String,
        patch: GameObjectPatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>>;
    fn delete_game_object(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;

    fn list_tags(&self) -> BoxFuture<'static, StorageResult<Vec<TagWithGamesEntity>>>;
    fn create_tag(&self, tag: NewTagEntity) -> BoxFuture<'static, StorageResult<TagWithGamesEntity>>;
    /// Replace the set of games a tag is an input to.
    fn set_tag_games(
        &self,
        id: String,
        games: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Option<TagWithGamesEntity>>>;
    fn delete_tag(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;
    /// Return the subset of `ids` that does not name an existing tag.
    fn find_missing_tags(&self, ids: Vec<String>) -> BoxFuture<'static, StorageResult<Vec<String>>>;

    fn list_lists(&self) -> BoxFuture<'static, StorageResult<Vec<ListEntity>>>;
    fn find_list(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ListEntity>>>;
    fn create_list(&self, list: NewListEntity) -> BoxFuture<'static, StorageResult<ListEntity>>;
    fn update_list(
        &self,
        id: String,
        patch: ListPatch,
    ) -> BoxFuture<'static, StorageResult<Option<ListEntity>>>;
    fn delete_list(&self, id: String) -> BoxFuture<'static, StorageResult<bool>>;

    /// Tags whose "input to games" set contains `game_id`.
    fn tag_ids_for_game(&self, game_id: String) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Distinct game objects carrying at least one of `tag_ids`. An empty input yields nothing.
    fn game_object_ids_with_any_tag(
        &self,
        tag_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>>;
    /// Scores of `player_id` restricted to `game_object_ids`, ordered by game object id.
    fn player_scores(
        &self,
        player_id: String,
        game_object_ids: Vec<String>,
        include_game_objects: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerScoreEntity>>>;
    /// Insert or update a score, returning `None` when the game object does not exist.
    fn upsert_player_score(
        &self,
        score: ScoreUpsertEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerScoreEntity>>>;

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>>;
}

/// Ordering used by every backend for game-object listings. Ties fall back to
/// the id ascending so pages are stable.
pub(crate) fn compare_game_objects(
    left: &GameObjectEntity,
    right: &GameObjectEntity,
    sort_by: GameObjectSortField,
    sort_order: SortOrder,
) -> Ordering {
    let primary = match sort_by {
        GameObjectSortField::Id => left.id.cmp(&right.id),
        GameObjectSortField::Name => left.name.cmp(&right.name),
        GameObjectSortField::Description => left
            .description
            .as_deref()
            .unwrap_or_default()
            .cmp(right.description.as_deref().unwrap_or_default()),
        GameObjectSortField::Tags => left.tags.len().cmp(&right.tags.len()),
        GameObjectSortField::UpdatedAt => left.updated_at.cmp(&right.updated_at),
    };
    let primary = match sort_order {
        SortOrder::Asc => primary,
        SortOrder::Desc => primary.reverse(),
    };
    primary.then_with(|| left.id.cmp(&right.id))
}

/// Whether a game object matches the listing filter.
pub(crate) fn matches_filter(game_object: &GameObjectEntity, filter: &GameObjectFilter) -> bool {
    let text_matches = filter.text.as_deref().is_none_or(|needle| {
        let needle = needle.to_ascii_lowercase();
        [
            Some(game_object.id.as_str()),
            Some(game_object.name.as_str()),
            game_object.description.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|haystack| haystack.to_ascii_lowercase().contains(&needle))
    });
    let tag_matches = filter
        .tag
        .as_deref()
        .is_none_or(|tag| game_object.tags.iter().any(|candidate| candidate.name == tag));
    text_matches && tag_matches
}
