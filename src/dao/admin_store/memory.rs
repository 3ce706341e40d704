//! In-process [`AdminStore`] used when no database is configured and by the test suite.
//! It mirrors the relational semantics of the SQL backend, including cascading
//! deletes and id renames.

use std::sync::Arc;

use futures::future::BoxFuture;
use indexmap::{IndexMap, IndexSet};
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AdminStore, compare_game_objects, matches_filter};
use crate::dao::{
    models::{
        GameObjectEntity, GameObjectFilter, GameObjectListQuery, GameObjectPatch,
        GameObjectRecord, ListEntity, ListPatch, NewGameObjectEntity, NewListEntity, NewTagEntity,
        PlayerScoreEntity, ScoreUpsertEntity, TagEntity, TagWithGamesEntity, current_timestamp,
    },
    storage::{StorageError, StorageResult},
};

#[derive(Clone, Default)]
pub struct MemoryAdminStore {
    tables: Arc<RwLock<Tables>>,
}

#[derive(Default)]
struct Tables {
    game_objects: IndexMap<String, GameObjectRow>,
    tags: IndexMap<String, TagRow>,
    lists: IndexMap<String, ListRow>,
    players: IndexMap<String, Option<String>>,
    scores: IndexMap<(String, String), ScoreRow>,
}

#[derive(Clone)]
struct GameObjectRow {
    name: String,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    tag_ids: IndexSet<String>,
}

#[derive(Clone)]
struct TagRow {
    name: String,
    games: IndexSet<String>,
}

#[derive(Clone)]
struct ListRow {
    name: String,
    description: Option<String>,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
    tag_ids: IndexSet<String>,
}

#[derive(Clone)]
struct ScoreRow {
    score: f64,
    created_at: OffsetDateTime,
    updated_at: OffsetDateTime,
}

impl MemoryAdminStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Tables {
    fn tag_refs(&self, tag_ids: &IndexSet<String>) -> Vec<TagEntity> {
        let mut tags: Vec<TagEntity> = tag_ids
            .iter()
            .filter_map(|id| {
                self.tags.get(id).map(|tag| TagEntity {
                    id: id.clone(),
                    name: tag.name.clone(),
                })
            })
            .collect();
        tags.sort_by(|left, right| left.name.cmp(&right.name).then_with(|| left.id.cmp(&right.id)));
        tags
    }

    fn game_object(&self, id: &str) -> Option<GameObjectEntity> {
        self.game_objects.get(id).map(|row| GameObjectEntity {
            id: id.to_owned(),
            name: row.name.clone(),
            description: row.description.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags: self.tag_refs(&row.tag_ids),
        })
    }

    fn tag(&self, id: &str) -> Option<TagWithGamesEntity> {
        self.tags.get(id).map(|row| {
            let mut games: Vec<String> = row.games.iter().cloned().collect();
            games.sort();
            TagWithGamesEntity {
                id: id.to_owned(),
                name: row.name.clone(),
                games,
            }
        })
    }

    fn list(&self, id: &str) -> Option<ListEntity> {
        self.lists.get(id).map(|row| ListEntity {
            id: id.to_owned(),
            name: row.name.clone(),
            description: row.description.clone(),
            created_at: row.created_at,
            updated_at: row.updated_at,
            tags: self.tag_refs(&row.tag_ids),
        })
    }

    fn score(&self, player_id: &str, game_object_id: &str, embed: bool) -> Option<PlayerScoreEntity> {
        let row = self
            .scores
            .get(&(player_id.to_owned(), game_object_id.to_owned()))?;
        let game_object = if embed {
            self.game_object(game_object_id).map(GameObjectRecord::from)
        } else {
            None
        };
        Some(PlayerScoreEntity {
            player_id: player_id.to_owned(),
            game_object_id: game_object_id.to_owned(),
            score: row.score,
            created_at: row.created_at,
            updated_at: row.updated_at,
            game_object,
        })
    }

    fn filtered_game_objects(&self, filter: &GameObjectFilter) -> Vec<GameObjectEntity> {
        self.game_objects
            .keys()
            .filter_map(|id| self.game_object(id))
            .filter(|game_object| matches_filter(game_object, filter))
            .collect()
    }

    fn rename_game_object(&mut self, from: &str, to: &str) -> StorageResult<()> {
        if self.game_objects.contains_key(to) {
            return Err(StorageError::conflict(format!(
                "game object id `{to}` is already in use"
            )));
        }
        if let Some(row) = self.game_objects.shift_remove(from) {
            self.game_objects.insert(to.to_owned(), row);
        }
        self.scores = std::mem::take(&mut self.scores)
            .into_iter()
            .map(|((player_id, game_object_id), row)| {
                let game_object_id = if game_object_id == from {
                    to.to_owned()
                } else {
                    game_object_id
                };
                ((player_id, game_object_id), row)
            })
            .collect();
        Ok(())
    }
}

fn ensure_unique_tag_name(tables: &Tables, name: &str) -> StorageResult<()> {
    if tables.tags.values().any(|tag| tag.name == name) {
        return Err(StorageError::conflict(format!(
            "tag name `{name}` is already in use"
        )));
    }
    Ok(())
}

impl AdminStore for MemoryAdminStore {
    fn list_game_objects(
        &self,
        query: GameObjectListQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<GameObjectEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut game_objects = tables.filtered_game_objects(&query.filter);
            game_objects.sort_by(|left, right| {
                compare_game_objects(left, right, query.sort_by, query.sort_order)
            });
            Ok(game_objects
                .into_iter()
                .skip(usize::try_from(query.offset).unwrap_or(usize::MAX))
                .take(usize::try_from(query.limit).unwrap_or(usize::MAX))
                .collect())
        })
    }

    fn count_game_objects(&self, filter: GameObjectFilter) -> BoxFuture<'static, StorageResult<u64>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(tables.filtered_game_objects(&filter).len() as u64)
        })
    }

    fn find_game_object(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.game_object(&id)) })
    }

    fn create_game_object(
        &self,
        game_object: NewGameObjectEntity,
    ) -> BoxFuture<'static, StorageResult<GameObjectEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let id = Uuid::new_v4().to_string();
            let now = current_timestamp();
            tables.game_objects.insert(
                id.clone(),
                GameObjectRow {
                    name: game_object.name.clone(),
                    description: game_object.description.clone(),
                    created_at: now,
                    updated_at: now,
                    tag_ids: IndexSet::new(),
                },
            );
            Ok(GameObjectEntity {
                id,
                name: game_object.name,
                description: game_object.description,
                created_at: now,
                updated_at: now,
                tags: Vec::new(),
            })
        })
    }

    fn update_game_object(
        &self,
        id: String,
        patch: GameObjectPatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.game_objects.contains_key(&id) {
                return Ok(None);
            }

            let mut current_id = id;
            if let Some(new_id) = patch.id.filter(|new_id| *new_id != current_id) {
                tables.rename_game_object(&current_id, &new_id)?;
                current_id = new_id;
            }

            let Some(row) = tables.game_objects.get_mut(&current_id) else {
                return Ok(None);
            };
            if let Some(name) = patch.name {
                row.name = name;
            }
            if let Some(description) = patch.description {
                row.description = description;
            }
            if let Some(tag_ids) = patch.tag_ids {
                row.tag_ids = tag_ids.into_iter().collect();
            }
            row.updated_at = current_timestamp();

            Ok(tables.game_object(&current_id))
        })
    }

    fn delete_game_object(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if tables.game_objects.shift_remove(&id).is_none() {
                return Ok(false);
            }
            tables
                .scores
                .retain(|(_, game_object_id), _| *game_object_id != id);
            Ok(true)
        })
    }

    fn list_tags(&self) -> BoxFuture<'static, StorageResult<Vec<TagWithGamesEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut tags: Vec<TagWithGamesEntity> =
                tables.tags.keys().filter_map(|id| tables.tag(id)).collect();
            tags.sort_by(|left, right| left.name.cmp(&right.name));
            Ok(tags)
        })
    }

    fn create_tag(&self, tag: NewTagEntity) -> BoxFuture<'static, StorageResult<TagWithGamesEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            ensure_unique_tag_name(&tables, &tag.name)?;
            let id = Uuid::new_v4().to_string();
            let games: IndexSet<String> = tag.games.into_iter().collect();
            let mut sorted_games: Vec<String> = games.iter().cloned().collect();
            sorted_games.sort();
            tables.tags.insert(
                id.clone(),
                TagRow {
                    name: tag.name.clone(),
                    games,
                },
            );
            Ok(TagWithGamesEntity {
                id,
                name: tag.name,
                games: sorted_games,
            })
        })
    }

    fn set_tag_games(
        &self,
        id: String,
        games: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Option<TagWithGamesEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let Some(row) = tables.tags.get_mut(&id) else {
                return Ok(None);
            };
            row.games = games.into_iter().collect();
            Ok(tables.tag(&id))
        })
    }

    fn delete_tag(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if tables.tags.shift_remove(&id).is_none() {
                return Ok(false);
            }
            for row in tables.game_objects.values_mut() {
                row.tag_ids.shift_remove(&id);
            }
            for row in tables.lists.values_mut() {
                row.tag_ids.shift_remove(&id);
            }
            Ok(true)
        })
    }

    fn find_missing_tags(&self, ids: Vec<String>) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            Ok(ids
                .into_iter()
                .filter(|id| !tables.tags.contains_key(id))
                .collect())
        })
    }

    fn list_lists(&self) -> BoxFuture<'static, StorageResult<Vec<ListEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut lists: Vec<ListEntity> =
                tables.lists.keys().filter_map(|id| tables.list(id)).collect();
            lists.sort_by(|left, right| {
                left.name.cmp(&right.name).then_with(|| left.id.cmp(&right.id))
            });
            Ok(lists)
        })
    }

    fn find_list(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ListEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.read().await.list(&id)) })
    }

    fn create_list(&self, list: NewListEntity) -> BoxFuture<'static, StorageResult<ListEntity>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let id = Uuid::new_v4().to_string();
            let now = current_timestamp();
            let tag_ids: IndexSet<String> = list.tag_ids.into_iter().collect();
            let tags = tables.tag_refs(&tag_ids);
            tables.lists.insert(
                id.clone(),
                ListRow {
                    name: list.name.clone(),
                    description: list.description.clone(),
                    created_at: now,
                    updated_at: now,
                    tag_ids,
                },
            );
            Ok(ListEntity {
                id,
                name: list.name,
                description: list.description,
                created_at: now,
                updated_at: now,
                tags,
            })
        })
    }

    fn update_list(
        &self,
        id: String,
        patch: ListPatch,
    ) -> BoxFuture<'static, StorageResult<Option<ListEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            let Some(row) = tables.lists.get_mut(&id) else {
                return Ok(None);
            };
            if let Some(name) = patch.name {
                row.name = name;
            }
            if let Some(description) = patch.description {
                row.description = description;
            }
            if let Some(tag_ids) = patch.tag_ids {
                row.tag_ids = tag_ids.into_iter().collect();
            }
            row.updated_at = current_timestamp();
            Ok(tables.list(&id))
        })
    }

    fn delete_list(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let tables = self.tables.clone();
        Box::pin(async move { Ok(tables.write().await.lists.shift_remove(&id).is_some()) })
    }

    fn tag_ids_for_game(&self, game_id: String) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let tables = tables.read().await;
            let mut tag_ids: Vec<String> = tables
                .tags
                .iter()
                .filter(|(_, tag)| tag.games.contains(&game_id))
                .map(|(id, _)| id.clone())
                .collect();
            tag_ids.sort();
            Ok(tag_ids)
        })
    }

    fn game_object_ids_with_any_tag(
        &self,
        tag_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            if tag_ids.is_empty() {
                return Ok(Vec::new());
            }
            let tables = tables.read().await;
            let mut ids: Vec<String> = tables
                .game_objects
                .iter()
                .filter(|(_, row)| tag_ids.iter().any(|tag_id| row.tag_ids.contains(tag_id)))
                .map(|(id, _)| id.clone())
                .collect();
            ids.sort();
            Ok(ids)
        })
    }

    fn player_scores(
        &self,
        player_id: String,
        game_object_ids: Vec<String>,
        include_game_objects: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerScoreEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            if game_object_ids.is_empty() {
                return Ok(Vec::new());
            }
            let tables = tables.read().await;
            let wanted: IndexSet<&String> = game_object_ids.iter().collect();
            let mut scores: Vec<PlayerScoreEntity> = tables
                .scores
                .keys()
                .filter(|(owner, game_object_id)| *owner == player_id && wanted.contains(game_object_id))
                .filter_map(|(owner, game_object_id)| {
                    tables.score(owner, game_object_id, include_game_objects)
                })
                .collect();
            scores.sort_by(|left, right| left.game_object_id.cmp(&right.game_object_id));
            Ok(scores)
        })
    }

    fn upsert_player_score(
        &self,
        score: ScoreUpsertEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerScoreEntity>>> {
        let tables = self.tables.clone();
        Box::pin(async move {
            let mut tables = tables.write().await;
            if !tables.game_objects.contains_key(&score.game_object_id) {
                return Ok(None);
            }

            let player_name = tables.players.entry(score.player_id.clone()).or_default();
            if score.player_name.is_some() {
                *player_name = score.player_name;
            }

            let now = current_timestamp();
            tables
                .scores
                .entry((score.player_id.clone(), score.game_object_id.clone()))
                .and_modify(|row| {
                    row.score = score.score;
                    row.updated_at = now;
                })
                .or_insert(ScoreRow {
                    score: score.score,
                    created_at: now,
                    updated_at: now,
                });

            Ok(tables.score(&score.player_id, &score.game_object_id, false))
        })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        Box::pin(async { Ok(()) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dao::models::{GameObjectSortField, SortOrder};

    async fn seed_game_object(store: &MemoryAdminStore, name: &str) -> GameObjectEntity {
        store
            .create_game_object(NewGameObjectEntity {
                name: name.into(),
                description: None,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn rename_moves_scores_and_tags() {
        let store = MemoryAdminStore::new();
        let tag = store
            .create_tag(NewTagEntity {
                name: "weapons".into(),
                games: vec!["g1".into()],
            })
            .await
            .unwrap();
        let sword = seed_game_object(&store, "Sword").await;
        store
            .update_game_object(
                sword.id.clone(),
                GameObjectPatch {
                    tag_ids: Some(vec![tag.id.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        store
            .upsert_player_score(ScoreUpsertEntity {
                player_id: "p1".into(),
                player_name: None,
                game_object_id: sword.id.clone(),
                score: 4.0,
            })
            .await
            .unwrap();

        let renamed = store
            .update_game_object(
                sword.id.clone(),
                GameObjectPatch {
                    id: Some("sword".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(renamed.id, "sword");
        assert_eq!(renamed.tags.len(), 1);
        assert!(store.find_game_object(sword.id).await.unwrap().is_none());
        let scores = store
            .player_scores("p1".into(), vec!["sword".into()], false)
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
    }

    #[tokio::test]
    async fn rename_to_existing_id_conflicts() {
        let store = MemoryAdminStore::new();
        let first = seed_game_object(&store, "First").await;
        let second = seed_game_object(&store, "Second").await;

        let result = store
            .update_game_object(
                first.id,
                GameObjectPatch {
                    id: Some(second.id),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(StorageError::Conflict { .. })));
    }

    #[tokio::test]
    async fn listing_pages_after_sorting() {
        let store = MemoryAdminStore::new();
        for name in ["c", "a", "b", "d"] {
            seed_game_object(&store, name).await;
        }

        let page = store
            .list_game_objects(GameObjectListQuery {
                filter: GameObjectFilter::default(),
                sort_by: GameObjectSortField::Name,
                sort_order: SortOrder::Asc,
                offset: 1,
                limit: 2,
            })
            .await
            .unwrap();

        let names: Vec<_> = page.iter().map(|item| item.name.as_str()).collect();
        assert_eq!(names, ["b", "c"]);
    }

    #[tokio::test]
    async fn deleting_a_tag_detaches_it() {
        let store = MemoryAdminStore::new();
        let tag = store
            .create_tag(NewTagEntity {
                name: "armor".into(),
                games: Vec::new(),
            })
            .await
            .unwrap();
        let list = store
            .create_list(NewListEntity {
                name: "Starter kit".into(),
                description: None,
                tag_ids: vec![tag.id.clone()],
            })
            .await
            .unwrap();

        assert!(store.delete_tag(tag.id).await.unwrap());
        let list = store.find_list(list.id).await.unwrap().unwrap();
        assert!(list.tags.is_empty());
    }

    #[tokio::test]
    async fn duplicate_tag_names_conflict() {
        let store = MemoryAdminStore::new();
        let tag = NewTagEntity {
            name: "boss".into(),
            games: Vec::new(),
        };
        store.create_tag(tag.clone()).await.unwrap();
        assert!(matches!(
            store.create_tag(tag).await,
            Err(StorageError::Conflict { .. })
        ));
    }
}
