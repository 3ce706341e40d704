use std::collections::{BTreeSet, HashMap, HashSet};

use futures::future::BoxFuture;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool, pool::PoolConnection};
use tracing::info;
use uuid::Uuid;

use super::{
    config::SqliteConfig,
    error::{SqliteDaoError, SqliteResult, query_error},
    models::{
        GameObjectRow, ListRow, PlayerScoreRow, TagGameRow, TagLinkRow, TagRow, to_millis,
    },
};
use crate::dao::{
    admin_store::AdminStore,
    models::{
        GameObjectEntity, GameObjectFilter, GameObjectListQuery, GameObjectPatch,
        GameObjectSortField, ListEntity, ListPatch, NewGameObjectEntity, NewListEntity,
        NewTagEntity, PlayerScoreEntity, ScoreUpsertEntity, SortOrder, TagEntity,
        TagWithGamesEntity, current_timestamp,
    },
    storage::StorageResult,
};

const SCHEMA: &str = include_str!("schema.sql");

/// Ids bound per `IN (...)` statement. SQLite caps host parameters per statement.
const ID_CHUNK_SIZE: usize = 500;

const GAME_OBJECT_COLUMNS: &str = "g.id, g.name, g.description, g.created_at, g.updated_at";
const PLAYER_SCORE_COLUMNS: &str = "s.player_id, s.game_object_id, s.score, s.created_at, \
     s.updated_at, g.name AS game_object_name, g.description AS game_object_description, \
     g.created_at AS game_object_created_at, g.updated_at AS game_object_updated_at";

#[derive(Clone)]
pub struct SqliteAdminStore {
    pool: SqlitePool,
}

/// Link tables attaching tags to their owners.
#[derive(Debug, Clone, Copy)]
enum TagLink {
    GameObject,
    List,
}

impl TagLink {
    fn select_prefix(self) -> &'static str {
        match self {
            TagLink::GameObject => {
                "SELECT l.game_object_id AS owner_id, t.id, t.name FROM game_object_tags l \
                 JOIN tags t ON t.id = l.tag_id WHERE l.game_object_id IN ("
            }
            TagLink::List => {
                "SELECT l.list_id AS owner_id, t.id, t.name FROM list_tags l \
                 JOIN tags t ON t.id = l.tag_id WHERE l.list_id IN ("
            }
        }
    }

    fn delete_sql(self) -> &'static str {
        match self {
            TagLink::GameObject => "DELETE FROM game_object_tags WHERE game_object_id = ?",
            TagLink::List => "DELETE FROM list_tags WHERE list_id = ?",
        }
    }

    fn insert_sql(self) -> &'static str {
        match self {
            TagLink::GameObject => {
                "INSERT OR IGNORE INTO game_object_tags (game_object_id, tag_id) VALUES (?, ?)"
            }
            TagLink::List => "INSERT OR IGNORE INTO list_tags (list_id, tag_id) VALUES (?, ?)",
        }
    }
}

impl SqliteAdminStore {
    /// Open the pool and create the tables when they are missing.
    pub async fn connect(config: SqliteConfig) -> SqliteResult<Self> {
        let pool = config
            .pool_options()
            .connect_with(config.options.clone())
            .await
            .map_err(|source| SqliteDaoError::Connect { source })?;

        sqlx::raw_sql(SCHEMA)
            .execute(&pool)
            .await
            .map_err(|source| SqliteDaoError::Schema { source })?;

        info!(
            filename = %config.options.get_filename().display(),
            "SQLite schema ready"
        );
        Ok(Self { pool })
    }

    async fn acquire(&self, operation: &'static str) -> SqliteResult<PoolConnection<Sqlite>> {
        self.pool.acquire().await.map_err(query_error(operation))
    }

    async fn ping(&self) -> SqliteResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|source| SqliteDaoError::HealthPing { source })?;
        Ok(())
    }

    async fn list_game_objects(
        &self,
        query: GameObjectListQuery,
    ) -> SqliteResult<Vec<GameObjectEntity>> {
        let mut conn = self.acquire("list_game_objects").await?;
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
        builder.push(GAME_OBJECT_COLUMNS).push(" FROM game_objects g");
        push_filter(&mut builder, &query.filter);
        builder
            .push(" ORDER BY ")
            .push(sort_expression(query.sort_by))
            .push(sort_direction(query.sort_order))
            .push(", g.id ASC LIMIT ")
            .push_bind(saturating_i64(query.limit))
            .push(" OFFSET ")
            .push_bind(saturating_i64(query.offset));

        let rows: Vec<GameObjectRow> = builder
            .build_query_as()
            .fetch_all(&mut *conn)
            .await
            .map_err(query_error("list_game_objects"))?;

        with_game_object_tags(&mut conn, rows).await
    }

    async fn count_game_objects(&self, filter: GameObjectFilter) -> SqliteResult<u64> {
        let mut builder = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM game_objects g");
        push_filter(&mut builder, &filter);
        let count: i64 = builder
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(query_error("count_game_objects"))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }

    async fn find_game_object(&self, id: String) -> SqliteResult<Option<GameObjectEntity>> {
        let mut conn = self.acquire("find_game_object").await?;
        fetch_game_object(&mut conn, &id).await
    }

    async fn create_game_object(
        &self,
        game_object: NewGameObjectEntity,
    ) -> SqliteResult<GameObjectEntity> {
        let id = Uuid::new_v4().to_string();
        let now = current_timestamp();
        sqlx::query(
            "INSERT INTO game_objects (id, name, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&game_object.name)
        .bind(&game_object.description)
        .bind(to_millis(now))
        .bind(to_millis(now))
        .execute(&self.pool)
        .await
        .map_err(query_error("create_game_object"))?;

        Ok(GameObjectEntity {
            id,
            name: game_object.name,
            description: game_object.description,
            created_at: now,
            updated_at: now,
            tags: Vec::new(),
        })
    }

    async fn update_game_object(
        &self,
        id: String,
        patch: GameObjectPatch,
    ) -> SqliteResult<Option<GameObjectEntity>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("update_game_object"))?;

        let existing: Option<String> = sqlx::query_scalar("SELECT id FROM game_objects WHERE id = ?")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error("update_game_object"))?;
        if existing.is_none() {
            return Ok(None);
        }

        let mut current_id = id;
        if let Some(new_id) = patch.id.filter(|new_id| *new_id != current_id) {
            sqlx::query("UPDATE game_objects SET id = ? WHERE id = ?")
                .bind(&new_id)
                .bind(&current_id)
                .execute(&mut *tx)
                .await
                .map_err(|source| match query_error("rename_game_object")(source) {
                    SqliteDaoError::Conflict { .. } => SqliteDaoError::Conflict {
                        message: format!("game object id `{new_id}` is already in use"),
                    },
                    other => other,
                })?;
            current_id = new_id;
        }

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE game_objects SET updated_at = ");
        builder.push_bind(to_millis(current_timestamp()));
        if let Some(name) = patch.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        builder.push(" WHERE id = ").push_bind(current_id.clone());
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(query_error("update_game_object"))?;

        if let Some(tag_ids) = patch.tag_ids {
            replace_tag_links(&mut tx, TagLink::GameObject, &current_id, &tag_ids).await?;
        }

        let updated = fetch_game_object(&mut tx, &current_id).await?;
        tx.commit()
            .await
            .map_err(query_error("update_game_object"))?;
        Ok(updated)
    }

    async fn delete_game_object(&self, id: String) -> SqliteResult<bool> {
        let result = sqlx::query("DELETE FROM game_objects WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete_game_object"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_tags(&self) -> SqliteResult<Vec<TagWithGamesEntity>> {
        let mut conn = self.acquire("list_tags").await?;
        let tags: Vec<TagRow> = sqlx::query_as("SELECT id, name FROM tags ORDER BY name, id")
            .fetch_all(&mut *conn)
            .await
            .map_err(query_error("list_tags"))?;
        let links: Vec<TagGameRow> =
            sqlx::query_as("SELECT tag_id, game_id FROM tag_games ORDER BY game_id")
                .fetch_all(&mut *conn)
                .await
                .map_err(query_error("list_tags"))?;

        let mut games_by_tag: HashMap<String, Vec<String>> = HashMap::new();
        for link in links {
            games_by_tag.entry(link.tag_id).or_default().push(link.game_id);
        }

        Ok(tags
            .into_iter()
            .map(|tag| TagWithGamesEntity {
                games: games_by_tag.remove(&tag.id).unwrap_or_default(),
                id: tag.id,
                name: tag.name,
            })
            .collect())
    }

    async fn create_tag(&self, tag: NewTagEntity) -> SqliteResult<TagWithGamesEntity> {
        let mut tx = self.pool.begin().await.map_err(query_error("create_tag"))?;
        let id = Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO tags (id, name) VALUES (?, ?)")
            .bind(&id)
            .bind(&tag.name)
            .execute(&mut *tx)
            .await
            .map_err(|source| match query_error("create_tag")(source) {
                SqliteDaoError::Conflict { .. } => SqliteDaoError::Conflict {
                    message: format!("tag name `{}` is already in use", tag.name),
                },
                other => other,
            })?;
        let games = replace_tag_games(&mut tx, &id, tag.games).await?;

        tx.commit().await.map_err(query_error("create_tag"))?;
        Ok(TagWithGamesEntity {
            id,
            name: tag.name,
            games,
        })
    }

    async fn set_tag_games(
        &self,
        id: String,
        games: Vec<String>,
    ) -> SqliteResult<Option<TagWithGamesEntity>> {
        let mut tx = self.pool.begin().await.map_err(query_error("set_tag_games"))?;
        let name: Option<String> = sqlx::query_scalar("SELECT name FROM tags WHERE id = ?")
            .bind(&id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(query_error("set_tag_games"))?;
        let Some(name) = name else {
            return Ok(None);
        };

        let games = replace_tag_games(&mut tx, &id, games).await?;
        tx.commit().await.map_err(query_error("set_tag_games"))?;
        Ok(Some(TagWithGamesEntity { id, name, games }))
    }

    async fn delete_tag(&self, id: String) -> SqliteResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete_tag"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_missing_tags(&self, ids: Vec<String>) -> SqliteResult<Vec<String>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut found = HashSet::new();
        for chunk in ids.chunks(ID_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT id FROM tags WHERE id IN (");
            push_id_list(&mut builder, chunk);
            let rows: Vec<String> = builder
                .build_query_scalar()
                .fetch_all(&self.pool)
                .await
                .map_err(query_error("find_missing_tags"))?;
            found.extend(rows);
        }
        Ok(ids.into_iter().filter(|id| !found.contains(id)).collect())
    }

    async fn list_lists(&self) -> SqliteResult<Vec<ListEntity>> {
        let mut conn = self.acquire("list_lists").await?;
        let rows: Vec<ListRow> = sqlx::query_as(
            "SELECT id, name, description, created_at, updated_at FROM lists ORDER BY name, id",
        )
        .fetch_all(&mut *conn)
        .await
        .map_err(query_error("list_lists"))?;
        with_list_tags(&mut conn, rows).await
    }

    async fn find_list(&self, id: String) -> SqliteResult<Option<ListEntity>> {
        let mut conn = self.acquire("find_list").await?;
        fetch_list(&mut conn, &id).await
    }

    async fn create_list(&self, list: NewListEntity) -> SqliteResult<ListEntity> {
        let mut tx = self.pool.begin().await.map_err(query_error("create_list"))?;
        let id = Uuid::new_v4().to_string();
        let now = to_millis(current_timestamp());

        sqlx::query(
            "INSERT INTO lists (id, name, description, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(list.name)
        .bind(list.description)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(query_error("create_list"))?;
        replace_tag_links(&mut tx, TagLink::List, &id, &list.tag_ids).await?;

        let created = fetch_list(&mut tx, &id)
            .await?
            .ok_or_else(|| SqliteDaoError::MissingRow {
                table: "lists",
                id: id.clone(),
            })?;
        tx.commit().await.map_err(query_error("create_list"))?;
        Ok(created)
    }

    async fn update_list(&self, id: String, patch: ListPatch) -> SqliteResult<Option<ListEntity>> {
        let mut tx = self.pool.begin().await.map_err(query_error("update_list"))?;

        let mut builder = QueryBuilder::<Sqlite>::new("UPDATE lists SET updated_at = ");
        builder.push_bind(to_millis(current_timestamp()));
        if let Some(name) = patch.name {
            builder.push(", name = ").push_bind(name);
        }
        if let Some(description) = patch.description {
            builder.push(", description = ").push_bind(description);
        }
        builder.push(" WHERE id = ").push_bind(id.clone());
        let result = builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(query_error("update_list"))?;
        if result.rows_affected() == 0 {
            return Ok(None);
        }

        if let Some(tag_ids) = patch.tag_ids {
            replace_tag_links(&mut tx, TagLink::List, &id, &tag_ids).await?;
        }

        let updated = fetch_list(&mut tx, &id).await?;
        tx.commit().await.map_err(query_error("update_list"))?;
        Ok(updated)
    }

    async fn delete_list(&self, id: String) -> SqliteResult<bool> {
        let result = sqlx::query("DELETE FROM lists WHERE id = ?")
            .bind(&id)
            .execute(&self.pool)
            .await
            .map_err(query_error("delete_list"))?;
        Ok(result.rows_affected() > 0)
    }

    async fn tag_ids_for_game(&self, game_id: String) -> SqliteResult<Vec<String>> {
        sqlx::query_scalar("SELECT tag_id FROM tag_games WHERE game_id = ? ORDER BY tag_id")
            .bind(&game_id)
            .fetch_all(&self.pool)
            .await
            .map_err(query_error("tag_ids_for_game"))
    }

    async fn game_object_ids_with_any_tag(&self, tag_ids: Vec<String>) -> SqliteResult<Vec<String>> {
        // `IN ()` is not valid SQL; an empty tag set matches nothing.
        if tag_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut game_object_ids = BTreeSet::new();
        for chunk in tag_ids.chunks(ID_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Sqlite>::new(
                "SELECT DISTINCT game_object_id FROM game_object_tags WHERE tag_id IN (",
            );
            push_id_list(&mut builder, chunk);
            let rows: Vec<String> = builder
                .build_query_scalar()
                .fetch_all(&self.pool)
                .await
                .map_err(query_error("game_object_ids_with_any_tag"))?;
            game_object_ids.extend(rows);
        }
        Ok(game_object_ids.into_iter().collect())
    }

    async fn player_scores(
        &self,
        player_id: String,
        game_object_ids: Vec<String>,
        include_game_objects: bool,
    ) -> SqliteResult<Vec<PlayerScoreEntity>> {
        if game_object_ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut rows: Vec<PlayerScoreRow> = Vec::new();
        for chunk in game_object_ids.chunks(ID_CHUNK_SIZE) {
            let mut builder = QueryBuilder::<Sqlite>::new("SELECT ");
            builder
                .push(PLAYER_SCORE_COLUMNS)
                .push(
                    " FROM player_scores s JOIN game_objects g ON g.id = s.game_object_id \
                     WHERE s.player_id = ",
                )
                .push_bind(player_id.clone())
                .push(" AND s.game_object_id IN (");
            push_id_list(&mut builder, chunk);

            let chunk_rows: Vec<PlayerScoreRow> = builder
                .build_query_as()
                .fetch_all(&self.pool)
                .await
                .map_err(query_error("player_scores"))?;
            rows.extend(chunk_rows);
        }
        rows.sort_by(|left, right| left.game_object_id.cmp(&right.game_object_id));
        rows.dedup_by(|left, right| left.game_object_id == right.game_object_id);

        Ok(rows
            .into_iter()
            .map(|row| row.into_entity(include_game_objects))
            .collect())
    }

    async fn upsert_player_score(
        &self,
        score: ScoreUpsertEntity,
    ) -> SqliteResult<Option<PlayerScoreEntity>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(query_error("upsert_player_score"))?;

        let game_object: Option<String> =
            sqlx::query_scalar("SELECT id FROM game_objects WHERE id = ?")
                .bind(&score.game_object_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(query_error("upsert_player_score"))?;
        if game_object.is_none() {
            return Ok(None);
        }

        sqlx::query(
            "INSERT INTO players (id, name) VALUES (?, ?) \
             ON CONFLICT (id) DO UPDATE SET name = COALESCE(excluded.name, players.name)",
        )
        .bind(&score.player_id)
        .bind(&score.player_name)
        .execute(&mut *tx)
        .await
        .map_err(query_error("upsert_player"))?;

        let now = to_millis(current_timestamp());
        sqlx::query(
            "INSERT INTO player_scores (player_id, game_object_id, score, created_at, updated_at) \
             VALUES (?, ?, ?, ?, ?) ON CONFLICT (player_id, game_object_id) \
             DO UPDATE SET score = excluded.score, updated_at = excluded.updated_at",
        )
        .bind(&score.player_id)
        .bind(&score.game_object_id)
        .bind(score.score)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(query_error("upsert_player_score"))?;

        let row: Option<PlayerScoreRow> = sqlx::query_as(&format!(
            "SELECT {PLAYER_SCORE_COLUMNS} FROM player_scores s \
             JOIN game_objects g ON g.id = s.game_object_id \
             WHERE s.player_id = ? AND s.game_object_id = ?"
        ))
        .bind(&score.player_id)
        .bind(&score.game_object_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(query_error("upsert_player_score"))?;

        tx.commit()
            .await
            .map_err(query_error("upsert_player_score"))?;
        Ok(row.map(|row| row.into_entity(false)))
    }
}

/// Append the listing predicate shared by the page query and the count.
fn push_filter<'args>(builder: &mut QueryBuilder<'args, Sqlite>, filter: &GameObjectFilter) {
    let mut keyword = " WHERE ";
    if let Some(text) = &filter.text {
        let pattern = like_pattern(text);
        builder
            .push(keyword)
            .push("(g.id LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR g.name LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR g.description LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
        keyword = " AND ";
    }
    if let Some(tag) = &filter.tag {
        builder
            .push(keyword)
            .push(
                "EXISTS (SELECT 1 FROM game_object_tags gt JOIN tags t ON t.id = gt.tag_id \
                 WHERE gt.game_object_id = g.id AND t.name = ",
            )
            .push_bind(tag.clone())
            .push(")");
    }
}

/// Push `?, ?, ...)` closing an `IN (` list. Callers guarantee `ids` is not empty.
fn push_id_list<'args>(builder: &mut QueryBuilder<'args, Sqlite>, ids: &[String]) {
    let mut separated = builder.separated(", ");
    for id in ids {
        separated.push_bind(id.clone());
    }
    separated.push_unseparated(")");
}

fn sort_expression(sort_by: GameObjectSortField) -> &'static str {
    match sort_by {
        GameObjectSortField::Id => "g.id",
        GameObjectSortField::Name => "g.name",
        GameObjectSortField::Description => "COALESCE(g.description, '')",
        GameObjectSortField::Tags => {
            "(SELECT COUNT(*) FROM game_object_tags c WHERE c.game_object_id = g.id)"
        }
        GameObjectSortField::UpdatedAt => "g.updated_at",
    }
}

fn sort_direction(sort_order: SortOrder) -> &'static str {
    match sort_order {
        SortOrder::Asc => " ASC",
        SortOrder::Desc => " DESC",
    }
}

/// Substring pattern for `LIKE ... ESCAPE '\'`.
fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for ch in text.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn saturating_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

async fn load_tag_links(
    conn: &mut SqliteConnection,
    link: TagLink,
    owner_ids: &[String],
) -> SqliteResult<HashMap<String, Vec<TagEntity>>> {
    let mut tags_by_owner: HashMap<String, Vec<TagEntity>> = HashMap::new();
    if owner_ids.is_empty() {
        return Ok(tags_by_owner);
    }

    for chunk in owner_ids.chunks(ID_CHUNK_SIZE) {
        let mut builder = QueryBuilder::<Sqlite>::new(link.select_prefix());
        push_id_list(&mut builder, chunk);
        builder.push(" ORDER BY t.name, t.id");
        let rows: Vec<TagLinkRow> = builder
            .build_query_as()
            .fetch_all(&mut *conn)
            .await
            .map_err(query_error("load_tag_links"))?;

        for row in rows {
            tags_by_owner
                .entry(row.owner_id.clone())
                .or_default()
                .push(row.into());
        }
    }
    Ok(tags_by_owner)
}

async fn replace_tag_links(
    conn: &mut SqliteConnection,
    link: TagLink,
    owner_id: &str,
    tag_ids: &[String],
) -> SqliteResult<()> {
    sqlx::query(link.delete_sql())
        .bind(owner_id)
        .execute(&mut *conn)
        .await
        .map_err(query_error("replace_tag_links"))?;
    for tag_id in tag_ids {
        sqlx::query(link.insert_sql())
            .bind(owner_id)
            .bind(tag_id)
            .execute(&mut *conn)
            .await
            .map_err(query_error("replace_tag_links"))?;
    }
    Ok(())
}

/// Replace the game set of a tag, returning the stored games in ascending order.
async fn replace_tag_games(
    conn: &mut SqliteConnection,
    tag_id: &str,
    games: Vec<String>,
) -> SqliteResult<Vec<String>> {
    sqlx::query("DELETE FROM tag_games WHERE tag_id = ?")
        .bind(tag_id)
        .execute(&mut *conn)
        .await
        .map_err(query_error("replace_tag_games"))?;

    let games: BTreeSet<String> = games.into_iter().collect();
    for game_id in &games {
        sqlx::query("INSERT INTO tag_games (tag_id, game_id) VALUES (?, ?)")
            .bind(tag_id)
            .bind(game_id)
            .execute(&mut *conn)
            .await
            .map_err(query_error("replace_tag_games"))?;
    }
    Ok(games.into_iter().collect())
}

async fn with_game_object_tags(
    conn: &mut SqliteConnection,
    rows: Vec<GameObjectRow>,
) -> SqliteResult<Vec<GameObjectEntity>> {
    let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut tags = load_tag_links(conn, TagLink::GameObject, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let row_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_entity(row_tags)
        })
        .collect())
}

async fn with_list_tags(
    conn: &mut SqliteConnection,
    rows: Vec<ListRow>,
) -> SqliteResult<Vec<ListEntity>> {
    let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
    let mut tags = load_tag_links(conn, TagLink::List, &ids).await?;
    Ok(rows
        .into_iter()
        .map(|row| {
            let row_tags = tags.remove(&row.id).unwrap_or_default();
            row.into_entity(row_tags)
        })
        .collect())
}

async fn fetch_game_object(
    conn: &mut SqliteConnection,
    id: &str,
) -> SqliteResult<Option<GameObjectEntity>> {
    let row: Option<GameObjectRow> = sqlx::query_as(
        "SELECT id, name, description, created_at, updated_at FROM game_objects WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error("find_game_object"))?;

    match row {
        Some(row) => Ok(with_game_object_tags(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

async fn fetch_list(conn: &mut SqliteConnection, id: &str) -> SqliteResult<Option<ListEntity>> {
    let row: Option<ListRow> = sqlx::query_as(
        "SELECT id, name, description, created_at, updated_at FROM lists WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(&mut *conn)
    .await
    .map_err(query_error("find_list"))?;

    match row {
        Some(row) => Ok(with_list_tags(conn, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

impl AdminStore for SqliteAdminStore {
    fn list_game_objects(
        &self,
        query: GameObjectListQuery,
    ) -> BoxFuture<'static, StorageResult<Vec<GameObjectEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_game_objects(query).await.map_err(Into::into) })
    }

    fn count_game_objects(&self, filter: GameObjectFilter) -> BoxFuture<'static, StorageResult<u64>> {
        let store = self.clone();
        Box::pin(async move { store.count_game_objects(filter).await.map_err(Into::into) })
    }

    fn find_game_object(
        &self,
        id: String,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_game_object(id).await.map_err(Into::into) })
    }

    fn create_game_object(
        &self,
        game_object: NewGameObjectEntity,
    ) -> BoxFuture<'static, StorageResult<GameObjectEntity>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .create_game_object(game_object)
                .await
                .map_err(Into::into)
        })
    }

    fn update_game_object(
        &self,
        id: String,
        patch: GameObjectPatch,
    ) -> BoxFuture<'static, StorageResult<Option<GameObjectEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_game_object(id, patch).await.map_err(Into::into) })
    }

    fn delete_game_object(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_game_object(id).await.map_err(Into::into) })
    }

    fn list_tags(&self) -> BoxFuture<'static, StorageResult<Vec<TagWithGamesEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_tags().await.map_err(Into::into) })
    }

    fn create_tag(&self, tag: NewTagEntity) -> BoxFuture<'static, StorageResult<TagWithGamesEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_tag(tag).await.map_err(Into::into) })
    }

    fn set_tag_games(
        &self,
        id: String,
        games: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Option<TagWithGamesEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.set_tag_games(id, games).await.map_err(Into::into) })
    }

    fn delete_tag(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_tag(id).await.map_err(Into::into) })
    }

    fn find_missing_tags(&self, ids: Vec<String>) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { store.find_missing_tags(ids).await.map_err(Into::into) })
    }

    fn list_lists(&self) -> BoxFuture<'static, StorageResult<Vec<ListEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.list_lists().await.map_err(Into::into) })
    }

    fn find_list(&self, id: String) -> BoxFuture<'static, StorageResult<Option<ListEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.find_list(id).await.map_err(Into::into) })
    }

    fn create_list(&self, list: NewListEntity) -> BoxFuture<'static, StorageResult<ListEntity>> {
        let store = self.clone();
        Box::pin(async move { store.create_list(list).await.map_err(Into::into) })
    }

    fn update_list(
        &self,
        id: String,
        patch: ListPatch,
    ) -> BoxFuture<'static, StorageResult<Option<ListEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.update_list(id, patch).await.map_err(Into::into) })
    }

    fn delete_list(&self, id: String) -> BoxFuture<'static, StorageResult<bool>> {
        let store = self.clone();
        Box::pin(async move { store.delete_list(id).await.map_err(Into::into) })
    }

    fn tag_ids_for_game(&self, game_id: String) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move { store.tag_ids_for_game(game_id).await.map_err(Into::into) })
    }

    fn game_object_ids_with_any_tag(
        &self,
        tag_ids: Vec<String>,
    ) -> BoxFuture<'static, StorageResult<Vec<String>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .game_object_ids_with_any_tag(tag_ids)
                .await
                .map_err(Into::into)
        })
    }

    fn player_scores(
        &self,
        player_id: String,
        game_object_ids: Vec<String>,
        include_game_objects: bool,
    ) -> BoxFuture<'static, StorageResult<Vec<PlayerScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move {
            store
                .player_scores(player_id, game_object_ids, include_game_objects)
                .await
                .map_err(Into::into)
        })
    }

    fn upsert_player_score(
        &self,
        score: ScoreUpsertEntity,
    ) -> BoxFuture<'static, StorageResult<Option<PlayerScoreEntity>>> {
        let store = self.clone();
        Box::pin(async move { store.upsert_player_score(score).await.map_err(Into::into) })
    }

    fn health_check(&self) -> BoxFuture<'static, StorageResult<()>> {
        let store = self.clone();
        Box::pin(async move { store.ping().await.map_err(Into::into) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn store() -> SqliteAdminStore {
        SqliteAdminStore::connect(SqliteConfig::in_memory().unwrap())
            .await
            .unwrap()
    }

    async fn tagged_game_object(
        store: &SqliteAdminStore,
        name: &str,
        tag_ids: Vec<String>,
    ) -> GameObjectEntity {
        let created = store
            .create_game_object(NewGameObjectEntity {
                name: name.into(),
                description: None,
            })
            .await
            .unwrap();
        store
            .update_game_object(
                created.id,
                GameObjectPatch {
                    tag_ids: Some(tag_ids),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap()
    }

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
    }

    #[tokio::test]
    async fn filter_and_count_share_the_predicate() {
        let store = store().await;
        let boss = store
            .create_tag(NewTagEntity {
                name: "boss".into(),
                games: Vec::new(),
            })
            .await
            .unwrap();
        tagged_game_object(&store, "Dragon", vec![boss.id.clone()]).await;
        tagged_game_object(&store, "Dragonfly", Vec::new()).await;
        tagged_game_object(&store, "Slime", vec![boss.id.clone()]).await;

        let filter = GameObjectFilter::new(Some("dragon".into()), Some("boss".into()));
        let page = store
            .list_game_objects(GameObjectListQuery {
                filter: filter.clone(),
                sort_by: GameObjectSortField::Name,
                sort_order: SortOrder::Asc,
                offset: 0,
                limit: 10,
            })
            .await
            .unwrap();

        assert_eq!(page.len(), 1);
        assert_eq!(page[0].name, "Dragon");
        assert_eq!(page[0].tags[0].name, "boss");
        assert_eq!(store.count_game_objects(filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn empty_tag_set_matches_no_game_objects() {
        let store = store().await;
        tagged_game_object(&store, "Sword", Vec::new()).await;

        let ids = store.game_object_ids_with_any_tag(Vec::new()).await.unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn multi_tag_overlap_yields_distinct_ids() {
        let store = store().await;
        let a = store
            .create_tag(NewTagEntity {
                name: "a".into(),
                games: vec!["g1".into()],
            })
            .await
            .unwrap();
        let b = store
            .create_tag(NewTagEntity {
                name: "b".into(),
                games: vec!["g1".into()],
            })
            .await
            .unwrap();
        let item = tagged_game_object(&store, "Shield", vec![a.id.clone(), b.id.clone()]).await;

        let tag_ids = store.tag_ids_for_game("g1".into()).await.unwrap();
        let ids = store.game_object_ids_with_any_tag(tag_ids).await.unwrap();

        assert_eq!(ids, vec![item.id]);
    }

    #[tokio::test]
    async fn rename_cascades_to_scores() {
        let store = store().await;
        let item = tagged_game_object(&store, "Bow", Vec::new()).await;
        store
            .upsert_player_score(ScoreUpsertEntity {
                player_id: "p1".into(),
                player_name: Some("Ada".into()),
                game_object_id: item.id.clone(),
                score: 12.5,
            })
            .await
            .unwrap()
            .unwrap();

        store
            .update_game_object(
                item.id,
                GameObjectPatch {
                    id: Some("bow".into()),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        let scores = store
            .player_scores("p1".into(), vec!["bow".into()], true)
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 12.5);
        assert_eq!(scores[0].game_object.as_ref().unwrap().name, "Bow");
    }

    #[tokio::test]
    async fn rename_to_taken_id_conflicts() {
        let store = store().await;
        let first = tagged_game_object(&store, "First", Vec::new()).await;
        let second = tagged_game_object(&store, "Second", Vec::new()).await;

        let result = store
            .update_game_object(
                first.id,
                GameObjectPatch {
                    id: Some(second.id),
                    ..Default::default()
                },
            )
            .await;

        assert!(matches!(result, Err(SqliteDaoError::Conflict { .. })));
    }

    #[tokio::test]
    async fn score_upsert_keeps_one_row_per_pair() {
        let store = store().await;
        let item = tagged_game_object(&store, "Axe", Vec::new()).await;
        for value in [3.0, 7.0] {
            store
                .upsert_player_score(ScoreUpsertEntity {
                    player_id: "p1".into(),
                    player_name: None,
                    game_object_id: item.id.clone(),
                    score: value,
                })
                .await
                .unwrap();
        }

        let scores = store
            .player_scores("p1".into(), vec![item.id.clone()], false)
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].score, 7.0);
        assert!(scores[0].game_object.is_none());
    }

    #[tokio::test]
    async fn large_id_sets_stay_under_the_parameter_limit() {
        let store = store().await;
        let tag = store
            .create_tag(NewTagEntity {
                name: "bulk".into(),
                games: vec!["g1".into()],
            })
            .await
            .unwrap();
        let item = tagged_game_object(&store, "Needle", vec![tag.id.clone()]).await;
        store
            .upsert_player_score(ScoreUpsertEntity {
                player_id: "p1".into(),
                player_name: None,
                game_object_id: item.id.clone(),
                score: 2.5,
            })
            .await
            .unwrap();

        let mut game_object_ids: Vec<String> =
            (0..40_000).map(|index| format!("absent-{index:05}")).collect();
        game_object_ids.push(item.id.clone());
        let scores = store
            .player_scores("p1".into(), game_object_ids, false)
            .await
            .unwrap();
        assert_eq!(scores.len(), 1);
        assert_eq!(scores[0].game_object_id, item.id);

        let mut tag_ids: Vec<String> = (0..40_000).map(|index| format!("tag-{index:05}")).collect();
        tag_ids.push(tag.id.clone());
        let missing = store.find_missing_tags(tag_ids.clone()).await.unwrap();
        assert_eq!(missing.len(), 40_000);
        let ids = store.game_object_ids_with_any_tag(tag_ids).await.unwrap();
        assert_eq!(ids, [item.id]);
    }

    #[tokio::test]
    async fn score_for_missing_game_object_is_rejected() {
        let store = store().await;
        let stored = store
            .upsert_player_score(ScoreUpsertEntity {
                player_id: "p1".into(),
                player_name: None,
                game_object_id: "missing".into(),
                score: 1.0,
            })
            .await
            .unwrap();
        assert!(stored.is_none());
    }

    #[tokio::test]
    async fn list_tags_replace_on_update() {
        let store = store().await;
        let red = store
            .create_tag(NewTagEntity {
                name: "red".into(),
                games: Vec::new(),
            })
            .await
            .unwrap();
        let blue = store
            .create_tag(NewTagEntity {
                name: "blue".into(),
                games: Vec::new(),
            })
            .await
            .unwrap();
        let list = store
            .create_list(NewListEntity {
                name: "Colors".into(),
                description: Some("palette".into()),
                tag_ids: vec![red.id.clone()],
            })
            .await
            .unwrap();

        let updated = store
            .update_list(
                list.id.clone(),
                ListPatch {
                    description: Some(None),
                    tag_ids: Some(vec![blue.id.clone()]),
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .unwrap();

        assert_eq!(updated.description, None);
        assert_eq!(updated.tags.len(), 1);
        assert_eq!(updated.tags[0].id, blue.id);
        assert!(store.delete_list(list.id).await.unwrap());
    }
}
