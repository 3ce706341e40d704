use time::OffsetDateTime;

use crate::dao::models::{
    GameObjectEntity, GameObjectRecord, ListEntity, PlayerScoreEntity, TagEntity,
};

/// `game_objects` row without its tag links.
#[derive(Debug, sqlx::FromRow)]
pub struct GameObjectRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl GameObjectRow {
    pub fn into_entity(self, tags: Vec<TagEntity>) -> GameObjectEntity {
        GameObjectEntity {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
            tags,
        }
    }
}

/// `lists` row without its tag links.
#[derive(Debug, sqlx::FromRow)]
pub struct ListRow {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl ListRow {
    pub fn into_entity(self, tags: Vec<TagEntity>) -> ListEntity {
        ListEntity {
            id: self.id,
            name: self.name,
            description: self.description,
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
            tags,
        }
    }
}

/// Tag joined through a link table, keyed by the owning row.
#[derive(Debug, sqlx::FromRow)]
pub struct TagLinkRow {
    pub owner_id: String,
    pub id: String,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TagRow {
    pub id: String,
    pub name: String,
}

#[derive(Debug, sqlx::FromRow)]
pub struct TagGameRow {
    pub tag_id: String,
    pub game_id: String,
}

/// `player_scores` row joined with its game object.
#[derive(Debug, sqlx::FromRow)]
pub struct PlayerScoreRow {
    pub player_id: String,
    pub game_object_id: String,
    pub score: f64,
    pub created_at: i64,
    pub updated_at: i64,
    pub game_object_name: String,
    pub game_object_description: Option<String>,
    pub game_object_created_at: i64,
    pub game_object_updated_at: i64,
}

impl PlayerScoreRow {
    pub fn into_entity(self, include_game_object: bool) -> PlayerScoreEntity {
        let game_object = include_game_object.then(|| GameObjectRecord {
            id: self.game_object_id.clone(),
            name: self.game_object_name,
            description: self.game_object_description,
            created_at: from_millis(self.game_object_created_at),
            updated_at: from_millis(self.game_object_updated_at),
        });
        PlayerScoreEntity {
            player_id: self.player_id,
            game_object_id: self.game_object_id,
            score: self.score,
            created_at: from_millis(self.created_at),
            updated_at: from_millis(self.updated_at),
            game_object,
        }
    }
}

pub fn to_millis(timestamp: OffsetDateTime) -> i64 {
    i64::try_from(timestamp.unix_timestamp_nanos() / 1_000_000).unwrap_or(i64::MAX)
}

pub fn from_millis(millis: i64) -> OffsetDateTime {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(millis) * 1_000_000)
        .unwrap_or(OffsetDateTime::UNIX_EPOCH)
}

impl From<TagLinkRow> for TagEntity {
    fn from(row: TagLinkRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
        }
    }
}
