use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

/// Game object with its tag associations, as persisted by the storage layer.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObjectEntity {
    /// Primary key, store-assigned on creation but editable afterwards.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Optional free-form description.
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Associated tags ordered by name.
    pub tags: Vec<TagEntity>,
}

/// Game object columns without the tag relation, embedded in score records.
#[derive(Debug, Clone, PartialEq)]
pub struct GameObjectRecord {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl From<GameObjectEntity> for GameObjectRecord {
    fn from(entity: GameObjectEntity) -> Self {
        Self {
            id: entity.id,
            name: entity.name,
            description: entity.description,
            created_at: entity.created_at,
            updated_at: entity.updated_at,
        }
    }
}

/// Values required to insert a game object.
#[derive(Debug, Clone)]
pub struct NewGameObjectEntity {
    pub name: String,
    pub description: Option<String>,
}

/// Partial update applied to a game object. `None` leaves the column untouched.
#[derive(Debug, Clone, Default)]
pub struct GameObjectPatch {
    /// New primary key; scores and tag links follow the renamed row.
    pub id: Option<String>,
    pub name: Option<String>,
    /// `Some(None)` clears the description.
    pub description: Option<Option<String>>,
    /// Replaces the whole tag set when present.
    pub tag_ids: Option<Vec<String>>,
}

/// Tag reference as carried by game objects and lists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagEntity {
    pub id: String,
    pub name: String,
}

/// Tag together with the games that consume it (the "input to games" relation).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagWithGamesEntity {
    pub id: String,
    pub name: String,
    /// Game identifiers ordered ascending.
    pub games: Vec<String>,
}

/// Values required to insert a tag.
#[derive(Debug, Clone)]
pub struct NewTagEntity {
    pub name: String,
    pub games: Vec<String>,
}

/// Tagged grouping entity managed next to game objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ListEntity {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    pub tags: Vec<TagEntity>,
}

/// Values required to insert a list.
#[derive(Debug, Clone)]
pub struct NewListEntity {
    pub name: String,
    pub description: Option<String>,
    pub tag_ids: Vec<String>,
}

/// Partial update applied to a list.
#[derive(Debug, Clone, Default)]
pub struct ListPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub tag_ids: Option<Vec<String>>,
}

/// Score recorded by a player against a game object.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerScoreEntity {
    pub player_id: String,
    pub game_object_id: String,
    pub score: f64,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Present only when the caller asked for the game object to be embedded.
    pub game_object: Option<GameObjectRecord>,
}

/// Insert-or-update payload for a player score.
#[derive(Debug, Clone)]
pub struct ScoreUpsertEntity {
    pub player_id: String,
    /// Stored on the player row when provided; an existing name is kept otherwise.
    pub player_name: Option<String>,
    pub game_object_id: String,
    pub score: f64,
}

/// Column a game-object listing can be sorted on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum GameObjectSortField {
    Id,
    Name,
    Description,
    /// Number of associated tags.
    Tags,
    #[default]
    UpdatedAt,
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

/// Filter predicate shared by the listing and the count of game objects.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameObjectFilter {
    /// Substring matched against id, name or description (ASCII case-insensitive).
    pub text: Option<String>,
    /// Exact tag name the game object must carry.
    pub tag: Option<String>,
}

impl GameObjectFilter {
    /// Build a filter, dropping blank values. The text is kept as given; the tag name is trimmed.
    pub fn new(text: Option<String>, tag: Option<String>) -> Self {
        Self {
            text: text.filter(|text| !text.trim().is_empty()),
            tag: tag
                .map(|tag| tag.trim().to_owned())
                .filter(|tag| !tag.is_empty()),
        }
    }
}

/// Immutable description of one page of the game-object listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameObjectListQuery {
    pub filter: GameObjectFilter,
    pub sort_by: GameObjectSortField,
    pub sort_order: SortOrder,
    pub offset: u64,
    pub limit: u64,
}

/// Current UTC time truncated to millisecond precision, the resolution the
/// SQL backend persists.
pub fn current_timestamp() -> OffsetDateTime {
    let now = OffsetDateTime::now_utc();
    let millis = now.unix_timestamp_nanos() / 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(millis * 1_000_000).unwrap_or(now)
}
