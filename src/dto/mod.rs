use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod game_object;
pub mod health;
pub mod list;
pub mod score;
pub mod tag;
pub mod validation;

fn format_timestamp(timestamp: OffsetDateTime) -> String {
    timestamp
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
