/// OpenAPI documentation generation.
pub mod documentation;
/// Game-object listing, filtering and mutation.
pub mod game_object_service;
/// Health check service.
pub mod health_service;
/// List management.
pub mod list_service;
/// Player score resolution and recording.
pub mod score_service;
/// Tag management, including the games each tag is an input to.
pub mod tag_service;

use indexmap::IndexSet;

use crate::{error::ServiceError, state::SharedState};

/// Deduplicate tag ids, then reject any that does not name an existing tag.
///
/// Ids are already validated as unpadded by the request DTOs.
async fn resolve_tag_ids(state: &SharedState, tag_ids: Vec<String>) -> Result<Vec<String>, ServiceError> {
    let tag_ids: IndexSet<String> = tag_ids.into_iter().collect();
    let tag_ids: Vec<String> = tag_ids.into_iter().collect();

    let missing = state.store().find_missing_tags(tag_ids.clone()).await?;
    if !missing.is_empty() {
        return Err(ServiceError::InvalidInput(format!(
            "unknown tag ids: {}",
            missing.join(", ")
        )));
    }
    Ok(tag_ids)
}

/// Trimmed optional text, `None` when blank.
fn normalize_optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_owned())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use crate::{
        config::AppConfig,
        dao::admin_store::memory::MemoryAdminStore,
        state::{AppState, SharedState},
    };

    /// State over a fresh in-memory store with default configuration.
    pub fn memory_state() -> SharedState {
        AppState::new(AppConfig::default(), Arc::new(MemoryAdminStore::new()))
    }
}
