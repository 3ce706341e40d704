//! Token registry resolving API credentials to caller identities.

use dashmap::DashMap;

use crate::{config::CredentialConfig, error::ServiceError};

/// Who is calling, as established by the authentication middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallerIdentity {
    /// Back-office or admin UI credential with unrestricted access.
    Service,
    /// Credential scoped to a single player.
    Player { player_id: String },
}

impl CallerIdentity {
    pub fn is_service(&self) -> bool {
        matches!(self, CallerIdentity::Service)
    }
}

/// Registry of known tokens keyed by their raw value.
#[derive(Debug, Default)]
pub struct CredentialRegistry {
    tokens: DashMap<String, CallerIdentity>,
}

impl CredentialRegistry {
    pub fn from_config(credentials: &[CredentialConfig]) -> Self {
        let registry = Self::default();
        for credential in credentials {
            registry.register(credential.token.clone(), credential.identity.clone());
        }
        registry
    }

    /// Add or replace a token.
    pub fn register(&self, token: String, identity: CallerIdentity) {
        self.tokens.insert(token, identity);
    }

    pub fn resolve(&self, token: &str) -> Option<CallerIdentity> {
        self.tokens.get(token).map(|entry| entry.value().clone())
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// Check that `caller` may read the data of `player_id`.
pub fn authorize_player_access(caller: &CallerIdentity, player_id: &str) -> Result<(), ServiceError> {
    match caller {
        CallerIdentity::Service => Ok(()),
        CallerIdentity::Player { player_id: own } if own == player_id => Ok(()),
        CallerIdentity::Player { .. } => Err(ServiceError::Forbidden(format!(
            "credential is not allowed to read scores of player `{player_id}`"
        ))),
    }
}
