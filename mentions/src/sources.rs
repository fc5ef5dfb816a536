//! Backend collaborator seams the mention engine resolves candidates through.
//!
//! Every implementation talks to the dashboard backend; the engine itself
//! only ever sees these traits, so tests and hosts can swap in stubs.

use async_trait::async_trait;
use katana_integrations::Integration;
use katana_integrations::IntegrationAccount;
use katana_integrations::ProviderConnection;
use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;
use ts_rs::TS;

pub type SourceResult<T> = Result<T, SourceError>;

/// The single failure class the engine models: a candidate source that could
/// not be reached. Callers degrade every variant to an empty candidate list.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SourceError {
    #[error("backend request failed: {message}")]
    Backend { message: String },
    #[error("integration `{integration}` is not connected")]
    NotConnected { integration: Integration },
}

impl SourceError {
    pub fn backend(message: impl Into<String>) -> Self {
        SourceError::Backend {
            message: message.into(),
        }
    }
}

/// One entity or sub-entity row returned by the lookup collaborator.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS, schemars::JsonSchema)]
pub struct EntityRef {
    pub id: String,
    pub name: String,
}

impl EntityRef {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Lists the workspace's OAuth integration accounts.
#[async_trait]
pub trait IntegrationSource: Send + Sync {
    async fn list_accounts(&self) -> SourceResult<Vec<IntegrationAccount>>;
}

/// Lists provider-level connections (Google, Vercel) that unlock canonical
/// integrations without their own OAuth account rows.
#[async_trait]
pub trait ProviderConnectionSource: Send + Sync {
    async fn list_connections(&self) -> SourceResult<Vec<ProviderConnection>>;
}

/// Looks up mentionable entities and their sub-entities.
#[async_trait]
pub trait EntitySource: Send + Sync {
    async fn list_entities(
        &self,
        integration: Integration,
        entity_type: &str,
    ) -> SourceResult<Vec<EntityRef>>;

    async fn sub_entities(
        &self,
        integration: Integration,
        entity_id: &str,
        sub_entity_type: &str,
    ) -> SourceResult<Vec<EntityRef>>;
}
