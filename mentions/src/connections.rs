//! Connected-integration state, loaded once and refreshed on demand.

use katana_integrations::Integration;
use katana_integrations::IntegrationAccount;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::warn;

use crate::sources::IntegrationSource;
use crate::sources::ProviderConnectionSource;

/// The collaborators the connected set is derived from.
#[derive(Clone)]
pub struct ConnectionSources {
    pub integrations: Arc<dyn IntegrationSource>,
    pub google: Arc<dyn ProviderConnectionSource>,
    pub vercel: Arc<dyn ProviderConnectionSource>,
}

/// Snapshot of which integrations are currently connected.
///
/// Built from the collaborator fetches at construction time and replaced
/// wholesale by [`ConnectionDirectory::refresh`]; the engine never reads
/// ambient state between refreshes. Iteration order is the authored popup
/// order of [`Integration`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConnectionDirectory {
    connected: BTreeSet<Integration>,
}

impl ConnectionDirectory {
    /// Fetches all three collaborators and folds the results into one
    /// connected set. Each failure is swallowed and logged; a collaborator
    /// that cannot be reached simply contributes nothing.
    pub async fn load(sources: &ConnectionSources) -> Self {
        let mut connected = BTreeSet::new();

        match sources.integrations.list_accounts().await {
            Ok(accounts) => {
                connected.extend(
                    accounts
                        .iter()
                        .filter_map(IntegrationAccount::connected_integration),
                );
            }
            Err(err) => warn!("integration account listing unavailable: {err}"),
        }

        match sources.google.list_connections().await {
            Ok(connections) => {
                if connections.iter().any(|connection| connection.is_active) {
                    connected.extend(Integration::google_suite());
                }
            }
            Err(err) => warn!("google connection listing unavailable: {err}"),
        }

        match sources.vercel.list_connections().await {
            Ok(connections) => {
                if connections.iter().any(|connection| connection.is_active) {
                    connected.insert(Integration::Vercel);
                }
            }
            Err(err) => warn!("vercel connection listing unavailable: {err}"),
        }

        Self { connected }
    }

    /// Re-runs the collaborator fetches and replaces the snapshot.
    pub async fn refresh(&mut self, sources: &ConnectionSources) {
        *self = Self::load(sources).await;
    }

    /// Directory with a fixed connected set; hosts and tests that already
    /// know the answer skip the collaborator round-trip.
    pub fn from_integrations(connected: impl IntoIterator<Item = Integration>) -> Self {
        Self {
            connected: connected.into_iter().collect(),
        }
    }

    pub fn is_connected(&self, integration: Integration) -> bool {
        self.connected.contains(&integration)
    }

    /// Case-insensitive name lookup restricted to connected integrations.
    pub fn resolve(&self, name: &str) -> Option<Integration> {
        Integration::from_name(name).filter(|integration| self.is_connected(*integration))
    }

    /// Connected integrations in authored popup order.
    pub fn connected(&self) -> impl Iterator<Item = Integration> + '_ {
        self.connected.iter().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.connected.is_empty()
    }
}
