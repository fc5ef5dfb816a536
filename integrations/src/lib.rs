//! Typed registry of the third-party integrations the Cost Katana chat can
//! mention, plus the wire types returned by the connection-listing backend.
//!
//! The mention engine never works with free-form integration strings
//! internally: backend OAuth kinds are mapped onto the closed [`Integration`]
//! enum once, at the connection boundary, and everything downstream (command
//! catalogs, entity taxonomies, candidate lists) is keyed by that enum.

mod catalog;

pub use catalog::CommandSpec;
pub use catalog::EntityTypeSpec;
pub use catalog::IntegrationProfile;
pub use catalog::Registry;
pub use catalog::RegistryError;
pub use catalog::SubEntrySpec;

use serde::Deserialize;
use serde::Serialize;
use std::str::FromStr;
use strum_macros::Display;
use strum_macros::EnumIter;
use strum_macros::EnumString;
use strum_macros::IntoStaticStr;
use ts_rs::TS;

/// Services a workspace can connect and then mention with `@name`.
///
/// This enum is the source of truth for canonical integration names and for
/// the order integrations are listed in the mention popup.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, EnumString, EnumIter, Display,
    IntoStaticStr, Serialize, Deserialize, TS, schemars::JsonSchema,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Integration {
    // DO NOT ALPHA-SORT! Enum order is presentation order in the popup.
    Jira,
    Linear,
    Github,
    Slack,
    Discord,
    Vercel,
    Google,
    Drive,
    Sheets,
    Docs,
}

impl Integration {
    /// Canonical lowercase name as it appears inside a mention token.
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// Human-readable label for popup rows.
    pub fn label(self) -> &'static str {
        match self {
            Integration::Jira => "Jira",
            Integration::Linear => "Linear",
            Integration::Github => "GitHub",
            Integration::Slack => "Slack",
            Integration::Discord => "Discord",
            Integration::Vercel => "Vercel",
            Integration::Google => "Google",
            Integration::Drive => "Google Drive",
            Integration::Sheets => "Google Sheets",
            Integration::Docs => "Google Docs",
        }
    }

    /// Case-insensitive lookup by canonical name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::from_str(name).ok()
    }

    /// Maps a backend OAuth account kind (`"jira_oauth"`, ...) onto the
    /// canonical integration it unlocks.
    pub fn from_oauth_kind(kind: &str) -> Option<Self> {
        match kind.to_ascii_lowercase().as_str() {
            "jira_oauth" => Some(Integration::Jira),
            "linear_oauth" => Some(Integration::Linear),
            "github_oauth" => Some(Integration::Github),
            "slack_oauth" => Some(Integration::Slack),
            "discord_oauth" => Some(Integration::Discord),
            _ => None,
        }
    }

    /// Integrations unlocked by a single active Google provider connection.
    pub const fn google_suite() -> [Self; 4] {
        [
            Integration::Google,
            Integration::Drive,
            Integration::Sheets,
            Integration::Docs,
        ]
    }
}

/// Connection status reported by the integration-account listing endpoint.
///
/// Anything the backend reports that is not `"active"` is folded into
/// [`AccountStatus::Inactive`]; only active accounts count as connected.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    #[serde(other)]
    Inactive,
}

impl AccountStatus {
    pub fn is_active(self) -> bool {
        self == AccountStatus::Active
    }
}

/// One row of the integration-account listing endpoint.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS, schemars::JsonSchema)]
pub struct IntegrationAccount {
    /// Backend OAuth account kind, e.g. `"jira_oauth"`.
    #[serde(rename = "type")]
    pub kind: String,
    pub status: AccountStatus,
}

impl IntegrationAccount {
    /// The integration this account connects, when the account is active and
    /// the kind is one we recognize.
    pub fn connected_integration(&self) -> Option<Integration> {
        if self.status.is_active() {
            Integration::from_oauth_kind(&self.kind)
        } else {
            None
        }
    }
}

/// One row of a provider-connection listing endpoint (Google, Vercel).
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProviderConnection {
    pub is_active: bool,
}
