//! Candidate rows offered by the autocomplete popup.

use katana_integrations::CommandSpec;
use katana_integrations::Integration;
use katana_integrations::SubEntrySpec;
use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::sources::EntityRef;

/// Which grammar position a candidate row completes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS, schemars::JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Integration,
    Command,
    Entity,
    SubEntity,
}

/// One row of the candidate list. Regenerated on every resolver pass and
/// never persisted; the optional fields describe the mention path the row
/// completes.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AutocompleteItem {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: ItemKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub integration: Option<Integration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_entity_type: Option<String>,
    /// Secondary popup line, e.g. a command description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Opaque payload for host-defined sources; the engine never reads it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl AutocompleteItem {
    pub(crate) fn for_integration(integration: Integration) -> Self {
        Self {
            id: integration.name().to_string(),
            label: integration.label().to_string(),
            kind: ItemKind::Integration,
            integration: Some(integration),
            command: None,
            entity_type: None,
            entity_id: None,
            sub_entity_type: None,
            detail: None,
            data: None,
        }
    }

    pub(crate) fn for_command(integration: Integration, spec: &CommandSpec) -> Self {
        Self {
            id: spec.name.to_string(),
            label: spec.label.to_string(),
            kind: ItemKind::Command,
            integration: Some(integration),
            command: Some(spec.name.to_string()),
            entity_type: None,
            entity_id: None,
            sub_entity_type: None,
            detail: Some(spec.description.to_string()),
            data: None,
        }
    }

    pub(crate) fn for_entity(integration: Integration, entity_type: &str, row: EntityRef) -> Self {
        Self {
            id: row.id,
            label: row.name,
            kind: ItemKind::Entity,
            integration: Some(integration),
            command: None,
            entity_type: Some(entity_type.to_string()),
            entity_id: None,
            sub_entity_type: None,
            detail: None,
            data: None,
        }
    }

    pub(crate) fn for_sub_entry(
        integration: Integration,
        entity_type: &str,
        entity_id: &str,
        entry: &SubEntrySpec,
    ) -> Self {
        Self {
            id: entry.name.to_string(),
            label: entry.label.to_string(),
            kind: ItemKind::SubEntity,
            integration: Some(integration),
            command: None,
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            sub_entity_type: Some(entry.name.to_string()),
            detail: None,
            data: None,
        }
    }

    pub(crate) fn for_sub_entity(
        integration: Integration,
        entity_type: &str,
        entity_id: &str,
        sub_entity_type: &str,
        row: EntityRef,
    ) -> Self {
        Self {
            id: row.id,
            label: row.name,
            kind: ItemKind::SubEntity,
            integration: Some(integration),
            command: None,
            entity_type: Some(entity_type.to_string()),
            entity_id: Some(entity_id.to_string()),
            sub_entity_type: Some(sub_entity_type.to_string()),
            detail: None,
            data: None,
        }
    }
}
