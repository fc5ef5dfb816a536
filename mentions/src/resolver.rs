//! Maps a parse level to a concrete candidate list, sync or async.

use katana_integrations::Integration;
use katana_integrations::Registry;

use crate::connections::ConnectionDirectory;
use crate::item::AutocompleteItem;
use crate::parse::MentionLevel;
use crate::sources::EntityRef;

/// A backend lookup the resolver needs before candidates exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchCall {
    Entities {
        integration: Integration,
        entity_type: String,
    },
    SubEntities {
        integration: Integration,
        entity_type: String,
        entity_id: String,
        sub_entity_type: String,
    },
}

/// A generation-stamped backend lookup. Results are applied only while their
/// generation is still the latest issued one, so a slow response can never
/// overwrite the candidates of a newer keystroke.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateFetch {
    pub generation: u64,
    pub call: FetchCall,
}

/// Outcome of one synchronous resolver pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Resolution {
    Ready(Vec<AutocompleteItem>),
    Fetch(FetchCall),
}

pub(crate) fn resolve(
    level: &MentionLevel,
    connections: &ConnectionDirectory,
    registry: &Registry,
) -> Resolution {
    match level {
        MentionLevel::AllIntegrations => Resolution::Ready(
            connections
                .connected()
                .map(AutocompleteItem::for_integration)
                .collect(),
        ),
        MentionLevel::IntegrationFilter { partial } => {
            let needle = partial.to_ascii_lowercase();
            Resolution::Ready(
                connections
                    .connected()
                    .filter(|integration| integration.name().starts_with(needle.as_str()))
                    .map(AutocompleteItem::for_integration)
                    .collect(),
            )
        }
        MentionLevel::CommandList { integration, .. } => Resolution::Ready(
            registry
                .commands(*integration)
                .iter()
                .map(|spec| AutocompleteItem::for_command(*integration, spec))
                .collect(),
        ),
        MentionLevel::EntityList {
            integration,
            entity_type,
        } => Resolution::Fetch(FetchCall::Entities {
            integration: *integration,
            entity_type: entity_type.clone(),
        }),
        MentionLevel::SubEntityTypeList {
            integration,
            entity_type,
            entity_id,
            ..
        } => Resolution::Ready(
            registry
                .sub_menu(*integration, entity_type)
                .iter()
                .map(|entry| {
                    AutocompleteItem::for_sub_entry(*integration, entity_type, entity_id, entry)
                })
                .collect(),
        ),
        MentionLevel::SubEntityList {
            integration,
            entity_type,
            entity_id,
            sub_entity_type,
        } => Resolution::Fetch(FetchCall::SubEntities {
            integration: *integration,
            entity_type: entity_type.clone(),
            entity_id: entity_id.clone(),
            sub_entity_type: sub_entity_type.clone(),
        }),
    }
}

/// Builds candidate rows out of fetched entity rows, keyed by the call that
/// requested them.
pub(crate) fn fetched_items(call: &FetchCall, rows: Vec<EntityRef>) -> Vec<AutocompleteItem> {
    match call {
        FetchCall::Entities {
            integration,
            entity_type,
        } => rows
            .into_iter()
            .map(|row| AutocompleteItem::for_entity(*integration, entity_type, row))
            .collect(),
        FetchCall::SubEntities {
            integration,
            entity_type,
            entity_id,
            sub_entity_type,
        } => rows
            .into_iter()
            .map(|row| {
                AutocompleteItem::for_sub_entity(
                    *integration,
                    entity_type,
                    entity_id,
                    sub_entity_type,
                    row,
                )
            })
            .collect(),
    }
}
