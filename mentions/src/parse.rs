//! Incremental parsing of the mention token around the cursor.
//!
//! The grammar is `@integration[:entityType[:entityId[:subEntityType
//! [:subEntityId]]]]`, with the special form `@integration:command-with-dashes`
//! for leaf commands. Parsing is re-run in full on every text or cursor
//! change; nothing here holds state between evaluations.

use katana_integrations::Integration;
use katana_integrations::Registry;
use serde::Deserialize;
use serde::Serialize;
use ts_rs::TS;

use crate::connections::ConnectionDirectory;

/// Byte span of the active mention token in the buffer: `start` is the
/// offset of `@`, `end` the token end (next whitespace or end of buffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MentionSpan {
    pub start: usize,
    pub end: usize,
}

impl MentionSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end == self.start
    }
}

/// A mention split positionally on `:`. Created fresh per evaluation and on
/// entity-path commits; replaced wholesale, never mutated in place.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParsedMention {
    pub integration: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_entity_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_entity_id: Option<String>,
    /// Exactly `buffer[start_index..end_index]`.
    pub full_text: String,
    #[ts(type = "number")]
    pub start_index: usize,
    #[ts(type = "number")]
    pub end_index: usize,
}

impl ParsedMention {
    /// Positional parse of `buffer[span.start..span.end]`: up to five
    /// `:`-separated segments assigned in order, stopping at the first empty
    /// segment.
    pub fn from_span(buffer: &str, span: MentionSpan) -> Self {
        let full_text = buffer[span.start..span.end].to_string();
        let rest = full_text.strip_prefix('@').unwrap_or(&full_text);

        let mut parts = rest.splitn(5, ':');
        let integration = parts.next().unwrap_or_default().to_string();
        let mut slots: [Option<String>; 4] = [None, None, None, None];
        if !integration.is_empty() {
            for slot in &mut slots {
                match parts.next() {
                    Some(segment) if !segment.is_empty() => *slot = Some(segment.to_string()),
                    _ => break,
                }
            }
        }
        let [entity_type, entity_id, sub_entity_type, sub_entity_id] = slots;

        Self {
            integration,
            entity_type,
            entity_id,
            sub_entity_type,
            sub_entity_id,
            full_text,
            start_index: span.start,
            end_index: span.end,
        }
    }
}

/// Extracts every mention token from a finished message, in order.
///
/// Purely lexical: a token starts at `@` and runs to the next whitespace,
/// a later `@` inside a token starts over, and a bare `@` is skipped. No
/// connection or registry checks happen here; hosts that only want live
/// integrations filter the result.
pub fn parse_mentions(text: &str) -> Vec<ParsedMention> {
    let mut mentions = Vec::new();
    let mut start = None;
    for (offset, ch) in text.char_indices() {
        if ch == '@' {
            start = Some(offset);
        } else if ch.is_whitespace()
            && let Some(begin) = start.take()
        {
            push_mention(text, begin, offset, &mut mentions);
        }
    }
    if let Some(begin) = start {
        push_mention(text, begin, text.len(), &mut mentions);
    }
    mentions
}

fn push_mention(text: &str, start: usize, end: usize, mentions: &mut Vec<ParsedMention>) {
    let mention = ParsedMention::from_span(text, MentionSpan { start, end });
    if !mention.integration.is_empty() {
        mentions.push(mention);
    }
}

/// What the grammar still needs at the cursor position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionLevel {
    /// Bare `@`: every connected integration.
    AllIntegrations,
    /// Typing an integration name: prefix-filter the connected list.
    IntegrationFilter { partial: String },
    /// Connected integration chosen: its command catalog.
    CommandList {
        integration: Integration,
        partial: String,
    },
    /// `@int:type:` — entity ids come from the backend.
    EntityList {
        integration: Integration,
        entity_type: String,
    },
    /// `@int:type:id` — the static sub-entity menu for the pair.
    SubEntityTypeList {
        integration: Integration,
        entity_type: String,
        entity_id: String,
        partial: String,
    },
    /// `@int:type:id:sub:` — sub-entity ids come from the backend.
    SubEntityList {
        integration: Integration,
        entity_type: String,
        entity_id: String,
        sub_entity_type: String,
    },
}

/// An open mention token at the cursor plus the level to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveMention {
    pub span: MentionSpan,
    pub level: MentionLevel,
}

/// Finds the mention token the cursor sits in, if any, and classifies how far
/// the grammar has been typed.
///
/// Returns `None` for closed mentions: whitespace between `@` and the cursor,
/// a fully typed hyphenated command with the cursor at the token edge, or a
/// complete five-segment path. Closed mentions have nothing left to
/// autocomplete.
pub fn active_mention(
    buffer: &str,
    cursor: usize,
    connections: &ConnectionDirectory,
    registry: &Registry,
) -> Option<ActiveMention> {
    let cursor = clamp_to_char_boundary(buffer, cursor);
    let start = buffer[..cursor].rfind('@')?;

    // Whitespace anywhere between `@` and the cursor closes the mention.
    if buffer[start + 1..cursor].chars().any(char::is_whitespace) {
        return None;
    }

    let end = buffer[start + 1..]
        .find(char::is_whitespace)
        .map_or(buffer.len(), |offset| start + 1 + offset);
    let span = MentionSpan { start, end };

    let typed = &buffer[start + 1..cursor];
    let after_cursor = buffer[cursor..].chars().next();
    let level = classify(typed, after_cursor, connections, registry)?;
    Some(ActiveMention { span, level })
}

/// Classifies the text typed between `@` and the cursor. `after_cursor` is
/// the character at the cursor, when the token continues past it.
fn classify(
    typed: &str,
    after_cursor: Option<char>,
    connections: &ConnectionDirectory,
    registry: &Registry,
) -> Option<MentionLevel> {
    let Some(colon) = typed.find(':') else {
        // Cursor parked at the end of a fully typed name with the `:` just
        // past it reads as command level, same as having typed the colon.
        if !typed.is_empty() && after_cursor == Some(':') {
            if let Some(integration) = connections.resolve(typed) {
                return Some(MentionLevel::CommandList {
                    integration,
                    partial: String::new(),
                });
            }
        }
        return Some(integration_filter_level(typed));
    };

    let integration_part = &typed[..colon];
    let remainder = &typed[colon + 1..];

    // A hyphen after the first `:` reads as a fully typed command
    // (`create-issue`); at the token edge that closes the mention. This is
    // the documented fuzzy rule: hyphenated entity ids such as `PROJ-123`
    // close the mention too. Keep it in sync with the module tests rather
    // than tightening it against the catalog.
    if remainder.contains('-') && after_cursor.is_none_or(char::is_whitespace) {
        return None;
    }

    let Some(integration) = connections.resolve(integration_part) else {
        return Some(integration_filter_level(integration_part));
    };

    let segments: Vec<&str> = remainder.splitn(4, ':').collect();
    if segments.len() == 4 && segments.iter().all(|segment| !segment.is_empty()) {
        // All five path segments are present; the mention is fully specified.
        return None;
    }

    let entity_type = segments.first().copied().unwrap_or_default();
    if entity_type.is_empty() {
        return Some(MentionLevel::CommandList {
            integration,
            partial: String::new(),
        });
    }
    if registry.entity_type(integration, entity_type).is_none() {
        // Not a mentionable entity type, so this is command text.
        return Some(MentionLevel::CommandList {
            integration,
            partial: remainder.to_string(),
        });
    }

    let entity_id = segments.get(1).copied().unwrap_or_default();
    if entity_id.is_empty() {
        return Some(MentionLevel::EntityList {
            integration,
            entity_type: entity_type.to_string(),
        });
    }

    let sub_entity_type = segments.get(2).copied().unwrap_or_default();
    if sub_entity_type.is_empty() {
        return Some(MentionLevel::SubEntityTypeList {
            integration,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            partial: String::new(),
        });
    }
    if registry
        .sub_entry(integration, entity_type, sub_entity_type)
        .is_none()
    {
        return Some(MentionLevel::SubEntityTypeList {
            integration,
            entity_type: entity_type.to_string(),
            entity_id: entity_id.to_string(),
            partial: sub_entity_type.to_string(),
        });
    }

    Some(MentionLevel::SubEntityList {
        integration,
        entity_type: entity_type.to_string(),
        entity_id: entity_id.to_string(),
        sub_entity_type: sub_entity_type.to_string(),
    })
}

fn integration_filter_level(partial: &str) -> MentionLevel {
    if partial.is_empty() {
        MentionLevel::AllIntegrations
    } else {
        MentionLevel::IntegrationFilter {
            partial: partial.to_string(),
        }
    }
}

fn clamp_to_char_boundary(buffer: &str, cursor: usize) -> usize {
    let mut cursor = cursor.min(buffer.len());
    while !buffer.is_char_boundary(cursor) {
        cursor -= 1;
    }
    cursor
}
