//! Splices a selected candidate back into the host buffer.

use crate::item::AutocompleteItem;
use crate::item::ItemKind;
use crate::parse::MentionLevel;
use crate::parse::MentionSpan;
use crate::parse::ParsedMention;

/// Replacement buffer contents plus the new cursor offset, applied verbatim
/// by the host input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEdit {
    pub text: String,
    pub cursor: usize,
}

/// What committing a candidate did to the mention.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AppliedSelection {
    /// Integration drill-down; the popup moves on to the command catalog.
    Drill { edit: BufferEdit },
    /// Leaf selection; the popup closes. Entity-path commits carry the
    /// resolved mention for the host callback.
    Commit {
        edit: BufferEdit,
        mention: Option<ParsedMention>,
    },
}

/// Rewrites the mention token at `span` according to the selected item.
/// Returns `None` when the item is missing the fields its kind requires.
pub(crate) fn apply_selection(
    buffer: &str,
    span: MentionSpan,
    level: &MentionLevel,
    item: &AutocompleteItem,
) -> Option<AppliedSelection> {
    match item.kind {
        ItemKind::Integration => {
            let integration = item.integration?;
            let mention = format!("@{}:", integration.name());
            Some(AppliedSelection::Drill {
                edit: splice(buffer, span, &mention),
            })
        }
        ItemKind::Command => {
            let integration = item.integration?;
            let command = item.command.as_deref().unwrap_or(item.id.as_str());
            let spliced = format!("@{}:{command} ", integration.name());
            Some(AppliedSelection::Commit {
                edit: splice(buffer, span, &spliced),
                mention: None,
            })
        }
        ItemKind::Entity | ItemKind::SubEntity => {
            let path = mention_path(level, item)?;
            let spliced = format!("{path} ");
            let edit = splice(buffer, span, &spliced);
            let mention = ParsedMention::from_span(
                &edit.text,
                MentionSpan {
                    start: span.start,
                    end: span.start + path.len(),
                },
            );
            Some(AppliedSelection::Commit {
                edit,
                mention: Some(mention),
            })
        }
    }
}

/// The full mention path after appending the selected segment to the
/// segments already typed.
fn mention_path(level: &MentionLevel, item: &AutocompleteItem) -> Option<String> {
    match level {
        MentionLevel::EntityList {
            integration,
            entity_type,
        } => Some(format!("@{}:{entity_type}:{}", integration.name(), item.id)),
        MentionLevel::SubEntityTypeList {
            integration,
            entity_type,
            entity_id,
            ..
        } => Some(format!(
            "@{}:{entity_type}:{entity_id}:{}",
            integration.name(),
            item.id
        )),
        MentionLevel::SubEntityList {
            integration,
            entity_type,
            entity_id,
            sub_entity_type,
        } => Some(format!(
            "@{}:{entity_type}:{entity_id}:{sub_entity_type}:{}",
            integration.name(),
            item.id
        )),
        _ => None,
    }
}

fn splice(buffer: &str, span: MentionSpan, insert: &str) -> BufferEdit {
    let mut text = String::with_capacity(buffer.len() - span.len() + insert.len());
    text.push_str(&buffer[..span.start]);
    text.push_str(insert);
    text.push_str(&buffer[span.end..]);
    BufferEdit {
        text,
        cursor: span.start + insert.len(),
    }
}
