//! Synchronous orchestration: popup state, re-derivation on input changes,
//! and the keyboard contract.

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use katana_integrations::Registry;
use tracing::debug;

use crate::apply;
use crate::apply::AppliedSelection;
use crate::apply::BufferEdit;
use crate::connections::ConnectionDirectory;
use crate::item::AutocompleteItem;
use crate::parse;
use crate::parse::MentionLevel;
use crate::parse::MentionSpan;
use crate::parse::ParsedMention;
use crate::resolver;
use crate::resolver::CandidateFetch;
use crate::resolver::Resolution;
use crate::sources::EntityRef;
use crate::sources::SourceResult;

/// What a handled event asks the host to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionOutcome {
    /// Nothing to apply (key passed through, or only the highlight moved).
    None,
    /// Integration drill-down: apply the edit; the popup is already showing
    /// the next level. `fetch` must be run when present.
    Edited {
        edit: BufferEdit,
        fetch: Option<CandidateFetch>,
    },
    /// Leaf commit: apply the edit and close the popup. Entity-path commits
    /// carry the resolved mention for the host callback.
    Committed {
        edit: BufferEdit,
        mention: Option<ParsedMention>,
    },
    /// Esc closed the popup without committing.
    Dismissed,
}

struct MentionPopup {
    span: MentionSpan,
    level: MentionLevel,
    items: Vec<AutocompleteItem>,
    selected: usize,
    loading: bool,
    pending: Option<CandidateFetch>,
}

/// The mention engine a chat input embeds: feed it every `(text, cursor)`
/// change and every key event, render [`MentionComposer::candidates`], and
/// apply the returned edits.
///
/// All state is owned here and rebuilt from the buffer on each change; the
/// async half lives in [`MentionSession`](crate::MentionSession).
pub struct MentionComposer {
    connections: ConnectionDirectory,
    registry: &'static Registry,
    buffer: String,
    cursor: usize,
    popup: Option<MentionPopup>,
    /// Token text the user dismissed with Esc; the popup stays closed until
    /// the token changes.
    dismissed_token: Option<String>,
    generation: u64,
}

impl MentionComposer {
    pub fn new(connections: ConnectionDirectory, registry: &'static Registry) -> Self {
        Self {
            connections,
            registry,
            buffer: String::new(),
            cursor: 0,
            popup: None,
            dismissed_token: None,
            generation: 0,
        }
    }

    /// Re-derives the popup for the current `(text, cursor)` pair. Both text
    /// edits and selection-only cursor moves come through here. The returned
    /// fetch, when present, must be run and its result handed to
    /// [`MentionComposer::apply_fetch`].
    pub fn sync_input(&mut self, text: &str, cursor: usize) -> Option<CandidateFetch> {
        if text == self.buffer && cursor == self.cursor {
            // Intercepted keys cause no input change; recomputing here would
            // reset the highlight the user just moved.
            return None;
        }
        self.buffer = text.to_string();
        self.cursor = cursor;
        self.recompute()
    }

    /// Applies the result of a candidate fetch. Returns false when the
    /// result was stale (a newer fetch has been issued since) or the popup
    /// is gone; stale results are discarded, never merged.
    pub fn apply_fetch(&mut self, generation: u64, result: SourceResult<Vec<EntityRef>>) -> bool {
        let Some(popup) = &mut self.popup else {
            debug!("dropping fetch result {generation}: popup closed");
            return false;
        };
        let Some(pending) = &popup.pending else {
            debug!("dropping fetch result {generation}: nothing pending");
            return false;
        };
        if pending.generation != generation {
            debug!(
                "dropping stale fetch result {generation} (current {})",
                pending.generation
            );
            return false;
        }

        let call = pending.call.clone();
        popup.pending = None;
        popup.loading = false;
        popup.selected = 0;
        popup.items = match result {
            Ok(rows) => resolver::fetched_items(&call, rows),
            Err(err) => {
                // Deliberate silent degrade: no candidates is the only
                // user-visible failure mode.
                debug!("candidate lookup failed, showing nothing: {err}");
                Vec::new()
            }
        };
        true
    }

    /// The keyboard contract. The returned bool reports whether the event
    /// was consumed; unconsumed events belong to the host input. Keys are
    /// only intercepted while the popup is open with at least one candidate.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (MentionOutcome, bool) {
        if !self.popup_active() {
            return (MentionOutcome::None, false);
        }
        match key_event {
            KeyEvent {
                code: KeyCode::Up, ..
            } => {
                self.move_selection(-1);
                (MentionOutcome::None, true)
            }
            KeyEvent {
                code: KeyCode::Down,
                ..
            } => {
                self.move_selection(1);
                (MentionOutcome::None, true)
            }
            KeyEvent {
                code: KeyCode::Enter,
                ..
            }
            | KeyEvent {
                code: KeyCode::Tab, ..
            } => self.commit_selected(),
            KeyEvent {
                code: KeyCode::Esc, ..
            } => {
                self.dismiss();
                (MentionOutcome::Dismissed, true)
            }
            _ => (MentionOutcome::None, false),
        }
    }

    /// Replaces the connection snapshot (after a refresh) and re-derives.
    pub fn set_connections(&mut self, connections: ConnectionDirectory) -> Option<CandidateFetch> {
        self.connections = connections;
        self.recompute()
    }

    pub fn connections(&self) -> &ConnectionDirectory {
        &self.connections
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn popup_open(&self) -> bool {
        self.popup.is_some()
    }

    /// Candidate rows to render, top to bottom. Empty while closed, loading,
    /// or degraded.
    pub fn candidates(&self) -> &[AutocompleteItem] {
        self.popup
            .as_ref()
            .map_or(&[], |popup| popup.items.as_slice())
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.popup.as_ref().map(|popup| popup.selected)
    }

    pub fn is_loading(&self) -> bool {
        self.popup.as_ref().is_some_and(|popup| popup.loading)
    }

    pub fn level(&self) -> Option<&MentionLevel> {
        self.popup.as_ref().map(|popup| &popup.level)
    }

    fn popup_active(&self) -> bool {
        self.popup
            .as_ref()
            .is_some_and(|popup| !popup.items.is_empty())
    }

    fn move_selection(&mut self, delta: isize) {
        if let Some(popup) = &mut self.popup {
            let len = popup.items.len();
            if len == 0 {
                return;
            }
            // Wrap in both directions.
            popup.selected = if delta < 0 {
                (popup.selected + len - 1) % len
            } else {
                (popup.selected + 1) % len
            };
        }
    }

    fn dismiss(&mut self) {
        if let Some(popup) = self.popup.take() {
            self.dismissed_token = Some(self.buffer[popup.span.start..popup.span.end].to_string());
        }
    }

    fn commit_selected(&mut self) -> (MentionOutcome, bool) {
        let Some(popup) = &self.popup else {
            return (MentionOutcome::None, false);
        };
        let Some(item) = popup.items.get(popup.selected).cloned() else {
            return (MentionOutcome::None, false);
        };
        let Some(applied) = apply::apply_selection(&self.buffer, popup.span, &popup.level, &item)
        else {
            debug!("selected item cannot be applied: {item:?}");
            return (MentionOutcome::None, true);
        };
        match applied {
            AppliedSelection::Drill { edit } => {
                self.buffer = edit.text.clone();
                self.cursor = edit.cursor;
                let fetch = self.recompute();
                (MentionOutcome::Edited { edit, fetch }, true)
            }
            AppliedSelection::Commit { edit, mention } => {
                self.buffer = edit.text.clone();
                self.cursor = edit.cursor;
                self.popup = None;
                self.dismissed_token = None;
                (MentionOutcome::Committed { edit, mention }, true)
            }
        }
    }

    fn recompute(&mut self) -> Option<CandidateFetch> {
        let Some(active) =
            parse::active_mention(&self.buffer, self.cursor, &self.connections, self.registry)
        else {
            self.popup = None;
            self.dismissed_token = None;
            return None;
        };

        let token = &self.buffer[active.span.start..active.span.end];
        if self.dismissed_token.as_deref() == Some(token) {
            self.popup = None;
            return None;
        }
        self.dismissed_token = None;

        match resolver::resolve(&active.level, &self.connections, self.registry) {
            Resolution::Ready(items) => {
                self.popup = Some(MentionPopup {
                    span: active.span,
                    level: active.level,
                    items,
                    selected: 0,
                    loading: false,
                    pending: None,
                });
                None
            }
            Resolution::Fetch(call) => {
                self.generation += 1;
                let fetch = CandidateFetch {
                    generation: self.generation,
                    call,
                };
                self.popup = Some(MentionPopup {
                    span: active.span,
                    level: active.level,
                    items: Vec::new(),
                    selected: 0,
                    loading: true,
                    pending: Some(fetch.clone()),
                });
                Some(fetch)
            }
        }
    }
}
