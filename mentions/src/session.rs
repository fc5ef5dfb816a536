//! Async driver around [`MentionComposer`]: owns the candidate sources,
//! spawns one task per fetch, and feeds results back in.

use std::sync::Arc;

use crossterm::event::KeyEvent;
use katana_integrations::Registry;
use tokio::sync::mpsc;

use crate::composer::MentionComposer;
use crate::composer::MentionOutcome;
use crate::connections::ConnectionDirectory;
use crate::connections::ConnectionSources;
use crate::resolver::CandidateFetch;
use crate::resolver::FetchCall;
use crate::sources::EntityRef;
use crate::sources::EntitySource;
use crate::sources::SourceResult;

struct FetchDone {
    generation: u64,
    result: SourceResult<Vec<EntityRef>>,
}

/// A composer wired to live candidate sources. Hosts that drive their own
/// async plumbing can use [`MentionComposer`] directly; this wrapper runs
/// each [`CandidateFetch`] on a spawned task and applies results as they
/// arrive, in any order. Stale results are rejected by the composer's
/// generation check, so slow lookups cannot clobber newer keystrokes.
pub struct MentionSession {
    composer: MentionComposer,
    sources: ConnectionSources,
    entities: Arc<dyn EntitySource>,
    tx: mpsc::UnboundedSender<FetchDone>,
    rx: mpsc::UnboundedReceiver<FetchDone>,
    in_flight: usize,
}

impl MentionSession {
    /// Loads the connection snapshot and builds a session over the builtin
    /// registry.
    pub async fn connect(sources: ConnectionSources, entities: Arc<dyn EntitySource>) -> Self {
        let directory = ConnectionDirectory::load(&sources).await;
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            composer: MentionComposer::new(directory, Registry::builtin()),
            sources,
            entities,
            tx,
            rx,
            in_flight: 0,
        }
    }

    /// Forwards an input change and spawns the resulting fetch, if any.
    pub fn sync_input(&mut self, text: &str, cursor: usize) {
        if let Some(fetch) = self.composer.sync_input(text, cursor) {
            self.spawn_fetch(fetch);
        }
    }

    /// Forwards a key event. Drill-down fetches are spawned here, so the
    /// returned [`MentionOutcome::Edited`] always carries `fetch: None`.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> (MentionOutcome, bool) {
        let (mut outcome, consumed) = self.composer.handle_key_event(key_event);
        if let MentionOutcome::Edited { fetch, .. } = &mut outcome
            && let Some(fetch) = fetch.take()
        {
            self.spawn_fetch(fetch);
        }
        (outcome, consumed)
    }

    /// Re-fetches the connection snapshot; an explicit host action (opening
    /// the composer, finishing an OAuth flow), never a background poll.
    pub async fn refresh_connections(&mut self) {
        let directory = ConnectionDirectory::load(&self.sources).await;
        if let Some(fetch) = self.composer.set_connections(directory) {
            self.spawn_fetch(fetch);
        }
    }

    /// Applies every fetch result that has already arrived, without
    /// blocking. Returns true when any of them changed the popup; hosts
    /// call this once per frame and redraw on true.
    pub fn pump(&mut self) -> bool {
        let mut changed = false;
        while let Ok(done) = self.rx.try_recv() {
            self.in_flight -= 1;
            if self.composer.apply_fetch(done.generation, done.result) {
                changed = true;
            }
        }
        changed
    }

    /// Waits for every in-flight fetch and applies the results.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            let Some(done) = self.rx.recv().await else {
                break;
            };
            self.in_flight -= 1;
            self.composer.apply_fetch(done.generation, done.result);
        }
    }

    pub fn composer(&self) -> &MentionComposer {
        &self.composer
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    fn spawn_fetch(&mut self, fetch: CandidateFetch) {
        let entities = Arc::clone(&self.entities);
        let tx = self.tx.clone();
        self.in_flight += 1;
        tokio::spawn(async move {
            let CandidateFetch { generation, call } = fetch;
            let result = match call {
                FetchCall::Entities {
                    integration,
                    entity_type,
                } => entities.list_entities(integration, &entity_type).await,
                FetchCall::SubEntities {
                    integration,
                    entity_id,
                    sub_entity_type,
                    ..
                } => {
                    entities
                        .sub_entities(integration, &entity_id, &sub_entity_type)
                        .await
                }
            };
            // A dropped session means nobody is waiting for this.
            let _ = tx.send(FetchDone { generation, result });
        });
    }
}
