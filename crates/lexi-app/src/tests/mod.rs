use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

use kanal::{AsyncReceiver, AsyncSender};
use lexi_config::Config;
use lexi_lookup::Lookup;
use lexi_store::{CLUE_MODE_KEY, KeyValueStore, MemoryStore, VOCABULARY_KEY};
use lexi_types::{AppEvent, UiEvent, VocabularyEntry};
use serde_json::json;
use tokio::task::JoinSet;
use tokio::time::timeout;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::storage_io;
use crate::page::seed_page;
use crate::state::ContentState;

mod event_loop_tests;
mod interaction_tests;

pub fn run_entry() -> VocabularyEntry {
    let mut entry = VocabularyEntry::bare("run", 1_700_000_000_000);
    entry.phonetic = "/rʌn/".into();
    entry.definition_primary = "move swiftly on foot".into();
    entry.variants = BTreeSet::from(["run".to_string(), "running".to_string(), "ran".to_string()]);
    entry
}

pub fn backend(entries: Vec<VocabularyEntry>, clue_mode: bool) -> Arc<dyn KeyValueStore> {
    Arc::new(MemoryStore::with_values([
        (VOCABULARY_KEY.to_string(), json!(entries)),
        (CLUE_MODE_KEY.to_string(), json!(clue_mode)),
    ]))
}

pub fn content_state(backend: Option<Arc<dyn KeyValueStore>>, page: &str) -> ContentState {
    let mut state = ContentState::new(Config::new(), backend);
    seed_page(&mut state.doc, page).expect("seed page");
    state
}

/// Event loop plus store forwarding, driven through channels
pub struct Harness {
    tx: AsyncSender<AppEvent>,
    ui_rx: AsyncReceiver<UiEvent>,
    cancel: CancellationToken,
    tasks: JoinSet<anyhow::Result<()>>,
}

impl Harness {
    pub fn spawn(state: ContentState, lookup: Option<Arc<dyn Lookup>>) -> Self {
        Self::spawn_with(state, lookup, Vec::new())
    }

    /// Start with `queued` events already waiting in the channel
    pub fn spawn_with(
        state: ContentState,
        lookup: Option<Arc<dyn Lookup>>,
        queued: Vec<AppEvent>,
    ) -> Self {
        let (tx, rx) = kanal::unbounded_async::<AppEvent>();
        for event in queued {
            tx.try_send(event).expect("queue event");
        }
        let (ui_tx, ui_rx) = kanal::unbounded_async::<UiEvent>();
        let cancel = CancellationToken::new();

        let mut tasks = JoinSet::new();
        if let Some(changes) = state.vocabulary.subscribe() {
            tasks.spawn(storage_io(cancel.child_token(), changes, tx.clone()));
        }
        tasks.spawn(event_loop(state, rx, ui_tx, lookup, cancel.child_token()));

        Self {
            tx,
            ui_rx,
            cancel,
            tasks,
        }
    }

    pub async fn send(&self, event: AppEvent) {
        self.tx.send(event).await.expect("send failed");
    }

    pub async fn next_ui(&self) -> UiEvent {
        match timeout(Duration::from_secs(5), self.ui_rx.recv()).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => panic!("UI channel error: {}", e),
            Err(_) => panic!("Timeout waiting for UI event"),
        }
    }

    pub async fn expect_quiet(&self, window: Duration) {
        if let Ok(event) = timeout(window, self.ui_rx.recv()).await {
            panic!("Unexpected UI event: {:?}", event);
        }
    }

    /// Skip the startup status line
    pub async fn loaded(&self) -> String {
        match self.next_ui().await {
            UiEvent::Status(message) => message,
            other => panic!("Expected startup status, got {:?}", other),
        }
    }

    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        while let Some(result) = self.tasks.join_next().await {
            result.expect("task panicked").expect("task failed");
        }
    }
}
