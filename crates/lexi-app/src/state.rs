use std::sync::Arc;
use std::time::Duration;

use lexi_config::Config;
use lexi_core::{
    ChangeObserver, Document, DomError, Highlighter, IdleTask, PageScanner, ScanReport, TermIndex,
};
use lexi_store::{KeyValueStore, LoadedState, VocabularyStore};
use lexi_types::{PageEdit, UiEvent};
use serde_json::Value;
use tokio::time::Instant;

use crate::interaction::InteractionLayer;

/// Everything the content controller owns
///
/// Lives inside the event loop task; nothing here is shared.
pub struct ContentState {
    pub config: Config,
    pub doc: Document,
    pub index: TermIndex,
    pub vocabulary: VocabularyStore,
    pub scanner: PageScanner,
    pub observer: ChangeObserver,
    pub idle: IdleTask,
    pub interaction: InteractionLayer,
    /// Activate at startup even if the stored flag is off
    pub start_active: bool,
    active: bool,
    /// Markers were dissolved for a rebuild; the next scan reports even if it finds nothing
    rebuild_pending: bool,
}

impl ContentState {
    pub fn new(config: Config, backend: Option<Arc<dyn KeyValueStore>>) -> Self {
        let highlighter = Highlighter::new(config.highlight.clone());
        Self {
            doc: Document::new(),
            index: TermIndex::new(),
            vocabulary: VocabularyStore::new(backend),
            scanner: PageScanner::new(highlighter, config.scan.min_word_len),
            observer: ChangeObserver::new(Duration::from_millis(config.observer.debounce_ms)),
            idle: IdleTask::new(Duration::from_millis(config.scan.idle_timeout_ms)),
            interaction: InteractionLayer::new(config.popup.clone(), config.viewport),
            start_active: false,
            active: false,
            rebuild_pending: false,
            config,
        }
    }

    /// Load vocabulary and the activation flag from the store
    pub async fn initialize(&mut self, now: Instant) -> LoadedState {
        let loaded = self.vocabulary.load(&mut self.index).await;
        if loaded.clue_mode || self.start_active {
            self.activate(now);
        }
        loaded
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn highlighter(&self) -> &Highlighter {
        self.scanner.highlighter()
    }

    /// Start observing and schedule a full scan; false if already active
    pub fn activate(&mut self, now: Instant) -> bool {
        if self.active {
            return false;
        }
        self.active = true;
        self.observer.start(&mut self.doc);
        self.idle.request(now);
        tracing::info!("Highlighting activated");
        true
    }

    /// Stop observing and dissolve every marker; `None` if already inactive
    pub fn deactivate(&mut self) -> Option<usize> {
        if !self.active {
            return None;
        }
        self.active = false;
        self.rebuild_pending = false;
        self.observer.stop(&mut self.doc);
        self.idle.cancel();
        self.interaction.dismiss();
        let removed = self.scanner.remove_highlights(&mut self.doc);
        tracing::info!("Highlighting deactivated, {} markers removed", removed);
        Some(removed)
    }

    /// Full pass over the body
    pub fn run_scan(&mut self, now: Instant) -> ScanReport {
        self.idle.cancel();
        if !self.active {
            return ScanReport::default();
        }
        let body = self.doc.body();
        let report = self.scanner.scan_and_highlight(&mut self.doc, body, &self.index);
        // Drain the pass's own insertions; markers never schedule a rescan
        self.observer
            .observe(&mut self.doc, self.scanner.highlighter(), now);
        report
    }

    /// Rebuild the index from a stored list; re-highlights when active
    pub fn apply_vocabulary(&mut self, value: Option<&Value>, now: Instant) -> usize {
        let entries = self.vocabulary.apply_vocabulary(value, &mut self.index);
        if self.active {
            let removed = self.scanner.remove_highlights(&mut self.doc);
            self.observer
                .observe(&mut self.doc, self.scanner.highlighter(), now);
            self.idle.request(now);
            self.rebuild_pending |= removed > 0;
            tracing::debug!("Vocabulary changed, {} markers cleared for rebuild", removed);
        }
        entries
    }

    /// Apply a host edit; returns whether it scheduled a rescan
    pub fn apply_edit(&mut self, edit: PageEdit, now: Instant) -> Result<bool, DomError> {
        let body = self.doc.body();
        match edit {
            PageEdit::AppendElement {
                parent,
                tag,
                attributes,
                text,
            } => {
                self.doc
                    .append_element(parent.unwrap_or(body), &tag, &attributes, &text)?;
            }
            PageEdit::AppendText { parent, text } => {
                let node = self.doc.create_text(&text);
                self.doc.append_child(parent.unwrap_or(body), node)?;
            }
            PageEdit::Remove(node) => self.doc.remove(node)?,
        }
        Ok(self
            .observer
            .observe(&mut self.doc, self.scanner.highlighter(), now))
    }

    pub fn take_rebuild_pending(&mut self) -> bool {
        std::mem::take(&mut self.rebuild_pending)
    }

    /// Turn an elapsed debounce into an idle scan request
    pub fn debounce_elapsed(&mut self, now: Instant) -> bool {
        if self.observer.take_if_due(now) {
            self.idle.request(now);
            return true;
        }
        false
    }

    pub fn highlights_event(&self) -> UiEvent {
        let highlighter = self.scanner.highlighter();
        UiEvent::Highlights {
            markers: highlighter.markers(&self.doc).len(),
            snapshot: highlighter.snapshot(&self.doc),
        }
    }
}
