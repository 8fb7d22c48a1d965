use std::time::Duration;

use tokio::time::Instant;

use crate::document::{Document, MutationRecord};
use crate::highlight::Highlighter;

/// Trailing-edge debounce without a maximum wait
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancel any pending deadline and schedule a new one
    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Disarm and return true once the deadline has passed
    pub fn take_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if deadline <= now => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObserverState {
    Stopped,
    Observing,
}

/// Watches page insertions and schedules debounced rescans
#[derive(Debug, Clone)]
pub struct ChangeObserver {
    state: ObserverState,
    debouncer: Debouncer,
}

impl ChangeObserver {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: ObserverState::Stopped,
            debouncer: Debouncer::new(delay),
        }
    }

    pub fn state(&self) -> ObserverState {
        self.state
    }

    pub fn start(&mut self, doc: &mut Document) {
        if self.state == ObserverState::Observing {
            return;
        }
        doc.set_observed(true);
        self.state = ObserverState::Observing;
        tracing::debug!("Change observer started");
    }

    pub fn stop(&mut self, doc: &mut Document) {
        doc.set_observed(false);
        self.debouncer.cancel();
        if self.state == ObserverState::Observing {
            tracing::debug!("Change observer stopped");
        }
        self.state = ObserverState::Stopped;
    }

    /// Drain the document's pending records; returns true if a rescan was scheduled
    pub fn observe(&mut self, doc: &mut Document, highlighter: &Highlighter, now: Instant) -> bool {
        if self.state != ObserverState::Observing {
            return false;
        }
        let records = doc.take_records();
        if records.is_empty() || !needs_rescan(&records, doc, highlighter) {
            return false;
        }
        self.debouncer.trigger(now);
        tracing::trace!("Rescan scheduled after {} mutation records", records.len());
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn take_if_due(&mut self, now: Instant) -> bool {
        self.debouncer.take_if_due(now)
    }
}

/// Any inserted element that is neither a marker nor extension UI
fn needs_rescan(records: &[MutationRecord], doc: &Document, highlighter: &Highlighter) -> bool {
    records
        .iter()
        .flat_map(|r| r.added.iter().copied())
        .filter(|&n| doc.is_element(n))
        .any(|n| !highlighter.is_marker(doc, n) && !highlighter.is_extension_owned(doc, n))
}

#[cfg(test)]
mod tests {
    use lexi_config::highlight::HighlightConfig;

    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn test_debouncer_collapses_bursts() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        debouncer.trigger(start);
        debouncer.trigger(start + Duration::from_millis(200));
        assert!(!debouncer.take_if_due(start + Duration::from_millis(300)));
        assert_eq!(debouncer.deadline(), Some(start + Duration::from_millis(500)));
        assert!(debouncer.take_if_due(start + Duration::from_millis(500)));
        assert!(!debouncer.is_armed());
        assert!(!debouncer.take_if_due(start + Duration::from_secs(5)));
    }

    #[test]
    fn test_observer_ignores_markers_and_extension_nodes() {
        let highlighter = Highlighter::new(HighlightConfig::default());
        let mut doc = Document::new();
        let mut observer = ChangeObserver::new(DELAY);
        let now = Instant::now();
        observer.start(&mut doc);

        let marker = doc.create_element_with("span", [("class", "leximind-clue")]);
        doc.append_child(doc.body(), marker).unwrap();
        let host = doc.create_element_with("div", [("id", "leximind-ai-host")]);
        doc.append_child(doc.body(), host).unwrap();
        let popup_child = doc.create_element("div");
        doc.append_child(host, popup_child).unwrap();
        let text = doc.create_text("loose text");
        doc.append_child(doc.body(), text).unwrap();

        assert!(!observer.observe(&mut doc, &highlighter, now));
        assert_eq!(observer.deadline(), None);

        let p = doc.create_element("p");
        doc.append_child(doc.body(), p).unwrap();
        assert!(observer.observe(&mut doc, &highlighter, now));
        assert_eq!(observer.deadline(), Some(now + DELAY));
    }

    #[test]
    fn test_stopped_observer_records_nothing() {
        let highlighter = Highlighter::new(HighlightConfig::default());
        let mut doc = Document::new();
        let mut observer = ChangeObserver::new(DELAY);
        let now = Instant::now();

        observer.start(&mut doc);
        let p = doc.create_element("p");
        doc.append_child(doc.body(), p).unwrap();
        assert!(observer.observe(&mut doc, &highlighter, now));

        observer.stop(&mut doc);
        assert_eq!(observer.state(), ObserverState::Stopped);
        assert_eq!(observer.deadline(), None);

        let p = doc.create_element("p");
        doc.append_child(doc.body(), p).unwrap();
        assert!(!observer.observe(&mut doc, &highlighter, now));
        assert!(doc.take_records().is_empty());
    }
}
