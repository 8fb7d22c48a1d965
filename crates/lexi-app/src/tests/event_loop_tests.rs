use std::sync::Arc;
use std::time::Duration;

use lexi_lookup::{Lookup, LookupError, LookupRecord, ProviderMetadata};
use lexi_types::{AppEvent, HostEvent, PageEdit, UiEvent, VocabularyEntry};
use tokio::time::Instant;

use super::{Harness, backend, content_state, run_entry};

fn paragraph(text: &str) -> AppEvent {
    AppEvent::Host(HostEvent::Edit(PageEdit::AppendElement {
        parent: None,
        tag: "p".into(),
        attributes: Vec::new(),
        text: text.into(),
    }))
}

#[tokio::test(start_paused = true)]
async fn test_mutation_burst_collapses_into_one_rescan() {
    let state = content_state(Some(backend(vec![run_entry()], true)), "");
    let harness = Harness::spawn(state, None);
    assert_eq!(harness.loaded().await, "1 vocabulary entries loaded, highlighting on");

    let mut last_edit = Instant::now();
    for i in 0..5 {
        harness
            .send(paragraph(&format!("Item {i}: she was running late")))
            .await;
        last_edit = Instant::now();
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    match harness.next_ui().await {
        UiEvent::Highlights { markers, snapshot } => {
            assert_eq!(markers, 5);
            assert!(snapshot.contains("Item 0: she was [running] late\n"));
            assert!(snapshot.contains("Item 4: she was [running] late\n"));
        }
        other => panic!("Unexpected UI event: {:?}", other),
    }
    assert!(Instant::now() >= last_edit + Duration::from_millis(300));

    // One pass covered the whole burst
    harness.expect_quiet(Duration::from_secs(2)).await;
    harness.shutdown().await;
}

#[tokio::test(start_paused = true)]
async fn test_text_only_insertions_do_not_rescan() {
    let state = content_state(Some(backend(vec![run_entry()], true)), "");
    let harness = Harness::spawn(state, None);
    harness.loaded().await;

    harness
        .send(AppEvent::Host(HostEvent::Edit(PageEdit::AppendText {
            parent: None,
            text: "running".into(),
        })))
        .await;
    harness.expect_quiet(Duration::from_secs(2)).await;
    harness.shutdown().await;
}

#[tokio::test]
async fn test_toggle_off_restores_page_text() {
    let entries = vec![run_entry(), VocabularyEntry::bare("machine learning", 0)];
    let state = content_state(
        Some(backend(entries, true)),
        "I study machine learning daily.\n\nShe ran home, running fast.",
    );
    let before = state.highlighter().snapshot(&state.doc);
    let harness = Harness::spawn(state, None);
    harness.loaded().await;

    match harness.next_ui().await {
        UiEvent::Highlights { markers, snapshot } => {
            assert_eq!(markers, 3);
            assert_eq!(
                snapshot,
                "I study [machine learning] daily.\nShe [ran] home, [running] fast.\n"
            );
        }
        other => panic!("Unexpected UI event: {:?}", other),
    }

    harness.send(AppEvent::SetClueMode(false)).await;
    match harness.next_ui().await {
        UiEvent::Highlights { markers, snapshot } => {
            assert_eq!(markers, 0);
            assert_eq!(snapshot, before);
        }
        other => panic!("Unexpected UI event: {:?}", other),
    }

    // And back on
    harness.send(AppEvent::SetClueMode(true)).await;
    assert!(matches!(
        harness.next_ui().await,
        UiEvent::Highlights { markers: 3, .. }
    ));
    harness.shutdown().await;
}

struct SlowFailingLookup;

#[async_trait::async_trait]
impl Lookup for SlowFailingLookup {
    async fn lookup(&self, _text: &str) -> Result<LookupRecord, LookupError> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Err(LookupError::Service("offline".into()))
    }

    fn metadata(&self) -> ProviderMetadata {
        ProviderMetadata {
            name: "slow".into(),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn test_idle_timeout_scans_under_steady_load() {
    let state = content_state(Some(backend(vec![run_entry()], true)), "She was running late.");
    let queued = (0..10)
        .map(|i| AppEvent::AddToVocabulary(format!("word{i}")))
        .collect();
    let harness = Harness::spawn_with(state, Some(Arc::new(SlowFailingLookup)), queued);

    let mut events = Vec::new();
    for _ in 0..12 {
        events.push(harness.next_ui().await);
    }

    // Startup status, five 200ms lookups, then the overdue scan
    let position = events
        .iter()
        .position(|e| matches!(e, UiEvent::Highlights { .. }))
        .expect("scan never ran");
    assert_eq!(position, 6);
    assert!(matches!(&events[1], UiEvent::Status(m) if m.starts_with("Lookup failed for 'word0'")));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_empty_vocabulary_leaves_page_untouched() {
    let mut state = content_state(Some(backend(Vec::new(), true)), "She was running late.");
    let now = Instant::now();
    let loaded = state.initialize(now).await;
    assert!(loaded.clue_mode);
    assert!(state.is_active());
    state.doc.take_records();

    let body = state.doc.body();
    let report = state
        .scanner
        .scan_and_highlight(&mut state.doc, body, &state.index);
    assert_eq!(report.visited, 0);
    assert_eq!(report.markers, 0);
    assert!(state.doc.take_records().is_empty());
}

#[tokio::test]
async fn test_missing_store_starts_inactive() {
    let mut state = content_state(None, "She was running late.");
    let loaded = state.initialize(Instant::now()).await;
    assert_eq!(loaded.entries, 0);
    assert!(!state.is_active());

    let mut forced = content_state(None, "");
    forced.start_active = true;
    forced.initialize(Instant::now()).await;
    assert!(forced.is_active());
}
