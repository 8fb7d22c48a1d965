use std::time::Duration;

use lexi_types::{AppEvent, ClickTarget, HostEvent, Key, NodeId, PopupSide, Rect, UiEvent};

use super::{Harness, backend, content_state, run_entry};
use crate::events::pointer::handle_click;
use crate::io::marker_anchor;

const QUIET: Duration = Duration::from_millis(200);

fn click_marker(ordinal: usize) -> AppEvent {
    AppEvent::Host(HostEvent::ClickMarker {
        ordinal,
        anchor: marker_anchor(ordinal),
    })
}

fn click_outside() -> AppEvent {
    AppEvent::Host(HostEvent::Click {
        target: ClickTarget::Page(NodeId(0)),
        anchor: Rect::default(),
    })
}

async fn ready_harness(page: &str) -> Harness {
    let state = content_state(Some(backend(vec![run_entry()], true)), page);
    let harness = Harness::spawn(state, None);
    harness.loaded().await;
    assert!(matches!(harness.next_ui().await, UiEvent::Highlights { .. }));
    harness
}

#[tokio::test]
async fn test_marker_click_resolves_variant_to_lemma() {
    let harness = ready_harness("She was running late.").await;

    harness.send(click_marker(0)).await;
    match harness.next_ui().await {
        UiEvent::ShowPopup(view) => {
            assert_eq!(view.key, "running");
            assert_eq!(view.entry.lemma, "run");
            assert_eq!(view.entry.definition_primary, "move swiftly on foot");
            assert_eq!(view.placement.side, PopupSide::Below);
            assert!(!view.pinned);
        }
        other => panic!("Unexpected UI event: {:?}", other),
    }

    harness.send(click_outside()).await;
    assert!(matches!(harness.next_ui().await, UiEvent::HidePopup));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_opening_second_popup_closes_first() {
    let harness = ready_harness("She ran home, running fast.").await;

    harness.send(click_marker(0)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::ShowPopup(v) if v.key == "ran"));

    harness.send(click_marker(1)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::HidePopup));
    assert!(matches!(harness.next_ui().await, UiEvent::ShowPopup(v) if v.key == "running"));

    harness.send(click_marker(7)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::Status(m) if m == "No marker #7"));
    harness.shutdown().await;
}

#[tokio::test]
async fn test_dismissal_rules() {
    let harness = ready_harness("She was running late.").await;

    // Pinned: scroll, outside clicks and clicks inside the popup keep it open
    harness.send(click_marker(0)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::ShowPopup(_)));
    harness.send(AppEvent::Host(HostEvent::TogglePin)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::ShowPopup(v) if v.pinned));
    harness.send(AppEvent::Host(HostEvent::Scroll)).await;
    harness.send(click_outside()).await;
    harness
        .send(AppEvent::Host(HostEvent::Click {
            target: ClickTarget::Popup,
            anchor: Rect::default(),
        }))
        .await;
    harness.expect_quiet(QUIET).await;

    // Escape always closes
    harness
        .send(AppEvent::Host(HostEvent::KeyDown(Key::Escape)))
        .await;
    assert!(matches!(harness.next_ui().await, UiEvent::HidePopup));

    // Unpinned: scroll closes, other keys do not
    harness.send(click_marker(0)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::ShowPopup(_)));
    harness
        .send(AppEvent::Host(HostEvent::KeyDown(Key::Other("a".into()))))
        .await;
    harness.expect_quiet(QUIET).await;
    harness.send(AppEvent::Host(HostEvent::Scroll)).await;
    assert!(matches!(harness.next_ui().await, UiEvent::HidePopup));

    // Nothing open: dismissal triggers are silent
    harness.send(AppEvent::Host(HostEvent::Scroll)).await;
    harness
        .send(AppEvent::Host(HostEvent::KeyDown(Key::Escape)))
        .await;
    harness.expect_quiet(QUIET).await;
    harness.shutdown().await;
}

#[tokio::test]
async fn test_unknown_marker_key_shows_nothing() {
    let mut state = content_state(Some(backend(vec![run_entry()], false)), "");
    state.initialize(tokio::time::Instant::now()).await;

    let body = state.doc.body();
    let attributes = [
        ("class".to_string(), "leximind-clue".to_string()),
        ("data-leximind-key".to_string(), "ghost".to_string()),
    ];
    let marker = state
        .doc
        .append_element(body, "span", &attributes, "ghost")
        .unwrap();
    let text = state.doc.children(marker)[0];

    let (tx, rx) = kanal::unbounded_async();
    handle_click(&mut state, ClickTarget::Page(text), Rect::default(), &tx)
        .await
        .unwrap();
    assert!(rx.is_empty());
    assert!(state.interaction.active().is_none());
}
