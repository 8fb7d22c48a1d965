use kanal::AsyncSender;
use lexi_types::{ClickTarget, NodeId, Rect, UiEvent};

use crate::state::ContentState;

pub async fn handle_click(
    state: &mut ContentState,
    target: ClickTarget,
    anchor: Rect,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let node = match target {
        ClickTarget::Popup => return Ok(()),
        ClickTarget::Page(node) => node,
    };

    match state.highlighter().enclosing_marker(&state.doc, node) {
        Some(marker) => open_marker(state, marker, anchor, app_to_ui_tx).await,
        None => handle_soft_dismiss(state, app_to_ui_tx).await,
    }
}

/// Click the n-th marker in document order (hosts without hit testing)
pub async fn handle_click_marker(
    state: &mut ContentState,
    ordinal: usize,
    anchor: Rect,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let marker = state.highlighter().markers(&state.doc).get(ordinal).copied();
    match marker {
        Some(marker) => open_marker(state, marker, anchor, app_to_ui_tx).await,
        None => {
            app_to_ui_tx
                .send(UiEvent::Status(format!("No marker #{ordinal}")))
                .await?;
            Ok(())
        }
    }
}

/// The click is consumed: any open popup closes, then the entry is shown if it resolves
async fn open_marker(
    state: &mut ContentState,
    marker: NodeId,
    anchor: Rect,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    if state.interaction.dismiss() {
        app_to_ui_tx.send(UiEvent::HidePopup).await?;
    }

    let Some(key) = state
        .highlighter()
        .marker_key(&state.doc, marker)
        .map(str::to_string)
    else {
        tracing::warn!("Marker {:?} has no lookup key", marker);
        return Ok(());
    };

    let Some(entry) = state.vocabulary.resolve(&key, &state.index).cloned() else {
        tracing::debug!("No vocabulary entry for '{}'", key);
        return Ok(());
    };

    tracing::debug!("Marker '{}' resolved to '{}'", key, entry.lemma);
    let view = state.interaction.show(&key, entry, anchor);
    app_to_ui_tx.send(UiEvent::ShowPopup(view)).await?;
    Ok(())
}

/// Outside click or scroll
pub async fn handle_soft_dismiss(
    state: &mut ContentState,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    if state.interaction.dismiss_unless_pinned() {
        app_to_ui_tx.send(UiEvent::HidePopup).await?;
    }
    Ok(())
}

pub async fn handle_toggle_pin(
    state: &mut ContentState,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    if let Some(view) = state.interaction.toggle_pin() {
        tracing::debug!("Popup '{}' pinned: {}", view.key, view.pinned);
        app_to_ui_tx.send(UiEvent::ShowPopup(view.clone())).await?;
    }
    Ok(())
}
