use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use lexi_lookup::Lookup;
use lexi_types::{AppEvent, HostEvent, Key, UiEvent};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::state::ContentState;

pub mod activation;
pub mod page_edit;
pub mod pointer;
pub mod scan;
pub mod vocabulary;

use activation::{handle_clue_mode_request, handle_storage_change};
use page_edit::handle_page_edit;
use pointer::{handle_click, handle_click_marker, handle_soft_dismiss, handle_toggle_pin};
use scan::handle_idle_scan;
use vocabulary::{handle_add_to_vocabulary, handle_clear_vocabulary, handle_remove_from_vocabulary};

/// Resolves at `deadline`, or never
async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending::<()>().await,
    }
}

/// Content controller's main loop
///
/// Branch order matters: an overdue idle scan runs even under a steady
/// event stream, events come next, and a pending scan otherwise runs as
/// soon as the queue is empty.
pub async fn event_loop(
    mut state: ContentState,
    host_to_app_rx: AsyncReceiver<AppEvent>,
    app_to_ui_tx: AsyncSender<UiEvent>,
    lookup: Option<Arc<dyn Lookup>>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    let loaded = state.initialize(Instant::now()).await;
    app_to_ui_tx
        .send(UiEvent::Status(format!(
            "{} vocabulary entries loaded, highlighting {}",
            loaded.entries,
            if state.is_active() { "on" } else { "off" }
        )))
        .await?;

    tracing::info!("[EVENT_LOOP] Starting main loop, waiting for events");
    loop {
        let idle_deadline = state.idle.deadline();
        let debounce_deadline = state.observer.deadline();
        let scan_pending = state.idle.is_pending();

        tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::info!("[EVENT_LOOP] Cancelled");
                break;
            }
            _ = wait_until(idle_deadline) => {
                tracing::debug!("Idle timeout reached, scanning under load");
                handle_idle_scan(&mut state, &app_to_ui_tx).await?;
            }
            event = host_to_app_rx.recv() => {
                let Ok(event) = event else {
                    tracing::info!("[EVENT_LOOP] Event channel closed");
                    break;
                };
                if matches!(event, AppEvent::Shutdown) {
                    tracing::info!("[EVENT_LOOP] Shutdown requested");
                    break;
                }
                handle_events(&mut state, lookup.as_deref(), &app_to_ui_tx, event).await?;
            }
            _ = wait_until(debounce_deadline) => {
                if state.debounce_elapsed(Instant::now()) {
                    tracing::debug!("Page settled, rescan requested");
                }
            }
            _ = std::future::ready(()), if scan_pending => {
                handle_idle_scan(&mut state, &app_to_ui_tx).await?;
            }
        }
    }

    Ok(())
}

async fn handle_events(
    state: &mut ContentState,
    lookup: Option<&dyn Lookup>,
    app_to_ui_tx: &AsyncSender<UiEvent>,
    event: AppEvent,
) -> anyhow::Result<()> {
    match event {
        AppEvent::Host(HostEvent::Edit(edit)) => {
            handle_page_edit(state, edit)?;
        }
        AppEvent::Host(HostEvent::Click { target, anchor }) => {
            handle_click(state, target, anchor, app_to_ui_tx).await?;
        }
        AppEvent::Host(HostEvent::ClickMarker { ordinal, anchor }) => {
            handle_click_marker(state, ordinal, anchor, app_to_ui_tx).await?;
        }
        AppEvent::Host(HostEvent::Scroll) => {
            handle_soft_dismiss(state, app_to_ui_tx).await?;
        }
        AppEvent::Host(HostEvent::KeyDown(Key::Escape)) => {
            if state.interaction.dismiss() {
                app_to_ui_tx.send(UiEvent::HidePopup).await?;
            }
        }
        AppEvent::Host(HostEvent::KeyDown(Key::Other(_))) => {}
        AppEvent::Host(HostEvent::Resize(viewport)) => {
            tracing::debug!("Viewport resized to {}x{}", viewport.width, viewport.height);
            state.interaction.set_viewport(viewport);
        }
        AppEvent::Host(HostEvent::TogglePin) => {
            handle_toggle_pin(state, app_to_ui_tx).await?;
        }
        AppEvent::StorageChanged(change) => {
            handle_storage_change(state, change, app_to_ui_tx).await?;
        }
        AppEvent::AddToVocabulary(text) => {
            handle_add_to_vocabulary(state, lookup, text, app_to_ui_tx).await?;
        }
        AppEvent::RemoveFromVocabulary(lemma) => {
            handle_remove_from_vocabulary(state, lemma, app_to_ui_tx).await?;
        }
        AppEvent::ClearVocabulary => {
            handle_clear_vocabulary(state, app_to_ui_tx).await?;
        }
        AppEvent::SetClueMode(enabled) => {
            handle_clue_mode_request(state, enabled, app_to_ui_tx).await?;
        }
        AppEvent::Shutdown => {
            // Handled by the loop
        }
    }

    Ok(())
}
