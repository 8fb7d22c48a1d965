use kanal::AsyncSender;
use lexi_store::{CLUE_MODE_KEY, StoreError, VOCABULARY_KEY};
use lexi_types::{StorageChange, UiEvent};
use tokio::time::Instant;

use crate::state::ContentState;

/// Persisted keys changed, in notification order
pub async fn handle_storage_change(
    state: &mut ContentState,
    change: StorageChange,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    match change.key.as_str() {
        VOCABULARY_KEY => {
            // The rescan this schedules reports the new markers
            let entries = state.apply_vocabulary(change.new_value.as_ref(), Instant::now());
            tracing::info!("Vocabulary reloaded: {} entries", entries);
        }
        CLUE_MODE_KEY => {
            let enabled = matches!(change.new_value, Some(serde_json::Value::Bool(true)));
            set_activation(state, enabled, app_to_ui_tx).await?;
        }
        other => tracing::trace!("Ignoring change to '{}'", other),
    }
    Ok(())
}

/// Toggle requested by the host; persisted, applied when the change comes back
pub async fn handle_clue_mode_request(
    state: &mut ContentState,
    enabled: bool,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    match state.vocabulary.set_clue_mode(enabled).await {
        Ok(()) => {}
        Err(StoreError::Unavailable) => {
            tracing::debug!("No store, applying clue mode directly");
            set_activation(state, enabled, app_to_ui_tx).await?;
        }
        Err(e) => {
            tracing::error!("Failed to persist clue mode: {}", e);
            app_to_ui_tx
                .send(UiEvent::Status(format!("Could not save setting: {e}")))
                .await?;
        }
    }
    Ok(())
}

async fn set_activation(
    state: &mut ContentState,
    enabled: bool,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    if enabled {
        state.activate(Instant::now());
        return Ok(());
    }

    let had_popup = state.interaction.active().is_some();
    if let Some(removed) = state.deactivate() {
        if had_popup {
            app_to_ui_tx.send(UiEvent::HidePopup).await?;
        }
        tracing::debug!("{} markers dissolved", removed);
        app_to_ui_tx.send(state.highlights_event()).await?;
    }
    Ok(())
}
