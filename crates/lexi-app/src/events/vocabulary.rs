use kanal::AsyncSender;
use lexi_lookup::Lookup;
use lexi_store::now_millis;
use lexi_types::{UiEvent, VocabularyEntry};

use crate::state::ContentState;

/// Look up a term and save it; the store notification triggers the rebuild
pub async fn handle_add_to_vocabulary(
    state: &mut ContentState,
    lookup: Option<&dyn Lookup>,
    text: String,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(());
    }

    let entry = match lookup {
        Some(lookup) => match lookup.lookup(text).await {
            Ok(record) => record.into_entry(now_millis()),
            Err(e) => {
                tracing::warn!("Lookup via {} failed for '{}': {}", lookup.metadata().name, text, e);
                app_to_ui_tx
                    .send(UiEvent::Status(format!("Lookup failed for '{text}': {e}")))
                    .await?;
                return Ok(());
            }
        },
        None => VocabularyEntry::bare(text, now_millis()),
    };

    let lemma = entry.lemma.clone();
    let status = match state.vocabulary.add_entry(entry).await {
        Ok(true) => format!("Saved '{lemma}'"),
        Ok(false) => format!("'{lemma}' is already saved"),
        Err(e) => {
            tracing::error!("Failed to save '{}': {}", lemma, e);
            format!("Could not save '{lemma}': {e}")
        }
    };
    app_to_ui_tx.send(UiEvent::Status(status)).await?;
    Ok(())
}

pub async fn handle_remove_from_vocabulary(
    state: &mut ContentState,
    lemma: String,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let status = match state.vocabulary.remove(&lemma).await {
        Ok(true) => format!("Removed '{}'", lemma.trim()),
        Ok(false) => format!("'{}' is not saved", lemma.trim()),
        Err(e) => {
            tracing::error!("Failed to remove '{}': {}", lemma, e);
            format!("Could not remove '{}': {e}", lemma.trim())
        }
    };
    app_to_ui_tx.send(UiEvent::Status(status)).await?;
    Ok(())
}

pub async fn handle_clear_vocabulary(
    state: &mut ContentState,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let status = match state.vocabulary.clear().await {
        Ok(()) => "Vocabulary cleared".to_string(),
        Err(e) => {
            tracing::error!("Failed to clear vocabulary: {}", e);
            format!("Could not clear vocabulary: {e}")
        }
    };
    app_to_ui_tx.send(UiEvent::Status(status)).await?;
    Ok(())
}
