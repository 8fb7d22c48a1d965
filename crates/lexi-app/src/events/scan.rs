use kanal::AsyncSender;
use lexi_types::UiEvent;
use tokio::time::Instant;

use crate::state::ContentState;

pub async fn handle_idle_scan(
    state: &mut ContentState,
    app_to_ui_tx: &AsyncSender<UiEvent>,
) -> anyhow::Result<()> {
    let report = state.run_scan(Instant::now());
    let rebuilt = state.take_rebuild_pending();
    if report.markers > 0 {
        tracing::info!(
            "Highlighted {} terms in {} text nodes",
            report.markers,
            report.highlighted
        );
    }
    if report.markers > 0 || rebuilt {
        app_to_ui_tx.send(state.highlights_event()).await?;
    }
    Ok(())
}
