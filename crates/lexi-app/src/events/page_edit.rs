use lexi_types::PageEdit;
use tokio::time::Instant;

use crate::state::ContentState;

pub fn handle_page_edit(state: &mut ContentState, edit: PageEdit) -> anyhow::Result<()> {
    match state.apply_edit(edit, Instant::now()) {
        Ok(true) => tracing::debug!("Edit scheduled a rescan"),
        Ok(false) => {}
        // A stale node id from the host is not fatal
        Err(e) => tracing::warn!("Ignoring page edit: {}", e),
    }
    Ok(())
}
