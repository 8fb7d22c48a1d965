use std::sync::Arc;

use kanal::{AsyncReceiver, AsyncSender};
use lexi_lookup::Lookup;
use lexi_types::{AppEvent, UiEvent};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::events::event_loop;
use crate::io::{console_io, storage_io};
use crate::state::ContentState;
use crate::ui::ui_loop;

/// Centralized channel management
pub struct ChannelSet {
    pub host_to_app: (AsyncSender<AppEvent>, AsyncReceiver<AppEvent>),
    pub app_to_ui: (AsyncSender<UiEvent>, AsyncReceiver<UiEvent>),
}

impl ChannelSet {
    pub fn new(capacity: usize) -> Self {
        Self {
            host_to_app: kanal::bounded_async(capacity), // page edits arrive in bursts
            app_to_ui: kanal::bounded_async(64),
        }
    }
}

/// Application controller for task spawning and lifecycle
pub struct AppController {
    channels: ChannelSet,
    cancel_token: CancellationToken,
}

impl AppController {
    pub fn new(capacity: usize) -> Self {
        Self {
            channels: ChannelSet::new(capacity),
            cancel_token: CancellationToken::new(),
        }
    }

    pub fn event_sender(&self) -> AsyncSender<AppEvent> {
        self.channels.host_to_app.0.clone()
    }

    pub fn spawn_tasks(
        &self,
        state: ContentState,
        lookup: Option<Arc<dyn Lookup>>,
    ) -> JoinSet<anyhow::Result<()>> {
        let mut tasks = JoinSet::new();

        // Subscribe before the event loop reads the store
        if let Some(changes) = state.vocabulary.subscribe() {
            tasks.spawn(storage_io(
                self.cancel_token.child_token(),
                changes,
                self.channels.host_to_app.0.clone(),
            ));
        } else {
            tracing::warn!("Running without a store, changes will not persist");
        }

        // Event loop
        tasks.spawn(event_loop(
            state,
            self.channels.host_to_app.1.clone(),
            self.channels.app_to_ui.0.clone(),
            lookup,
            self.cancel_token.child_token(),
        ));

        // UI loop
        tasks.spawn(ui_loop(
            self.cancel_token.child_token(),
            self.channels.app_to_ui.1.clone(),
        ));

        tasks
    }

    pub fn spawn_console(&self, tasks: &mut JoinSet<anyhow::Result<()>>) {
        tasks.spawn(console_io(
            self.cancel_token.child_token(),
            self.channels.host_to_app.0.clone(),
        ));
    }

    pub fn shutdown(&self) {
        self.cancel_token.cancel();
    }
}
