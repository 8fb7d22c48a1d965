use lexi_config::popup::PopupConfig;
use lexi_core::place_popup;
use lexi_types::{PopupView, Rect, Viewport, VocabularyEntry};

/// Owner of the single definition popup
#[derive(Debug)]
pub struct InteractionLayer {
    config: PopupConfig,
    viewport: Viewport,
    active: Option<PopupView>,
}

impl InteractionLayer {
    pub fn new(config: PopupConfig, viewport: Viewport) -> Self {
        Self {
            config,
            viewport,
            active: None,
        }
    }

    pub fn active(&self) -> Option<&PopupView> {
        self.active.as_ref()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Open a popup for `entry` next to `anchor`, replacing any open one
    pub fn show(&mut self, key: &str, entry: VocabularyEntry, anchor: Rect) -> PopupView {
        let view = PopupView {
            key: key.to_string(),
            entry,
            placement: place_popup(anchor, self.viewport, &self.config),
            pinned: false,
        };
        self.active = Some(view.clone());
        view
    }

    /// Close the popup; returns whether one was open
    pub fn dismiss(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Close the popup unless the user pinned it
    pub fn dismiss_unless_pinned(&mut self) -> bool {
        match &self.active {
            Some(view) if !view.pinned => self.dismiss(),
            _ => false,
        }
    }

    pub fn toggle_pin(&mut self) -> Option<&PopupView> {
        let view = self.active.as_mut()?;
        view.pinned = !view.pinned;
        Some(view)
    }
}
