use crate::geometry::{Rect, Viewport};
use crate::types::{NodeId, PopupView};

#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Input coming from the page host
    Host(HostEvent),
    /// A persisted key changed
    StorageChanged(StorageChange),
    /// Look up a term and save it
    AddToVocabulary(String),
    RemoveFromVocabulary(String),
    ClearVocabulary,
    /// Persist the activation flag
    SetClueMode(bool),
    Shutdown,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StorageChange {
    pub key: String,
    pub new_value: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub enum HostEvent {
    Edit(PageEdit),
    Click { target: ClickTarget, anchor: Rect },
    /// Click the n-th marker in document order
    ClickMarker { ordinal: usize, anchor: Rect },
    Scroll,
    KeyDown(Key),
    Resize(Viewport),
    TogglePin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickTarget {
    Page(NodeId),
    Popup,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Other(String),
}

/// Structural page change; `None` parent means the body
#[derive(Debug, Clone)]
pub enum PageEdit {
    AppendElement {
        parent: Option<NodeId>,
        tag: String,
        attributes: Vec<(String, String)>,
        text: String,
    },
    AppendText {
        parent: Option<NodeId>,
        text: String,
    },
    Remove(NodeId),
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    ShowPopup(PopupView),
    HidePopup,
    Highlights { markers: usize, snapshot: String },
    Status(String),
}
