pub mod events;
pub mod geometry;
pub mod types;

pub use events::{AppEvent, ClickTarget, HostEvent, Key, PageEdit, StorageChange, UiEvent};
pub use geometry::{Placement, PopupSide, Rect, Viewport};
pub use types::{ExampleSentence, Match, NodeId, PopupView, VocabularyEntry, normalize_term};
