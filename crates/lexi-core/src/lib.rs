pub mod document;
pub mod error;
pub mod highlight;
pub mod idle;
pub mod observer;
pub mod placement;
pub mod resolver;
pub mod scanner;
pub mod term_index;

pub use document::{Document, MutationRecord, NodeKind};
pub use error::DomError;
pub use highlight::Highlighter;
pub use idle::IdleTask;
pub use observer::{ChangeObserver, Debouncer, ObserverState};
pub use placement::place_popup;
pub use resolver::MatchResolver;
pub use scanner::{EligibleTextNodes, PageScanner, ScanReport};
pub use term_index::TermIndex;
