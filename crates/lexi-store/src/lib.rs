pub mod error;
pub mod kv;
pub mod persisted;
pub mod vocabulary;

pub use error::StoreError;
pub use kv::{JsonFileStore, KeyValueStore, MemoryStore};
pub use persisted::{CLUE_MODE_KEY, PersistedItem, VOCABULARY_KEY, decode_vocabulary, now_millis};
pub use vocabulary::{LoadedState, VocabularyStore};
