mod record;

pub use record::LookupRecord;

/// Remote definition service
///
/// Request formatting and transport belong to the implementation; callers
/// only see the decoded record.
#[async_trait::async_trait]
pub trait Lookup: Send + Sync {
    /// Look up a word or phrase
    async fn lookup(&self, text: &str) -> Result<LookupRecord, LookupError>;

    /// Provider metadata
    fn metadata(&self) -> ProviderMetadata;
}

#[derive(Debug, Clone)]
pub struct ProviderMetadata {
    pub name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    #[error("Service error: {0}")]
    Service(String),

    #[error("Failed to parse lookup response: {0}")]
    Parse(String),
}
