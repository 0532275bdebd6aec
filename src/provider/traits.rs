use crate::provider::Suggestion;
use async_trait::async_trait;

#[async_trait]
pub trait SuggestionSource: Send + Sync {
    /// Ranked matches for an already trimmed, long enough query.
    async fn lookup(&self, query: &str) -> anyhow::Result<Vec<Suggestion>>;
}
