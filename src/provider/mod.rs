pub mod server;
mod traits;
mod types;

pub use server::ServerSuggestions;
pub use traits::SuggestionSource;
pub use types::*;

use tracing::debug;

/// Trimmed query, or `None` when it is too short to be worth a request.
pub fn normalize_query(query: &str, min_len: usize) -> Option<&str> {
    let query = query.trim();
    (query.chars().count() >= min_len).then_some(query)
}

pub async fn suggest(
    source: &dyn SuggestionSource,
    query: &str,
    min_len: usize,
) -> anyhow::Result<Vec<Suggestion>> {
    match normalize_query(query, min_len) {
        Some(query) => source.lookup(query).await,
        None => {
            debug!("query {:?} under {} characters, skipping lookup", query, min_len);
            Ok(Vec::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSource {
        queries: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SuggestionSource for RecordingSource {
        async fn lookup(&self, query: &str) -> anyhow::Result<Vec<Suggestion>> {
            self.queries.lock().unwrap().push(query.to_string());
            Ok(vec![Suggestion {
                id: 1,
                title: format!("{} song", query),
                artist: "Someone".to_string(),
            }])
        }
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  ab ", 2), Some("ab"));
        assert_eq!(normalize_query(" a ", 2), None);
        assert_eq!(normalize_query("", 2), None);
        assert_eq!(normalize_query("ñu", 2), Some("ñu"));
    }

    #[tokio::test]
    async fn test_short_query_issues_no_request() {
        let source = RecordingSource::default();

        let results = suggest(&source, " x ", 2).await.unwrap();
        assert!(results.is_empty());
        assert!(source.queries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_query_is_trimmed_before_lookup() {
        let source = RecordingSource::default();

        let results = suggest(&source, "  salsa ", 2).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(*source.queries.lock().unwrap(), vec!["salsa".to_string()]);
    }
}
