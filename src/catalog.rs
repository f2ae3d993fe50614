//! Client for the remote exercise catalog (API Ninjas). The rest of the app
//! only sees the [`ExerciseCatalog`] trait, so tests and the UI can swap in
//! canned results.

use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::models::{ExerciseRecord, SearchQuery};

pub const DEFAULT_BASE_URL: &str = "https://api.api-ninjas.com/v1/exercises";

/// Outcome of one search, as delivered by the background worker.
pub type FetchResult = Result<Vec<ExerciseRecord>, FetchError>;

/// Anything that can answer a search with candidate exercises.
pub trait ExerciseCatalog: Send + Sync {
    fn fetch(&self, query: &SearchQuery) -> FetchResult;
}

pub struct NinjasClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl NinjasClient {
    pub fn new(api_key: Option<String>, base_url: String, timeout: Duration) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("exercise-guide/0.1.0"));

        let client = Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.filter(|key| !key.trim().is_empty()),
            base_url,
        })
    }
}

impl ExerciseCatalog for NinjasClient {
    fn fetch(&self, query: &SearchQuery) -> FetchResult {
        let api_key = self.api_key.as_deref().ok_or(FetchError::MissingApiKey)?;
        let pairs = query_pairs(query);
        debug!(url = %self.base_url, ?pairs, "requesting exercises");

        let response = self
            .client
            .get(&self.base_url)
            .query(&pairs)
            .header("X-Api-Key", api_key)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "catalog request failed");
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let records = decode_body(&body)?;
        debug!(count = records.len(), "catalog returned exercises");
        Ok(records)
    }
}

/// Query string parameters in the order the catalog expects. Blank filters
/// are omitted; difficulty is always sent.
pub fn query_pairs(query: &SearchQuery) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::with_capacity(4);

    if let Some(muscle) = query.muscle.as_deref().filter(|m| !m.is_empty()) {
        pairs.push(("muscle", muscle.to_string()));
    }
    if let Some(kind) = query.kind.as_deref().filter(|k| !k.is_empty()) {
        pairs.push(("type", kind.to_string()));
    }
    let name = query.name.trim();
    if !name.is_empty() {
        pairs.push(("name", name.to_string()));
    }
    pairs.push(("difficulty", query.difficulty.as_str().to_string()));

    pairs
}

/// The catalog answers with a bare JSON array of exercises.
pub fn decode_body(body: &str) -> Result<Vec<ExerciseRecord>, FetchError> {
    Ok(serde_json::from_str(body)?)
}

/// Run `catalog.fetch` on a worker thread so the terminal keeps redrawing.
/// The event loop polls the returned receiver on each tick.
pub fn spawn_search(catalog: Arc<dyn ExerciseCatalog>, query: SearchQuery) -> Receiver<FetchResult> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = catalog.fetch(&query);
        if let Err(err) = &result {
            warn!(error = %err, "search failed");
        }
        // The UI may have moved on to a newer search; a closed channel is fine.
        let _ = tx.send(result);
    });
    rx
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Difficulty;

    struct CannedCatalog(Vec<ExerciseRecord>);

    impl ExerciseCatalog for CannedCatalog {
        fn fetch(&self, _query: &SearchQuery) -> FetchResult {
            Ok(self.0.clone())
        }
    }

    #[test]
    fn query_pairs_skip_blank_filters() {
        let query = SearchQuery {
            name: "   ".into(),
            kind: Some(String::new()),
            muscle: None,
            difficulty: Difficulty::Expert,
        };

        assert_eq!(query_pairs(&query), vec![("difficulty", "expert".to_string())]);
    }

    #[test]
    fn query_pairs_keep_catalog_order() {
        let query = SearchQuery {
            name: "curl".into(),
            kind: Some("strength".into()),
            muscle: Some("biceps".into()),
            difficulty: Difficulty::Beginner,
        };

        assert_eq!(
            query_pairs(&query),
            vec![
                ("muscle", "biceps".to_string()),
                ("type", "strength".to_string()),
                ("name", "curl".to_string()),
                ("difficulty", "beginner".to_string()),
            ]
        );
    }

    #[test]
    fn decode_body_reports_garbage() {
        assert!(matches!(decode_body("{not json"), Err(FetchError::Decode(_))));
        assert!(decode_body("[]").unwrap().is_empty());
    }

    #[test]
    fn missing_api_key_fails_before_any_request() {
        let client = NinjasClient::new(
            Some("  ".into()),
            "http://127.0.0.1:9".into(),
            Duration::from_secs(1),
        )
        .unwrap();

        let err = client.fetch(&SearchQuery::default()).unwrap_err();
        assert!(matches!(err, FetchError::MissingApiKey));
    }

    #[test]
    fn spawn_search_delivers_worker_result() {
        let record = ExerciseRecord {
            name: "Plank".into(),
            ..Default::default()
        };
        let catalog: Arc<dyn ExerciseCatalog> = Arc::new(CannedCatalog(vec![record.clone()]));

        let rx = spawn_search(catalog, SearchQuery::default());
        let result = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert_eq!(result.unwrap(), vec![record]);
    }
}
