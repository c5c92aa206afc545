//! Streaming query abstractions for export operations
//!
//! This module provides a unified interface for pulling search records page by
//! page without loading the whole result set into memory, and the scroll
//! session that implements it on top of a [`ScrollTransport`].

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::client::{ScanRequest, ScrollPage, ScrollTransport};
use crate::error::Result;
use crate::model::Hit;

/// Trait for streaming query results in batches
#[async_trait]
pub trait StreamingQuery: Send {
    /// Fetch the next batch of records
    ///
    /// # Returns
    /// * `Result<Option<Vec<Hit>>>` - Next non-empty batch, or None if exhausted
    async fn next_batch(&mut self) -> Result<Option<Vec<Hit>>>;

    /// Close the query and release server-side resources
    async fn close(&mut self) -> Result<()>;
}

/// Lifecycle of a scroll cursor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No request sent yet
    Pending,
    /// Cursor open and usable
    Opened { scroll_id: String },
    /// Backend reported the end of the result set
    Exhausted,
    /// A request failed; the cursor is abandoned
    Failed,
    /// Released before exhaustion
    Closed,
}

/// Cursor-based pagination over a search backend
///
/// The session opens lazily on the first [`StreamingQuery::next_batch`] call
/// and never reuses a cursor after exhaustion or failure. There is no resume
/// path; a new run starts a new session.
pub struct ScrollSession<T: ScrollTransport> {
    transport: T,
    request: ScanRequest,
    state: SessionState,
    /// Hits returned with the scan response, served before the first scroll
    first_page: Option<Vec<Hit>>,
    total_fetched: u64,
    pages: u64,
}

impl<T: ScrollTransport> ScrollSession<T> {
    /// Create a session for `request`; no request is sent yet
    pub fn new(transport: T, request: ScanRequest) -> Self {
        Self {
            transport,
            request,
            state: SessionState::Pending,
            first_page: None,
            total_fetched: 0,
            pages: 0,
        }
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Number of pages received so far
    pub fn pages(&self) -> u64 {
        self.pages
    }

    /// Send the scan request and store the cursor
    pub async fn open(&mut self) -> Result<()> {
        if self.state != SessionState::Pending {
            return Ok(());
        }

        let response = match self.transport.scan(&self.request).await {
            Ok(response) => response,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
        };

        let hits = response.hits.hits;
        if !hits.is_empty() {
            debug!("Scan response carried {} records", hits.len());
            self.first_page = Some(hits);
        }

        let Some(scroll_id) = response.scroll_id else {
            // No cursor: the scan response is the whole result.
            self.state = SessionState::Exhausted;
            return Ok(());
        };

        info!(
            "Opened scroll over {} (page size {}, timeout {})",
            if self.request.indices.is_empty() {
                "all indices".to_string()
            } else {
                self.request.indices.join(",")
            },
            self.request.size,
            self.request.timeout
        );
        self.state = SessionState::Opened { scroll_id };
        Ok(())
    }

    /// Exchange the cursor for the next page
    ///
    /// An empty page or an end-of-iteration signal exhausts the session.
    /// Any error abandons the cursor.
    pub async fn advance(&mut self) -> Result<Option<Vec<Hit>>> {
        let scroll_id = match &self.state {
            SessionState::Opened { scroll_id } => scroll_id.clone(),
            _ => return Ok(None),
        };

        let page = match self.transport.scroll(&scroll_id, &self.request.timeout).await {
            Ok(page) => page,
            Err(e) => {
                self.state = SessionState::Failed;
                return Err(e);
            }
        };

        match page {
            ScrollPage::End => {
                self.exhaust();
                Ok(None)
            }
            ScrollPage::Page(response) if response.hits.hits.is_empty() => {
                self.exhaust();
                Ok(None)
            }
            ScrollPage::Page(response) => {
                if let Some(next_id) = response.scroll_id {
                    self.state = SessionState::Opened { scroll_id: next_id };
                }
                Ok(Some(self.record(response.hits.hits)))
            }
        }
    }

    fn record(&mut self, hits: Vec<Hit>) -> Vec<Hit> {
        self.pages += 1;
        self.total_fetched += hits.len() as u64;
        debug!(
            "Fetched page of {} records (total: {})",
            hits.len(),
            self.total_fetched
        );
        hits
    }

    fn exhaust(&mut self) {
        debug!(
            "Scroll exhausted after {} records in {} pages",
            self.total_fetched, self.pages
        );
        self.state = SessionState::Exhausted;
    }
}

#[async_trait]
impl<T: ScrollTransport> StreamingQuery for ScrollSession<T> {
    async fn next_batch(&mut self) -> Result<Option<Vec<Hit>>> {
        if self.state == SessionState::Pending {
            self.open().await?;
        }

        if let Some(hits) = self.first_page.take() {
            return Ok(Some(self.record(hits)));
        }

        self.advance().await
    }

    async fn close(&mut self) -> Result<()> {
        if let SessionState::Opened { scroll_id } = &self.state {
            // Best effort: the cursor expires on its own anyway.
            if let Err(e) = self.transport.clear_scroll(scroll_id).await {
                warn!("Failed to release scroll cursor: {}", e);
            }
            self.state = SessionState::Closed;
            info!(
                "Closed scroll after fetching {} records",
                self.total_fetched
            );
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::error::{EstabError, TransportError};
    use crate::model::{HitsEnvelope, SearchResponse};
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    /// Scripted responses and a log of the requests seen
    #[derive(Default)]
    pub(crate) struct MockState {
        pub scan: Option<Result<SearchResponse>>,
        pub scrolls: VecDeque<Result<ScrollPage>>,
        pub scroll_ids: Vec<String>,
        pub cleared: Vec<String>,
        pub scan_calls: usize,
    }

    #[derive(Clone, Default)]
    pub(crate) struct MockTransport {
        pub state: Arc<Mutex<MockState>>,
    }

    impl MockTransport {
        pub fn new(scan: SearchResponse, scrolls: Vec<Result<ScrollPage>>) -> Self {
            let state = MockState {
                scan: Some(Ok(scan)),
                scrolls: scrolls.into(),
                ..MockState::default()
            };
            Self {
                state: Arc::new(Mutex::new(state)),
            }
        }
    }

    #[async_trait]
    impl ScrollTransport for MockTransport {
        async fn scan(&self, _request: &ScanRequest) -> Result<SearchResponse> {
            let mut state = self.state.lock().unwrap();
            state.scan_calls += 1;
            state.scan.take().expect("scan called twice")
        }

        async fn scroll(&self, scroll_id: &str, _timeout: &str) -> Result<ScrollPage> {
            let mut state = self.state.lock().unwrap();
            state.scroll_ids.push(scroll_id.to_string());
            state.scrolls.pop_front().expect("unexpected scroll")
        }

        async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
            self.state.lock().unwrap().cleared.push(scroll_id.to_string());
            Ok(())
        }
    }

    pub(crate) fn hit(id: &str) -> Hit {
        Hit {
            index: "idx".to_string(),
            doc_type: Some("doc".to_string()),
            id: id.to_string(),
            ..Hit::default()
        }
    }

    pub(crate) fn response(scroll_id: Option<&str>, ids: &[&str]) -> SearchResponse {
        SearchResponse {
            scroll_id: scroll_id.map(str::to_string),
            hits: HitsEnvelope {
                hits: ids.iter().map(|id| hit(id)).collect(),
            },
        }
    }

    fn page(scroll_id: &str, ids: &[&str]) -> Result<ScrollPage> {
        Ok(ScrollPage::Page(response(Some(scroll_id), ids)))
    }

    fn request() -> ScanRequest {
        ScanRequest {
            query: json!({ "query": { "match_all": {} } }),
            indices: vec!["idx".to_string()],
            timeout: "1m".to_string(),
            size: 2,
        }
    }

    fn ids(batch: &[Hit]) -> Vec<&str> {
        batch.iter().map(|h| h.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_pages_until_empty_page() {
        let transport = MockTransport::new(
            response(Some("c0"), &[]),
            vec![page("c0", &["1", "2"]), page("c0", &["3"]), page("c0", &[])],
        );
        let mut session = ScrollSession::new(transport.clone(), request());

        assert_eq!(ids(&session.next_batch().await.unwrap().unwrap()), ["1", "2"]);
        assert_eq!(ids(&session.next_batch().await.unwrap().unwrap()), ["3"]);
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(session.state(), &SessionState::Exhausted);
        assert_eq!(session.pages(), 2);

        // Exhausted cursors are never used again.
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(transport.state.lock().unwrap().scroll_ids.len(), 3);
    }

    #[tokio::test]
    async fn test_end_signal_exhausts() {
        let transport = MockTransport::new(
            response(Some("c0"), &[]),
            vec![page("c0", &["1"]), Ok(ScrollPage::End)],
        );
        let mut session = ScrollSession::new(transport, request());

        assert!(session.next_batch().await.unwrap().is_some());
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(session.state(), &SessionState::Exhausted);
    }

    #[tokio::test]
    async fn test_scan_hits_served_first() {
        let transport = MockTransport::new(
            response(Some("c0"), &["a"]),
            vec![page("c1", &["b"]), page("c1", &[])],
        );
        let mut session = ScrollSession::new(transport, request());

        assert_eq!(ids(&session.next_batch().await.unwrap().unwrap()), ["a"]);
        assert_eq!(ids(&session.next_batch().await.unwrap().unwrap()), ["b"]);
        assert!(session.next_batch().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_without_cursor_serves_hits_then_ends() {
        let transport = MockTransport::new(response(None, &["a", "b"]), vec![]);
        let mut session = ScrollSession::new(transport.clone(), request());

        assert_eq!(ids(&session.next_batch().await.unwrap().unwrap()), ["a", "b"]);
        assert!(session.next_batch().await.unwrap().is_none());
        assert_eq!(session.state(), &SessionState::Exhausted);

        session.close().await.unwrap();
        let state = transport.state.lock().unwrap();
        assert!(state.scroll_ids.is_empty());
        assert!(state.cleared.is_empty());
    }

    #[tokio::test]
    async fn test_follows_newest_scroll_id() {
        let transport = MockTransport::new(
            response(Some("c0"), &[]),
            vec![page("c1", &["1"]), page("c2", &["2"]), page("c2", &[])],
        );
        let mut session = ScrollSession::new(transport.clone(), request());
        while session.next_batch().await.unwrap().is_some() {}

        assert_eq!(
            transport.state.lock().unwrap().scroll_ids,
            vec!["c0", "c1", "c2"]
        );
    }

    #[tokio::test]
    async fn test_transport_error_is_fatal() {
        let transport = MockTransport::new(
            response(Some("c0"), &[]),
            vec![Err(TransportError::Status {
                status: 404,
                body: "SearchContextMissingException".to_string(),
            }
            .into())],
        );
        let mut session = ScrollSession::new(transport.clone(), request());

        let err = session.next_batch().await.unwrap_err();
        assert!(matches!(err, EstabError::Transport(_)));
        assert_eq!(session.state(), &SessionState::Failed);

        // No retry, and a failed cursor is not released either.
        assert!(session.next_batch().await.unwrap().is_none());
        session.close().await.unwrap();
        assert!(transport.state.lock().unwrap().cleared.is_empty());
    }

    #[tokio::test]
    async fn test_scan_error_is_fatal() {
        let transport = MockTransport::default();
        transport.state.lock().unwrap().scan =
            Some(Err(TransportError::Request("connection refused".to_string()).into()));
        let mut session = ScrollSession::new(transport, request());

        assert!(session.next_batch().await.is_err());
        assert_eq!(session.state(), &SessionState::Failed);
    }

    #[tokio::test]
    async fn test_close_releases_open_cursor() {
        let transport = MockTransport::new(response(Some("c0"), &[]), vec![page("c1", &["1"])]);
        let mut session = ScrollSession::new(transport.clone(), request());

        session.next_batch().await.unwrap();
        session.close().await.unwrap();

        assert_eq!(session.state(), &SessionState::Closed);
        assert_eq!(transport.state.lock().unwrap().cleared, vec!["c1"]);
    }

    #[tokio::test]
    async fn test_close_before_open_sends_nothing() {
        let transport = MockTransport::new(response(Some("c0"), &[]), vec![]);
        let mut session = ScrollSession::new(transport.clone(), request());

        session.close().await.unwrap();

        let state = transport.state.lock().unwrap();
        assert_eq!(state.scan_calls, 0);
        assert!(state.cleared.is_empty());
    }
}
