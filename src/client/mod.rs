//! HTTP transport for the search backend
//!
//! This module speaks the scan/scroll wire protocol:
//! - `POST /{indices}/_search?search_type=scan&scroll=..&size=..` opens a cursor
//! - `POST /_search/scroll?scroll=..` exchanges the cursor for the next page
//! - `DELETE /_search/scroll` releases the cursor early
//!
//! Scroll ids travel as the raw request body, the form 1.x and 2.x backends
//! accept.
//!
//! The [`ScrollTransport`] trait is the seam between the scroll session and the
//! network, so the session can be driven by an in-memory transport in tests.
//! Scroll ids are never logged in full.

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, info};
use url::Url;

use crate::config::{Config, ConnectionConfig};
use crate::error::{Result, TransportError};
use crate::model::SearchResponse;

/// User agent string for all backend requests.
const CLIENT_USER_AGENT: &str = concat!("estab/", env!("CARGO_PKG_VERSION"));

/// Maximum number of bytes of an error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Index path used when no index is given.
const ALL_INDICES: &str = "_all";

/// Parameters of the initial scan request
#[derive(Debug, Clone)]
pub struct ScanRequest {
    /// Query document sent as the request body
    pub query: Value,
    /// Indices to search; empty means all
    pub indices: Vec<String>,
    /// Cursor time-to-live
    pub timeout: String,
    /// Records per page
    pub size: u32,
}

/// Outcome of one scroll request
#[derive(Debug, Clone)]
pub enum ScrollPage {
    /// A decoded page; may contain zero hits
    Page(SearchResponse),
    /// The backend signalled the end of iteration
    End,
}

/// Request/response transport for cursor-based pagination
#[async_trait]
pub trait ScrollTransport: Send + Sync {
    /// Open a cursor for `request`
    ///
    /// # Returns
    /// * `Result<SearchResponse>` - Cursor id and possibly a first page
    async fn scan(&self, request: &ScanRequest) -> Result<SearchResponse>;

    /// Fetch the next page for `scroll_id`
    async fn scroll(&self, scroll_id: &str, timeout: &str) -> Result<ScrollPage>;

    /// Release the server-side cursor
    async fn clear_scroll(&self, scroll_id: &str) -> Result<()>;
}

/// Search backend client over HTTP
#[derive(Debug, Clone)]
pub struct SearchClient {
    /// The underlying HTTP client.
    http: Client,
    /// Backend root URL, e.g. `http://localhost:9200/`.
    base_url: Url,
    /// `search_type` for the scan request, if any.
    search_type: Option<String>,
}

impl SearchClient {
    /// Create a client for the backend described by `config`
    ///
    /// # Arguments
    /// * `config` - Loaded configuration (connection and scroll sections)
    ///
    /// # Returns
    /// * `Result<Self>` - New client or error
    pub fn from_config(config: &Config) -> Result<Self> {
        let base_url = Self::base_url(&config.connection)?;
        let http = Client::builder()
            .user_agent(CLIENT_USER_AGENT)
            .connect_timeout(config.connect_timeout())
            .build()
            .map_err(|e| TransportError::Request(format!("Failed to build HTTP client: {e}")))?;

        let search_type = Some(config.scroll.search_type.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        debug!("Created search client for {}", base_url);

        Ok(Self {
            http,
            base_url,
            search_type,
        })
    }

    /// Build the backend root URL from connection settings
    pub fn base_url(connection: &ConnectionConfig) -> Result<Url> {
        let raw = format!(
            "{}://{}:{}/",
            connection.scheme, connection.host, connection.port
        );
        Url::parse(&raw).map_err(|e| TransportError::InvalidUrl(format!("{raw}: {e}")).into())
    }

    /// URL of the initial scan request
    fn scan_url(&self, request: &ScanRequest) -> Result<Url> {
        let index_path = if request.indices.is_empty() {
            ALL_INDICES.to_string()
        } else {
            request.indices.join(",")
        };

        let mut url = self.endpoint(&[&index_path, "_search"])?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(search_type) = &self.search_type {
                query.append_pair("search_type", search_type);
            }
            query
                .append_pair("scroll", &request.timeout)
                .append_pair("size", &request.size.to_string());
        }
        Ok(url)
    }

    /// URL of the scroll endpoint
    fn scroll_url(&self) -> Result<Url> {
        self.endpoint(&["_search", "scroll"])
    }

    /// URL of a scroll request keeping the cursor alive for `timeout`
    fn next_page_url(&self, timeout: &str) -> Result<Url> {
        let mut url = self.scroll_url()?;
        url.query_pairs_mut().append_pair("scroll", timeout);
        Ok(url)
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| TransportError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

#[async_trait]
impl ScrollTransport for SearchClient {
    async fn scan(&self, request: &ScanRequest) -> Result<SearchResponse> {
        let url = self.scan_url(request)?;
        info!("[SCAN] POST {}", url.path());

        let response = self
            .http
            .post(url.clone())
            .json(&request.query)
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("Scan request failed: {e}")))?;

        let status = response.status();
        info!("[SCAN] POST {} -> {}", url.path(), status.as_u16());

        let body = read_body(response).await?;
        let scan: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| TransportError::Decode(format!("Failed to parse scan response: {e}")))?;

        Ok(scan)
    }

    async fn scroll(&self, scroll_id: &str, timeout: &str) -> Result<ScrollPage> {
        let url = self.next_page_url(timeout)?;
        debug!("[SCROLL] POST {} (cursor {})", url.path(), redact_id(scroll_id));

        let response = self
            .http
            .post(url)
            .body(scroll_id.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("Scroll request failed: {e}")))?;

        debug!("[SCROLL] -> {}", response.status().as_u16());

        let body = read_body(response).await?;
        parse_page(&body)
    }

    async fn clear_scroll(&self, scroll_id: &str) -> Result<()> {
        let url = self.scroll_url()?;
        debug!("[SCROLL] DELETE {} (cursor {})", url.path(), redact_id(scroll_id));

        let response = self
            .http
            .delete(url)
            .body(scroll_id.to_string())
            .send()
            .await
            .map_err(|e| TransportError::Request(format!("Clear scroll failed: {e}")))?;

        read_body(response).await.map(|_| ())
    }
}

/// Read a response body, turning non-success statuses into errors
async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| TransportError::Request(format!("Failed to read response body: {e}")))?;

    if !status.is_success() {
        return Err(TransportError::Status {
            status: status.as_u16(),
            body: truncate(&body, MAX_ERROR_BODY),
        }
        .into());
    }
    Ok(body)
}

/// Decode a scroll response body
///
/// An empty body is the end-of-iteration signal.
pub fn parse_page(body: &str) -> Result<ScrollPage> {
    if body.trim().is_empty() {
        return Ok(ScrollPage::End);
    }
    serde_json::from_str(body)
        .map(ScrollPage::Page)
        .map_err(|e| TransportError::Decode(format!("Failed to parse scroll response: {e}")).into())
}

/// Shorten a cursor id for logging
fn redact_id(id: &str) -> String {
    match id.char_indices().nth(8) {
        Some((end, _)) => format!("{}...", &id[..end]),
        None => id.to_string(),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &text[..end])
}
