//! Lazy walk over an `@odata.nextLink` continuation chain

use crate::api::error::{ApiError, Result};
use crate::api::models::PageResponse;
use futures::Stream;
use log::{debug, info, warn};
use reqwest::Client;
use reqwest::header::HeaderMap;
use serde_json::Value;

/// Cursor over the pages of one query.
///
/// Holds the fixed request headers and the URL of the next page. Each call to
/// [`Pages::next_page`] issues exactly one GET; the sequence ends when a
/// response carries no continuation link or when a request fails.
#[derive(Debug)]
pub struct Pages {
    http: Client,
    headers: HeaderMap,
    next_url: Option<String>,
    pages_fetched: usize,
    records_fetched: usize,
    total_count: Option<u64>,
}

impl Pages {
    pub fn new(http: Client, headers: HeaderMap, initial_url: impl Into<String>) -> Self {
        Self {
            http,
            headers,
            next_url: Some(initial_url.into()),
            pages_fetched: 0,
            records_fetched: 0,
            total_count: None,
        }
    }

    /// URL the next call will request, `None` once exhausted
    pub fn next_url(&self) -> Option<&str> {
        self.next_url.as_deref()
    }

    pub fn is_done(&self) -> bool {
        self.next_url.is_none()
    }

    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched
    }

    pub fn records_fetched(&self) -> usize {
        self.records_fetched
    }

    /// Server-reported `@odata.count`, when the query asked for `$count=true`
    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    /// Fetch the next page's `value` array, or `None` when the chain is done.
    ///
    /// On error the cursor is left exhausted; pages already returned stay valid.
    pub async fn next_page(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(url) = self.next_url.take() else {
            return Ok(None);
        };

        let page = self.fetch(&url).await?;

        self.pages_fetched += 1;
        self.records_fetched += page.value.len();
        if page.count.is_some() {
            self.total_count = page.count;
        }
        debug!(
            "Page {} from {}: {} records{}",
            self.pages_fetched,
            url,
            page.value.len(),
            if page.next_link.is_some() { ", more available" } else { "" }
        );

        match page.next_link {
            Some(next) => self.next_url = Some(next),
            None => info!(
                "Query complete: {} pages, {} records",
                self.pages_fetched, self.records_fetched
            ),
        }

        Ok(Some(page.value))
    }

    async fn fetch(&self, url: &str) -> Result<PageResponse> {
        debug!("GET {}", url);
        let response = self
            .http
            .get(url)
            .headers(self.headers.clone())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("GET {} returned {}", url, status);
            return Err(ApiError::Status {
                url: url.to_string(),
                status,
                body,
            });
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|source| ApiError::MalformedPage {
            url: url.to_string(),
            source,
        })
    }

    /// Adapt into a stream of pages. The stream ends after the first error.
    pub fn into_stream(self) -> impl Stream<Item = Result<Vec<Value>>> {
        futures::stream::try_unfold(self, |mut pages| async move {
            Ok::<_, ApiError>(pages.next_page().await?.map(|page| (page, pages)))
        })
    }

    /// Drain the chain and concatenate every page's records
    pub async fn collect_records(mut self) -> Result<Vec<Value>> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(records)
    }
}
