//! Client for the worker search backend.

use futures::future::{FutureExt, LocalBoxFuture};
use log::{debug, info};
use reqwest::header::AUTHORIZATION;
use serde::Deserialize;

use crate::config::{FILTER_OPTIONS_ENDPOINT, SEARCH_ENDPOINT};
use crate::error::ApiError;
use crate::query::FilterSet;
use crate::Worker;

/// One page of search results plus the server's pagination metadata.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchResponse {
    pub workers: Vec<Worker>,
    pub total_count: usize,
    pub page: u32,
    pub total_pages: u32,
}

/// The endpoint answers with either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SearchPayload {
    Paginated {
        results: Vec<Worker>,
        #[serde(default)]
        count: Option<usize>,
        #[serde(default)]
        page: Option<u32>,
        #[serde(default)]
        total_pages: Option<u32>,
    },
    Plain(Vec<Worker>),
}

impl From<SearchPayload> for SearchResponse {
    fn from(payload: SearchPayload) -> Self {
        match payload {
            SearchPayload::Paginated {
                results,
                count,
                page,
                total_pages,
            } => SearchResponse {
                total_count: count.unwrap_or(results.len()),
                page: page.unwrap_or(1),
                total_pages: total_pages.unwrap_or(1),
                workers: results,
            },
            SearchPayload::Plain(workers) => SearchResponse {
                total_count: workers.len(),
                page: 1,
                total_pages: 1,
                workers,
            },
        }
    }
}

/// Decode a search response body.
pub fn parse_search_response(body: &str) -> Result<SearchResponse, ApiError> {
    serde_json::from_str::<SearchPayload>(body)
        .map(SearchResponse::from)
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Deserialize)]
pub struct NumericRange {
    pub min: f64,
    pub max: f64,
}

/// Choices offered by the filter panel.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct FilterOptions {
    pub regions: Vec<String>,
    pub skills: Vec<String>,
    pub languages: Vec<String>,
    pub education_levels: Vec<String>,
    pub religions: Vec<String>,
    pub working_times: Vec<String>,
    pub experience_range: NumericRange,
    pub age_range: NumericRange,
    pub rating_range: NumericRange,
}

/// The external search service.
///
/// Futures are local: the page runs on a single-threaded event loop.
pub trait SearchBackend {
    fn search<'a>(
        &'a self,
        filters: &'a FilterSet,
    ) -> LocalBoxFuture<'a, Result<SearchResponse, ApiError>>;

    fn filter_options(&self) -> LocalBoxFuture<'_, Result<FilterOptions, ApiError>>;
}

/// `reqwest` client for the REST API.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl HttpSearchBackend {
    /// `base_url` must be absolute, e.g. `https://hire.example.et/api`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            token: None,
        }
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token.filter(|t| !t.is_empty());
        self
    }

    pub fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(self.url(path));
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {}", token)),
            None => request,
        }
    }
}

impl SearchBackend for HttpSearchBackend {
    fn search<'a>(
        &'a self,
        filters: &'a FilterSet,
    ) -> LocalBoxFuture<'a, Result<SearchResponse, ApiError>> {
        async move {
            let pairs = filters.query_pairs();
            info!("Searching workers with {} filter values", pairs.len());
            let response = self
                .get(SEARCH_ENDPOINT)
                .query(&pairs)
                .send()
                .await?
                .error_for_status()?;
            let body = response.text().await?;
            let response = parse_search_response(&body)?;
            debug!(
                "Search returned {} workers (server page {}/{}, {} total)",
                response.workers.len(),
                response.page,
                response.total_pages,
                response.total_count
            );
            Ok(response)
        }
        .boxed_local()
    }

    fn filter_options(&self) -> LocalBoxFuture<'_, Result<FilterOptions, ApiError>> {
        async move {
            let options = self
                .get(FILTER_OPTIONS_ENDPOINT)
                .send()
                .await?
                .error_for_status()?
                .json::<FilterOptions>()
                .await?;
            Ok(options)
        }
        .boxed_local()
    }
}
