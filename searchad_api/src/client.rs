//! HTTP client for the ad-keyword API and the blog-search API.

use std::time::Duration;

use reqwest::header::HeaderMap;
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    query::{BlogSearchQuery, KeywordToolQuery, Query},
    signature,
    types::{AdCredentials, BlogSearchResponse, KeywordToolResponse, SearchCredentials},
    user_agent::get_user_agent,
    Error,
};

/// Request timeout for every API call.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const KEYWORD_TOOL_PATH: &str = "/keywordstool";
const BLOG_SEARCH_PATH: &str = "/search/blog";

const CLIENT_ID_HEADER: &str = "x-naver-client-id";
const CLIENT_SECRET_HEADER: &str = "x-naver-client-secret";

/// HTTP client for both upstream APIs.
///
/// Credentials are passed per call so one client can serve callers that
/// bring their own keys.
#[derive(Clone)]
pub struct Client {
    /// Base URL for the ad-keyword API. Defaults to `https://api.naver.com`.
    ad_base_url: String,
    /// Base URL for the search API. Defaults to `https://openapi.naver.com/v1`.
    search_base_url: String,
    http: reqwest::Client,
}

impl Client {
    /// Creates a client pointing at the production APIs.
    pub fn new() -> Result<Self, Error> {
        Self::with_base_urls("https://api.naver.com", "https://openapi.naver.com/v1")
    }

    /// Creates a client with custom base URLs. Used for testing with wiremock.
    pub fn with_base_urls(ad_base_url: &str, search_base_url: &str) -> Result<Self, Error> {
        Ok(Self {
            ad_base_url: ad_base_url.trim_end_matches('/').to_string(),
            search_base_url: search_base_url.trim_end_matches('/').to_string(),
            http: build_http(REQUEST_TIMEOUT)?,
        })
    }

    /// Replaces the per-request timeout (30 s by default).
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, Error> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    fn get_url(&self, base: &str, path: &str, query: &impl Query) -> Result<Url, Error> {
        let raw = format!("{}{}", base, path);
        let url = Url::parse(&raw).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::InvalidUrl(format!("{}: {}", raw, e))
        })?;
        Ok(query.add_to_url(&url))
    }

    async fn get<T>(&self, url: Url, headers: HeaderMap) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        tracing::debug!("GET {}", url.path());
        let resp = self
            .http
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<T>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse resource: {} | body: {}", e, snippet);
            Error::InvalidResponse(format!("{} | body: {}", e, snippet))
        })
    }

    /// Fetches keywords related to the query's hint keyword. The request is
    /// signed with the caller's secret key.
    pub async fn get_keyword_list(
        &self,
        query: &KeywordToolQuery,
        credentials: &AdCredentials,
    ) -> Result<KeywordToolResponse, Error> {
        let url = self.get_url(&self.ad_base_url, KEYWORD_TOOL_PATH, query)?;
        let headers = signature::build_headers(
            "GET",
            KEYWORD_TOOL_PATH,
            &credentials.api_key,
            &credentials.secret_key,
            &credentials.customer_id,
        )?;
        self.get(url, headers).await
    }

    /// Runs a blog search. Only the `total` field of the response is
    /// meaningful to callers counting documents.
    pub async fn get_blog_search(
        &self,
        query: &BlogSearchQuery,
        credentials: &SearchCredentials,
    ) -> Result<BlogSearchResponse, Error> {
        let url = self.get_url(&self.search_base_url, BLOG_SEARCH_PATH, query)?;
        let mut headers = HeaderMap::new();
        headers.insert(CLIENT_ID_HEADER, header_value(&credentials.client_id)?);
        headers.insert(CLIENT_SECRET_HEADER, header_value(&credentials.client_secret)?);
        self.get(url, headers).await
    }
}

fn build_http(timeout: Duration) -> Result<reqwest::Client, Error> {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(timeout)
        .build()
        .map_err(|e| {
            tracing::error!("Failed to build HTTP client: {}", e);
            Error::RequestFailed
        })
}

fn header_value(value: &str) -> Result<reqwest::header::HeaderValue, Error> {
    reqwest::header::HeaderValue::from_str(value)
        .map_err(|_| Error::Signature("credential contains invalid header characters".into()))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}
