//! Competing-document counts from the blog search API.

use searchad_api::types::SearchCredentials;
use searchad_api::{BlogSearchQuery, Client};

use crate::config::ensure_search_credentials;
use crate::error::KeywordScoutError;
use crate::retry::{with_retry, RetryPolicy};

/// Looks up how many indexed documents match a keyword.
pub struct DocumentCountClient {
    api: Client,
    retry: RetryPolicy,
}

impl DocumentCountClient {
    pub fn new(api: Client, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    /// Returns the document count, retrying transient failures. Blank
    /// credentials fail with `CredentialsMissing` before any request.
    pub async fn try_fetch_document_count(
        &self,
        keyword: &str,
        credentials: &SearchCredentials,
    ) -> Result<u64, KeywordScoutError> {
        ensure_search_credentials(credentials)?;
        let query = BlogSearchQuery::new(keyword).with_display(1);
        let response = with_retry(
            &self.retry,
            "blog search",
            searchad_api::Error::is_transient,
            || self.api.get_blog_search(&query, credentials),
        )
        .await?;
        Ok(response.total)
    }

    /// Returns the document count, or `0` when the lookup fails for any reason.
    /// A zero count makes the keyword's competition ratio `0.0`.
    pub async fn fetch_document_count(&self, keyword: &str, credentials: &SearchCredentials) -> u64 {
        match self.try_fetch_document_count(keyword, credentials).await {
            Ok(total) => total,
            Err(err) => {
                tracing::warn!("Document count for '{}' unavailable: {}", keyword, err);
                0
            }
        }
    }
}
