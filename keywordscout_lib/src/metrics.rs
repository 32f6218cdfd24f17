//! Related-keyword lookup against the ad-keyword API.

use searchad_api::types::AdCredentials;
use searchad_api::{Client, KeywordToolQuery};

use crate::config::ensure_ad_credentials;
use crate::error::KeywordScoutError;
use crate::keyword::KeywordRecord;
use crate::retry::{with_retry, RetryPolicy};

/// Fetches related keywords for a seed and normalizes them into
/// [`KeywordRecord`]s.
///
/// Fails fast: a response without a keyword list, or any item with an
/// unparseable volume, fails the whole call.
pub struct KeywordMetricsClient {
    api: Client,
    retry: RetryPolicy,
}

impl KeywordMetricsClient {
    pub fn new(api: Client, retry: RetryPolicy) -> Self {
        Self { api, retry }
    }

    pub async fn fetch_related(
        &self,
        seed_keyword: &str,
        credentials: &AdCredentials,
    ) -> Result<Vec<KeywordRecord>, KeywordScoutError> {
        ensure_ad_credentials(credentials)?;
        let seed = seed_keyword.trim();
        if seed.is_empty() {
            return Err(KeywordScoutError::InvalidInput(
                "seed keyword must not be empty".into(),
            ));
        }

        let query = KeywordToolQuery::new(seed);
        let response = with_retry(
            &self.retry,
            "keywordstool",
            searchad_api::Error::is_transient,
            || self.api.get_keyword_list(&query, credentials),
        )
        .await?;

        let Some(items) = response.keyword_list else {
            let message = response
                .message
                .unwrap_or_else(|| "response has no keywordList".to_string());
            tracing::error!("Keyword lookup for '{}' rejected: {}", seed, message);
            return Err(KeywordScoutError::UpstreamFormat(message));
        };

        let records = items
            .iter()
            .map(KeywordRecord::from_raw)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::info!("{} related keywords for '{}'", records.len(), seed);
        Ok(records)
    }
}
