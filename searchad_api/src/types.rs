//! Wire types for the ad-keyword and blog-search APIs, plus the credential
//! sets each API authenticates with.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials for the signed ad-keyword API.
#[derive(Clone, PartialEq, Eq)]
pub struct AdCredentials {
    pub api_key: String,
    pub secret_key: String,
    pub customer_id: String,
}

impl fmt::Debug for AdCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdCredentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .field("customer_id", &self.customer_id)
            .finish()
    }
}

impl AdCredentials {
    /// Names of fields that are empty or whitespace-only.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        blank(&[
            ("ad.api_key", &self.api_key),
            ("ad.secret_key", &self.secret_key),
            ("ad.customer_id", &self.customer_id),
        ])
    }
}

/// Client id/secret pair for the search API.
#[derive(Clone, PartialEq, Eq)]
pub struct SearchCredentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for SearchCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SearchCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

impl SearchCredentials {
    /// Names of fields that are empty or whitespace-only.
    pub fn blank_fields(&self) -> Vec<&'static str> {
        blank(&[
            ("search.client_id", &self.client_id),
            ("search.client_secret", &self.client_secret),
        ])
    }
}

fn blank(fields: &[(&'static str, &String)]) -> Vec<&'static str> {
    fields
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect()
}

/// Response body of `GET /keywordstool`.
///
/// Both fields are optional on the wire: a rejected call answers with a
/// `message` and no `keywordList`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KeywordToolResponse {
    #[serde(default)]
    pub keyword_list: Option<Vec<RawKeyword>>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One related keyword as returned by the ad-keyword API.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawKeyword {
    pub rel_keyword: String,
    pub monthly_pc_qc_cnt: RawVolume,
    pub monthly_mobile_qc_cnt: RawVolume,
    #[serde(default)]
    pub comp_idx: String,
}

/// A monthly query count. Small volumes come back as text such as `"< 10"`.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawVolume {
    Count(u64),
    Text(String),
}

/// Response body of `GET /search/blog`. Only `total` is used.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogSearchResponse {
    pub total: u64,
    #[serde(default)]
    pub start: Option<u32>,
    #[serde(default)]
    pub display: Option<u32>,
    #[serde(default)]
    pub last_build_date: Option<String>,
}
