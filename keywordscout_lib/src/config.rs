//! Layered configuration: credentials and tunable constants.
//!
//! Each credential field is resolved independently, first match wins:
//! explicit value > environment variable > config file > default.
//! Empty or whitespace-only values count as absent at every layer.

use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use searchad_api::types::{AdCredentials, SearchCredentials};
use serde::Deserialize;

use crate::error::KeywordScoutError;
use crate::rank::{SurfaceTable, SurfaceWindow};
use crate::scrape::LinkPattern;

pub const ENV_AD_API_KEY: &str = "NAVER_AD_API_KEY";
pub const ENV_AD_SECRET_KEY: &str = "NAVER_AD_SECRET_KEY";
pub const ENV_AD_CUSTOMER_ID: &str = "NAVER_AD_CUSTOMER_ID";
pub const ENV_SEARCH_CLIENT_ID: &str = "NAVER_SEARCH_CLIENT_ID";
pub const ENV_SEARCH_CLIENT_SECRET: &str = "NAVER_SEARCH_CLIENT_SECRET";

const ENV_KEYS: [&str; 5] = [
    ENV_AD_API_KEY,
    ENV_AD_SECRET_KEY,
    ENV_AD_CUSTOMER_ID,
    ENV_SEARCH_CLIENT_ID,
    ENV_SEARCH_CLIENT_SECRET,
];

/// Default pause between keywords in an enrichment run.
pub const DEFAULT_ENRICH_DELAY: Duration = Duration::from_millis(50);

/// Contents of `keywordscout.toml`. Every table and key is optional.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub ad: AdSection,
    pub search: SearchSection,
    pub enrich: EnrichSection,
    pub rank: RankSection,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdSection {
    pub api_key: Option<String>,
    pub secret_key: Option<String>,
    pub customer_id: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchSection {
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct EnrichSection {
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RankSection {
    pub host: Option<String>,
    pub featured_width: Option<usize>,
    pub organic_width: Option<usize>,
    pub tab_cap: Option<usize>,
}

impl ConfigFile {
    /// Parses a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, KeywordScoutError> {
        toml::from_str(content).map_err(|e| KeywordScoutError::Config(e.to_string()))
    }

    /// Reads and parses the file at `path`.
    pub fn load(path: &Path) -> Result<Self, KeywordScoutError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            KeywordScoutError::Config(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Like [`ConfigFile::load`], but a missing file yields the empty config.
    pub fn load_or_default(path: &Path) -> Result<Self, KeywordScoutError> {
        if path.exists() {
            Self::load(path)
        } else {
            tracing::debug!("No config file at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    pub fn enrich_delay(&self) -> Duration {
        self.enrich
            .delay_ms
            .map(Duration::from_millis)
            .unwrap_or(DEFAULT_ENRICH_DELAY)
    }

    /// Surface boundaries with any configured widths applied. The organic
    /// window always starts where the featured window ends.
    pub fn surface_table(&self) -> SurfaceTable {
        let defaults = SurfaceTable::default();
        let featured_width = self.rank.featured_width.unwrap_or(defaults.featured.width);
        SurfaceTable {
            featured: SurfaceWindow {
                offset: 0,
                width: featured_width,
            },
            organic: SurfaceWindow {
                offset: featured_width,
                width: self.rank.organic_width.unwrap_or(defaults.organic.width),
            },
            tab_cap: self.rank.tab_cap.unwrap_or(defaults.tab_cap),
        }
    }

    pub fn link_pattern(&self) -> LinkPattern {
        let mut pattern = LinkPattern::default();
        if let Some(host) = non_empty(self.rank.host.as_deref()) {
            pattern.host = host.to_string();
        }
        pattern
    }
}

/// Credential values supplied directly by the caller, e.g. CLI flags or a
/// per-request payload.
#[derive(Debug, Clone, Default)]
pub struct CredentialOverrides {
    pub ad_api_key: Option<String>,
    pub ad_secret_key: Option<String>,
    pub ad_customer_id: Option<String>,
    pub search_client_id: Option<String>,
    pub search_client_secret: Option<String>,
}

/// Snapshot of the credential environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvLayer {
    vars: HashMap<String, String>,
}

impl EnvLayer {
    /// Captures the known credential variables from the process environment.
    pub fn from_process() -> Self {
        let vars = ENV_KEYS
            .iter()
            .filter_map(|key| std::env::var(key).ok().map(|v| (key.to_string(), v)))
            .collect();
        Self { vars }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }
}

/// Resolves credential sets from the explicit, environment and file layers.
#[derive(Debug, Clone, Default)]
pub struct CredentialResolver {
    overrides: CredentialOverrides,
    env: EnvLayer,
    file: ConfigFile,
}

impl CredentialResolver {
    pub fn new(overrides: CredentialOverrides, env: EnvLayer, file: ConfigFile) -> Self {
        Self {
            overrides,
            env,
            file,
        }
    }

    /// Resolves the ad-keyword API credentials, listing every missing field
    /// on failure.
    pub fn ad_credentials(&self) -> Result<AdCredentials, KeywordScoutError> {
        let mut missing = Vec::new();
        let api_key = self.field(
            "ad.api_key",
            self.overrides.ad_api_key.as_deref(),
            ENV_AD_API_KEY,
            self.file.ad.api_key.as_deref(),
            &mut missing,
        );
        let secret_key = self.field(
            "ad.secret_key",
            self.overrides.ad_secret_key.as_deref(),
            ENV_AD_SECRET_KEY,
            self.file.ad.secret_key.as_deref(),
            &mut missing,
        );
        let customer_id = self.field(
            "ad.customer_id",
            self.overrides.ad_customer_id.as_deref(),
            ENV_AD_CUSTOMER_ID,
            self.file.ad.customer_id.as_deref(),
            &mut missing,
        );

        match (api_key, secret_key, customer_id) {
            (Some(api_key), Some(secret_key), Some(customer_id)) => Ok(AdCredentials {
                api_key,
                secret_key,
                customer_id,
            }),
            _ => Err(KeywordScoutError::CredentialsMissing(missing)),
        }
    }

    /// Resolves the search API credentials.
    pub fn search_credentials(&self) -> Result<SearchCredentials, KeywordScoutError> {
        let mut missing = Vec::new();
        let client_id = self.field(
            "search.client_id",
            self.overrides.search_client_id.as_deref(),
            ENV_SEARCH_CLIENT_ID,
            self.file.search.client_id.as_deref(),
            &mut missing,
        );
        let client_secret = self.field(
            "search.client_secret",
            self.overrides.search_client_secret.as_deref(),
            ENV_SEARCH_CLIENT_SECRET,
            self.file.search.client_secret.as_deref(),
            &mut missing,
        );

        match (client_id, client_secret) {
            (Some(client_id), Some(client_secret)) => Ok(SearchCredentials {
                client_id,
                client_secret,
            }),
            _ => Err(KeywordScoutError::CredentialsMissing(missing)),
        }
    }

    fn field(
        &self,
        name: &'static str,
        explicit: Option<&str>,
        env_key: &str,
        file: Option<&str>,
        missing: &mut Vec<&'static str>,
    ) -> Option<String> {
        let value = resolve_layered(&[explicit, self.env.get(env_key), file, None]);
        if value.is_none() {
            missing.push(name);
        }
        value
    }
}

/// Returns the first non-empty value, in layer order.
/// Rejects an ad credential set with any blank field.
pub fn ensure_ad_credentials(credentials: &AdCredentials) -> Result<(), KeywordScoutError> {
    missing_to_error(credentials.blank_fields())
}

/// Rejects a search credential set with any blank field.
pub fn ensure_search_credentials(
    credentials: &SearchCredentials,
) -> Result<(), KeywordScoutError> {
    missing_to_error(credentials.blank_fields())
}

fn missing_to_error(missing: Vec<&'static str>) -> Result<(), KeywordScoutError> {
    if missing.is_empty() {
        Ok(())
    } else {
        Err(KeywordScoutError::CredentialsMissing(missing))
    }
}

pub fn resolve_layered(layers: &[Option<&str>]) -> Option<String> {
    layers
        .iter()
        .find_map(|layer| non_empty(*layer))
        .map(|v| v.to_string())
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
