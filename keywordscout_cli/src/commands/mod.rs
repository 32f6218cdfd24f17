//! CLI subcommand implementations.

pub mod analyze;
pub mod keywords;
pub mod rank;

use clap::Args;
use keywordscout_lib::{ConfigFile, CredentialOverrides, CredentialResolver, EnvLayer};

/// Credential flags. Each one overrides the matching environment variable,
/// which in turn overrides the config file.
#[derive(Args, Default)]
pub struct CredentialArgs {
    /// Search ad API key [env: NAVER_AD_API_KEY]
    #[arg(long)]
    pub ad_api_key: Option<String>,

    /// Search ad API secret [env: NAVER_AD_SECRET_KEY]
    #[arg(long)]
    pub ad_secret_key: Option<String>,

    /// Search ad customer id [env: NAVER_AD_CUSTOMER_ID]
    #[arg(long)]
    pub customer_id: Option<String>,

    /// Open API client id [env: NAVER_SEARCH_CLIENT_ID]
    #[arg(long)]
    pub client_id: Option<String>,

    /// Open API client secret [env: NAVER_SEARCH_CLIENT_SECRET]
    #[arg(long)]
    pub client_secret: Option<String>,
}

impl CredentialArgs {
    pub fn resolver(&self, config: &ConfigFile) -> CredentialResolver {
        let overrides = CredentialOverrides {
            ad_api_key: self.ad_api_key.clone(),
            ad_secret_key: self.ad_secret_key.clone(),
            ad_customer_id: self.customer_id.clone(),
            search_client_id: self.client_id.clone(),
            search_client_secret: self.client_secret.clone(),
        };
        CredentialResolver::new(overrides, EnvLayer::from_process(), config.clone())
    }
}
