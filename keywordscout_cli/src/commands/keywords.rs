use anyhow::Result;
use clap::Args;
use keywordscout_lib::searchad_api::Client;
use keywordscout_lib::{ConfigFile, KeywordMetricsClient, RetryPolicy};

use super::CredentialArgs;
use crate::output::{
    print_json, print_keywords_csv, print_keywords_markdown, print_keywords_table, OutputFormat,
};

#[derive(Args)]
pub struct KeywordsArgs {
    /// Seed keyword
    pub seed: String,

    /// Show at most this many related keywords
    #[arg(long)]
    pub limit: Option<usize>,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

pub async fn run(args: &KeywordsArgs, config: &ConfigFile, format: &OutputFormat) -> Result<()> {
    let credentials = args.credentials.resolver(config).ad_credentials()?;
    let metrics = KeywordMetricsClient::new(Client::new()?, RetryPolicy::from_env());

    let mut records = metrics.fetch_related(&args.seed, &credentials).await?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }
    eprintln!("{} related keywords for '{}'", records.len(), args.seed);

    match format {
        OutputFormat::Table => print_keywords_table(&records),
        OutputFormat::Json => print_json(&records),
        OutputFormat::Csv => print_keywords_csv(&records)?,
        OutputFormat::Markdown => print_keywords_markdown(&records),
    }

    Ok(())
}
