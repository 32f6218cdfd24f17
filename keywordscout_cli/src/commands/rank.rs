use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use keywordscout_lib::{
    ConfigFile, RankChecker, RankComparison, RankLocator, RankReport, ResultLinkExtractor,
    RetryPolicy, SearchPageClient,
};
use serde::Serialize;

use crate::output::{
    print_json, print_rank_csv, print_rank_markdown, print_rank_table, OutputFormat,
};

#[derive(Args)]
pub struct RankArgs {
    /// Keyword to search for
    pub keyword: String,

    /// URL of the post to locate
    pub url: String,

    /// Earlier JSON report (from `--output json`) to compare against
    #[arg(long)]
    pub previous: Option<PathBuf>,
}

/// JSON shape of a rank check. The report's surfaces sit at the top level so
/// the output can be passed back in with `--previous`.
#[derive(Serialize)]
struct RankOutput<'a> {
    keyword: &'a str,
    target_url: &'a str,
    #[serde(flatten)]
    report: RankReport,
    #[serde(skip_serializing_if = "Option::is_none")]
    comparison: Option<RankComparison>,
}

pub async fn run(args: &RankArgs, config: &ConfigFile, format: &OutputFormat) -> Result<()> {
    let previous = match &args.previous {
        Some(path) => Some(load_report(path)?),
        None => None,
    };

    let checker = RankChecker::new(
        SearchPageClient::new()?,
        ResultLinkExtractor::new(config.link_pattern())?,
        RankLocator::new(config.surface_table()),
        RetryPolicy::from_env(),
    );

    let report = checker.check(&args.keyword, &args.url).await?;
    let comparison = previous.as_ref().map(|p| report.compare(p));

    match format {
        OutputFormat::Table => print_rank_table(&report, comparison.as_ref()),
        OutputFormat::Json => print_json(&RankOutput {
            keyword: &args.keyword,
            target_url: &args.url,
            report,
            comparison,
        }),
        OutputFormat::Csv => print_rank_csv(&report, comparison.as_ref())?,
        OutputFormat::Markdown => print_rank_markdown(&report, comparison.as_ref()),
    }

    Ok(())
}

fn load_report(path: &Path) -> Result<RankReport> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))
}
