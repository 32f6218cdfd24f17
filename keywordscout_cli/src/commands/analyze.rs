//! Seed keyword to enriched, exported keyword table.
//!
//! Related keywords are fetched once, then enriched one at a time with a
//! pause between lookups. Ctrl-C stops the run after the current keyword;
//! keywords processed so far are still printed.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use keywordscout_lib::searchad_api::Client;
use keywordscout_lib::{
    ConfigFile, DocumentCountClient, EnrichmentPipeline, KeywordMetricsClient, RetryPolicy,
};

use super::CredentialArgs;
use crate::output::{
    print_json, print_keywords_csv, print_keywords_markdown, print_keywords_table, OutputFormat,
};

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Seed keyword
    pub seed: String,

    /// Enrich only the first N related keywords
    #[arg(long)]
    pub limit: Option<usize>,

    /// Pause between document-count lookups in milliseconds [config: enrich.delay_ms]
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Directory for the CSV export
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,

    /// Skip writing the CSV export
    #[arg(long)]
    pub no_export: bool,

    #[command(flatten)]
    pub credentials: CredentialArgs,
}

pub async fn run(args: &AnalyzeArgs, config: &ConfigFile, format: &OutputFormat) -> Result<()> {
    let resolver = args.credentials.resolver(config);
    let ad_credentials = resolver.ad_credentials()?;
    let search_credentials = resolver.search_credentials()?;

    let retry = RetryPolicy::from_env();
    let api = Client::new()?;
    let metrics = KeywordMetricsClient::new(api.clone(), retry.clone());

    let mut records = metrics.fetch_related(&args.seed, &ad_credentials).await?;
    if let Some(limit) = args.limit {
        records.truncate(limit);
    }
    if records.is_empty() {
        eprintln!("No related keywords for '{}'", args.seed);
        return Ok(());
    }

    let delay = args
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or_else(|| config.enrich_delay());
    let mut pipeline =
        EnrichmentPipeline::new(DocumentCountClient::new(api, retry)).with_delay(delay);
    if !args.no_export {
        pipeline = pipeline.with_export_dir(&args.export_dir);
    }

    let run = pipeline.start_run();
    eprintln!(
        "Run {}: enriching {} keywords for '{}'",
        run.id(),
        records.len(),
        args.seed
    );

    let pb = ProgressBar::new(records.len() as u64);
    pb.set_style(ProgressStyle::with_template(
        "[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} ({eta}) {msg}",
    )?);
    pb.set_message("fetching document counts...");

    let mut progress = run.progress();
    let bar = pb.clone();
    let watcher = tokio::spawn(async move {
        while progress.changed().await {
            let state = progress.poll();
            bar.set_position(state.current as u64);
            bar.set_message(state.message);
        }
    });

    let cancel = run.cancel_token();
    let interrupt = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            cancel.cancel();
        }
    });

    let result = pipeline
        .enrich(&mut records, &search_credentials, &run)
        .await;
    watcher.abort();
    interrupt.abort();
    let outcome = result?;

    pb.set_position(outcome.processed as u64);
    if outcome.cancelled {
        pb.abandon_with_message("cancelled");
        eprintln!(
            "Cancelled after {} of {} keywords",
            outcome.processed,
            records.len()
        );
    } else {
        pb.finish_with_message("done");
    }

    if outcome.failed_lookups > 0 {
        eprintln!(
            "{} document-count lookups failed and were recorded as 0",
            outcome.failed_lookups
        );
    }
    if let Some(path) = &outcome.export_path {
        eprintln!("Exported to {}", path.display());
    }

    let enriched = &records[..outcome.processed];
    match format {
        OutputFormat::Table => print_keywords_table(enriched),
        OutputFormat::Json => print_json(&enriched),
        OutputFormat::Csv => print_keywords_csv(enriched)?,
        OutputFormat::Markdown => print_keywords_markdown(enriched),
    }

    Ok(())
}
