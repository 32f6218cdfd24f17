mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use keywordscout_lib::ConfigFile;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "keywordscout")]
#[command(about = "Keyword research and blog rank tracking for Naver search")]
struct Cli {
    /// Output format: table, json, csv, or markdown
    #[arg(long, default_value = "table", global = true)]
    output: String,

    /// Config file with credentials and tuning
    #[arg(long, default_value = "keywordscout.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List related keywords and search volumes for a seed keyword
    Keywords(commands::keywords::KeywordsArgs),
    /// Related keywords enriched with document counts and competition ratios
    Analyze(commands::analyze::AnalyzeArgs),
    /// Find where a blog post ranks for a keyword
    Rank(commands::rank::RankArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("keywordscout=info".parse()?),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let format = match cli.output.as_str() {
        "json" => OutputFormat::Json,
        "csv" => OutputFormat::Csv,
        "md" | "markdown" => OutputFormat::Markdown,
        _ => OutputFormat::Table,
    };

    let config = ConfigFile::load_or_default(&cli.config)?;

    match &cli.command {
        Commands::Keywords(args) => commands::keywords::run(args, &config, &format).await?,
        Commands::Analyze(args) => commands::analyze::run(args, &config, &format).await?,
        Commands::Rank(args) => commands::rank::run(args, &config, &format).await?,
    }

    Ok(())
}
