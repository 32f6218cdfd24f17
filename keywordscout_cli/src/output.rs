use anyhow::Result;
use keywordscout_lib::{KeywordRecord, RankChange, RankComparison, RankReport, SurfaceRank};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Clone, Debug)]
pub enum OutputFormat {
    Table,
    Json,
    Csv,
    Markdown,
}

#[derive(Tabled, Serialize)]
struct KeywordRow {
    #[tabled(rename = "Keyword")]
    #[serde(rename = "Keyword")]
    keyword: String,
    #[tabled(rename = "Mobile")]
    #[serde(rename = "Mobile")]
    mobile: u64,
    #[tabled(rename = "PC")]
    #[serde(rename = "PC")]
    pc: u64,
    #[tabled(rename = "Total")]
    #[serde(rename = "Total")]
    total: u64,
    #[tabled(rename = "Competition")]
    #[serde(rename = "Competition")]
    competition: String,
    #[tabled(rename = "Documents")]
    #[serde(rename = "Documents")]
    documents: String,
    #[tabled(rename = "Ratio")]
    #[serde(rename = "Ratio")]
    ratio: String,
}

#[derive(Tabled, Serialize)]
struct RankRow {
    #[tabled(rename = "Surface")]
    #[serde(rename = "Surface")]
    surface: String,
    #[tabled(rename = "Rank")]
    #[serde(rename = "Rank")]
    rank: String,
    #[tabled(rename = "Change")]
    #[serde(rename = "Change")]
    change: String,
}

// -- Row builders --

fn build_keyword_rows(records: &[KeywordRecord]) -> Vec<KeywordRow> {
    records
        .iter()
        .map(|r| KeywordRow {
            keyword: r.related_keyword.clone(),
            mobile: r.mobile_volume,
            pc: r.pc_volume,
            total: r.total_volume,
            competition: r.competition_index.clone(),
            documents: r
                .document_count
                .map(|d| d.to_string())
                .unwrap_or_else(|| "-".to_string()),
            ratio: r
                .competition_ratio
                .map(|ratio| format!("{:.2}", ratio))
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn build_rank_rows(report: &RankReport, comparison: Option<&RankComparison>) -> Vec<RankRow> {
    let surfaces: [(&str, SurfaceRank, Option<RankChange>); 3] = [
        (
            "Featured block",
            report.featured_block,
            comparison.map(|c| c.featured_block),
        ),
        (
            "Organic block",
            report.organic_block,
            comparison.map(|c| c.organic_block),
        ),
        (
            "Blog tab",
            report.dedicated_tab,
            comparison.map(|c| c.dedicated_tab),
        ),
    ];

    surfaces
        .into_iter()
        .map(|(surface, rank, change)| RankRow {
            surface: surface.to_string(),
            rank: format_rank(rank),
            change: change.map(|c| c.to_string()).unwrap_or_default(),
        })
        .collect()
}

fn format_rank(rank: SurfaceRank) -> String {
    match rank.rank {
        Some(r) if rank.found => format!("#{}", r),
        _ => "not ranked".to_string(),
    }
}

// -- Table output --

pub fn print_keywords_table(records: &[KeywordRecord]) {
    println!("{}", Table::new(build_keyword_rows(records)));
}

pub fn print_rank_table(report: &RankReport, comparison: Option<&RankComparison>) {
    println!("{}", Table::new(build_rank_rows(report, comparison)));
}

// -- Markdown output --

pub fn print_keywords_markdown(records: &[KeywordRecord]) {
    let mut table = Table::new(build_keyword_rows(records));
    table.with(Style::markdown());
    println!("{}", table);
}

pub fn print_rank_markdown(report: &RankReport, comparison: Option<&RankComparison>) {
    let mut table = Table::new(build_rank_rows(report, comparison));
    table.with(Style::markdown());
    println!("{}", table);
}

// -- CSV output --

pub fn print_keywords_csv(records: &[KeywordRecord]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_keyword_rows(records) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn print_rank_csv(report: &RankReport, comparison: Option<&RankComparison>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(std::io::stdout());
    for row in build_rank_rows(report, comparison) {
        wtr.serialize(row)?;
    }
    wtr.flush()?;
    Ok(())
}

// -- JSON output --

pub fn print_json<T: serde::Serialize>(data: &T) {
    match serde_json::to_string_pretty(data) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize to JSON: {}", e),
    }
}
