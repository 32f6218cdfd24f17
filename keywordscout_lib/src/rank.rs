//! Rank detection across the featured block, the organic block and the
//! dedicated blog tab.
//!
//! The featured/organic split of the combined page is a positional
//! assumption about third-party markup. It lives in [`SurfaceTable`] so it
//! can be tuned from config without touching the scan.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::KeywordScoutError;
use crate::retry::{with_retry, RetryPolicy};
use crate::scrape::{
    normalize_url, CandidateLink, ResultLinkExtractor, ScrapeError, SearchPageClient,
};

/// A contiguous range of 0-based positions on the combined page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SurfaceWindow {
    pub offset: usize,
    pub width: usize,
}

impl SurfaceWindow {
    pub fn end(&self) -> usize {
        self.offset.saturating_add(self.width)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.offset && index < self.end()
    }

    /// 1-based rank of `index` within this window.
    fn rank_of(&self, index: usize) -> u32 {
        (index - self.offset + 1) as u32
    }
}

/// Position boundaries of the three result surfaces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfaceTable {
    pub featured: SurfaceWindow,
    pub organic: SurfaceWindow,
    /// How many dedicated-tab links are scanned.
    pub tab_cap: usize,
}

impl Default for SurfaceTable {
    fn default() -> Self {
        Self {
            featured: SurfaceWindow {
                offset: 0,
                width: 10,
            },
            organic: SurfaceWindow {
                offset: 10,
                width: 20,
            },
            tab_cap: 100,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SurfaceRank {
    pub found: bool,
    pub rank: Option<u32>,
}

impl SurfaceRank {
    pub fn at(rank: u32) -> Self {
        Self {
            found: true,
            rank: Some(rank),
        }
    }

    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Where a target URL sits on each surface. "Not found" on every surface
/// is a successful result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RankReport {
    pub featured_block: SurfaceRank,
    pub organic_block: SurfaceRank,
    pub dedicated_tab: SurfaceRank,
}

impl RankReport {
    /// Per-surface movement relative to an earlier report.
    pub fn compare(&self, previous: &RankReport) -> RankComparison {
        RankComparison {
            featured_block: RankChange::between(
                self.featured_block.rank,
                previous.featured_block.rank,
            ),
            organic_block: RankChange::between(
                self.organic_block.rank,
                previous.organic_block.rank,
            ),
            dedicated_tab: RankChange::between(
                self.dedicated_tab.rank,
                previous.dedicated_tab.rank,
            ),
        }
    }
}

/// Two normalized URLs refer to the same target when either contains the
/// other.
pub fn urls_match(a: &str, b: &str) -> bool {
    !a.is_empty() && !b.is_empty() && (a.contains(b) || b.contains(a))
}

pub struct RankLocator {
    table: SurfaceTable,
}

impl RankLocator {
    pub fn new(table: SurfaceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &SurfaceTable {
        &self.table
    }

    pub fn locate(
        &self,
        target_url: &str,
        combined: &[CandidateLink],
        tab: &[CandidateLink],
    ) -> RankReport {
        let target = normalize_url(target_url);
        let (featured_block, organic_block) = self.locate_combined(&target, combined);
        RankReport {
            featured_block,
            organic_block,
            dedicated_tab: self.locate_tab(&target, tab),
        }
    }

    /// Scans the combined page up to the end of the furthest window and
    /// stops at the first match. A match outside both windows counts as
    /// not ranked.
    pub fn locate_combined(
        &self,
        target: &str,
        links: &[CandidateLink],
    ) -> (SurfaceRank, SurfaceRank) {
        let featured = self.table.featured;
        let organic = self.table.organic;
        let bound = featured.end().max(organic.end());

        let hit = links
            .iter()
            .take(bound)
            .position(|link| urls_match(target, &link.normalized_url));

        match hit {
            Some(i) if featured.contains(i) => {
                (SurfaceRank::at(featured.rank_of(i)), SurfaceRank::not_found())
            }
            Some(i) if organic.contains(i) => {
                (SurfaceRank::not_found(), SurfaceRank::at(organic.rank_of(i)))
            }
            _ => (SurfaceRank::not_found(), SurfaceRank::not_found()),
        }
    }

    pub fn locate_tab(&self, target: &str, links: &[CandidateLink]) -> SurfaceRank {
        links
            .iter()
            .take(self.table.tab_cap)
            .position(|link| urls_match(target, &link.normalized_url))
            .map(|i| SurfaceRank::at(i as u32 + 1))
            .unwrap_or_default()
    }
}

/// Movement of a target on one surface between two checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "direction", content = "by", rename_all = "snake_case")]
pub enum RankChange {
    /// Absent both times.
    NotRanked,
    /// Absent before, ranked now.
    Entered(u32),
    /// Ranked before, absent now.
    Lost,
    Same,
    Up(u32),
    Down(u32),
}

impl RankChange {
    pub fn between(current: Option<u32>, previous: Option<u32>) -> Self {
        match (current, previous) {
            (None, None) => Self::NotRanked,
            (Some(now), None) => Self::Entered(now),
            (None, Some(_)) => Self::Lost,
            (Some(now), Some(before)) if now < before => Self::Up(before - now),
            (Some(now), Some(before)) if now > before => Self::Down(now - before),
            (Some(_), Some(_)) => Self::Same,
        }
    }
}

impl fmt::Display for RankChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotRanked => write!(f, "-"),
            Self::Entered(rank) => write!(f, "new (#{})", rank),
            Self::Lost => write!(f, "lost"),
            Self::Same => write!(f, "same"),
            Self::Up(n) => write!(f, "up {}", n),
            Self::Down(n) => write!(f, "down {}", n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankComparison {
    pub featured_block: RankChange,
    pub organic_block: RankChange,
    pub dedicated_tab: RankChange,
}

/// Fetches both result pages for a keyword and locates a target URL on them.
pub struct RankChecker {
    pages: SearchPageClient,
    extractor: ResultLinkExtractor,
    locator: RankLocator,
    retry: RetryPolicy,
}

impl RankChecker {
    pub fn new(
        pages: SearchPageClient,
        extractor: ResultLinkExtractor,
        locator: RankLocator,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            pages,
            extractor,
            locator,
            retry,
        }
    }

    pub async fn check(
        &self,
        keyword: &str,
        target_url: &str,
    ) -> Result<RankReport, KeywordScoutError> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(KeywordScoutError::InvalidInput("keyword is empty".into()));
        }
        if normalize_url(target_url).is_empty() {
            return Err(KeywordScoutError::InvalidInput("target URL is empty".into()));
        }

        let combined_body = with_retry(&self.retry, "combined page", ScrapeError::is_transient, || {
            self.pages.combined_page(keyword)
        })
        .await?;
        let tab_body = with_retry(&self.retry, "blog tab page", ScrapeError::is_transient, || {
            self.pages.tab_page(keyword)
        })
        .await?;

        let combined = self.extractor.extract(&combined_body);
        let tab = self.extractor.extract(&tab_body);
        tracing::info!(
            "Rank check for '{}': {} combined links, {} tab links",
            keyword,
            combined.len(),
            tab.len()
        );

        Ok(self.locator.locate(target_url, &combined, &tab))
    }
}
