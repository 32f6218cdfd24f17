//! Library layer for keywordscout: keyword enrichment and rank detection.
//!
//! Wraps the `searchad_api` crate with credential layering, bounded retries,
//! a sequential enrichment pipeline with run-scoped progress, CSV export,
//! and a rank checker over search result pages.

pub mod config;
pub mod documents;
pub mod enrich;
pub mod error;
pub mod export;
pub mod keyword;
pub mod metrics;
pub mod progress;
pub mod rank;
pub mod retry;
pub mod scrape;

pub use searchad_api;
pub use searchad_api::types::{AdCredentials, SearchCredentials};

pub use config::{ConfigFile, CredentialOverrides, CredentialResolver, EnvLayer};
pub use documents::DocumentCountClient;
pub use enrich::{EnrichOutcome, EnrichmentPipeline, EnrichmentRun};
pub use error::KeywordScoutError;
pub use keyword::KeywordRecord;
pub use metrics::KeywordMetricsClient;
pub use progress::{ProgressHandle, ProgressRegistry, ProgressState, RunId};
pub use rank::{
    RankChange, RankChecker, RankComparison, RankLocator, RankReport, SurfaceRank, SurfaceTable,
    SurfaceWindow,
};
pub use retry::RetryPolicy;
pub use scrape::{
    CandidateLink, LinkPattern, ResultLinkExtractor, ScrapeError, SearchPageClient,
};
