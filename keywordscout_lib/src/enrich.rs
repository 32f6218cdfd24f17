//! Sequential enrichment of keyword records with document counts.
//!
//! Records are processed strictly in input order with a fixed pause between
//! lookups to stay under the search API's rate limit. A failed lookup
//! degrades that record's count to `0` and the batch moves on.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use searchad_api::types::SearchCredentials;
use tokio_util::sync::CancellationToken;

use crate::config::{ensure_search_credentials, DEFAULT_ENRICH_DELAY};
use crate::documents::DocumentCountClient;
use crate::error::KeywordScoutError;
use crate::export;
use crate::keyword::KeywordRecord;
use crate::progress::{self, ProgressHandle, ProgressRegistry, ProgressReporter, RunId};

/// Context of one enrichment run: its id, progress and cancellation.
pub struct EnrichmentRun {
    id: RunId,
    reporter: ProgressReporter,
    handle: ProgressHandle,
    cancel: CancellationToken,
}

impl EnrichmentRun {
    fn new() -> Self {
        let (reporter, handle) = progress::channel();
        Self {
            id: RunId::generate(),
            reporter,
            handle,
            cancel: CancellationToken::new(),
        }
    }

    pub fn id(&self) -> &RunId {
        &self.id
    }

    pub fn progress(&self) -> ProgressHandle {
        self.handle.clone()
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Stops the run before its next record.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }
}

/// Result of [`EnrichmentPipeline::enrich`].
#[derive(Debug, Clone)]
pub struct EnrichOutcome {
    pub run_id: RunId,
    pub processed: usize,
    /// Lookups that failed and were recorded as zero documents.
    pub failed_lookups: usize,
    pub cancelled: bool,
    pub export_path: Option<PathBuf>,
}

pub struct EnrichmentPipeline {
    documents: DocumentCountClient,
    delay: Duration,
    export_dir: Option<PathBuf>,
    registry: Option<Arc<ProgressRegistry>>,
}

impl EnrichmentPipeline {
    pub fn new(documents: DocumentCountClient) -> Self {
        Self {
            documents,
            delay: DEFAULT_ENRICH_DELAY,
            export_dir: None,
            registry: None,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Completed runs write a CSV export into `dir`.
    pub fn with_export_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.export_dir = Some(dir.into());
        self
    }

    /// New runs are registered here so they can be polled by id. A run stays
    /// pollable until its [`EnrichmentRun`] is dropped; dropped runs are
    /// evicted on the next registration, or earlier through
    /// [`ProgressRegistry::finish`].
    pub fn with_registry(mut self, registry: Arc<ProgressRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn start_run(&self) -> EnrichmentRun {
        let run = EnrichmentRun::new();
        if let Some(registry) = &self.registry {
            registry.register(run.id.clone(), run.progress());
        }
        run
    }

    /// Adds document counts and competition ratios to `records` in place.
    ///
    /// Blank credentials fail with `CredentialsMissing` before any record
    /// is touched. After that only an export failure is an error; lookup
    /// failures are counted in the outcome. A cancelled run keeps the records processed so far,
    /// leaves progress at its last value and skips the export.
    pub async fn enrich(
        &self,
        records: &mut [KeywordRecord],
        credentials: &SearchCredentials,
        run: &EnrichmentRun,
    ) -> Result<EnrichOutcome, KeywordScoutError> {
        ensure_search_credentials(credentials)?;
        let total = records.len();
        let mut processed = 0usize;
        let mut failed_lookups = 0usize;
        let mut cancelled = false;

        tracing::info!("Run {}: enriching {} keywords", run.id, total);
        run.reporter.update(0, total, "starting");

        for (idx, record) in records.iter_mut().enumerate() {
            if run.cancel.is_cancelled() {
                cancelled = true;
                break;
            }

            let count = match self
                .documents
                .try_fetch_document_count(&record.related_keyword, credentials)
                .await
            {
                Ok(count) => count,
                Err(err) => {
                    tracing::warn!(
                        "Run {}: document count for '{}' failed, using 0: {}",
                        run.id,
                        record.related_keyword,
                        err
                    );
                    failed_lookups += 1;
                    0
                }
            };
            record.apply_document_count(count);
            processed = idx + 1;
            tracing::debug!(
                "{} documents for '{}' (ratio {:.4})",
                count,
                record.related_keyword,
                record.competition_ratio.unwrap_or_default()
            );
            run.reporter
                .update(processed, total, format!("processed {}", record.related_keyword));

            if processed < total {
                tokio::select! {
                    _ = tokio::time::sleep(self.delay) => {}
                    _ = run.cancel.cancelled() => {}
                }
            }
        }

        if cancelled {
            tracing::warn!("Run {}: cancelled after {}/{} keywords", run.id, processed, total);
        } else {
            tracing::info!(
                "Run {}: enriched {} keywords ({} lookups failed)",
                run.id,
                processed,
                failed_lookups
            );
        }

        let export_path = match (&self.export_dir, cancelled) {
            (Some(dir), false) => Some(export::write_export(dir, records, chrono::Local::now())?),
            _ => None,
        };

        Ok(EnrichOutcome {
            run_id: run.id.clone(),
            processed,
            failed_lookups,
            cancelled,
            export_path,
        })
    }
}
