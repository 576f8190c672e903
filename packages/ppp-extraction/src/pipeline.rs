//! Pipeline orchestration: Fetching → Reducing → Extracting → Reconciling.
//!
//! One invocation walks those stages in order; any step's failure
//! absorbs into a stage-tagged [`PipelineError`] and the invocation's
//! partial progress is discarded. Nothing here retries, persists, or
//! locks by submission id. Retries and write serialization are caller
//! policy, and two concurrent runs for one submission race with
//! last-writer-wins at the store.

use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::{ExtractError, FetchError, PipelineError, Stage};
use crate::extract::{ExtractInput, Extractor};
use crate::reconcile::reconcile;
use crate::reduce::reduce;
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::Completion;
use crate::types::config::PipelineConfig;
use crate::types::record::LoanRecord;
use crate::types::request::PipelineRequest;

/// The extraction pipeline for one kind of fetcher and completion
/// service. Stateless across invocations; safe to share behind an `Arc`.
pub struct Pipeline<F, C> {
    fetcher: F,
    extractor: Extractor<C>,
    config: PipelineConfig,
}

impl<F: PageFetcher, C: Completion> Pipeline<F, C> {
    pub fn new(fetcher: F, llm: Option<C>, config: PipelineConfig) -> Self {
        let extractor = Extractor::new(llm, config.extractor.clone());
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    /// Run one invocation to completion.
    ///
    /// `existing` is the prior persisted record, loaded by the caller;
    /// the reconciled result is returned for the caller to persist.
    pub async fn run(
        &self,
        request: &PipelineRequest,
        existing: Option<&LoanRecord>,
    ) -> Result<LoanRecord, PipelineError> {
        self.run_with_cancellation(request, existing, &CancellationToken::new())
            .await
    }

    /// [`run`](Self::run), cancellable at every suspension point.
    ///
    /// Cancellation wins over in-flight work; a rendered fetch dropped
    /// mid-navigation still releases its browser before the process
    /// moves on.
    pub async fn run_with_cancellation(
        &self,
        request: &PipelineRequest,
        existing: Option<&LoanRecord>,
        cancel: &CancellationToken,
    ) -> Result<LoanRecord, PipelineError> {
        let started = Instant::now();
        let budget = self.config.combined_budget;

        info!(
            submission = %request.submission_id,
            business = %request.business_name,
            url = %request.source_url,
            mode = ?request.mode,
            "pipeline starting"
        );

        // FETCHING: bounded by the full combined budget. A URL that
        // cannot parse fails here rather than deep inside a fetcher.
        if let Err(error) = url::Url::parse(&request.source_url) {
            return Err(PipelineError::fetch(FetchError::Network {
                url: request.source_url.clone(),
                source: Box::new(error),
            }));
        }
        let fetch = self.fetcher.fetch(&request.source_url, request.mode);
        let fetched = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PipelineError::cancelled(Stage::Fetching));
            }
            outcome = tokio::time::timeout(budget, fetch) => match outcome {
                Ok(Ok(page)) => page,
                Ok(Err(error)) => {
                    warn!(submission = %request.submission_id, error = %error, "fetch failed");
                    return Err(PipelineError::fetch(error));
                }
                Err(_) => {
                    return Err(PipelineError::fetch(FetchError::Timeout {
                        url: request.source_url.clone(),
                        elapsed: budget,
                    }));
                }
            },
        };
        debug!(
            submission = %request.submission_id,
            final_url = %fetched.final_url,
            text_len = fetched.text.len(),
            "fetch complete"
        );

        // REDUCING: synchronous and total.
        let reduced = reduce(&fetched, &self.config.reducer);
        debug!(
            submission = %request.submission_id,
            chars = reduced.chars().count(),
            "content reduced"
        );

        // EXTRACTING: bounded by whatever the fetch left of the
        // combined budget, on top of the service's own transport timeout.
        let remaining = budget.saturating_sub(started.elapsed());
        if remaining.is_zero() {
            return Err(PipelineError::extract(ExtractError::Timeout));
        }
        let extraction = self.extractor.extract(ExtractInput {
            reduced_text: &reduced,
            business_name: &request.business_name,
            source_url: &request.source_url,
            prefill: request.prefill.clone(),
        });
        let fresh = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                return Err(PipelineError::cancelled(Stage::Extracting));
            }
            outcome = tokio::time::timeout(remaining, extraction) => match outcome {
                Ok(Ok(record)) => record,
                Ok(Err(error)) => {
                    warn!(submission = %request.submission_id, error = %error, "extraction failed");
                    return Err(PipelineError::extract(error));
                }
                Err(_) => return Err(PipelineError::extract(ExtractError::Timeout)),
            },
        };

        // RECONCILING: pure and total.
        let record = reconcile(existing, fresh);

        info!(
            submission = %request.submission_id,
            has_loan_data = record.has_loan_data(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "pipeline complete"
        );
        Ok(record)
    }
}
