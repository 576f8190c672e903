//! Extraction: a deterministic prompt contract around reduced page text,
//! a completion-service round trip, and strict response validation.

pub mod prompts;

mod normalize;

use tracing::{debug, info};

use crate::error::ExtractError;
use crate::traits::llm::{Completion, CompletionOptions};
use crate::types::config::ExtractorConfig;
use crate::types::record::LoanRecord;

/// Input for one extraction.
#[derive(Debug)]
pub struct ExtractInput<'a> {
    /// Bounded plain-text payload from the reducer.
    pub reduced_text: &'a str,

    /// The business the caller expects the page to describe.
    pub business_name: &'a str,

    /// Provenance URL, stamped onto the result.
    pub source_url: &'a str,

    /// Caller-supplied partial record, if a site-specific scraper already
    /// pulled fields out of the DOM.
    pub prefill: Option<LoanRecord>,
}

/// Turns reduced text into a [`LoanRecord`] via the completion service.
///
/// The service is an enhancement, not a hard dependency: with no service
/// configured, or with a prefill that already looks structured, the call
/// is skipped and the prefill is re-stamped instead.
pub struct Extractor<C> {
    llm: Option<C>,
    config: ExtractorConfig,
}

impl<C: Completion> Extractor<C> {
    pub fn new(llm: Option<C>, config: ExtractorConfig) -> Self {
        Self { llm, config }
    }

    pub async fn extract(&self, input: ExtractInput<'_>) -> Result<LoanRecord, ExtractError> {
        if let Some(record) = self.short_circuit(&input) {
            info!(
                business = %input.business_name,
                url = %input.source_url,
                "skipping extraction service, re-stamping structured input"
            );
            return Ok(record);
        }

        let Some(llm) = &self.llm else {
            return Err(ExtractError::ServiceUnavailable(
                "no completion service configured".into(),
            ));
        };

        let system = prompts::format_system_prompt(input.business_name);
        let user = prompts::format_user_prompt(input.source_url, input.reduced_text);
        let options = CompletionOptions {
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        debug!(
            business = %input.business_name,
            content_chars = input.reduced_text.chars().count(),
            temperature = options.temperature,
            "requesting extraction"
        );

        let response = llm.complete(&system, &user, &options).await?;
        let record = normalize::parse_response(&response)?
            .into_record(input.business_name, input.source_url);

        info!(
            business = %record.business_name,
            has_loan_data = record.has_loan_data(),
            "extraction complete"
        );
        Ok(record)
    }

    /// The service call is skipped when no service is configured, or the
    /// prefill is already a structured record (a name plus a draw
    /// amount). Either way the pipeline-owned fields are re-stamped so
    /// they reflect this fetch attempt.
    fn short_circuit(&self, input: &ExtractInput<'_>) -> Option<LoanRecord> {
        let prefill = input.prefill.as_ref()?;
        if self.llm.is_none() || prefill.is_structured() {
            Some(restamp(prefill.clone(), input.source_url))
        } else {
            None
        }
    }
}

fn restamp(mut record: LoanRecord, source_url: &str) -> LoanRecord {
    record.source_link = source_url.to_string();
    record.extracted_at = chrono::Utc::now();
    record
}
