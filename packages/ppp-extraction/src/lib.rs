//! PPP Loan Disclosure Extraction Pipeline
//!
//! Normalizes unstructured loan-disclosure pages (HTML or rendered
//! browser DOM) into a fixed structured record: fetch-or-render a source
//! page, reduce it to a bounded text payload, send it to a
//! natural-language extraction service under a strict output contract,
//! validate the response, and reconcile it against prior persisted
//! state, all while tolerating an unreliable, semi-adversarial source
//! (anti-bot pages, malformed markup, non-deterministic model output).
//!
//! # Design Philosophy
//!
//! - The extraction service is a capability seam ([`Completion`]), not a
//!   hard dependency: tests script it, and pre-structured inputs skip it.
//! - Reconciliation never regresses: fresh nulls do not erase known data.
//! - Failures are stage-tagged and normalized into one error type;
//!   partial progress is discarded, never persisted.
//! - Persistence and HTTP routing stay behind trait seams: the pipeline
//!   returns records, the caller stores them.
//!
//! # Usage
//!
//! ```rust,ignore
//! use ppp_extraction::{
//!     OpenAiCompletion, Pipeline, PipelineConfig, PipelineRequest, WebFetcher,
//! };
//!
//! let config = PipelineConfig::default();
//! let pipeline = Pipeline::new(
//!     WebFetcher::new(&config),
//!     OpenAiCompletion::from_env(),
//!     config,
//! );
//!
//! let request = PipelineRequest::new("sub-123", "Acme LLC", "https://example.com/acme");
//! let existing = store.load_loan_record(&request.submission_id).await?;
//! let record = pipeline.run(&request, existing.as_ref()).await?;
//! store.save_loan_record(&request.submission_id, &record).await?;
//! ```
//!
//! # Modules
//!
//! - [`fetch`] - Two-tier page acquisition (direct HTTP, headless browser)
//! - [`reduce`] - Bounded plain-text payloads for the service prompt
//! - [`extract`] - Prompt contract, response validation, normalization
//! - [`reconcile`] - Non-null-preference merge with prior state
//! - [`pipeline`] - Stage orchestration, budgets, cancellation
//! - [`traits`] - Collaborator seams (completion, fetcher, store)
//! - [`stores`] - Store implementations (in-memory)
//! - [`testing`] - Deterministic mocks for the seams

pub mod error;
pub mod extract;
pub mod fetch;
pub mod llm;
pub mod pipeline;
pub mod reconcile;
pub mod reduce;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    CompletionError, ExtractError, FetchError, PipelineError, Stage, StageError, StoreError,
};
pub use extract::{ExtractInput, Extractor};
pub use fetch::{find_bot_marker, DirectFetcher, RenderedFetcher, WebFetcher};
pub use llm::OpenAiCompletion;
pub use pipeline::Pipeline;
pub use reconcile::reconcile;
pub use reduce::reduce;
pub use stores::MemorySubmissionStore;
pub use traits::{Completion, CompletionOptions, PageFetcher, SubmissionStore};
pub use types::{
    config::{
        ExtractorConfig, FetchConfig, PipelineConfig, ReducerConfig, RenderConfig,
        DEFAULT_USER_AGENT,
    },
    page::{FetchMode, FetchResult},
    record::{LoanDraw, LoanRecord},
    request::{PipelineRequest, PipelineResponse},
};
