//! Invocation-contract types consumed by the HTTP collaborator.
//!
//! The HTTP layer deserializes a [`PipelineRequest`] from the route body,
//! runs the pipeline, and maps the outcome into a [`PipelineResponse`];
//! status-code policy belongs to that layer, not here.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;
use crate::types::page::FetchMode;
use crate::types::record::LoanRecord;

/// Input for one pipeline invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineRequest {
    /// Opaque key into the collaborator document store.
    pub submission_id: String,

    /// The business the caller expects the page to describe.
    pub business_name: String,

    /// Page to fetch and extract from.
    pub source_url: String,

    /// Caller-supplied partial record, e.g. from a site-specific scraper
    /// that already pulled fields out of the DOM. Feeds the extractor's
    /// short-circuit path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prefill: Option<LoanRecord>,

    #[serde(default)]
    pub mode: FetchMode,
}

impl PipelineRequest {
    pub fn new(
        submission_id: impl Into<String>,
        business_name: impl Into<String>,
        source_url: impl Into<String>,
    ) -> Self {
        Self {
            submission_id: submission_id.into(),
            business_name: business_name.into(),
            source_url: source_url.into(),
            prefill: None,
            mode: FetchMode::default(),
        }
    }

    pub fn with_prefill(mut self, prefill: LoanRecord) -> Self {
        self.prefill = Some(prefill);
        self
    }

    pub fn with_mode(mut self, mode: FetchMode) -> Self {
        self.mode = mode;
        self
    }
}

/// Wire-shape outcome of one invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineResponse {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loan_record: Option<LoanRecord>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl PipelineResponse {
    pub fn ok(record: LoanRecord) -> Self {
        Self {
            success: true,
            loan_record: Some(record),
            error_message: None,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            loan_record: None,
            error_message: Some(message.into()),
        }
    }
}

impl From<Result<LoanRecord, PipelineError>> for PipelineResponse {
    fn from(result: Result<LoanRecord, PipelineError>) -> Self {
        match result {
            Ok(record) => Self::ok(record),
            Err(error) => Self::failed(error.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FetchError, PipelineError};

    #[test]
    fn test_request_deserializes_route_body() {
        let body = r#"{
            "submissionId": "sub-123",
            "businessName": "Acme LLC",
            "sourceUrl": "https://example.com/acme"
        }"#;

        let request: PipelineRequest = serde_json::from_str(body).unwrap();
        assert_eq!(request.submission_id, "sub-123");
        assert_eq!(request.mode, FetchMode::Auto);
        assert!(request.prefill.is_none());
    }

    #[test]
    fn test_response_shapes() {
        let ok = PipelineResponse::ok(LoanRecord::empty("Acme LLC", "https://example.com"));
        let value = serde_json::to_value(&ok).unwrap();
        assert_eq!(value["success"], true);
        assert!(value.get("loanRecord").is_some());
        assert!(value.get("errorMessage").is_none());

        let failed: PipelineResponse = Err(PipelineError::fetch(FetchError::HttpStatus {
            url: "https://example.com".to_string(),
            status: 404,
        }))
        .into();
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("loanRecord").is_none());
        assert!(value["errorMessage"].as_str().unwrap().contains("fetching failed"));
    }
}
