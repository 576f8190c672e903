//! Parsing and normalization of extraction-service responses.
//!
//! The service is expected to return one JSON object, possibly wrapped
//! in a fenced code block. Anything that does not parse to an object is
//! a `MalformedResponse`, never silently coerced into an empty record,
//! so callers can tell "nothing was found" (valid nulls) apart from
//! "the service responded incoherently".

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ExtractError;
use crate::types::record::{lenient_draw, lenient_string, LoanDraw, LoanRecord};

/// The service's response body, before pipeline stamping.
///
/// Field coercion is lenient (numeric strings become numbers, bad dates
/// become null); unknown fields, including any `sourceLink` or
/// `extractedAt` the service invents, are dropped by serde.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct RawExtraction {
    #[serde(deserialize_with = "lenient_string")]
    business_name: Option<String>,
    #[serde(deserialize_with = "lenient_draw")]
    first_draw: LoanDraw,
    #[serde(deserialize_with = "lenient_draw")]
    second_draw: LoanDraw,
    #[serde(deserialize_with = "lenient_string")]
    lender: Option<String>,
    #[serde(deserialize_with = "lenient_string")]
    notes: Option<String>,
}

impl RawExtraction {
    /// Stamp the pipeline-owned fields and default the business name to
    /// the caller's expectation when the service omitted it.
    pub(crate) fn into_record(self, expected_name: &str, source_url: &str) -> LoanRecord {
        LoanRecord {
            business_name: self
                .business_name
                .unwrap_or_else(|| expected_name.to_string()),
            source_link: source_url.to_string(),
            extracted_at: Utc::now(),
            first_draw: self.first_draw,
            second_draw: self.second_draw,
            lender: self.lender,
            notes: self.notes,
        }
    }
}

/// Strip a markdown code fence (```json ... ``` or bare ``` ... ```)
/// from around the payload, tolerating prose before the fence.
pub(crate) fn strip_code_fence(response: &str) -> &str {
    let trimmed = response.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };

    let after = &trimmed[start + 3..];
    let after = after.strip_prefix("json").unwrap_or(after);
    let end = after.find("```").unwrap_or(after.len());
    after[..end].trim()
}

/// Parse a service response into its raw extraction shape.
pub(crate) fn parse_response(raw: &str) -> Result<RawExtraction, ExtractError> {
    let payload = strip_code_fence(raw);

    let value: Value = serde_json::from_str(payload).map_err(|e| {
        debug!(error = %e, "extraction response is not valid JSON");
        malformed(raw)
    })?;
    if !value.is_object() {
        return Err(malformed(raw));
    }

    serde_json::from_value(value).map_err(|_| malformed(raw))
}

fn malformed(raw: &str) -> ExtractError {
    ExtractError::MalformedResponse {
        snippet: raw.trim().chars().take(200).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_fenced_response_parses() {
        let response = "```json\n{\"businessName\":\"Acme\",\"firstDraw\":{\"amount\":12000,\"date\":\"2020-05-01\",\"forgiveness\":null},\"secondDraw\":{\"amount\":null,\"date\":null,\"forgiveness\":null},\"lender\":\"Chase\",\"notes\":null}\n```";

        let record = parse_response(response)
            .unwrap()
            .into_record("Acme", "https://example.com/acme");

        assert_eq!(record.business_name, "Acme");
        assert_eq!(record.first_draw.amount, Some(12000.0));
        assert_eq!(record.first_draw.date, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert_eq!(record.second_draw.amount, None);
        assert_eq!(record.lender, Some("Chase".to_string()));
    }

    #[test]
    fn test_bare_fence_and_no_fence_parse() {
        for response in ["```\n{\"lender\":\"Chase\"}\n```", "{\"lender\":\"Chase\"}"] {
            let raw = parse_response(response).unwrap();
            let record = raw.into_record("Acme", "https://example.com");
            assert_eq!(record.lender, Some("Chase".to_string()));
        }
    }

    #[test]
    fn test_refusal_text_is_malformed_not_empty() {
        let result = parse_response("Sorry, I cannot help with that.");
        match result {
            Err(ExtractError::MalformedResponse { snippet }) => {
                assert!(snippet.contains("Sorry"));
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_non_object_json_is_malformed() {
        assert!(matches!(
            parse_response("[1, 2, 3]"),
            Err(ExtractError::MalformedResponse { .. })
        ));
        assert!(matches!(
            parse_response("\"just a string\""),
            Err(ExtractError::MalformedResponse { .. })
        ));
    }

    #[test]
    fn test_snippet_is_truncated() {
        let long = "x".repeat(1000);
        match parse_response(&long) {
            Err(ExtractError::MalformedResponse { snippet }) => {
                assert_eq!(snippet.chars().count(), 200);
            }
            other => panic!("expected MalformedResponse, got {other:?}"),
        }
    }

    #[test]
    fn test_numeric_strings_coerce() {
        let response = r#"{
            "businessName": "Acme",
            "firstDraw": { "amount": "$20,000", "date": "May 1, 2020 (First Round)", "forgiveness": "15000" }
        }"#;

        let record = parse_response(response)
            .unwrap()
            .into_record("Acme", "https://example.com");
        assert_eq!(record.first_draw.amount, Some(20000.0));
        assert_eq!(record.first_draw.date, NaiveDate::from_ymd_opt(2020, 5, 1));
        assert_eq!(record.first_draw.forgiveness, Some(15000.0));
    }

    #[test]
    fn test_bad_fields_become_null_without_failing_the_record() {
        let response = r#"{
            "businessName": "Acme",
            "firstDraw": { "amount": 20000, "date": "sometime in spring", "forgiveness": -50 },
            "lender": 42
        }"#;

        let record = parse_response(response)
            .unwrap()
            .into_record("Acme", "https://example.com");
        assert_eq!(record.first_draw.amount, Some(20000.0));
        assert_eq!(record.first_draw.date, None);
        assert_eq!(record.first_draw.forgiveness, None);
        assert_eq!(record.lender, None);
    }

    #[test]
    fn test_pipeline_owned_fields_are_discarded() {
        let response = r#"{
            "businessName": "Acme",
            "sourceLink": "https://attacker.example",
            "extractedAt": "1999-01-01T00:00:00Z"
        }"#;

        let record = parse_response(response)
            .unwrap()
            .into_record("Acme", "https://example.com/real");
        assert_eq!(record.source_link, "https://example.com/real");
        assert!(record.extracted_at.timestamp() > 0);
    }

    #[test]
    fn test_missing_business_name_defaults_to_expected() {
        let record = parse_response("{}")
            .unwrap()
            .into_record("Acme LLC", "https://example.com");
        assert_eq!(record.business_name, "Acme LLC");
        assert!(!record.has_loan_data());
    }
}
