//! The canonical loan record shape.
//!
//! One shared type consumed by the extractor, the reconciler, and the
//! store collaborators, so the record shape is defined exactly once.
//! Serialized camelCase to match the persisted per-submission document.
//!
//! Deserialization is deliberately lenient: a malformed amount or date in
//! a persisted record (or in a service response) reads as absent instead
//! of failing the whole record.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One disbursement event of a PPP loan.
///
/// A draw counts as "present" when it has an amount; date and forgiveness
/// may exist without one and still merge field-by-field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoanDraw {
    #[serde(deserialize_with = "lenient_amount")]
    pub amount: Option<f64>,
    #[serde(deserialize_with = "lenient_date")]
    pub date: Option<NaiveDate>,
    #[serde(deserialize_with = "lenient_amount")]
    pub forgiveness: Option<f64>,
}

impl LoanDraw {
    pub fn is_present(&self) -> bool {
        self.amount.is_some()
    }
}

/// The canonical extraction output for one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRecord {
    #[serde(default)]
    pub business_name: String,

    /// Provenance URL. Pipeline-owned: a value in a raw service response
    /// is discarded and overwritten.
    #[serde(default)]
    pub source_link: String,

    /// Completion timestamp. Pipeline-owned, same rule as `source_link`.
    #[serde(default = "unix_epoch", deserialize_with = "lenient_timestamp")]
    pub extracted_at: DateTime<Utc>,

    #[serde(default, deserialize_with = "lenient_draw")]
    pub first_draw: LoanDraw,

    #[serde(default, deserialize_with = "lenient_draw")]
    pub second_draw: LoanDraw,

    #[serde(default, deserialize_with = "lenient_string")]
    pub lender: Option<String>,

    /// Free-text caveats from the extraction service.
    #[serde(default, deserialize_with = "lenient_string")]
    pub notes: Option<String>,
}

impl LoanRecord {
    /// Create a record with no loan data, stamped with the pipeline-owned
    /// provenance fields.
    pub fn empty(business_name: impl Into<String>, source_link: impl Into<String>) -> Self {
        Self {
            business_name: business_name.into(),
            source_link: source_link.into(),
            extracted_at: Utc::now(),
            first_draw: LoanDraw::default(),
            second_draw: LoanDraw::default(),
            lender: None,
            notes: None,
        }
    }

    /// True when at least one draw is present.
    ///
    /// A record where this is false is valid but "empty": reconciliation
    /// against prior state keeps every previously known field.
    pub fn has_loan_data(&self) -> bool {
        self.first_draw.is_present() || self.second_draw.is_present()
    }

    /// True when the record already looks like a completed extraction:
    /// a business name plus at least one draw amount.
    pub fn is_structured(&self) -> bool {
        !self.business_name.trim().is_empty() && self.has_loan_data()
    }
}

fn unix_epoch() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// Coerce a JSON value into a finite, non-negative amount.
///
/// Numbers pass through; numeric-looking strings (with optional `$` and
/// thousands separators) are parsed; everything else is `None`.
pub(crate) fn coerce_amount(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned = s.trim().trim_start_matches('$').replace(',', "");
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    };
    number.filter(|n| n.is_finite() && *n >= 0.0)
}

/// Parse a loan date out of the formats the disclosure sources use.
///
/// A trailing parenthetical such as "May 1, 2020 (First Round)" is
/// stripped before parsing. Unparseable input is `None`, never an error.
pub(crate) fn parse_loan_date(raw: &str) -> Option<NaiveDate> {
    let mut text = raw.trim();
    if let Some(open) = text.find('(') {
        text = text[..open].trim();
    }
    if text.is_empty() {
        return None;
    }

    const FORMATS: [&str; 4] = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"];
    for format in FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }

    // ISO timestamps: keep the date part.
    if text.len() > 10 {
        if let Ok(date) = NaiveDate::parse_from_str(&text[..10], "%Y-%m-%d") {
            return Some(date);
        }
    }

    None
}

pub(crate) fn coerce_date(value: &Value) -> Option<NaiveDate> {
    match value {
        Value::String(s) => parse_loan_date(s),
        _ => None,
    }
}

pub(crate) fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_amount))
}

pub(crate) fn lenient_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(coerce_date))
}

pub(crate) fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        _ => None,
    }))
}

pub(crate) fn lenient_draw<'de, D>(deserializer: D) -> Result<LoanDraw, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .map(|v| serde_json::from_value(v).unwrap_or_default())
        .unwrap_or_default())
}

pub(crate) fn lenient_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .and_then(|v| match v {
            Value::String(s) => DateTime::parse_from_rfc3339(&s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc)),
            _ => None,
        })
        .unwrap_or_else(unix_epoch))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_amount_coercion() {
        assert_eq!(coerce_amount(&json!(5000.0)), Some(5000.0));
        assert_eq!(coerce_amount(&json!("$20,000")), Some(20000.0));
        assert_eq!(coerce_amount(&json!("12345.67")), Some(12345.67));
        assert_eq!(coerce_amount(&json!(-1.0)), None);
        assert_eq!(coerce_amount(&json!("not a number")), None);
        assert_eq!(coerce_amount(&json!(null)), None);
        assert_eq!(coerce_amount(&json!({"amount": 5})), None);
    }

    #[test]
    fn test_date_parsing_formats() {
        let expected = NaiveDate::from_ymd_opt(2020, 5, 1).unwrap();
        assert_eq!(parse_loan_date("2020-05-01"), Some(expected));
        assert_eq!(parse_loan_date("05/01/2020"), Some(expected));
        assert_eq!(parse_loan_date("May 1, 2020"), Some(expected));
        assert_eq!(parse_loan_date("May 1, 2020 (First Round)"), Some(expected));
        assert_eq!(parse_loan_date("2020-05-01T12:30:00Z"), Some(expected));
        assert_eq!(parse_loan_date("sometime in 2020"), None);
        assert_eq!(parse_loan_date(""), None);
    }

    #[test]
    fn test_record_round_trips_camel_case() {
        let record = LoanRecord {
            business_name: "Acme LLC".to_string(),
            source_link: "https://example.com/acme".to_string(),
            extracted_at: Utc::now(),
            first_draw: LoanDraw {
                amount: Some(20000.0),
                date: NaiveDate::from_ymd_opt(2020, 4, 15),
                forgiveness: None,
            },
            second_draw: LoanDraw::default(),
            lender: Some("Acme Bank".to_string()),
            notes: None,
        };

        let value = serde_json::to_value(&record).unwrap();
        assert!(value.get("businessName").is_some());
        assert!(value.get("firstDraw").is_some());
        assert_eq!(value["firstDraw"]["amount"], json!(20000.0));
        assert_eq!(value["firstDraw"]["date"], json!("2020-04-15"));

        let back: LoanRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_malformed_persisted_fields_read_as_absent() {
        // A prior record written by an older or buggy collaborator: the
        // whole record must still load, bad fields dropping to null.
        let stored = json!({
            "businessName": "Acme LLC",
            "sourceLink": "https://example.com/acme",
            "extractedAt": "not a timestamp",
            "firstDraw": { "amount": "garbage", "date": 12345, "forgiveness": "$1,000" },
            "secondDraw": "not an object",
            "lender": 42,
            "notes": "   "
        });

        let record: LoanRecord = serde_json::from_value(stored).unwrap();
        assert_eq!(record.business_name, "Acme LLC");
        assert_eq!(record.extracted_at, DateTime::<Utc>::UNIX_EPOCH);
        assert_eq!(record.first_draw.amount, None);
        assert_eq!(record.first_draw.date, None);
        assert_eq!(record.first_draw.forgiveness, Some(1000.0));
        assert_eq!(record.second_draw, LoanDraw::default());
        assert_eq!(record.lender, None);
        assert_eq!(record.notes, None);
    }

    #[test]
    fn test_presence_rules() {
        let mut record = LoanRecord::empty("Acme LLC", "https://example.com");
        assert!(!record.has_loan_data());
        assert!(!record.is_structured());

        record.first_draw.date = NaiveDate::from_ymd_opt(2020, 4, 15);
        assert!(!record.has_loan_data(), "a draw without an amount is not present");

        record.first_draw.amount = Some(20000.0);
        assert!(record.has_loan_data());
        assert!(record.is_structured());
    }
}
