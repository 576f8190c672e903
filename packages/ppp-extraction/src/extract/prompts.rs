//! The prompt contract for the loan-data extraction service.
//!
//! The system instruction pins the exact output schema and the
//! no-fabrication policy; the user payload carries the expected business
//! name, provenance URL, and reduced page text.

/// System instruction. `{business_name}` is substituted at call time.
pub const EXTRACT_SYSTEM_PROMPT: &str = r#"You are an AI assistant specialized in extracting structured PPP loan data from raw HTML or text content.

Extract the following information in a consistent format:
1. Business Name
2. First Draw PPP Loan Amount
3. First Draw PPP Loan Date
4. First Draw PPP Loan Forgiveness Amount
5. Second Draw PPP Loan Amount (if applicable)
6. Second Draw PPP Loan Date (if applicable)
7. Second Draw PPP Loan Forgiveness Amount (if applicable)
8. Lending Institution/Bank

The expected business name is: "{business_name}"

Return only a valid JSON object with the following structure:
{
  "businessName": "string",
  "firstDraw": {
    "amount": number,
    "date": "YYYY-MM-DD",
    "forgiveness": number
  },
  "secondDraw": {
    "amount": number,
    "date": "YYYY-MM-DD",
    "forgiveness": number
  },
  "lender": "string",
  "notes": "string"
}

Use null for values that are not found. If you're uncertain about any value, use null. Do not fabricate values. Include any important context or caveats in the notes field.
DO NOT include any explanatory text, just return the valid JSON object."#;

/// User payload template. `{source_url}` and `{content}` are substituted
/// at call time.
pub const EXTRACT_USER_PROMPT: &str = r#"I need to extract PPP loan data from this content. The page is from {source_url}.

Here's the relevant content:
{content}"#;

pub fn format_system_prompt(business_name: &str) -> String {
    EXTRACT_SYSTEM_PROMPT.replace("{business_name}", business_name)
}

pub fn format_user_prompt(source_url: &str, content: &str) -> String {
    EXTRACT_USER_PROMPT
        .replace("{source_url}", source_url)
        .replace("{content}", content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders_are_substituted() {
        let system = format_system_prompt("Acme LLC");
        assert!(system.contains("The expected business name is: \"Acme LLC\""));
        assert!(!system.contains("{business_name}"));

        let user = format_user_prompt("https://example.com/acme", "First Draw $20,000");
        assert!(user.contains("https://example.com/acme"));
        assert!(user.ends_with("First Draw $20,000"));
    }

    #[test]
    fn test_schema_template_survives_substitution() {
        // The JSON template's braces must not be touched by replacement.
        let system = format_system_prompt("Acme LLC");
        assert!(system.contains("\"firstDraw\""));
        assert!(system.contains("Use null for values that are not found"));
    }
}
