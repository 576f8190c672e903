//! Transient page content types shared between the fetchers and the
//! content reducer. Not persisted.

use serde::{Deserialize, Serialize};

/// How page content is acquired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMode {
    /// Single HTTP GET. Fast; fails on JS-rendered or bot-gated pages.
    Direct,

    /// Full browser rendering. Slow; handles JS and can wait out simple
    /// bot checks.
    Rendered,

    /// Try direct first, fall back to rendered when the direct result
    /// fails or looks unrendered.
    #[default]
    Auto,
}

/// Raw page content handed from a fetcher to the reducer.
#[derive(Debug, Clone)]
pub struct FetchResult {
    /// Full markup, present whenever the fetch had DOM access.
    pub html: Option<String>,

    /// Visible text with whitespace collapsed.
    pub text: String,

    /// The fetched URL after redirects.
    pub final_url: String,
}

impl FetchResult {
    /// Build a text-only result with no markup attached.
    pub fn text_only(final_url: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            html: None,
            text: text.into(),
            final_url: final_url.into(),
        }
    }

    pub fn has_content(&self) -> bool {
        !self.text.trim().is_empty()
    }
}
