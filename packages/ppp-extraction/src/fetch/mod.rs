//! Page acquisition: a two-tier fetch engine.
//!
//! Tier 1 is a plain HTTP GET ([`DirectFetcher`]); tier 2 is a headless
//! browser ([`RenderedFetcher`]) for JS-rendered or bot-gated sources.
//! [`WebFetcher`] fronts both behind the [`PageFetcher`] trait and, in
//! [`FetchMode::Auto`], falls back from direct to rendered when the
//! direct result fails or looks unrendered.

pub mod direct;
pub mod rendered;
pub(crate) mod text;

use async_trait::async_trait;
use tracing::{debug, warn};

pub use direct::DirectFetcher;
pub use rendered::RenderedFetcher;
pub use text::find_bot_marker;

use crate::error::FetchError;
use crate::traits::fetcher::PageFetcher;
use crate::types::config::PipelineConfig;
use crate::types::page::{FetchMode, FetchResult};

/// Production fetcher combining both tiers.
pub struct WebFetcher {
    direct: DirectFetcher,
    rendered: RenderedFetcher,
    bot_markers: Vec<String>,
}

impl WebFetcher {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            direct: DirectFetcher::new(config.fetch.clone()),
            rendered: RenderedFetcher::new(config.render.clone()),
            bot_markers: config.render.bot_markers.clone(),
        }
    }

    /// Does a direct-mode result need the rendered tier to produce real
    /// content?
    fn needs_render(&self, result: &FetchResult) -> bool {
        if find_bot_marker("", &result.text, &self.bot_markers).is_some() {
            return true;
        }
        match &result.html {
            Some(html) => text::looks_unrendered(html, &result.text),
            None => !result.has_content(),
        }
    }
}

#[async_trait]
impl PageFetcher for WebFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult, FetchError> {
        match mode {
            FetchMode::Direct => self.direct.fetch(url).await,
            FetchMode::Rendered => self.rendered.fetch(url).await,
            FetchMode::Auto => match self.direct.fetch(url).await {
                Ok(result) if !self.needs_render(&result) => Ok(result),
                Ok(_) => {
                    debug!(url = %url, "direct result looks unrendered, retrying in rendered mode");
                    self.rendered.fetch(url).await
                }
                Err(error) => {
                    warn!(url = %url, error = %error, "direct fetch failed, retrying in rendered mode");
                    self.rendered.fetch(url).await
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::config::RenderConfig;

    fn fetcher() -> WebFetcher {
        WebFetcher::new(&PipelineConfig::default())
    }

    #[test]
    fn test_rendered_content_is_accepted() {
        let result = FetchResult {
            html: Some("<html><body><p>real content</p></body></html>".to_string()),
            text: "First Draw PPP Loan of $20,000 approved 2020-04-15 from Acme Bank, \
                   with plenty of surrounding narrative so the text does not look like \
                   an empty application shell to the heuristics at all."
                .to_string(),
            final_url: "https://example.com".to_string(),
        };
        assert!(!fetcher().needs_render(&result));
    }

    #[test]
    fn test_spa_shell_triggers_fallback() {
        let result = FetchResult {
            html: Some(
                r#"<html><body><div id="root"></div><script src="app.js"></script></body></html>"#
                    .to_string(),
            ),
            text: String::new(),
            final_url: "https://example.com".to_string(),
        };
        assert!(fetcher().needs_render(&result));
    }

    #[test]
    fn test_challenge_body_triggers_fallback() {
        let markers = RenderConfig::default().bot_markers;
        let result = FetchResult {
            html: Some("<html><body>Security check in progress</body></html>".to_string()),
            text: "Security check in progress".to_string(),
            final_url: "https://example.com".to_string(),
        };
        assert!(find_bot_marker("", &result.text, &markers).is_some());
        assert!(fetcher().needs_render(&result));
    }
}
