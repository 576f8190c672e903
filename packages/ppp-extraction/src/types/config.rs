//! Configuration for the pipeline and its components.
//!
//! Every timing and sizing constant inherited from the source behavior
//! (navigation timeout, bot-check grace period, reduction budget,
//! combined wall-clock budget) is a tunable field here rather than a
//! hard-coded constant; the defaults are starting points, not proven
//! optima.

use std::time::Duration;

/// Desktop Chrome user-agent presented by both fetch modes.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36";

/// Configuration for direct (plain HTTP) fetches.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User-agent header sent with each request.
    pub user_agent: String,

    /// Whole-request timeout.
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl FetchConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Configuration for rendered (headless browser) fetches.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// User-agent override for the browser context.
    pub user_agent: String,

    /// Viewport dimensions (width, height).
    pub viewport: (u32, u32),

    /// Bound on navigation plus initial load. Default 60s.
    pub nav_timeout: Duration,

    /// Pause after navigation before reading the DOM, giving late
    /// scripts a chance to finish.
    pub settle: Duration,

    /// Grace period granted once when a challenge marker is found,
    /// before the page is re-checked. Default 8s.
    pub bot_grace: Duration,

    /// Case-insensitive challenge-page phrases checked against the page
    /// title and body text.
    pub bot_markers: Vec<String>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            viewport: (1366, 768),
            nav_timeout: Duration::from_secs(60),
            settle: Duration::from_secs(2),
            bot_grace: Duration::from_secs(8),
            bot_markers: vec![
                "security check".to_string(),
                "checking your browser".to_string(),
                "cloudflare".to_string(),
                "challenge".to_string(),
            ],
        }
    }
}

impl RenderConfig {
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width, height);
        self
    }

    pub fn with_nav_timeout(mut self, timeout: Duration) -> Self {
        self.nav_timeout = timeout;
        self
    }

    pub fn with_bot_grace(mut self, grace: Duration) -> Self {
        self.bot_grace = grace;
        self
    }

    pub fn with_bot_markers(mut self, markers: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.bot_markers = markers.into_iter().map(|m| m.into()).collect();
        self
    }
}

/// Configuration for content reduction.
#[derive(Debug, Clone)]
pub struct ReducerConfig {
    /// Maximum characters handed to the extraction service, measured
    /// after whitespace collapsing. The cut lands exactly at the budget,
    /// mid-word if that is where it falls; the budget bounds request
    /// cost, not readability.
    pub max_chars: usize,
}

impl Default for ReducerConfig {
    fn default() -> Self {
        Self { max_chars: 9000 }
    }
}

impl ReducerConfig {
    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = max_chars;
        self
    }
}

/// Configuration for the extraction-service call.
#[derive(Debug, Clone)]
pub struct ExtractorConfig {
    /// Decoding temperature. Near zero: extraction is a structured-data
    /// task and reruns should reproduce for audit trails.
    pub temperature: f32,

    /// Response token cap.
    pub max_tokens: u32,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            temperature: 0.1,
            max_tokens: 800,
        }
    }
}

impl ExtractorConfig {
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// Top-level pipeline configuration.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub fetch: FetchConfig,
    pub render: RenderConfig,
    pub reducer: ReducerConfig,
    pub extractor: ExtractorConfig,

    /// Combined wall-clock budget across fetching and extracting,
    /// distinct from each component's own timeout: a slow-but-legal
    /// fetch eats into what extraction gets. Default 90s.
    pub combined_budget: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            render: RenderConfig::default(),
            reducer: ReducerConfig::default(),
            extractor: ExtractorConfig::default(),
            combined_budget: Duration::from_secs(90),
        }
    }
}

impl PipelineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_combined_budget(mut self, budget: Duration) -> Self {
        self.combined_budget = budget;
        self
    }

    pub fn with_reducer(mut self, reducer: ReducerConfig) -> Self {
        self.reducer = reducer;
        self
    }

    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_source_behavior() {
        let config = PipelineConfig::default();
        assert_eq!(config.reducer.max_chars, 9000);
        assert_eq!(config.render.nav_timeout, Duration::from_secs(60));
        assert_eq!(config.render.bot_grace, Duration::from_secs(8));
        assert_eq!(config.render.viewport, (1366, 768));
        assert_eq!(config.combined_budget, Duration::from_secs(90));
        assert!((config.extractor.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn test_builders() {
        let render = RenderConfig::default()
            .with_bot_grace(Duration::from_secs(1))
            .with_bot_markers(["verify you are human"]);
        assert_eq!(render.bot_grace, Duration::from_secs(1));
        assert_eq!(render.bot_markers, vec!["verify you are human".to_string()]);
    }
}
