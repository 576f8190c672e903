//! Mock implementations for exercising the pipeline without network or
//! service access.
//!
//! [`ScriptedCompletion`] stands in for the non-deterministic extraction
//! service with fixed payloads, and [`StaticFetcher`] serves canned page
//! content, so parsing, normalization, and orchestration logic can be
//! validated independently of real model or network behavior.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{CompletionError, FetchError};
use crate::fetch::text::visible_text;
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::{Completion, CompletionOptions};
use crate::types::page::{FetchMode, FetchResult};

/// Build a [`FetchResult`] the way a real fetch would, from raw markup.
pub fn page_from_html(url: impl Into<String>, html: impl Into<String>) -> FetchResult {
    let html = html.into();
    FetchResult {
        text: visible_text(&html),
        html: Some(html),
        final_url: url.into(),
    }
}

/// One prompt sent to a [`ScriptedCompletion`], recorded for assertions.
#[derive(Debug, Clone)]
pub struct RecordedPrompt {
    pub system: String,
    pub user: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A completion service that replays scripted responses in order.
///
/// With no script left it answers `{}`, a valid nothing-found response.
#[derive(Default)]
pub struct ScriptedCompletion {
    responses: Mutex<VecDeque<Result<String, CompletionError>>>,
    calls: Mutex<Vec<RecordedPrompt>>,
}

impl ScriptedCompletion {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a response body.
    pub fn with_response(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue a failure.
    pub fn with_error(self, error: CompletionError) -> Self {
        self.responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// All prompts sent so far.
    pub fn calls(&self) -> Vec<RecordedPrompt> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl Completion for ScriptedCompletion {
    async fn complete(
        &self,
        system: &str,
        user: &str,
        options: &CompletionOptions,
    ) -> Result<String, CompletionError> {
        self.calls.lock().unwrap().push(RecordedPrompt {
            system: system.to_string(),
            user: user.to_string(),
            temperature: options.temperature,
            max_tokens: options.max_tokens,
        });

        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok("{}".to_string()))
    }
}

/// One recorded fetch call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedFetch {
    pub url: String,
    pub mode: FetchMode,
}

/// A fetcher that serves scripted results per URL.
#[derive(Default)]
pub struct StaticFetcher {
    pages: Mutex<HashMap<String, VecDeque<Result<FetchResult, FetchError>>>>,
    calls: Mutex<Vec<RecordedFetch>>,
}

impl StaticFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve the given markup for a URL.
    pub fn with_page(self, url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let page = page_from_html(url.clone(), html);
        self.pages
            .lock()
            .unwrap()
            .entry(url)
            .or_default()
            .push_back(Ok(page));
        self
    }

    /// Serve a prebuilt result for a URL.
    pub fn with_result(self, url: impl Into<String>, result: FetchResult) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(Ok(result));
        self
    }

    /// Fail a URL with the given error.
    pub fn with_failure(self, url: impl Into<String>, error: FetchError) -> Self {
        self.pages
            .lock()
            .unwrap()
            .entry(url.into())
            .or_default()
            .push_back(Err(error));
        self
    }

    /// All fetches made so far.
    pub fn calls(&self) -> Vec<RecordedFetch> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for StaticFetcher {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult, FetchError> {
        self.calls.lock().unwrap().push(RecordedFetch {
            url: url.to_string(),
            mode,
        });

        self.pages
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(|queue| queue.pop_front())
            .unwrap_or_else(|| {
                Err(FetchError::Network {
                    url: url.to_string(),
                    source: "no scripted page for this URL".into(),
                })
            })
    }
}
