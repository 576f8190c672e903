//! Rendered-mode fetching through a headless browser.
//!
//! Each fetch launches its own browser process: contexts are never
//! shared across invocations, so one page's cookies or challenge state
//! cannot leak into another's session. The process is released on every
//! exit path: graceful close on the normal path, a detached cleanup
//! task from `Drop` for errors and cancellation.

use std::future::Future;

use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::error::CdpError;
use chromiumoxide::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::FetchError;
use crate::fetch::text::{find_bot_marker, visible_text};
use crate::types::config::RenderConfig;
use crate::types::page::FetchResult;

/// Headless-browser fetcher for JS-rendered or bot-gated sources.
pub struct RenderedFetcher {
    config: RenderConfig,
}

/// A snapshot of the rendered page.
#[derive(Debug, Clone)]
pub(crate) struct PageView {
    pub(crate) title: String,
    pub(crate) html: String,
    pub(crate) text: String,
    pub(crate) final_url: String,
}

impl RenderedFetcher {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub async fn fetch(&self, url: &str) -> Result<FetchResult, FetchError> {
        let session = BrowserSession::launch(&self.config, url).await?;
        let result = self.fetch_in_session(&session, url).await;
        session.shutdown().await;
        result
    }

    async fn fetch_in_session(
        &self,
        session: &BrowserSession,
        url: &str,
    ) -> Result<FetchResult, FetchError> {
        let page = session.navigate(url, &self.config).await?;
        tokio::time::sleep(self.config.settle).await;

        let first = read_page(&page, url).await?;
        let view = resolve_challenge(url, first, &self.config, || read_page(&page, url)).await?;

        debug!(
            url = %url,
            final_url = %view.final_url,
            text_len = view.text.len(),
            "rendered fetch complete"
        );

        Ok(FetchResult {
            html: Some(view.html),
            text: view.text,
            final_url: view.final_url,
        })
    }
}

/// Apply the bot-check heuristic to a freshly loaded page.
///
/// If a challenge marker shows in the title or body, wait out the grace
/// period once and re-read; a persisting marker means the real page was
/// never reached, which is a fetch failure, not content to return.
pub(crate) async fn resolve_challenge<F, Fut>(
    url: &str,
    first: PageView,
    config: &RenderConfig,
    reread: F,
) -> Result<PageView, FetchError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<PageView, FetchError>>,
{
    let Some(marker) = find_bot_marker(&first.title, &first.text, &config.bot_markers) else {
        return Ok(first);
    };

    debug!(
        url = %url,
        marker = %marker,
        grace = ?config.bot_grace,
        "challenge marker found, waiting out grace period"
    );
    tokio::time::sleep(config.bot_grace).await;

    let second = reread().await?;
    match find_bot_marker(&second.title, &second.text, &config.bot_markers) {
        None => Ok(second),
        Some(marker) => {
            warn!(url = %url, marker = %marker, "challenge page persisted");
            Err(FetchError::BotBlocked {
                url: url.to_string(),
                marker,
            })
        }
    }
}

async fn read_page(page: &Page, url: &str) -> Result<PageView, FetchError> {
    let html = page.content().await.map_err(|e| render_error(url, e))?;
    let title = page
        .get_title()
        .await
        .map_err(|e| render_error(url, e))?
        .unwrap_or_default();
    let final_url = page
        .url()
        .await
        .map_err(|e| render_error(url, e))?
        .unwrap_or_else(|| url.to_string());
    let text = visible_text(&html);

    Ok(PageView {
        title,
        html,
        text,
        final_url,
    })
}

fn render_error(url: &str, error: CdpError) -> FetchError {
    FetchError::Network {
        url: url.to_string(),
        source: Box::new(error),
    }
}

/// A launched browser plus the task driving its CDP event loop.
struct BrowserSession {
    browser: Option<Browser>,
    handler_task: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(config: &RenderConfig, url: &str) -> Result<Self, FetchError> {
        let (width, height) = config.viewport;
        let browser_config = BrowserConfig::builder()
            .window_size(width, height)
            .arg(format!("--user-agent={}", config.user_agent))
            .build()
            .map_err(|message| FetchError::Network {
                url: url.to_string(),
                source: message.into(),
            })?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(|e| render_error(url, e))?;

        // The handler must be polled for the whole session or every CDP
        // call deadlocks.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser: Some(browser),
            handler_task,
        })
    }

    /// Open an isolated page and navigate, bounded by the configured
    /// navigation timeout.
    async fn navigate(&self, url: &str, config: &RenderConfig) -> Result<Page, FetchError> {
        let browser = self
            .browser
            .as_ref()
            .ok_or_else(|| FetchError::Network {
                url: url.to_string(),
                source: "browser session already shut down".into(),
            })?;

        let navigation = async {
            let page = browser.new_page("about:blank").await?;
            page.goto(url).await?;
            page.wait_for_navigation().await?;
            Ok::<Page, CdpError>(page)
        };

        match tokio::time::timeout(config.nav_timeout, navigation).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(e)) => Err(render_error(url, e)),
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                elapsed: config.nav_timeout,
            }),
        }
    }

    /// Graceful release on the normal path. Runs outside any cancellable
    /// scope; after this the `Drop` backstop has nothing left to do.
    async fn shutdown(mut self) {
        if let Some(mut browser) = self.browser.take() {
            if let Err(e) = browser.close().await {
                warn!(error = %e, "browser close failed");
            }
            let _ = browser.wait().await;
        }
        self.handler_task.abort();
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        // Error or cancellation path: the caller's future was dropped
        // before `shutdown`. Release the process from a detached task so
        // the release itself cannot be cancelled; the handler task exits
        // on its own once the connection closes. Outside a runtime the
        // browser's own drop kills the child process.
        if let Some(mut browser) = self.browser.take() {
            if let Ok(handle) = tokio::runtime::Handle::try_current() {
                handle.spawn(async move {
                    let _ = browser.close().await;
                    let _ = browser.wait().await;
                });
            }
        }
    }
}
