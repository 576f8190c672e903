//! Fetcher trait for pluggable page acquisition.

use async_trait::async_trait;

use crate::error::FetchError;
use crate::types::page::{FetchMode, FetchResult};

/// Acquires raw page content from a URL.
///
/// Production uses [`WebFetcher`](crate::fetch::WebFetcher); tests use
/// [`StaticFetcher`](crate::testing::StaticFetcher). Mode selection is
/// the caller's decision: an implementation may treat
/// [`FetchMode::Auto`] as a fallback policy but must honor an explicit
/// direct or rendered request.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for std::sync::Arc<T> {
    async fn fetch(&self, url: &str, mode: FetchMode) -> Result<FetchResult, FetchError> {
        (**self).fetch(url, mode).await
    }
}
