//! Page fetcher trait.

use async_trait::async_trait;

use crate::error::FetchResult;

/// Retrieves the raw HTML of a competitor page.
///
/// Implementations follow redirects and treat any non-success status as
/// an error. A fetch failure aborts the check; nothing is persisted.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the page body at `url`.
    async fn fetch(&self, url: &str) -> FetchResult<String>;

    /// Short name for logs.
    fn name(&self) -> &str {
        "fetcher"
    }
}

#[async_trait]
impl<F: Fetcher + ?Sized> Fetcher for Box<F> {
    async fn fetch(&self, url: &str) -> FetchResult<String> {
        (**self).fetch(url).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
