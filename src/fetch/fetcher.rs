use crate::error::FetchError;
use async_trait::async_trait;

/// Retrieves the text body of a page
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch `url` and return its body; non-success responses are errors
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: PageFetcher + ?Sized> PageFetcher for Box<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}
