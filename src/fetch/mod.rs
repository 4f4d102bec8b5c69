pub mod browser;
pub mod fetcher;
pub mod http;
pub mod throttle;

pub use browser::BrowserFetcher;
pub use fetcher::PageFetcher;
pub use http::HttpFetcher;
pub use throttle::Throttle;
