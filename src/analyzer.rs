use crate::config::ProbeConfig;
use crate::events::{EventSink, LogSink, ProbeEvent};
use crate::extract::{self, SpanStrategy};
use crate::fetch::{PageFetcher, Throttle};
use crate::results::AnalysisResult;
use std::sync::Arc;
use std::time::Duration;

/// Fetches pages one at a time and extracts embedded JSON and script endpoints
pub struct Analyzer {
    fetcher: Box<dyn PageFetcher>,
    throttle: Throttle,
    base_url: String,
    strategy: SpanStrategy,
    sink: Arc<dyn EventSink>,
}

impl Analyzer {
    /// Create an analyzer with the default delay, span strategy and log sink
    pub fn new(fetcher: impl PageFetcher + 'static, base_url: impl Into<String>) -> Self {
        Self {
            fetcher: Box::new(fetcher),
            throttle: Throttle::default(),
            base_url: base_url.into(),
            strategy: SpanStrategy::default(),
            sink: Arc::new(LogSink),
        }
    }

    /// Apply the delay and span strategy from a configuration
    pub fn with_config(self, config: &ProbeConfig) -> Self {
        self.with_delay(config.fetch.delay())
            .with_strategy(config.strategy)
    }

    /// Set the delay awaited before every fetch
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.throttle = Throttle::new(delay);
        self
    }

    pub fn with_strategy(mut self, strategy: SpanStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Route diagnostic events somewhere other than the log
    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn delay(&self) -> Duration {
        self.throttle.delay()
    }

    /// Fetches and analyzes one page.
    ///
    /// A failed fetch is reported once through the event sink and yields `None`;
    /// it is never an error for the caller.
    pub async fn analyze_page(&self, url: &str) -> Option<AnalysisResult> {
        let html = self.fetch_page(url).await?;
        Some(self.analyze_html(url, &html))
    }

    /// Analyzes each page in turn, skipping the ones that could not be fetched
    pub async fn analyze_pages(&self, urls: &[String]) -> Vec<AnalysisResult> {
        let mut results = Vec::with_capacity(urls.len());
        for url in urls {
            if let Some(result) = self.analyze_page(url).await {
                results.push(result);
            }
        }
        results
    }

    /// Waits for the throttle, then fetches the page body
    pub async fn fetch_page(&self, url: &str) -> Option<String> {
        self.sink.emit(ProbeEvent::AnalysisStarted {
            url: url.to_string(),
        });

        let fetched = {
            let _turn = self.throttle.acquire().await;
            self.fetcher.fetch(url).await
        };

        match fetched {
            Ok(html) => Some(html),
            Err(e) => {
                self.sink.emit(ProbeEvent::FetchFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                None
            }
        }
    }

    /// Runs both extractions over an already fetched body
    pub fn analyze_html(&self, url: &str, html: &str) -> AnalysisResult {
        let json_data = extract::find_json_content_with_strategy(html, self.strategy);
        let js_endpoints = extract::find_js_endpoints(html, &self.base_url);

        self.sink.emit(ProbeEvent::PageAnalyzed {
            url: url.to_string(),
            json_findings: json_data.len(),
            endpoints: js_endpoints.len(),
        });

        AnalysisResult::new(url.to_string(), json_data, js_endpoints)
    }
}
