//! Fetches pages and reports the JSON data and endpoint URLs embedded in them.
//!
//! The extraction core in [`extract`] is pure: give it HTML and a base URL and
//! it returns JSON findings and script-referenced endpoints. [`Analyzer`] adds
//! a throttled fetch in front of it, and [`resources`] can download the
//! scripts and stylesheets a page references.

pub mod analyzer;
pub mod config;
pub mod error;
pub mod events;
pub mod extract;
pub mod fetch;
pub mod resources;
pub mod results;
pub mod utils;

// Re-export commonly used types for convenience
pub use analyzer::Analyzer;
pub use config::{FetchConfig, LoginConfig, ProbeConfig};
pub use error::{ConfigError, FetchError, LoginError, ResourceError};
pub use events::{EventSink, LogSink, ProbeEvent, RecordingSink};
pub use extract::{SpanStrategy, find_js_endpoints, find_json_content};
pub use fetch::{BrowserFetcher, HttpFetcher, PageFetcher};
pub use results::{AnalysisResult, JsonFinding, RunReport};
