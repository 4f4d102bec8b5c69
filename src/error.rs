use std::path::PathBuf;

/// A page could not be retrieved
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("invalid URL {url}: {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("WebDriver failed while {context} {url}: {message}")]
    WebDriver {
        context: &'static str,
        url: String,
        message: String,
    },
}

/// The WebDriver session could not be opened or the login form could not be submitted
#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("failed to connect to any WebDriver server (tried {tried})")]
    Connect { tried: String },

    #[error("WebDriver command failed while {context}: {source}")]
    Command {
        context: &'static str,
        #[source]
        source: fantoccini::error::CmdError,
    },

    #[error("login did not leave {login_url} within {waited_ms} ms")]
    Timeout { login_url: String, waited_ms: u64 },
}

/// A resource could not be downloaded or saved
#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("download of {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration could not be loaded or turned into a client
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("invalid {name} header value {value:?}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error("login requires {0}")]
    MissingCredential(&'static str),
}
