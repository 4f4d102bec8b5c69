use crate::error::ConfigError;
use crate::extract::SpanStrategy;
use crate::utils::origin_of;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Configuration for page fetching
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchConfig {
    /// Delay awaited before every fetch, in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// `User-Agent` sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// `Accept` sent with every request
    #[serde(default = "default_accept")]
    pub accept: String,
}

/// Configuration for submitting a login form through WebDriver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginConfig {
    /// Page holding the login form
    pub login_url: String,

    pub username: String,

    #[serde(default, skip_serializing)]
    pub password: String,

    /// CSS selector of the username input
    #[serde(default = "default_username_selector")]
    pub username_selector: String,

    /// CSS selector of the password input
    #[serde(default = "default_password_selector")]
    pub password_selector: String,

    /// CSS selector of the submit control
    #[serde(default = "default_submit_selector")]
    pub submit_selector: String,

    /// How long to wait for the browser to leave the login page
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,
}

/// Top-level probe configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// Base URL for resolving relative endpoints (defaults to the first page's origin)
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub fetch: FetchConfig,

    /// How candidate JSON spans are located
    #[serde(default)]
    pub strategy: SpanStrategy,

    /// Log in through WebDriver before fetching
    #[serde(default)]
    pub login: Option<LoginConfig>,

    /// Fetch pages through WebDriver instead of plain HTTP
    #[serde(default)]
    pub use_browser: bool,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Directory for `data.json` and downloaded resources
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Extra resource URLs to download
    #[serde(default)]
    pub resources: Vec<String>,
}

/// Default value for delay_ms
fn default_delay_ms() -> u64 {
    1000
}

fn default_user_agent() -> String {
    "SecurityResearchParser/1.0".to_string()
}

fn default_accept() -> String {
    "application/json,*/*".to_string()
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_username_selector() -> String {
    "input[type='text'], input[name='username']".to_string()
}

fn default_password_selector() -> String {
    "input[type='password'], input[name='password']".to_string()
}

fn default_submit_selector() -> String {
    "button[type='submit'], input[type='submit']".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    15_000
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            delay_ms: default_delay_ms(),
            user_agent: default_user_agent(),
            accept: default_accept(),
        }
    }
}

impl FetchConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl LoginConfig {
    /// Create a login configuration with the default form selectors
    pub fn new(login_url: &str, username: &str, password: &str) -> Self {
        Self {
            login_url: login_url.to_string(),
            username: username.to_string(),
            password: password.to_string(),
            username_selector: default_username_selector(),
            password_selector: default_password_selector(),
            submit_selector: default_submit_selector(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
        }
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            fetch: FetchConfig::default(),
            strategy: SpanStrategy::default(),
            login: None,
            use_browser: false,
            webdriver_url: default_webdriver_url(),
            output_dir: None,
            resources: Vec::new(),
        }
    }
}

impl ProbeConfig {
    /// Create a configuration with default values and the given base URL
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: Some(base_url.to_string()),
            ..Self::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// The configured base URL, or the origin of `first_page` when none is set
    pub fn resolve_base_url(&self, first_page: &str) -> Result<Url, ConfigError> {
        let candidate = match &self.base_url {
            Some(base) => base.clone(),
            None => origin_of(first_page).unwrap_or_else(|| first_page.to_string()),
        };

        Url::parse(&candidate).map_err(|source| ConfigError::InvalidBaseUrl {
            url: candidate,
            source,
        })
    }

    /// Whether a WebDriver session is needed for this run
    pub fn needs_browser(&self) -> bool {
        self.use_browser || self.login.is_some()
    }
}
