use crate::config::LoginConfig;
use crate::error::{FetchError, LoginError};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder, Locator};
use std::time::Duration;
use tokio::time::Instant;

/// WebDriver endpoints tried when the configured one refuses the session
pub const FALLBACK_WEBDRIVER_URLS: [&str; 4] = [
    "http://localhost:9515", // ChromeDriver default
    "http://localhost:4723", // Appium default
    "http://localhost:9222", // Chrome debug port default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

const LOGIN_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Fetches pages through a WebDriver session and can log in through a form
#[derive(Clone)]
pub struct BrowserFetcher {
    client: Client,
}

impl BrowserFetcher {
    /// Connects to the WebDriver instance, falling back to common local endpoints
    pub async fn connect(webdriver_url: &str) -> Result<Self, LoginError> {
        match ClientBuilder::native().connect(webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", webdriver_url);
                return Ok(Self { client });
            }
            Err(e) => {
                ::log::error!("Failed to connect to WebDriver at {}: {}", webdriver_url, e);
            }
        }

        let mut tried = vec![webdriver_url.to_string()];
        for url in FALLBACK_WEBDRIVER_URLS.iter() {
            if *url == webdriver_url {
                continue;
            }

            ::log::info!("Trying fallback WebDriver URL: {}", url);
            tried.push(url.to_string());
            if let Ok(client) = ClientBuilder::native().connect(url).await {
                ::log::debug!("Connected to fallback WebDriver at {}", url);
                return Ok(Self { client });
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(LoginError::Connect {
            tried: tried.join(", "),
        })
    }

    /// Submits the login form and returns the session cookies as a `Cookie` header value
    pub async fn login(&self, login: &LoginConfig) -> Result<String, LoginError> {
        ::log::info!("Logging in at {}", login.login_url);

        self.client
            .goto(&login.login_url)
            .await
            .map_err(|source| command("opening the login page", source))?;

        let username = self
            .client
            .find(Locator::Css(&login.username_selector))
            .await
            .map_err(|source| command("finding the username field", source))?;
        username
            .send_keys(&login.username)
            .await
            .map_err(|source| command("typing the username", source))?;

        let password = self
            .client
            .find(Locator::Css(&login.password_selector))
            .await
            .map_err(|source| command("finding the password field", source))?;
        password
            .send_keys(&login.password)
            .await
            .map_err(|source| command("typing the password", source))?;

        let submit = self
            .client
            .find(Locator::Css(&login.submit_selector))
            .await
            .map_err(|source| command("finding the submit control", source))?;
        submit
            .click()
            .await
            .map_err(|source| command("submitting the login form", source))?;

        self.wait_for_navigation(login).await?;
        self.session_cookies().await
    }

    /// The session's cookies as `name=value; name=value`
    pub async fn session_cookies(&self) -> Result<String, LoginError> {
        let cookies = self
            .client
            .get_all_cookies()
            .await
            .map_err(|source| command("reading cookies", source))?;

        Ok(cookies
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect::<Vec<_>>()
            .join("; "))
    }

    /// Ends the WebDriver session
    pub async fn close(self) -> Result<(), LoginError> {
        self.client
            .close()
            .await
            .map_err(|source| command("closing the session", source))
    }

    // Polls until the browser leaves the login page
    async fn wait_for_navigation(&self, login: &LoginConfig) -> Result<(), LoginError> {
        let start = Instant::now();
        let timeout = login.navigation_timeout();

        loop {
            let current = self
                .client
                .current_url()
                .await
                .map_err(|source| command("reading the current URL", source))?;
            if current.as_str().trim_end_matches('/') != login.login_url.trim_end_matches('/') {
                ::log::debug!("Login navigated to {}", current);
                return Ok(());
            }

            if start.elapsed() >= timeout {
                return Err(LoginError::Timeout {
                    login_url: login.login_url.clone(),
                    waited_ms: login.navigation_timeout_ms,
                });
            }
            tokio::time::sleep(LOGIN_POLL_INTERVAL).await;
        }
    }
}

fn command(context: &'static str, source: fantoccini::error::CmdError) -> LoginError {
    LoginError::Command { context, source }
}

/// Maps WebDriver errors during navigation or source retrieval
fn navigation_error(
    error: fantoccini::error::CmdError,
    context: &'static str,
    url: &str,
) -> FetchError {
    if error.to_string().contains("Unable to find session") {
        ::log::warn!("Lost WebDriver session while {} {}", context, url);
    }
    FetchError::WebDriver {
        context,
        url: url.to_string(),
        message: error.to_string(),
    }
}

#[async_trait]
impl PageFetcher for BrowserFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        ::log::debug!("Navigating to {}", url);

        self.client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, "accessing", url))?;

        self.client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))
    }
}
