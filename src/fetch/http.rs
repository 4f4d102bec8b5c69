use crate::config::FetchConfig;
use crate::error::{ConfigError, FetchError};
use crate::fetch::PageFetcher;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use url::Url;

/// Fetches pages over plain HTTP with a fixed header set
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: Option<Url>,
    cookies: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher sending the configured `User-Agent` and `Accept` on every request
    pub fn new(config: &FetchConfig) -> Result<Self, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, header_value("User-Agent", &config.user_agent)?);
        headers.insert(ACCEPT, header_value("Accept", &config.accept)?);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: None,
            cookies: None,
        })
    }

    /// Resolve relative page URLs against `base_url`
    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    /// Send a `Cookie` header (e.g. from a browser login) with every request
    pub fn with_cookies(mut self, cookies: impl Into<String>) -> Self {
        let cookies = cookies.into();
        self.cookies = if cookies.is_empty() { None } else { Some(cookies) };
        self
    }

    /// The underlying client, carrying the default headers
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    pub fn cookies(&self) -> Option<&str> {
        self.cookies.as_deref()
    }

    /// Turns `url` into an absolute URL, using the base for relative input
    pub fn resolve(&self, url: &str) -> Result<Url, FetchError> {
        let parsed = match (Url::parse(url), &self.base_url) {
            (Ok(absolute), _) => Ok(absolute),
            (Err(url::ParseError::RelativeUrlWithoutBase), Some(base)) => base.join(url),
            (Err(e), _) => Err(e),
        };

        parsed.map_err(|source| FetchError::InvalidUrl {
            url: url.to_string(),
            source,
        })
    }
}

fn header_value(name: &'static str, value: &str) -> Result<HeaderValue, ConfigError> {
    HeaderValue::from_str(value).map_err(|_| ConfigError::InvalidHeader {
        name,
        value: value.to_string(),
    })
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let target = self.resolve(url)?;
        ::log::debug!("GET {}", target);

        let mut request = self.client.get(target);
        if let Some(cookies) = &self.cookies {
            request = request.header(COOKIE, cookies.as_str());
        }

        let response = request.send().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })
    }
}
