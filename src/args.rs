use clap::{Parser, ValueEnum};
use page_probe::{LoginConfig, ProbeConfig, SpanStrategy};
use std::error::Error;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "page-probe")]
#[command(about = "Reports JSON data and endpoint URLs embedded in web pages")]
#[command(version)]
pub struct Args {
    /// Page URLs to analyze
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Base URL for resolving relative endpoints (defaults to the first page's origin)
    #[arg(short, long)]
    pub base_url: Option<String>,

    /// Delay in milliseconds awaited before every fetch
    #[arg(short, long)]
    pub delay_ms: Option<u64>,

    /// How candidate JSON spans are located
    #[arg(short, long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// JSON configuration file; command-line flags take precedence
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Fetch pages through WebDriver instead of plain HTTP
    #[arg(long)]
    pub browser: bool,

    /// URL for the WebDriver instance
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Login page to submit credentials on before fetching
    #[arg(long)]
    pub login_url: Option<String>,

    #[arg(long, requires = "login_url")]
    pub username: Option<String>,

    #[arg(long, env = "PROBE_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory for data.json and downloaded resources
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Extra resource URL to download (repeatable)
    #[arg(long = "resource")]
    pub resources: Vec<String>,

    /// Print the run as JSON instead of the text report
    #[arg(long)]
    pub json: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyArg {
    NonGreedy,
    Balanced,
}

/// Convert from CLI argument strategy to internal strategy
pub fn convert_strategy(arg: StrategyArg) -> SpanStrategy {
    match arg {
        StrategyArg::NonGreedy => SpanStrategy::NonGreedy,
        StrategyArg::Balanced => SpanStrategy::Balanced,
    }
}

impl Args {
    /// Builds the run configuration: file (if any), then command-line overrides
    pub fn build_config(&self) -> Result<ProbeConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => ProbeConfig::from_file(path)?,
            None => ProbeConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.base_url = Some(base_url.clone());
        }
        if let Some(delay_ms) = self.delay_ms {
            config.fetch.delay_ms = delay_ms;
        }
        if let Some(strategy) = self.strategy {
            config.strategy = convert_strategy(strategy);
        }
        if self.browser {
            config.use_browser = true;
        }
        if let Some(webdriver_url) = self.webdriver_url.as_ref().filter(|u| !u.is_empty()) {
            config.webdriver_url = webdriver_url.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = Some(output_dir.clone());
        }
        config.resources.extend(self.resources.iter().cloned());

        if let Some(login_url) = &self.login_url {
            let username = self
                .username
                .as_deref()
                .ok_or(page_probe::ConfigError::MissingCredential("--username"))?;
            let password = self
                .password
                .as_deref()
                .ok_or(page_probe::ConfigError::MissingCredential("--password or PROBE_PASSWORD"))?;
            config.login = Some(LoginConfig::new(login_url, username, password));
        } else if let (Some(login), Some(password)) = (config.login.as_mut(), &self.password) {
            // Password given on the command line or env wins over the config file
            login.password = password.clone();
        }

        Ok(config)
    }
}
