use clap::Parser;
use page_probe::resources::{self, ResourceDownloader};
use page_probe::{
    Analyzer, BrowserFetcher, EventSink, HttpFetcher, LogSink, PageFetcher, ProbeConfig,
    ProbeEvent, RunReport,
};
use std::error::Error;
use std::fmt::Display;
use std::sync::Arc;
use url::Url;

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Initialize logging
    env_logger::init();

    // Parse command-line arguments
    let args = Args::parse();

    if let Err(e) = run(args).await {
        ::log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = args.build_config()?;
    let base_url = config.resolve_base_url(&args.urls[0])?;
    let sink: Arc<dyn EventSink> = Arc::new(LogSink);

    ::log::info!(
        "Probing {} page(s), base URL {}, {} ms between fetches",
        args.urls.len(),
        base_url,
        config.fetch.delay_ms
    );

    // A browser session is only opened for login or browser fetching
    let browser = if config.needs_browser() {
        println!("Note: browser mode requires a WebDriver server (e.g., ChromeDriver).");
        Some(BrowserFetcher::connect(&config.webdriver_url).await?)
    } else {
        None
    };

    let outcome = probe(&args, &config, &base_url, browser.as_ref(), sink).await;
    close_session(browser, outcome, BrowserFetcher::close).await
}

/// Closes the session, if any, whatever the outcome, then hands the outcome back
async fn close_session<S, T, E, F, Fut>(
    session: Option<S>,
    outcome: Result<T, Box<dyn Error>>,
    close: F,
) -> Result<T, Box<dyn Error>>
where
    F: FnOnce(S) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    if let Some(session) = session {
        if let Err(e) = close(session).await {
            ::log::warn!("Failed to close WebDriver session: {}", e);
        }
    }
    outcome
}

/// The page URL the way the HTTP fetcher requested it
fn absolute_page_url(base_url: &Url, url: &str) -> String {
    base_url
        .join(url)
        .map(|u| u.to_string())
        .unwrap_or_else(|_| url.to_string())
}

async fn probe(
    args: &Args,
    config: &ProbeConfig,
    base_url: &Url,
    browser: Option<&BrowserFetcher>,
    sink: Arc<dyn EventSink>,
) -> Result<(), Box<dyn Error>> {
    let mut cookies = None;
    if let (Some(browser), Some(login)) = (browser, &config.login) {
        let header = browser.login(login).await?;
        sink.emit(ProbeEvent::LoginSucceeded {
            login_url: login.login_url.clone(),
            cookies: header.split("; ").filter(|c| !c.is_empty()).count(),
        });
        cookies = Some(header);
    }

    let mut http = HttpFetcher::new(&config.fetch)?.with_base_url(base_url.clone());
    if let Some(cookies) = &cookies {
        http = http.with_cookies(cookies.clone());
    }

    let downloader = config.output_dir.as_ref().map(|dir| {
        ResourceDownloader::new(http.client().clone(), dir)
            .with_cookies(cookies.clone())
            .with_event_sink(sink.clone())
    });

    let fetcher: Box<dyn PageFetcher> = match (browser, config.use_browser) {
        (Some(browser), true) => Box::new(browser.clone()),
        _ => Box::new(http),
    };
    let analyzer = Analyzer::new(fetcher, base_url.as_str())
        .with_config(config)
        .with_event_sink(sink.clone());

    let mut report = RunReport::default();
    for url in &args.urls {
        let result = match &downloader {
            None => analyzer.analyze_page(url).await,
            Some(downloader) => match analyzer.fetch_page(url).await {
                Some(html) => {
                    let result = analyzer.analyze_html(url, &html);
                    let page_url = absolute_page_url(base_url, url);

                    report
                        .saved_resources
                        .extend(downloader.save_page(&page_url, &html).await);
                    let found = resources::collect_resources(&html, &page_url);
                    report
                        .saved_resources
                        .extend(downloader.download_all(&found).await);
                    Some(result)
                }
                None => None,
            },
        };

        match result {
            Some(result) => {
                if !args.json {
                    println!("\n{}", result.report());
                }
                report.results.push(result);
            }
            None if !args.json => println!("\nNo results available for {}", url),
            None => {}
        }
    }

    if let Some(downloader) = &downloader {
        let listed = resources::listed_resources(&config.resources);
        report
            .saved_resources
            .extend(downloader.download_all(&listed).await);

        let path = report.write_to(downloader.output_dir())?;
        ::log::info!("Saved JSON data: {}", path.display());
    } else if !config.resources.is_empty() {
        ::log::warn!("Ignoring {} listed resources: no output directory set", config.resources.len());
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }

    ::log::info!(
        "Probe complete - {} of {} pages analyzed",
        report.results.len(),
        args.urls.len()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Session(Arc<AtomicBool>);

    async fn close(session: Session) -> Result<(), String> {
        session.0.store(true, Ordering::SeqCst);
        Ok(())
    }

    #[tokio::test]
    async fn test_session_closed_after_failure() {
        let closed = Arc::new(AtomicBool::new(false));
        let failed: Result<(), Box<dyn Error>> = Err("login failed".into());

        let outcome = close_session(Some(Session(closed.clone())), failed, close).await;

        assert_eq!(outcome.unwrap_err().to_string(), "login failed");
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_session_closed_after_success() {
        let closed = Arc::new(AtomicBool::new(false));

        let outcome = close_session(Some(Session(closed.clone())), Ok(7), close).await;

        assert_eq!(outcome.unwrap(), 7);
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_close_failure_keeps_outcome() {
        let outcome = close_session(Some(()), Ok("done"), |_| async {
            Err::<(), _>("session already gone")
        })
        .await;
        assert_eq!(outcome.unwrap(), "done");
    }

    #[test]
    fn test_relative_page_url_resolves_against_base() {
        let base = Url::parse("https://example.com/app/").unwrap();
        assert_eq!(absolute_page_url(&base, "/account"), "https://example.com/account");
        assert_eq!(absolute_page_url(&base, "page.html"), "https://example.com/app/page.html");
        assert_eq!(
            absolute_page_url(&base, "https://other.test/x"),
            "https://other.test/x"
        );

        let found = resources::collect_resources(
            r#"<script src="js/app.js"></script>"#,
            &absolute_page_url(&base, "/account/"),
        );
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].url, "https://example.com/account/js/app.js");
    }

    #[tokio::test]
    async fn test_no_session_to_close() {
        let outcome = close_session(None::<Session>, Ok(()), close).await;
        assert!(outcome.is_ok());
    }
}
