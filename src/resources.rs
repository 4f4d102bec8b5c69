use crate::error::ResourceError;
use crate::events::{EventSink, LogSink, ProbeEvent};
use crate::results::REPORT_FILE_NAME;
use crate::utils::sanitize_filename;
use reqwest::header::{CONTENT_TYPE, COOKIE};
use scraper::{Html, Selector};
use serde::Serialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

/// Where a resource reference came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    /// `<script src>`
    Script,
    /// `<link rel="stylesheet" href>`
    Stylesheet,
    /// Given explicitly by the caller
    Listed,
}

/// An absolute resource URL to download
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceRef {
    pub url: String,
    pub kind: ResourceKind,
}

/// A resource written to disk
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedResource {
    pub url: String,
    pub path: PathBuf,
    pub bytes: usize,
}

/// Finds external scripts and stylesheets, resolved against the page URL, in document order
pub fn collect_resources(html: &str, page_url: &str) -> Vec<ResourceRef> {
    let Ok(base) = Url::parse(page_url) else {
        ::log::debug!("Page URL {} is not absolute; no resources collected", page_url);
        return Vec::new();
    };

    let doc = Html::parse_document(html);
    let resource_selector =
        Selector::parse(r#"script[src], link[rel="stylesheet"]"#).expect("static selector is valid");

    let mut seen = HashSet::new();
    let mut resources = Vec::new();
    for element in doc.select(&resource_selector) {
        let (reference, kind) = match element.value().name() {
            "script" => (element.value().attr("src"), ResourceKind::Script),
            _ => (element.value().attr("href"), ResourceKind::Stylesheet),
        };
        let Some(reference) = reference.filter(|r| !r.trim().is_empty()) else {
            continue;
        };

        match base.join(reference.trim()) {
            Ok(resolved) => {
                let url = resolved.to_string();
                if seen.insert(url.clone()) {
                    resources.push(ResourceRef { url, kind });
                }
            }
            Err(e) => ::log::debug!("Skipping resource {}: {}", reference, e),
        }
    }

    ::log::debug!("Found {} resources in {}", resources.len(), page_url);
    resources
}

/// Wraps caller-supplied URLs as resources, dropping blanks and duplicates
pub fn listed_resources(urls: &[String]) -> Vec<ResourceRef> {
    let mut seen = HashSet::new();
    urls.iter()
        .map(|u| u.trim())
        .filter(|u| !u.is_empty() && seen.insert(u.to_string()))
        .map(|u| ResourceRef {
            url: u.to_string(),
            kind: ResourceKind::Listed,
        })
        .collect()
}

/// File extension for a `Content-Type` value
pub fn extension_for_content_type(content_type: &str) -> Option<&str> {
    let mime = content_type.split(';').next()?.trim();
    let subtype = mime.split('/').nth(1)?.trim();
    if subtype.is_empty() {
        return None;
    }

    Some(match subtype {
        "javascript" | "x-javascript" | "ecmascript" => "js",
        "plain" => "txt",
        "svg+xml" => "svg",
        "jpeg" => "jpg",
        "octet-stream" => return None,
        other => other,
    })
}

/// Local file name for a downloaded resource.
///
/// Uses the last path segment without its query; when it has no extension, one
/// is derived from the response's content type.
pub fn file_name_for(url: &str, content_type: Option<&str>) -> String {
    let segment = Url::parse(url)
        .ok()
        .and_then(|u| {
            u.path_segments()
                .and_then(|mut segments| segments.next_back().map(|s| s.to_string()))
        })
        .unwrap_or_default();

    let mut name = sanitize_filename(&segment);
    if name.is_empty() {
        name = "index".to_string();
    }

    if !name.contains('.') {
        if let Some(ext) = content_type.and_then(extension_for_content_type) {
            name = format!("{}.{}", name, ext);
        }
    }

    name
}

/// Local file name for a fetched page body; `index.html` for a site root
pub fn page_file_name(url: &str) -> String {
    let name = file_name_for(url, Some("text/html"));
    if name == REPORT_FILE_NAME {
        format!("page-{}", name)
    } else {
        name
    }
}

/// Downloads resources into an output directory
pub struct ResourceDownloader {
    client: reqwest::Client,
    output_dir: PathBuf,
    cookies: Option<String>,
    sink: Arc<dyn EventSink>,
}

impl ResourceDownloader {
    pub fn new(client: reqwest::Client, output_dir: impl AsRef<Path>) -> Self {
        Self {
            client,
            output_dir: output_dir.as_ref().to_path_buf(),
            cookies: None,
            sink: Arc::new(LogSink),
        }
    }

    /// Send a `Cookie` header with every download
    pub fn with_cookies(mut self, cookies: Option<String>) -> Self {
        self.cookies = cookies.filter(|c| !c.is_empty());
        self
    }

    pub fn with_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Downloads one resource and writes it under the output directory
    pub async fn download(&self, resource: &ResourceRef) -> Result<SavedResource, ResourceError> {
        let url = resource.url.as_str();
        let mut request = self.client.get(url);
        if let Some(cookies) = &self.cookies {
            request = request.header(COOKIE, cookies.as_str());
        }

        let response = request.send().await.map_err(|source| ResourceError::Request {
            url: url.to_string(),
            source,
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ResourceError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.to_string());
        let body = response.bytes().await.map_err(|source| ResourceError::Request {
            url: url.to_string(),
            source,
        })?;

        self.write_file(url, &file_name_for(url, content_type.as_deref()), &body)
            .await
    }

    /// Downloads every resource in order; failures are reported and skipped
    pub async fn download_all(&self, resources: &[ResourceRef]) -> Vec<SavedResource> {
        let mut saved = Vec::with_capacity(resources.len());
        for resource in resources {
            let outcome = self.download(resource).await;
            saved.extend(self.record(&resource.url, outcome));
        }
        saved
    }

    /// Writes an already fetched page body next to its resources
    pub async fn save_page(&self, url: &str, html: &str) -> Option<SavedResource> {
        let outcome = self
            .write_file(url, &page_file_name(url), html.as_bytes())
            .await;
        self.record(url, outcome)
    }

    async fn write_file(
        &self,
        url: &str,
        name: &str,
        body: &[u8],
    ) -> Result<SavedResource, ResourceError> {
        tokio::fs::create_dir_all(&self.output_dir)
            .await
            .map_err(|source| ResourceError::Io {
                path: self.output_dir.clone(),
                source,
            })?;

        let path = self.output_dir.join(name);
        tokio::fs::write(&path, body)
            .await
            .map_err(|source| ResourceError::Io {
                path: path.clone(),
                source,
            })?;

        Ok(SavedResource {
            url: url.to_string(),
            path,
            bytes: body.len(),
        })
    }

    // Reports the outcome through the sink
    fn record(
        &self,
        url: &str,
        outcome: Result<SavedResource, ResourceError>,
    ) -> Option<SavedResource> {
        match outcome {
            Ok(file) => {
                self.sink.emit(ProbeEvent::ResourceSaved {
                    url: file.url.clone(),
                    path: file.path.clone(),
                    bytes: file.bytes,
                });
                Some(file)
            }
            Err(e) => {
                self.sink.emit(ProbeEvent::DownloadFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                None
            }
        }
    }
}
