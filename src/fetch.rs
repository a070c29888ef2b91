use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, USER_AGENT};
use tracing::debug;

pub const CMC_HOME: &str = "https://coinmarketcap.com/";

/// Somewhere the page HTML can be read from. Each call returns the current
/// state of the document, so a wait loop can poll it.
pub trait DocumentSource {
    fn fetch(&self) -> impl Future<Output = Result<String>>;
}

/// Saved page on disk, re-read on every poll.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl DocumentSource for FileSource {
    async fn fetch(&self) -> Result<String> {
        tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("failed to read {}", self.path.display()))
    }
}

/// Live page over HTTP.
#[derive(Debug, Clone)]
pub struct UrlSource {
    client: reqwest::Client,
    url: String,
}

impl UrlSource {
    pub fn new(url: impl Into<String>) -> Result<Self> {
        Ok(Self {
            client: build_client()?,
            url: url.into(),
        })
    }
}

impl DocumentSource for UrlSource {
    async fn fetch(&self) -> Result<String> {
        fetch_html(&self.client, &self.url).await
    }
}

/// HTML already in memory.
#[derive(Debug, Clone)]
pub struct StaticSource(pub String);

impl DocumentSource for StaticSource {
    async fn fetch(&self) -> Result<String> {
        Ok(self.0.clone())
    }
}

fn build_client() -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();
    headers.insert(USER_AGENT, HeaderValue::from_static(
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.0.0 Safari/537.36"));
    headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));

    let client = reqwest::Client::builder()
        .default_headers(headers)
        .redirect(reqwest::redirect::Policy::limited(5))
        .gzip(true).brotli(true).deflate(true)
        .build()?;
    Ok(client)
}

async fn fetch_html(client: &reqwest::Client, url: &str) -> Result<String> {
    let html = client.get(url)
        .send().await
        .with_context(|| format!("request to {url} failed"))?
        .error_for_status()?
        .text().await?;

    debug!(url, bytes = html.len(), "fetched page");
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_source_returns_its_html() {
        let source = StaticSource("<table></table>".to_string());
        assert_eq!(source.fetch().await.unwrap(), "<table></table>");
    }

    #[tokio::test]
    async fn missing_file_names_the_path() {
        let source = FileSource::new("/definitely/not/here.html");
        let err = source.fetch().await.unwrap_err();
        assert!(format!("{err:#}").contains("/definitely/not/here.html"));
    }
}
