use crate::domain::ports::{FeedFormat, FeedSource};
use crate::utils::error::{Result, UbigeoError};
use crate::utils::validation::is_remote;
use reqwest::Client;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpFeed {
    url: String,
    client: Client,
    format: FeedFormat,
}

impl HttpFeed {
    pub fn new(url: impl Into<String>) -> Self {
        let url = url.into();
        Self {
            format: FeedFormat::infer(&url),
            url,
            client: Client::new(),
        }
    }

    pub fn with_timeout(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            ..Self::new(url)
        })
    }

    pub fn with_format(mut self, format: FeedFormat) -> Self {
        self.format = format;
        self
    }
}

impl FeedSource for HttpFeed {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::debug!("Making request to: {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| UbigeoError::unavailable(&self.url, e))?;

        tracing::debug!("Response status: {}", response.status());
        if !response.status().is_success() {
            return Err(UbigeoError::unavailable(
                &self.url,
                format!("HTTP {}", response.status()),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| UbigeoError::unavailable(&self.url, e))?;
        Ok(body.to_vec())
    }

    fn identity(&self) -> &str {
        &self.url
    }

    fn format(&self) -> FeedFormat {
        self.format
    }
}

#[derive(Debug, Clone)]
pub struct FileFeed {
    path: PathBuf,
    identity: String,
    format: FeedFormat,
}

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let identity = path.display().to_string();
        Self {
            format: FeedFormat::infer(&identity),
            path,
            identity,
        }
    }

    pub fn with_format(mut self, format: FeedFormat) -> Self {
        self.format = format;
        self
    }
}

impl FeedSource for FileFeed {
    async fn fetch(&self) -> Result<Vec<u8>> {
        tracing::debug!("Reading {}", self.identity);
        tokio::fs::read(&self.path)
            .await
            .map_err(|e| UbigeoError::unavailable(&self.identity, e))
    }

    fn identity(&self) -> &str {
        &self.identity
    }

    fn format(&self) -> FeedFormat {
        self.format
    }
}

/// A feed picked from a configured source string.
#[derive(Debug, Clone)]
pub enum Feed {
    Http(HttpFeed),
    File(FileFeed),
}

impl Feed {
    /// http(s) URLs go through reqwest, anything else is read from disk.
    pub fn from_source(
        source: &str,
        format: Option<FeedFormat>,
        timeout: Duration,
    ) -> Result<Self> {
        let feed = if is_remote(source) {
            let feed = HttpFeed::with_timeout(source, timeout)?;
            Self::Http(match format {
                Some(format) => feed.with_format(format),
                None => feed,
            })
        } else {
            let feed = FileFeed::new(source);
            Self::File(match format {
                Some(format) => feed.with_format(format),
                None => feed,
            })
        };
        Ok(feed)
    }
}

impl FeedSource for Feed {
    async fn fetch(&self) -> Result<Vec<u8>> {
        match self {
            Self::Http(feed) => feed.fetch().await,
            Self::File(feed) => feed.fetch().await,
        }
    }

    fn identity(&self) -> &str {
        match self {
            Self::Http(feed) => feed.identity(),
            Self::File(feed) => feed.identity(),
        }
    }

    fn format(&self) -> FeedFormat {
        match self {
            Self::Http(feed) => feed.format(),
            Self::File(feed) => feed.format(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[tokio::test]
    async fn test_http_feed_returns_body() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/data/ubigeo-inei.json");
            then.status(200)
                .header("Content-Type", "application/json")
                .body("[]");
        });

        let feed = HttpFeed::new(server.url("/data/ubigeo-inei.json"));
        let body = feed.fetch().await.unwrap();

        api_mock.assert();
        assert_eq!(body, b"[]");
        assert_eq!(feed.format(), FeedFormat::Json);
    }

    #[tokio::test]
    async fn test_http_feed_error_status_is_unavailable() {
        let server = MockServer::start();
        let api_mock = server.mock(|when, then| {
            when.method(GET).path("/missing.json");
            then.status(404);
        });

        let feed = HttpFeed::new(server.url("/missing.json"));
        let err = feed.fetch().await.unwrap_err();

        api_mock.assert();
        assert!(matches!(err, UbigeoError::SourceUnavailable { .. }));
        assert!(err.to_string().contains("404"));
    }

    #[tokio::test]
    async fn test_file_feed() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"departamento,provincia,distrito\n").unwrap();

        let feed = FileFeed::new(temp_file.path()).with_format(FeedFormat::Csv);
        assert_eq!(feed.fetch().await.unwrap(), b"departamento,provincia,distrito\n");
        assert_eq!(feed.format(), FeedFormat::Csv);

        let missing = FileFeed::new("/nonexistent/code_ubigeo_dep_prov_dis.json");
        assert!(matches!(
            missing.fetch().await,
            Err(UbigeoError::SourceUnavailable { .. })
        ));
    }

    #[test]
    fn test_feed_from_source() {
        let timeout = Duration::from_secs(5);
        assert!(matches!(
            Feed::from_source("https://example.com/reniec.csv", None, timeout).unwrap(),
            Feed::Http(_)
        ));

        let feed = Feed::from_source("./data/reniec.txt", Some(FeedFormat::Csv), timeout).unwrap();
        assert!(matches!(feed, Feed::File(_)));
        assert_eq!(feed.format(), FeedFormat::Csv);
    }
}
