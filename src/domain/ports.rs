use crate::utils::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Body encoding of a feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeedFormat {
    #[default]
    Json,
    Csv,
}

impl FeedFormat {
    /// Guess the format from a URL or path; anything but `.csv` is JSON.
    pub fn infer(source: &str) -> Self {
        let without_query = source.split(['?', '#']).next().unwrap_or(source);
        match Path::new(without_query)
            .extension()
            .and_then(|ext| ext.to_str())
        {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

/// Transport for a raw feed (hierarchy or catalog).
pub trait FeedSource: Send + Sync {
    fn fetch(&self) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// URL or path, used in logs and error messages.
    fn identity(&self) -> &str;

    fn format(&self) -> FeedFormat {
        FeedFormat::infer(self.identity())
    }
}

/// Destination of the static export.
#[async_trait]
pub trait ExportSink: Send + Sync {
    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;

    /// Flush pending output and return where it ended up.
    async fn finish(&self) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_format() {
        assert_eq!(FeedFormat::infer("./data/ubigeo-inei.json"), FeedFormat::Json);
        assert_eq!(FeedFormat::infer("./data/ubigeo-inei.CSV"), FeedFormat::Csv);
        assert_eq!(
            FeedFormat::infer("https://example.com/reniec.csv?rev=3"),
            FeedFormat::Csv
        );
        assert_eq!(FeedFormat::infer("https://example.com/catalog"), FeedFormat::Json);
    }
}
