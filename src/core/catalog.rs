use crate::core::normalize::{normalize_code, normalize_name, pad_part};
use crate::domain::model::{CatalogRecord, CodingStandard};
use crate::domain::ports::{FeedFormat, FeedSource};
use crate::domain::raw::RawCatalogRow;
use crate::utils::error::{Result, UbigeoError};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Builds the flat code -> record index of one external catalog.
pub struct CrossIndexBuilder;

impl CrossIndexBuilder {
    pub fn build<I>(standard: CodingStandard, rows: I) -> CatalogIndex
    where
        I: IntoIterator<Item = RawCatalogRow>,
    {
        let mut records = HashMap::new();
        let mut skipped = 0usize;

        for row in rows {
            let department_id = pad_part(&row.department_part.as_text());
            let province_part = pad_part(&row.province_part.as_text());
            let district_part = pad_part(&row.district_part.as_text());
            // 區段為 00 的列是省級彙總，不是可定址的區
            if district_part == "00" {
                skipped += 1;
                continue;
            }

            let province_id = format!("{}{}", department_id, province_part);
            let code = normalize_code(&format!("{}{}", province_id, district_part));
            let record = CatalogRecord {
                district_id: code.clone(),
                code: code.clone(),
                department_id,
                province_id,
                name: row.name.as_deref().map(normalize_name),
            };
            records.insert(code, record);
        }

        tracing::debug!(
            "Indexed {} {} catalog records ({} non-leaf rows skipped)",
            records.len(),
            standard,
            skipped
        );
        CatalogIndex { standard, records }
    }
}

#[derive(Debug, Clone)]
pub struct CatalogIndex {
    standard: CodingStandard,
    records: HashMap<String, CatalogRecord>,
}

impl CatalogIndex {
    pub fn standard(&self) -> CodingStandard {
        self.standard
    }

    /// The query code is normalized before the lookup.
    pub fn lookup(&self, code: &str) -> Option<CatalogRecord> {
        self.records.get(&normalize_code(code)).cloned()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Parse a catalog body into rows.
pub fn parse_catalog(feed: &str, format: FeedFormat, body: &[u8]) -> Result<Vec<RawCatalogRow>> {
    match format {
        FeedFormat::Json => {
            serde_json::from_slice(body).map_err(|e| UbigeoError::malformed(feed, e))
        }
        FeedFormat::Csv => {
            let mut reader = csv::ReaderBuilder::new()
                .trim(csv::Trim::All)
                .from_reader(body);
            let rows = reader
                .deserialize()
                .collect::<std::result::Result<Vec<RawCatalogRow>, _>>()
                .map_err(|e| UbigeoError::malformed(feed, e))?;
            Ok(rows)
        }
    }
}

/// Loads one catalog feed at most once and serves lookups from it.
pub struct CatalogRepository<F: FeedSource> {
    standard: CodingStandard,
    feed: F,
    index: OnceCell<Arc<CatalogIndex>>,
}

impl<F: FeedSource> CatalogRepository<F> {
    pub fn new(standard: CodingStandard, feed: F) -> Self {
        Self {
            standard,
            feed,
            index: OnceCell::new(),
        }
    }

    pub fn standard(&self) -> CodingStandard {
        self.standard
    }

    /// Load the catalog; concurrent callers share one in-flight load and a
    /// failed load leaves the repository ready to retry.
    pub async fn bootstrap(&self) -> Result<Arc<CatalogIndex>> {
        self.index
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    async fn load(&self) -> Result<Arc<CatalogIndex>> {
        tracing::debug!("Loading {} catalog from {}", self.standard, self.feed.identity());
        let body = self.feed.fetch().await?;
        let rows = parse_catalog(self.feed.identity(), self.feed.format(), &body)?;
        let index = CrossIndexBuilder::build(self.standard, rows);
        tracing::info!("📇 {} catalog ready: {} codes", self.standard, index.len());
        Ok(Arc::new(index))
    }

    pub fn is_ready(&self) -> bool {
        self.index.initialized()
    }

    /// `None` when the code is unknown or the catalog is not loaded yet.
    pub fn lookup(&self, code: &str) -> Option<CatalogRecord> {
        self.index.get().and_then(|index| index.lookup(code))
    }
}
