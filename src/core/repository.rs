use crate::core::collation::{BaseCollator, Collator};
use crate::core::hierarchy::{Hierarchy, HierarchyBuilder};
use crate::domain::model::{Department, District, Province, Resolution};
use crate::domain::ports::FeedSource;
use crate::domain::raw::RawHierarchy;
use crate::utils::error::{Result, UbigeoError};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Owns the hierarchy loaded from one feed.
///
/// `bootstrap` fetches and builds the model at most once; callers that
/// arrive while a load is running wait for that same load. The read
/// accessors return empty results until the model is loaded.
pub struct HierarchyRepository<F: FeedSource, C: Collator = BaseCollator> {
    feed: F,
    builder: HierarchyBuilder<C>,
    hierarchy: OnceCell<Arc<Hierarchy>>,
}

impl<F: FeedSource> HierarchyRepository<F, BaseCollator> {
    pub fn new(feed: F) -> Self {
        Self::with_collator(feed, BaseCollator::default())
    }
}

impl<F: FeedSource, C: Collator> HierarchyRepository<F, C> {
    pub fn with_collator(feed: F, collator: C) -> Self {
        Self {
            feed,
            builder: HierarchyBuilder::new(collator),
            hierarchy: OnceCell::new(),
        }
    }

    pub fn feed(&self) -> &F {
        &self.feed
    }

    pub async fn bootstrap(&self) -> Result<Arc<Hierarchy>> {
        self.hierarchy
            .get_or_try_init(|| self.load())
            .await
            .map(Arc::clone)
    }

    async fn load(&self) -> Result<Arc<Hierarchy>> {
        let feed = self.feed.identity();
        tracing::info!("📥 Loading UBIGEO hierarchy from {}", feed);

        let body = self.feed.fetch().await?;
        let raw: RawHierarchy =
            serde_json::from_slice(&body).map_err(|e| UbigeoError::malformed(feed, e))?;
        if raw.is_empty() {
            return Err(UbigeoError::malformed(feed, "hierarchy has no departments"));
        }

        Ok(Arc::new(self.builder.build(raw)))
    }

    pub fn is_ready(&self) -> bool {
        self.hierarchy.initialized()
    }

    /// The loaded model, if any. Holding it keeps a consistent snapshot.
    pub fn snapshot(&self) -> Option<Arc<Hierarchy>> {
        self.hierarchy.get().cloned()
    }

    pub fn get_departments(&self) -> Vec<Department> {
        self.hierarchy
            .get()
            .map(|h| h.departments())
            .unwrap_or_default()
    }

    pub fn get_department_by_id(&self, id: &str) -> Option<Department> {
        self.hierarchy.get()?.department_by_id(id)
    }

    pub fn get_provinces_by_department(&self, department_id: &str) -> Vec<Province> {
        self.hierarchy
            .get()
            .map(|h| h.provinces_by_department(department_id))
            .unwrap_or_default()
    }

    pub fn get_province_by_id(&self, id: &str) -> Option<Province> {
        self.hierarchy.get()?.province_by_id(id)
    }

    pub fn get_districts_by_province(&self, province_id: &str) -> Vec<District> {
        self.hierarchy
            .get()
            .map(|h| h.districts_by_province(province_id))
            .unwrap_or_default()
    }

    pub fn lookup_by_primary_code(&self, code: &str) -> Option<Resolution> {
        self.hierarchy.get()?.lookup_by_primary_code(code)
    }

    pub fn lookup_by_alternate_code(&self, code: &str) -> Option<Resolution> {
        self.hierarchy.get()?.lookup_by_alternate_code(code)
    }
}
