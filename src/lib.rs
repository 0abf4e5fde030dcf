pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;
pub use config::UbigeoConfig;

pub use adapters::feed::{Feed, FileFeed, HttpFeed};
pub use adapters::storage::{LocalStorage, ZipStorage};
pub use core::{
    catalog::{CatalogIndex, CatalogRepository, CrossIndexBuilder},
    collation::{BaseCollator, CollationLocale, Collator},
    export::StaticExporter,
    hierarchy::{Hierarchy, HierarchyBuilder},
    repository::HierarchyRepository,
    resolver::{CodeResolver, LookupOutcome},
};
pub use domain::model::{
    CatalogRecord, CodingStandard, Department, District, ExternalEntityId, Province, Resolution,
};
pub use utils::error::{Result, UbigeoError};
