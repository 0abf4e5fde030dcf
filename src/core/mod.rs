pub mod catalog;
pub mod collation;
pub mod export;
pub mod hierarchy;
pub mod normalize;
pub mod repository;
pub mod resolver;

pub use crate::domain::model::{CatalogRecord, Department, District, Province, Resolution};
pub use crate::domain::ports::{ExportSink, FeedFormat, FeedSource};
pub use crate::utils::error::Result;
