// Adapters layer: concrete implementations of the domain ports (feed transport, export storage).

pub mod feed;
pub mod storage;
