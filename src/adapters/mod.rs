// Adapters layer: concrete implementations at the edges of the core, namely
// source backends and the export boundary.

pub mod export;
pub mod http_api;

pub use export::Exporter;
pub use http_api::HttpApiSource;
