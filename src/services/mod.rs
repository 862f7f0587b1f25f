pub mod catalog_query;
pub mod catalog_store;
pub mod classifier;
pub mod ingest;
pub mod m3u_parser;
pub mod snapshot;
