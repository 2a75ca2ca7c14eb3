//! Skydrop data sources
//!
//! Fetches restaurants, orders and airspace polygons either from the REST
//! service or from a directory of JSON files with the same shapes.

pub mod error;
pub mod file;
pub mod rest;
pub mod source;
pub mod wire;

pub use error::SourceError;
pub use file::FileSource;
pub use rest::RestClient;
pub use source::DataSource;
