//! cityudx Dataset - Index and query city model datasets
//!
//! A [`DatasetSource`] walks a local UDX folder or asks a remote catalog for
//! its listing, builds one immutable [`CatalogIndex`], and hands out
//! [`DatasetAccessor`] views over it.

pub mod accessor;
pub mod index;
pub mod local;
pub mod remote;
pub mod source;

pub use accessor::DatasetAccessor;
pub use index::CatalogIndex;
pub use remote::{HttpCatalogClient, StaticCatalogClient};
pub use source::{Backend, DatasetSource, SourceMode};
