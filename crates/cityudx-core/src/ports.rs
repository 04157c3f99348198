//! Port trait definitions
//!
//! These traits define the collaborators a dataset backend talks to.

pub mod catalog;
pub mod content;

pub use catalog::{CatalogClient, CatalogFile};
pub use content::GmlContentReader;
