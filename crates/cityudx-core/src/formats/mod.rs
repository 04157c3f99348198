//! Readers for dataset file content
//!
//! Geometry parsing is out of scope; readers here only extract the facts the
//! index exposes, such as the highest level of detail in a file.

pub mod gml;

pub use gml::{scan_max_lod, GmlLodScanner};
