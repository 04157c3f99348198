//! cityudx Core - Domain models, error taxonomy, and configuration
//!
//! This crate contains the grid-mesh and package vocabulary shared by every
//! cityudx crate, plus the ports that dataset backends plug into.

pub mod config;
pub mod error;
pub mod formats;
pub mod models;
pub mod ports;

pub use error::{MeshCodeError, Result, UdxError};
