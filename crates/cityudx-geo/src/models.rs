//! Geometry models for cityudx-geo.
//!
//! This module re-exports canonical types from `cityudx-core` so callers of
//! the projection API need a single import path.

pub use cityudx_core::models::{CoordinateSystem, GeoCoordinate, Vector3d};
