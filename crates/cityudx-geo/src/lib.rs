//! cityudx Geo - Projection of geodetic positions into local Cartesian frames
//!
//! This crate handles the Japanese plane rectangular coordinate system
//! (JGD2011, zones 1 to 19), axis conventions, and the [`GeoReference`]
//! used to place mesh cell centers into a scene. Projection runs through PROJ
//! with the default `proj` feature and through a closed-form series without it.

pub mod models;
pub mod projection;
pub mod reference;
pub mod transform;

#[cfg(feature = "proj")]
pub mod proj_backend;

pub use projection::{default_projection, PlaneProjection, SeriesProjection};
pub use reference::GeoReference;
pub use transform::{geodetic_to_plane, plane_to_geodetic, PlaneZone};
