//! Projection context for placing geodetic positions into a scene

use std::fmt;
use std::sync::Arc;

use cityudx_core::config::{validate_unit_scale, LayeredConfig};
use cityudx_core::error::Result;
use tracing::debug;

use crate::models::{CoordinateSystem, GeoCoordinate, Vector3d};
use crate::projection::{default_projection, PlaneProjection};
use crate::transform::PlaneZone;

/// Reference frame for [`GeoReference::project`].
///
/// `reference_point` is expressed in the target axis convention, in metres of
/// the plane rectangular system. It is subtracted before the unit scale is
/// applied. Clones share the same projection backend.
#[derive(Clone)]
pub struct GeoReference {
    projection: Arc<dyn PlaneProjection>,
    reference_point: Vector3d,
    unit_scale: f64,
    coordinate_system: CoordinateSystem,
}

impl GeoReference {
    /// Uses PROJ when the `proj` feature is enabled and the series otherwise.
    pub fn new(
        zone_id: i32,
        reference_point: Vector3d,
        unit_scale: f64,
        coordinate_system: CoordinateSystem,
    ) -> Result<Self> {
        let zone = PlaneZone::new(zone_id)?;
        let unit_scale = validate_unit_scale(unit_scale)?;
        Ok(Self {
            projection: default_projection(zone)?,
            reference_point,
            unit_scale,
            coordinate_system,
        })
    }

    /// Zone only: origin at zero, metres, ENU axes.
    pub fn for_zone(zone_id: i32) -> Result<Self> {
        Self::new(zone_id, Vector3d::ZERO, 1.0, CoordinateSystem::Enu)
    }

    /// Build from the resolved zone, axis and scale of a layered configuration.
    pub fn from_config(config: &LayeredConfig) -> Result<Self> {
        let reference = Self::new(
            config.zone_id.value,
            Vector3d::ZERO,
            config.unit_scale.value,
            config.coordinate_system.value,
        )?;
        debug!(
            zone = reference.zone_id(),
            backend = reference.projection.name(),
            axes = %reference.coordinate_system,
            unit_scale = reference.unit_scale,
            "Geo reference from configuration"
        );
        Ok(reference)
    }

    /// Swap the projection backend, keeping the frame.
    pub fn with_projection(mut self, projection: Arc<dyn PlaneProjection>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_reference_point(mut self, reference_point: Vector3d) -> Self {
        self.reference_point = reference_point;
        self
    }

    /// Geodetic position to scene coordinates in the configured axes.
    pub fn project(&self, coord: &GeoCoordinate) -> Result<Vector3d> {
        Ok(self.coordinate_system.from_enu(self.project_without_axis_convert(coord)?))
    }

    /// Same as [`project`](Self::project) but the result stays in ENU axes.
    pub fn project_without_axis_convert(&self, coord: &GeoCoordinate) -> Result<Vector3d> {
        let enu = self.projection.forward(coord)?;
        Ok((enu - self.coordinate_system.to_enu(self.reference_point)) / self.unit_scale)
    }

    /// Exact inverse of [`project`](Self::project).
    pub fn unproject(&self, point: &Vector3d) -> Result<GeoCoordinate> {
        let scene = *point * self.unit_scale + self.reference_point;
        self.projection.inverse(&self.coordinate_system.to_enu(scene))
    }

    pub fn zone_id(&self) -> i32 {
        self.zone().id()
    }

    pub fn zone(&self) -> PlaneZone {
        self.projection.zone()
    }

    pub fn backend(&self) -> &'static str {
        self.projection.name()
    }

    pub fn reference_point(&self) -> Vector3d {
        self.reference_point
    }

    pub fn unit_scale(&self) -> f64 {
        self.unit_scale
    }

    pub fn coordinate_system(&self) -> CoordinateSystem {
        self.coordinate_system
    }
}

impl fmt::Debug for GeoReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeoReference")
            .field("zone", &self.zone())
            .field("backend", &self.backend())
            .field("reference_point", &self.reference_point)
            .field("unit_scale", &self.unit_scale)
            .field("coordinate_system", &self.coordinate_system)
            .finish()
    }
}
