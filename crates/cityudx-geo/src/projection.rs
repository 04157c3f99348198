//! Projection backends behind [`GeoReference`](crate::GeoReference)

use std::sync::Arc;

use cityudx_core::error::Result;

use crate::models::{GeoCoordinate, Vector3d};
use crate::transform::{geodetic_to_plane, plane_to_geodetic, PlaneZone};

/// Maps between JGD2011 geodetic positions and ENU metres of one plane zone.
///
/// Implementations are shared across threads by every accessor that holds a
/// [`GeoReference`](crate::GeoReference).
pub trait PlaneProjection: Send + Sync {
    fn zone(&self) -> PlaneZone;

    /// Short backend name used in logs.
    fn name(&self) -> &'static str;

    /// Geodetic position to ENU plane metres, height carried through.
    fn forward(&self, coord: &GeoCoordinate) -> Result<Vector3d>;

    /// ENU plane metres back to a geodetic position.
    fn inverse(&self, enu: &Vector3d) -> Result<GeoCoordinate>;
}

/// Closed-form Transverse Mercator series from [`transform`](crate::transform).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeriesProjection {
    zone: PlaneZone,
}

impl SeriesProjection {
    pub fn new(zone: PlaneZone) -> Self {
        Self { zone }
    }
}

impl PlaneProjection for SeriesProjection {
    fn zone(&self) -> PlaneZone {
        self.zone
    }

    fn name(&self) -> &'static str {
        "series"
    }

    fn forward(&self, coord: &GeoCoordinate) -> Result<Vector3d> {
        Ok(geodetic_to_plane(coord, self.zone))
    }

    fn inverse(&self, enu: &Vector3d) -> Result<GeoCoordinate> {
        Ok(plane_to_geodetic(enu, self.zone))
    }
}

/// PROJ when the `proj` feature is enabled.
#[cfg(feature = "proj")]
pub fn default_projection(zone: PlaneZone) -> Result<Arc<dyn PlaneProjection>> {
    let projection: Arc<dyn PlaneProjection> =
        Arc::new(crate::proj_backend::ProjProjector::new(zone)?);
    Ok(projection)
}

/// The series when built without the `proj` feature.
#[cfg(not(feature = "proj"))]
pub fn default_projection(zone: PlaneZone) -> Result<Arc<dyn PlaneProjection>> {
    let projection: Arc<dyn PlaneProjection> = Arc::new(SeriesProjection::new(zone));
    Ok(projection)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_round_trip() {
        let projection = SeriesProjection::new(PlaneZone::new(9).unwrap());
        let coord = GeoCoordinate::new(35.6, 139.7, 12.0);
        let back = projection.inverse(&projection.forward(&coord).unwrap()).unwrap();
        assert!((back.latitude - coord.latitude).abs() < 1e-9);
        assert!((back.longitude - coord.longitude).abs() < 1e-9);
        assert_eq!(back.height, 12.0);
    }

    #[cfg(feature = "proj")]
    #[test]
    fn test_default_projection_uses_proj() {
        let projection = default_projection(PlaneZone::new(9).unwrap()).unwrap();
        assert_eq!(projection.name(), "proj");
        assert_eq!(projection.zone().id(), 9);
    }

    #[cfg(not(feature = "proj"))]
    #[test]
    fn test_default_projection_falls_back_to_series() {
        let projection = default_projection(PlaneZone::new(9).unwrap()).unwrap();
        assert_eq!(projection.name(), "series");
    }
}
