//! PROJ-backed projection, enabled with the `proj` feature (on by default)

use std::sync::{Mutex, MutexGuard};

use cityudx_core::error::{Result, UdxError};
use proj::Proj;

use crate::models::{GeoCoordinate, Vector3d};
use crate::projection::PlaneProjection;
use crate::transform::PlaneZone;

const GEOGRAPHIC_CRS: &str = "EPSG:6668";

/// Projects between JGD2011 geographic coordinates and a plane rectangular
/// zone via PROJ.
///
/// A PROJ context must not be used from two threads at once, so each
/// direction sits behind its own lock.
pub struct ProjProjector {
    zone: PlaneZone,
    forward: Mutex<Proj>,
    inverse: Mutex<Proj>,
}

impl ProjProjector {
    pub fn new(zone: PlaneZone) -> Result<Self> {
        let plane = format!("EPSG:{}", zone.epsg());
        let forward = known_crs(GEOGRAPHIC_CRS, &plane)?;
        let inverse = known_crs(&plane, GEOGRAPHIC_CRS)?;
        Ok(Self { zone, forward: Mutex::new(forward), inverse: Mutex::new(inverse) })
    }
}

impl std::fmt::Debug for ProjProjector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjProjector").field("zone", &self.zone).finish_non_exhaustive()
    }
}

impl PlaneProjection for ProjProjector {
    fn zone(&self) -> PlaneZone {
        self.zone
    }

    fn name(&self) -> &'static str {
        "proj"
    }

    fn forward(&self, coord: &GeoCoordinate) -> Result<Vector3d> {
        let (east, north) = lock(&self.forward)
            .convert((coord.longitude, coord.latitude))
            .map_err(projection_failed)?;
        Ok(Vector3d::new(east, north, coord.height))
    }

    fn inverse(&self, enu: &Vector3d) -> Result<GeoCoordinate> {
        let (longitude, latitude) =
            lock(&self.inverse).convert((enu.x, enu.y)).map_err(projection_failed)?;
        Ok(GeoCoordinate::new(latitude, longitude, enu.z))
    }
}

fn known_crs(from: &str, to: &str) -> Result<Proj> {
    Proj::new_known_crs(from, to, None).map_err(|e| UdxError::ConfigInvalid {
        key: "crs".to_string(),
        reason: format!("Failed to create projection from {} to {}: {}", from, to, e),
    })
}

// A poisoned lock still holds a usable context.
fn lock(proj: &Mutex<Proj>) -> MutexGuard<'_, Proj> {
    proj.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn projection_failed(e: proj::ProjError) -> UdxError {
    UdxError::ConfigInvalid { key: "crs".to_string(), reason: format!("Projection failed: {}", e) }
}
