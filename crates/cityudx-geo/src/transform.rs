//! Geodetic <-> Japanese plane rectangular coordinates
//!
//! Transverse Mercator on GRS80 using the series expansion published by the
//! Geospatial Information Authority of Japan (Kawase 2011), accurate to well
//! below a millimetre inside each zone.
//!
//! Plane coordinates follow the survey convention: `x` grows north and `y`
//! grows east. The public functions return ENU vectors instead so callers
//! never see the swapped axes.

use cityudx_core::config::validate_zone;
use cityudx_core::error::{Result, UdxError};
use serde::{Deserialize, Serialize};

use crate::models::{GeoCoordinate, Vector3d};

/// GRS80 semi-major axis in metres
const SEMI_MAJOR_AXIS: f64 = 6_378_137.0;
/// GRS80 inverse flattening
const INVERSE_FLATTENING: f64 = 298.257_222_101;
/// Scale factor on the central meridian
const SCALE_FACTOR: f64 = 0.9999;

/// Origin of a plane rectangular zone, degrees and minutes as published.
const ZONE_ORIGINS: [(f64, f64, f64, f64); 19] = [
    (33.0, 0.0, 129.0, 30.0),
    (33.0, 0.0, 131.0, 0.0),
    (36.0, 0.0, 132.0, 10.0),
    (33.0, 0.0, 133.0, 30.0),
    (36.0, 0.0, 134.0, 20.0),
    (36.0, 0.0, 136.0, 0.0),
    (36.0, 0.0, 137.0, 10.0),
    (36.0, 0.0, 138.0, 30.0),
    (36.0, 0.0, 139.0, 50.0),
    (40.0, 0.0, 140.0, 50.0),
    (44.0, 0.0, 140.0, 15.0),
    (44.0, 0.0, 142.0, 15.0),
    (44.0, 0.0, 144.0, 15.0),
    (26.0, 0.0, 142.0, 0.0),
    (26.0, 0.0, 127.0, 30.0),
    (26.0, 0.0, 124.0, 0.0),
    (26.0, 0.0, 131.0, 0.0),
    (20.0, 0.0, 136.0, 0.0),
    (26.0, 0.0, 154.0, 0.0),
];

/// A validated plane rectangular zone (1 to 19)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct PlaneZone(u8);

impl TryFrom<i32> for PlaneZone {
    type Error = UdxError;

    fn try_from(zone: i32) -> Result<Self> {
        Self::new(zone)
    }
}

impl From<PlaneZone> for i32 {
    fn from(zone: PlaneZone) -> i32 {
        zone.id()
    }
}

impl PlaneZone {
    pub fn new(zone: i32) -> Result<Self> {
        validate_zone(zone).map(|zone| Self(zone as u8))
    }

    pub fn id(&self) -> i32 {
        self.0 as i32
    }

    /// EPSG code of the JGD2011 CRS for this zone (6669 for zone 1).
    pub fn epsg(&self) -> u32 {
        6668 + self.0 as u32
    }

    /// Latitude and longitude of the zone origin in degrees.
    pub fn origin(&self) -> (f64, f64) {
        let (lat_deg, lat_min, lon_deg, lon_min) = ZONE_ORIGINS[self.0 as usize - 1];
        (lat_deg + lat_min / 60.0, lon_deg + lon_min / 60.0)
    }
}

/// Series coefficients derived from the third flattening `n`.
struct Series {
    n: f64,
    /// Rectifying radius scaled by m0
    a_bar: f64,
    a: [f64; 6],
    alpha: [f64; 6],
    beta: [f64; 6],
    delta: [f64; 7],
}

impl Series {
    fn grs80() -> Self {
        let n = 1.0 / (2.0 * INVERSE_FLATTENING - 1.0);
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let a = [
            1.0 + n2 / 4.0 + n4 / 64.0,
            -1.5 * (n - n3 / 8.0 - n5 / 64.0),
            15.0 / 16.0 * (n2 - n4 / 4.0),
            -35.0 / 48.0 * (n3 - 5.0 / 16.0 * n5),
            315.0 / 512.0 * n4,
            -693.0 / 1280.0 * n5,
        ];
        let alpha = [
            0.0,
            n / 2.0 - 2.0 / 3.0 * n2 + 5.0 / 16.0 * n3 + 41.0 / 180.0 * n4 - 127.0 / 288.0 * n5,
            13.0 / 48.0 * n2 - 3.0 / 5.0 * n3 + 557.0 / 1440.0 * n4 + 281.0 / 630.0 * n5,
            61.0 / 240.0 * n3 - 103.0 / 140.0 * n4 + 15061.0 / 26880.0 * n5,
            49561.0 / 161280.0 * n4 - 179.0 / 168.0 * n5,
            34729.0 / 80640.0 * n5,
        ];
        let beta = [
            0.0,
            n / 2.0 - 2.0 / 3.0 * n2 + 37.0 / 96.0 * n3 - n4 / 360.0 - 81.0 / 512.0 * n5,
            n2 / 48.0 + n3 / 15.0 - 437.0 / 1440.0 * n4 + 46.0 / 105.0 * n5,
            17.0 / 480.0 * n3 - 37.0 / 840.0 * n4 - 209.0 / 4480.0 * n5,
            4397.0 / 161280.0 * n4 - 11.0 / 504.0 * n5,
            4583.0 / 161280.0 * n5,
        ];
        let delta = [
            0.0,
            2.0 * n - 2.0 / 3.0 * n2 - 2.0 * n3 + 116.0 / 45.0 * n4 + 26.0 / 45.0 * n5
                - 2854.0 / 675.0 * n6,
            7.0 / 3.0 * n2 - 8.0 / 5.0 * n3 - 227.0 / 45.0 * n4 + 2704.0 / 315.0 * n5
                + 2323.0 / 945.0 * n6,
            56.0 / 15.0 * n3 - 136.0 / 35.0 * n4 - 1262.0 / 105.0 * n5 + 73814.0 / 2835.0 * n6,
            4279.0 / 630.0 * n4 - 332.0 / 35.0 * n5 - 399572.0 / 14175.0 * n6,
            4174.0 / 315.0 * n5 - 144838.0 / 6237.0 * n6,
            601676.0 / 22275.0 * n6,
        ];

        let a_bar = SCALE_FACTOR * SEMI_MAJOR_AXIS / (1.0 + n) * a[0];
        Self { n, a_bar, a, alpha, beta, delta }
    }

    /// Meridian arc length from the equator to `phi` (radians), scaled by m0.
    fn meridian_arc(&self, phi: f64) -> f64 {
        let tail: f64 = (1..6).map(|j| self.a[j] * (2.0 * j as f64 * phi).sin()).sum();
        SCALE_FACTOR * SEMI_MAJOR_AXIS / (1.0 + self.n) * (self.a[0] * phi + tail)
    }

    fn conformal_factor(&self) -> f64 {
        2.0 * self.n.sqrt() / (1.0 + self.n)
    }
}

/// Project a geodetic position into the zone's plane, as ENU metres.
///
/// The height passes through unchanged as the up component.
pub fn geodetic_to_plane(coord: &GeoCoordinate, zone: PlaneZone) -> Vector3d {
    let series = Series::grs80();
    let (origin_lat, origin_lon) = zone.origin();
    let phi = coord.latitude.to_radians();
    let d_lambda = (coord.longitude - origin_lon).to_radians();

    let k = series.conformal_factor();
    let t = (phi.sin().atanh() - k * (k * phi.sin()).atanh()).sinh();
    let t_bar = (1.0 + t * t).sqrt();
    let xi = t.atan2(d_lambda.cos());
    let eta = (d_lambda.sin() / t_bar).atanh();

    let mut north = xi;
    let mut east = eta;
    for j in 1..6 {
        let m = 2.0 * j as f64;
        north += series.alpha[j] * (m * xi).sin() * (m * eta).cosh();
        east += series.alpha[j] * (m * xi).cos() * (m * eta).sinh();
    }

    let north = series.a_bar * north - series.meridian_arc(origin_lat.to_radians());
    let east = series.a_bar * east;
    Vector3d::new(east, north, coord.height)
}

/// Inverse of [`geodetic_to_plane`]: ENU metres in the zone back to degrees.
pub fn plane_to_geodetic(enu: &Vector3d, zone: PlaneZone) -> GeoCoordinate {
    let series = Series::grs80();
    let (origin_lat, origin_lon) = zone.origin();

    let xi = (enu.y + series.meridian_arc(origin_lat.to_radians())) / series.a_bar;
    let eta = enu.x / series.a_bar;

    let mut xi_p = xi;
    let mut eta_p = eta;
    for j in 1..6 {
        let m = 2.0 * j as f64;
        xi_p -= series.beta[j] * (m * xi).sin() * (m * eta).cosh();
        eta_p -= series.beta[j] * (m * xi).cos() * (m * eta).sinh();
    }

    let chi = (xi_p.sin() / eta_p.cosh()).asin();
    let phi: f64 =
        chi + (1..7).map(|j| series.delta[j] * (2.0 * j as f64 * chi).sin()).sum::<f64>();
    let d_lambda = eta_p.sinh().atan2(xi_p.cos());

    GeoCoordinate::new(phi.to_degrees(), origin_lon + d_lambda.to_degrees(), enu.z)
}
