//! Canonical coordinate and vector types used across all cityudx crates.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Geodetic position in degrees (JGD2011) with ellipsoidal height in metres
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
    pub height: f64,
}

impl GeoCoordinate {
    pub fn new(latitude: f64, longitude: f64, height: f64) -> Self {
        Self { latitude, longitude, height }
    }
}

/// Three-component double precision vector
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vector3d {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3d {
    pub const ZERO: Vector3d = Vector3d { x: 0.0, y: 0.0, z: 0.0 };

    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn length(&self) -> f64 {
        self.dot(self).sqrt()
    }

    pub fn dot(&self, other: &Vector3d) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }
}

impl Add for Vector3d {
    type Output = Vector3d;

    fn add(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vector3d {
    type Output = Vector3d;

    fn sub(self, rhs: Vector3d) -> Vector3d {
        Vector3d::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f64> for Vector3d {
    type Output = Vector3d;

    fn mul(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

impl Div<f64> for Vector3d {
    type Output = Vector3d;

    fn div(self, rhs: f64) -> Vector3d {
        Vector3d::new(self.x / rhs, self.y / rhs, self.z / rhs)
    }
}

impl Neg for Vector3d {
    type Output = Vector3d;

    fn neg(self) -> Vector3d {
        Vector3d::new(-self.x, -self.y, -self.z)
    }
}

impl fmt::Display for Vector3d {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3}, {:.3})", self.x, self.y, self.z)
    }
}

/// Axis convention of the local Cartesian frame
///
/// Letters name what the X, Y and Z axes point at: East/West, North/South, Up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CoordinateSystem {
    /// X east, Y north, Z up. Native axis order of PLATEAU data.
    #[default]
    Enu,
    /// X west, Y up, Z north
    Wun,
    /// X east, Y up, Z north (left-handed, Unity style)
    Eun,
    /// X east, Y south, Z up (left-handed, Unreal style)
    Esu,
}

impl CoordinateSystem {
    /// Re-express an ENU vector in this axis convention.
    pub fn from_enu(&self, enu: Vector3d) -> Vector3d {
        match self {
            CoordinateSystem::Enu => enu,
            CoordinateSystem::Wun => Vector3d::new(-enu.x, enu.z, enu.y),
            CoordinateSystem::Eun => Vector3d::new(enu.x, enu.z, enu.y),
            CoordinateSystem::Esu => Vector3d::new(enu.x, -enu.y, enu.z),
        }
    }

    /// Re-express a vector in this axis convention as ENU.
    pub fn to_enu(&self, v: Vector3d) -> Vector3d {
        match self {
            CoordinateSystem::Enu => v,
            CoordinateSystem::Wun => Vector3d::new(-v.x, v.z, v.y),
            CoordinateSystem::Eun => Vector3d::new(v.x, v.z, v.y),
            CoordinateSystem::Esu => Vector3d::new(v.x, -v.y, v.z),
        }
    }
}

impl fmt::Display for CoordinateSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoordinateSystem::Enu => "ENU",
            CoordinateSystem::Wun => "WUN",
            CoordinateSystem::Eun => "EUN",
            CoordinateSystem::Esu => "ESU",
        };
        f.write_str(name)
    }
}
