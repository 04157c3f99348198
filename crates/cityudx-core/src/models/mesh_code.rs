//! Japanese standard grid square (JIS X 0410) mesh codes
//!
//! A first-level cell spans 40' of latitude by 1 degree of longitude. The
//! second level divides it 8 x 8 (5' x 7.5'), the third level divides a
//! second-level cell 10 x 10 (30" x 45").
//!
//! | digits | meaning                              |
//! |--------|--------------------------------------|
//! | 1-2    | `floor(latitude * 1.5)`              |
//! | 3-4    | `floor(longitude) - 100`             |
//! | 5, 6   | second-level row, column (0-7)       |
//! | 7, 8   | third-level row, column (0-9)        |

use geo::{coord, Rect};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use super::geometry::GeoCoordinate;
use crate::error::MeshCodeError;

const FIRST_LAT_DEG: f64 = 40.0 / 60.0;
const FIRST_LON_DEG: f64 = 1.0;
const SECOND_LAT_DEG: f64 = FIRST_LAT_DEG / 8.0;
const SECOND_LON_DEG: f64 = FIRST_LON_DEG / 8.0;
const THIRD_LAT_DEG: f64 = SECOND_LAT_DEG / 10.0;
const THIRD_LON_DEG: f64 = SECOND_LON_DEG / 10.0;

/// Third-level cells along each axis of the encodable grid (100 x 8 x 10).
const GRID_CELLS: f64 = 8000.0;
const GRID_SNAP: f64 = 1e-9;

/// Subdivision level of a mesh code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MeshLevel {
    /// 6 digits, roughly 10 km square
    Second,
    /// 8 digits, roughly 1 km square
    Third,
}

impl MeshLevel {
    /// Number of digits in the canonical string form
    pub fn digits(&self) -> usize {
        match self {
            MeshLevel::Second => 6,
            MeshLevel::Third => 8,
        }
    }

    fn cell_size(&self) -> (f64, f64) {
        match self {
            MeshLevel::Second => (SECOND_LAT_DEG, SECOND_LON_DEG),
            MeshLevel::Third => (THIRD_LAT_DEG, THIRD_LON_DEG),
        }
    }
}

impl fmt::Display for MeshLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MeshLevel::Second => f.write_str("second-level"),
            MeshLevel::Third => f.write_str("third-level"),
        }
    }
}

/// A validated grid-cell identifier.
///
/// Field order gives the derived ordering: coarser groups compare first, and a
/// second-level cell sorts before every third-level cell inside it. This is the
/// same order as comparing canonical strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshCode {
    first_lat: u8,
    first_lon: u8,
    second: (u8, u8),
    third: Option<(u8, u8)>,
}

impl MeshCode {
    /// Parse and validate a 6 or 8 digit mesh code.
    pub fn parse(s: &str) -> Result<Self, MeshCodeError> {
        let len = s.chars().count();
        let level = match len {
            6 => MeshLevel::Second,
            8 => MeshLevel::Third,
            _ => return Err(MeshCodeError::InvalidLength { len }),
        };

        let mut digits = [0u8; 8];
        for (position, found) in s.chars().enumerate() {
            let value = found.to_digit(10).ok_or(MeshCodeError::NonDigit { position, found })?;
            digits[position] = value as u8;
        }

        for digit in [4, 5] {
            if digits[digit] > 7 {
                return Err(MeshCodeError::DigitOutOfRange {
                    level: MeshLevel::Second,
                    digit,
                    value: digits[digit],
                });
            }
        }

        Ok(Self {
            first_lat: digits[0] * 10 + digits[1],
            first_lon: digits[2] * 10 + digits[3],
            second: (digits[4], digits[5]),
            third: match level {
                MeshLevel::Second => None,
                MeshLevel::Third => Some((digits[6], digits[7])),
            },
        })
    }

    /// The cell of the given level containing a geodetic position.
    ///
    /// Cells are closed on their south and west edges, so a cell's own
    /// south-west corner maps back to it. Returns `None` when the position is
    /// outside the range the code can express (latitude 0 to 66.67, longitude
    /// 100 to 200).
    pub fn from_coordinate(latitude: f64, longitude: f64, level: MeshLevel) -> Option<Self> {
        let (row, col) = third_grid_units(latitude, longitude);
        if !(0.0..GRID_CELLS).contains(&row) || !(0.0..GRID_CELLS).contains(&col) {
            return None;
        }
        let cell = Self::from_third_grid_index(row.floor() as u32, col.floor() as u32);
        Some(match level {
            MeshLevel::Second => cell.as_second(),
            MeshLevel::Third => cell,
        })
    }

    /// Third-level cells of this cell whose interior overlaps `extent`
    /// (x = longitude, y = latitude), row by row from the south-west.
    ///
    /// A third-level cell yields itself or nothing, and cells that only touch
    /// the edge of `extent` are left out. A zero-width extent selects the
    /// cells containing it.
    pub fn thirds_overlapping(&self, extent: &Rect<f64>) -> Vec<Self> {
        let (own_rows, own_cols) = self.third_grid_span();
        let (min_row, min_col) = third_grid_units(extent.min().y, extent.min().x);
        let (max_row, max_col) = third_grid_units(extent.max().y, extent.max().x);
        let rows = grid_span(min_row, max_row).and_then(|span| overlap(span, own_rows));
        let cols = grid_span(min_col, max_col).and_then(|span| overlap(span, own_cols));
        let (Some((first_row, last_row)), Some((first_col, last_col))) = (rows, cols) else {
            return Vec::new();
        };

        (first_row..=last_row)
            .flat_map(|row| {
                (first_col..=last_col).map(move |col| Self::from_third_grid_index(row, col))
            })
            .collect()
    }

    pub fn level(&self) -> MeshLevel {
        if self.third.is_some() {
            MeshLevel::Third
        } else {
            MeshLevel::Second
        }
    }

    /// The second-level cell containing this one.
    pub fn as_second(&self) -> Self {
        Self { third: None, ..*self }
    }

    /// Whether `other` lies inside this cell (a cell contains itself).
    pub fn contains(&self, other: &MeshCode) -> bool {
        match self.third {
            Some(_) => self == other,
            None => self.as_second() == other.as_second(),
        }
    }

    /// Cell bounds in degrees, x = longitude and y = latitude.
    pub fn extent(&self) -> Rect<f64> {
        let (lat, lon) = self.south_west();
        let (lat_size, lon_size) = self.level().cell_size();
        Rect::new(
            coord! { x: lon, y: lat },
            coord! { x: lon + lon_size, y: lat + lat_size },
        )
    }

    /// Geodetic center of the cell at height 0.
    pub fn center_point(&self) -> GeoCoordinate {
        let center = self.extent().center();
        GeoCoordinate::new(center.y, center.x, 0.0)
    }

    fn south_west(&self) -> (f64, f64) {
        let mut lat = self.first_lat as f64 * FIRST_LAT_DEG;
        let mut lon = 100.0 + self.first_lon as f64 * FIRST_LON_DEG;
        lat += self.second.0 as f64 * SECOND_LAT_DEG;
        lon += self.second.1 as f64 * SECOND_LON_DEG;
        if let Some((row, col)) = self.third {
            lat += row as f64 * THIRD_LAT_DEG;
            lon += col as f64 * THIRD_LON_DEG;
        }
        (lat, lon)
    }

    /// Rows and columns this cell covers in the continuous third-level grid.
    fn third_grid_span(&self) -> ((u32, u32), (u32, u32)) {
        let row = (self.first_lat as u32 * 8 + self.second.0 as u32) * 10;
        let col = (self.first_lon as u32 * 8 + self.second.1 as u32) * 10;
        match self.third {
            Some((r, c)) => ((row + r as u32, row + r as u32), (col + c as u32, col + c as u32)),
            None => ((row, row + 9), (col, col + 9)),
        }
    }

    fn from_third_grid_index(row: u32, col: u32) -> Self {
        Self {
            first_lat: (row / 80) as u8,
            first_lon: (col / 80) as u8,
            second: (((row / 10) % 8) as u8, ((col / 10) % 8) as u8),
            third: Some(((row % 10) as u8, (col % 10) as u8)),
        }
    }
}

/// Position in units of third-level cells: rows of 30" north of the
/// equator and columns of 45" east of 100°E. Values within `GRID_SNAP` of a
/// cell edge land exactly on it.
fn third_grid_units(latitude: f64, longitude: f64) -> (f64, f64) {
    (snap(latitude / THIRD_LAT_DEG), snap((longitude - 100.0) / THIRD_LON_DEG))
}

fn snap(units: f64) -> f64 {
    let edge = units.round();
    if (units - edge).abs() < GRID_SNAP {
        edge
    } else {
        units
    }
}

/// Grid cells whose interior overlaps `[low, high]`, or the cell containing
/// `low` when the span has no width.
fn grid_span(low: f64, high: f64) -> Option<(u32, u32)> {
    if !low.is_finite() || !high.is_finite() || high < low {
        return None;
    }
    let first = low.floor().max(0.0);
    let last = if high > low { high.ceil() - 1.0 } else { low.floor() };
    let last = last.min(GRID_CELLS - 1.0);
    (first <= last).then(|| (first as u32, last as u32))
}

fn overlap(a: (u32, u32), b: (u32, u32)) -> Option<(u32, u32)> {
    let (first, last) = (a.0.max(b.0), a.1.min(b.1));
    (first <= last).then_some((first, last))
}

impl fmt::Display for MeshCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02}{:02}{}{}",
            self.first_lat, self.first_lon, self.second.0, self.second.1
        )?;
        if let Some((row, col)) = self.third {
            write!(f, "{}{}", row, col)?;
        }
        Ok(())
    }
}

impl FromStr for MeshCode {
    type Err = MeshCodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Serialize for MeshCode {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MeshCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        MeshCode::parse(&s).map_err(serde::de::Error::custom)
    }
}
