//! City model packages (content categories) and their folder tokens

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{BitAnd, BitOr, BitOrAssign};

/// A set of content categories.
///
/// Each predefined package occupies one bit; a value may hold any combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct PackageFlags(u32);

impl PackageFlags {
    pub const NONE: PackageFlags = PackageFlags(0);
    pub const BUILDING: PackageFlags = PackageFlags(1 << 0);
    pub const ROAD: PackageFlags = PackageFlags(1 << 1);
    pub const URBAN_PLANNING_DECISION: PackageFlags = PackageFlags(1 << 2);
    pub const LAND_USE: PackageFlags = PackageFlags(1 << 3);
    pub const CITY_FURNITURE: PackageFlags = PackageFlags(1 << 4);
    pub const VEGETATION: PackageFlags = PackageFlags(1 << 5);
    pub const RELIEF: PackageFlags = PackageFlags(1 << 6);
    pub const DISASTER_RISK: PackageFlags = PackageFlags(1 << 7);
    pub const RAILWAY: PackageFlags = PackageFlags(1 << 8);
    pub const WATERWAY: PackageFlags = PackageFlags(1 << 9);
    pub const WATER_BODY: PackageFlags = PackageFlags(1 << 10);
    pub const BRIDGE: PackageFlags = PackageFlags(1 << 11);
    pub const TRACK: PackageFlags = PackageFlags(1 << 12);
    pub const SQUARE: PackageFlags = PackageFlags(1 << 13);
    pub const TUNNEL: PackageFlags = PackageFlags(1 << 14);
    pub const UNDERGROUND_FACILITY: PackageFlags = PackageFlags(1 << 15);
    pub const UNDERGROUND_BUILDING: PackageFlags = PackageFlags(1 << 16);
    pub const AREA: PackageFlags = PackageFlags(1 << 17);
    pub const OTHER_CONSTRUCTION: PackageFlags = PackageFlags(1 << 18);
    pub const GENERIC: PackageFlags = PackageFlags(1 << 19);
    /// Files under a folder whose token is not in the vocabulary.
    pub const UNKNOWN: PackageFlags = PackageFlags(1 << 31);

    /// Every single-bit package with its display name, in bit order.
    const NAMED: [(PackageFlags, &'static str); 21] = [
        (Self::BUILDING, "Building"),
        (Self::ROAD, "Road"),
        (Self::URBAN_PLANNING_DECISION, "UrbanPlanningDecision"),
        (Self::LAND_USE, "LandUse"),
        (Self::CITY_FURNITURE, "CityFurniture"),
        (Self::VEGETATION, "Vegetation"),
        (Self::RELIEF, "Relief"),
        (Self::DISASTER_RISK, "DisasterRisk"),
        (Self::RAILWAY, "Railway"),
        (Self::WATERWAY, "Waterway"),
        (Self::WATER_BODY, "WaterBody"),
        (Self::BRIDGE, "Bridge"),
        (Self::TRACK, "Track"),
        (Self::SQUARE, "Square"),
        (Self::TUNNEL, "Tunnel"),
        (Self::UNDERGROUND_FACILITY, "UndergroundFacility"),
        (Self::UNDERGROUND_BUILDING, "UndergroundBuilding"),
        (Self::AREA, "Area"),
        (Self::OTHER_CONSTRUCTION, "OtherConstruction"),
        (Self::GENERIC, "Generic"),
        (Self::UNKNOWN, "Unknown"),
    ];

    /// Folder token vocabulary. Several hazard tokens share DisasterRisk.
    const TOKENS: [(&'static str, PackageFlags); 24] = [
        ("bldg", Self::BUILDING),
        ("tran", Self::ROAD),
        ("urf", Self::URBAN_PLANNING_DECISION),
        ("luse", Self::LAND_USE),
        ("frn", Self::CITY_FURNITURE),
        ("veg", Self::VEGETATION),
        ("dem", Self::RELIEF),
        ("fld", Self::DISASTER_RISK),
        ("tnm", Self::DISASTER_RISK),
        ("lsld", Self::DISASTER_RISK),
        ("htd", Self::DISASTER_RISK),
        ("ifld", Self::DISASTER_RISK),
        ("rwy", Self::RAILWAY),
        ("wwy", Self::WATERWAY),
        ("wtr", Self::WATER_BODY),
        ("brid", Self::BRIDGE),
        ("trk", Self::TRACK),
        ("squr", Self::SQUARE),
        ("tun", Self::TUNNEL),
        ("unf", Self::UNDERGROUND_FACILITY),
        ("ubld", Self::UNDERGROUND_BUILDING),
        ("area", Self::AREA),
        ("cons", Self::OTHER_CONSTRUCTION),
        ("gen", Self::GENERIC),
    ];

    /// Every defined bit, including `UNKNOWN`.
    pub fn all() -> PackageFlags {
        Self::NAMED.iter().fold(Self::NONE, |acc, (flag, _)| acc | *flag)
    }

    pub fn is_empty(&self) -> bool {
        self.0 == 0
    }

    /// True when every bit of `other` is set in `self`.
    pub fn contains(&self, other: PackageFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn intersects(&self, other: PackageFlags) -> bool {
        self.0 & other.0 != 0
    }

    /// The single-bit packages present in this set, in bit order.
    pub fn iter(&self) -> impl Iterator<Item = PackageFlags> {
        let set = *self;
        Self::NAMED.iter().map(|(flag, _)| *flag).filter(move |flag| set.contains(*flag))
    }

    /// Display name of a single package, `None` for combinations.
    pub fn name(&self) -> Option<&'static str> {
        Self::NAMED.iter().find(|(flag, _)| flag == self).map(|(_, name)| *name)
    }

    /// Look a package up by display name, case-insensitively.
    pub fn from_name(name: &str) -> Option<PackageFlags> {
        Self::NAMED
            .iter()
            .find(|(_, n)| n.eq_ignore_ascii_case(name))
            .map(|(flag, _)| *flag)
    }

    /// Canonical folder token of a single package.
    pub fn token(&self) -> Option<&'static str> {
        Self::TOKENS.iter().find(|(_, flag)| flag == self).map(|(token, _)| *token)
    }

    /// Classify a folder or filename token. Unrecognised tokens map to
    /// `UNKNOWN` so the file still reaches the index.
    pub fn from_token(token: &str) -> PackageFlags {
        Self::TOKENS
            .iter()
            .find(|(t, _)| *t == token)
            .map(|(_, flag)| *flag)
            .unwrap_or(Self::UNKNOWN)
    }

    /// Parse either a folder token (`bldg`) or a display name (`Building`).
    pub fn parse_token_or_name(s: &str) -> Option<PackageFlags> {
        let by_token = Self::from_token(s);
        if by_token != Self::UNKNOWN {
            return Some(by_token);
        }
        Self::from_name(s)
    }
}

/// Classify a local path or remote URL by the UDX layout
/// `.../udx/<token>/.../<meshcode>_<token>_<version>.gml`.
///
/// The folder directly under `udx` wins; without one, the second
/// underscore-separated token of the file name is used.
pub fn classify_path(locator: &str) -> PackageFlags {
    let segments: Vec<&str> = locator.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
    if let Some(pos) = segments.iter().rposition(|s| *s == "udx") {
        if let Some(folder) = segments.get(pos + 1).filter(|_| pos + 2 < segments.len()) {
            return PackageFlags::from_token(folder);
        }
    }
    segments
        .last()
        .and_then(|file_name| file_name.split('_').nth(1))
        .map(PackageFlags::from_token)
        .unwrap_or(PackageFlags::UNKNOWN)
}

impl BitOr for PackageFlags {
    type Output = PackageFlags;

    fn bitor(self, rhs: PackageFlags) -> PackageFlags {
        PackageFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for PackageFlags {
    fn bitor_assign(&mut self, rhs: PackageFlags) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for PackageFlags {
    type Output = PackageFlags;

    fn bitand(self, rhs: PackageFlags) -> PackageFlags {
        PackageFlags(self.0 & rhs.0)
    }
}

impl fmt::Display for PackageFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("None");
        }
        let names: Vec<&str> = self.iter().filter_map(|flag| flag.name()).collect();
        f.write_str(&names.join(" | "))
    }
}

impl Serialize for PackageFlags {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter().filter_map(|flag| flag.name()))
    }
}

impl<'de> Deserialize<'de> for PackageFlags {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let names = Vec::<String>::deserialize(deserializer)?;
        names.iter().try_fold(PackageFlags::NONE, |acc, name| {
            PackageFlags::from_name(name)
                .map(|flag| acc | flag)
                .ok_or_else(|| serde::de::Error::custom(format!("unknown package {name:?}")))
        })
    }
}
