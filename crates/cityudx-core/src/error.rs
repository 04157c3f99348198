//! Error types for cityudx

use thiserror::Error;

use crate::models::mesh_code::MeshLevel;

/// Rejection reasons for a mesh code string.
///
/// Parsing never coerces: a malformed string is always one of these.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MeshCodeError {
    #[error("Invalid mesh code length {len}: expected 6 (second level) or 8 (third level) digits")]
    InvalidLength { len: usize },

    #[error("Mesh code contains non-digit character {found:?} at position {position}")]
    NonDigit { position: usize, found: char },

    #[error("Digit {value} at position {digit} is out of range for a {level} mesh")]
    DigitOutOfRange {
        level: MeshLevel,
        digit: usize,
        value: u8,
    },
}

#[derive(Debug, Error)]
pub enum UdxError {
    // Mesh code errors
    #[error("Invalid mesh code: {0}")]
    MeshCode(#[from] MeshCodeError),

    // Source errors
    #[error("Dataset root unavailable at {root}: {reason}")]
    RootUnavailable { root: String, reason: String },

    #[error("Catalog listing from {url} could not be decoded: {reason}")]
    Catalog { url: String, reason: String },

    // Accessor errors
    #[error("Accessor has no visible mesh codes")]
    EmptyAccessor,

    #[error("Could not read GML content from {locator}: {reason}")]
    UnreadableContent { locator: String, reason: String },

    // Projection errors
    #[error("Invalid plane rectangular zone {zone}: expected 1 to 19")]
    InvalidZone { zone: i32 },

    // Configuration errors
    #[error("Missing required configuration: {key}")]
    ConfigMissing { key: String },

    #[error("Invalid configuration value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },
}

pub type Result<T> = std::result::Result<T, UdxError>;
