use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use super::mesh_code::MeshCode;
use super::package::{classify_path, PackageFlags};
use crate::error::{MeshCodeError, Result};
use crate::ports::GmlContentReader;

/// Where a GML file lives
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileLocator {
    Local(PathBuf),
    Remote(String),
}

impl FileLocator {
    /// The final path segment, without any URL query or fragment.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            FileLocator::Local(path) => path.file_name().and_then(|n| n.to_str()),
            FileLocator::Remote(url) => {
                let path = url.split(['?', '#']).next().unwrap_or(url);
                path.rsplit('/').next().filter(|s| !s.is_empty())
            }
        }
    }

    /// True when the file name ends in `.gml` (any case).
    pub fn is_gml(&self) -> bool {
        self.file_name()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("gml"))
    }

    pub fn as_path(&self) -> Option<&Path> {
        match self {
            FileLocator::Local(path) => Some(path),
            FileLocator::Remote(_) => None,
        }
    }

    pub fn as_url(&self) -> Option<&str> {
        match self {
            FileLocator::Local(_) => None,
            FileLocator::Remote(url) => Some(url),
        }
    }
}

impl fmt::Display for FileLocator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileLocator::Local(path) => write!(f, "{}", path.display()),
            FileLocator::Remote(url) => f.write_str(url),
        }
    }
}

/// Mesh code encoded as the file name prefix, e.g. `53392642` in
/// `53392642_bldg_6697_op.gml`.
pub fn mesh_code_from_file_name(file_name: &str) -> std::result::Result<MeshCode, MeshCodeError> {
    let prefix = file_name.split(['_', '.']).next().unwrap_or(file_name);
    MeshCode::parse(prefix)
}

/// A single file in a dataset index
///
/// The maximum LOD is read through the content reader on first request and
/// cached; failures are not cached.
#[derive(Clone)]
pub struct GmlFileEntry {
    mesh_code: MeshCode,
    package: PackageFlags,
    locator: FileLocator,
    max_lod: OnceLock<u32>,
    reader: Arc<dyn GmlContentReader>,
}

impl GmlFileEntry {
    pub fn new(
        mesh_code: MeshCode,
        package: PackageFlags,
        locator: FileLocator,
        reader: Arc<dyn GmlContentReader>,
    ) -> Self {
        Self { mesh_code, package, locator, max_lod: OnceLock::new(), reader }
    }

    /// Derive mesh code and package from the locator using the UDX naming rules.
    pub fn from_locator(
        locator: FileLocator,
        reader: Arc<dyn GmlContentReader>,
    ) -> std::result::Result<Self, MeshCodeError> {
        let file_name = locator.file_name().unwrap_or_default();
        let mesh_code = mesh_code_from_file_name(file_name)?;
        let package = classify_path(&locator.to_string());
        Ok(Self::new(mesh_code, package, locator, reader))
    }

    /// Seed the LOD cache with a value already known, e.g. from a catalog listing.
    pub fn with_max_lod(self, max_lod: u32) -> Self {
        let _ = self.max_lod.set(max_lod);
        self
    }

    pub fn mesh_code(&self) -> MeshCode {
        self.mesh_code
    }

    pub fn package(&self) -> PackageFlags {
        self.package
    }

    pub fn locator(&self) -> &FileLocator {
        &self.locator
    }

    /// Highest LOD marker found in the file.
    pub fn max_lod(&self) -> Result<u32> {
        if let Some(lod) = self.max_lod.get() {
            tracing::debug!(locator = %self.locator, lod, "max LOD cache hit");
            return Ok(*lod);
        }
        let lod = self.reader.max_lod(&self.locator)?;
        tracing::debug!(locator = %self.locator, lod, "max LOD computed");
        // A concurrent caller may have won the race; both computed the same value.
        let _ = self.max_lod.set(lod);
        Ok(lod)
    }

    /// The cached LOD, without touching the content reader.
    pub fn cached_max_lod(&self) -> Option<u32> {
        self.max_lod.get().copied()
    }
}

impl fmt::Debug for GmlFileEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GmlFileEntry")
            .field("mesh_code", &self.mesh_code)
            .field("package", &self.package)
            .field("locator", &self.locator)
            .field("max_lod", &self.max_lod.get())
            .finish()
    }
}

impl PartialEq for GmlFileEntry {
    fn eq(&self, other: &Self) -> bool {
        self.mesh_code == other.mesh_code
            && self.package == other.package
            && self.locator == other.locator
    }
}
