use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One file listed by a remote catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogFile {
    /// Absolute URL following the UDX layout
    pub url: String,

    /// Max LOD already known to the catalog, if it reports one
    #[serde(default, rename = "maxLod", skip_serializing_if = "Option::is_none")]
    pub max_lod: Option<u32>,
}

impl CatalogFile {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into(), max_lod: None }
    }

    pub fn with_max_lod(mut self, max_lod: u32) -> Self {
        self.max_lod = Some(max_lod);
        self
    }
}

/// Lists the files of a remotely hosted dataset
///
/// Implementations own their transport policy (timeouts, retries) and report a
/// single outcome: the full listing, or `UdxError::RootUnavailable` when the
/// catalog cannot be reached.
pub trait CatalogClient: Send + Sync {
    /// Base URL the client talks to, used in diagnostics.
    fn root(&self) -> &str;

    fn list_files(&self, dataset_id: &str) -> Result<Vec<CatalogFile>>;
}
