//! Remote catalog backend
//!
//! The catalog answers `GET {base}/api/sdk/datasets/{id}/files` with either a
//! flat JSON array of GML URLs, or an object mapping package token to
//! `[{ "code", "url", "maxLod" }]`.

use cityudx_core::error::{Result, UdxError};
use cityudx_core::models::{FileLocator, GmlFileEntry};
use cityudx_core::ports::{CatalogClient, CatalogFile, GmlContentReader};
use reqwest::blocking::Client;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::index::CatalogIndex;

/// Default HTTP request timeout (30 seconds).
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Urls(Vec<String>),
    ByPackage(BTreeMap<String, Vec<ListedFile>>),
}

#[derive(Deserialize)]
struct ListedFile {
    url: String,
    #[serde(rename = "maxLod", default)]
    max_lod: Option<u32>,
}

/// Decode a catalog response body.
///
/// Grouped listings are flattened in token order, keeping the listed order
/// within each token.
pub fn decode_listing(url: &str, body: &str) -> Result<Vec<CatalogFile>> {
    let listing: Listing = serde_json::from_str(body)
        .map_err(|e| UdxError::Catalog { url: url.to_string(), reason: e.to_string() })?;

    Ok(match listing {
        Listing::Urls(urls) => urls.into_iter().map(CatalogFile::new).collect(),
        Listing::ByPackage(groups) => groups
            .into_values()
            .flatten()
            .map(|file| CatalogFile { url: file.url, max_lod: file.max_lod })
            .collect(),
    })
}

/// HTTP-based implementation of [`CatalogClient`].
#[derive(Clone)]
pub struct HttpCatalogClient {
    base_url: String,
    client: Client,
    timeout: Duration,
}

impl std::fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpCatalogClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }

    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cityudx/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| UdxError::RootUnavailable {
                root: base_url.clone(),
                reason: format!("failed to create HTTP client: {}", e),
            })?;
        Ok(Self { base_url, client, timeout })
    }

    pub fn files_url(&self, dataset_id: &str) -> String {
        format!("{}/api/sdk/datasets/{}/files", self.base_url, dataset_id)
    }

    fn fetch_text(&self, url: &str) -> Result<String> {
        let unavailable = |reason: String| UdxError::RootUnavailable {
            root: self.base_url.clone(),
            reason,
        };

        let response = self.client.get(url).send().map_err(|e| {
            if e.is_timeout() {
                let secs = self.timeout.as_secs();
                unavailable(format!("timed out after {}s requesting {}", secs, url))
            } else {
                unavailable(e.to_string())
            }
        })?;

        if !response.status().is_success() {
            return Err(unavailable(format!("HTTP {} for {}", response.status(), url)));
        }

        response.text().map_err(|e| unavailable(e.to_string()))
    }
}

impl CatalogClient for HttpCatalogClient {
    fn root(&self) -> &str {
        &self.base_url
    }

    fn list_files(&self, dataset_id: &str) -> Result<Vec<CatalogFile>> {
        let url = self.files_url(dataset_id);
        let body = self.fetch_text(&url)?;
        decode_listing(&url, &body)
    }
}

/// In-memory catalog, for offline use and tests.
#[derive(Debug, Clone, Default)]
pub struct StaticCatalogClient {
    root: String,
    datasets: HashMap<String, Vec<CatalogFile>>,
}

impl StaticCatalogClient {
    pub fn new(root: impl Into<String>) -> Self {
        Self { root: root.into(), datasets: HashMap::new() }
    }

    pub fn with_dataset(mut self, dataset_id: impl Into<String>, files: Vec<CatalogFile>) -> Self {
        self.datasets.insert(dataset_id.into(), files);
        self
    }
}

impl CatalogClient for StaticCatalogClient {
    fn root(&self) -> &str {
        &self.root
    }

    fn list_files(&self, dataset_id: &str) -> Result<Vec<CatalogFile>> {
        self.datasets.get(dataset_id).cloned().ok_or_else(|| UdxError::RootUnavailable {
            root: self.root.clone(),
            reason: format!("unknown dataset {:?}", dataset_id),
        })
    }
}

/// Build an index from a catalog listing.
///
/// Listed URLs go through the same naming rules as local paths; entries
/// that do not parse are skipped.
pub fn build_index(
    client: &dyn CatalogClient,
    dataset_id: &str,
    reader: Arc<dyn GmlContentReader>,
) -> Result<CatalogIndex> {
    let files = client.list_files(dataset_id)?;

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let locator = FileLocator::Remote(file.url);
        if !locator.is_gml() {
            warn!(url = %locator, "Skipping non-GML catalog entry");
            continue;
        }
        match GmlFileEntry::from_locator(locator.clone(), Arc::clone(&reader)) {
            Ok(entry) => entries.push(match file.max_lod {
                Some(lod) => entry.with_max_lod(lod),
                None => entry,
            }),
            Err(e) => warn!(url = %locator, error = %e, "Skipping catalog entry"),
        }
    }

    let root = format!("{}#{}", client.root(), dataset_id);
    let index = CatalogIndex::from_entries(root, entries);
    info!(
        backend = "remote",
        root = client.root(),
        dataset = dataset_id,
        cells = index.mesh_code_count(),
        entries = index.len(),
        "Dataset index built"
    );
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityudx_core::models::PackageFlags;

    struct NoContent;

    impl GmlContentReader for NoContent {
        fn max_lod(&self, _locator: &FileLocator) -> Result<u32> {
            Ok(0)
        }
    }

    #[test]
    fn test_decode_flat_listing() {
        let body = r#"["https://x/udx/bldg/53392642_bldg_6697_op.gml", "https://x/udx/tran/53392642_tran_6697_op.gml"]"#;
        let files = decode_listing("https://x/api", body).unwrap();
        assert_eq!(files.len(), 2);
        assert_eq!(files[0].max_lod, None);
    }

    #[test]
    fn test_decode_grouped_listing() {
        let body = r#"{
            "tran": [{"code": "53392642", "url": "https://x/udx/tran/53392642_tran_6697_op.gml", "maxLod": 1}],
            "bldg": [
                {"code": "53392642", "url": "https://x/udx/bldg/53392642_bldg_6697_op.gml", "maxLod": 2},
                {"code": "53392670", "url": "https://x/udx/bldg/53392670_bldg_6697_op.gml"}
            ]
        }"#;
        let files = decode_listing("https://x/api", body).unwrap();
        assert_eq!(files.len(), 3);
        // Token order: bldg before tran
        assert!(files[0].url.contains("/bldg/"));
        assert_eq!(files[0].max_lod, Some(2));
        assert_eq!(files[1].max_lod, None);
        assert_eq!(files[2].max_lod, Some(1));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let result = decode_listing("https://x/api", r#"{"bldg": 5}"#);
        assert!(matches!(result, Err(UdxError::Catalog { .. })));
        assert!(matches!(decode_listing("https://x/api", "<html>"), Err(UdxError::Catalog { .. })));
    }

    #[test]
    fn test_files_url_trims_trailing_slash() {
        let client = HttpCatalogClient::new("https://catalog.example.com/").unwrap();
        assert_eq!(
            client.files_url("23ku"),
            "https://catalog.example.com/api/sdk/datasets/23ku/files"
        );
        assert_eq!(client.root(), "https://catalog.example.com");
    }

    #[test]
    fn test_build_index_seeds_lod_and_skips_bad_entries() {
        let client = StaticCatalogClient::new("https://x").with_dataset(
            "demo",
            vec![
                CatalogFile::new("https://x/udx/bldg/53392642_bldg_6697_op.gml").with_max_lod(2),
                CatalogFile::new("https://x/udx/bldg/badname_bldg_6697_op.gml"),
                CatalogFile::new("https://x/udx/bldg/53392642_bldg_6697_appearance.zip"),
            ],
        );

        let index = build_index(&client, "demo", Arc::new(NoContent)).unwrap();
        assert_eq!(index.len(), 1);
        let entry = index.files(PackageFlags::BUILDING)[0];
        assert_eq!(entry.cached_max_lod(), Some(2));
    }

    #[test]
    fn test_unknown_dataset_is_unavailable() {
        let client = StaticCatalogClient::new("https://x");
        let result = build_index(&client, "missing", Arc::new(NoContent));
        assert!(matches!(result, Err(UdxError::RootUnavailable { .. })));
    }
}
