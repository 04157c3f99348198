//! Dataset sources: where an index comes from

use cityudx_core::error::Result;
use cityudx_core::formats::GmlLodScanner;
use cityudx_core::ports::{CatalogClient, GmlContentReader};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::accessor::DatasetAccessor;
use crate::index::CatalogIndex;
use crate::remote::HttpCatalogClient;
use crate::{local, remote};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Local,
    Remote,
}

impl fmt::Display for SourceMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SourceMode::Local => f.write_str("local"),
            SourceMode::Remote => f.write_str("remote"),
        }
    }
}

/// The two ways of listing a dataset
pub enum Backend {
    /// A folder containing `udx/`
    Local { root: PathBuf },
    /// A dataset id served by a catalog
    Remote { client: Arc<dyn CatalogClient>, dataset_id: String },
}

impl Backend {
    pub fn mode(&self) -> SourceMode {
        match self {
            Backend::Local { .. } => SourceMode::Local,
            Backend::Remote { .. } => SourceMode::Remote,
        }
    }

    pub fn root(&self) -> String {
        match self {
            Backend::Local { root } => root.display().to_string(),
            Backend::Remote { client, .. } => client.root().to_string(),
        }
    }

    fn build_index(&self, reader: Arc<dyn GmlContentReader>) -> Result<CatalogIndex> {
        match self {
            Backend::Local { root } => local::build_index(root, reader),
            Backend::Remote { client, dataset_id } => {
                remote::build_index(client.as_ref(), dataset_id, reader)
            }
        }
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Local { root } => f.debug_struct("Local").field("root", root).finish(),
            Backend::Remote { client, dataset_id } => f
                .debug_struct("Remote")
                .field("root", &client.root())
                .field("dataset_id", dataset_id)
                .finish(),
        }
    }
}

/// A dataset and its index, built once at construction.
#[derive(Debug)]
pub struct DatasetSource {
    backend: Backend,
    index: Arc<CatalogIndex>,
}

impl DatasetSource {
    /// Index a local folder, reading GML content from disk.
    pub fn create_local(root: impl AsRef<Path>) -> Result<Self> {
        let backend = Backend::Local { root: root.as_ref().to_path_buf() };
        Self::from_backend(backend, Arc::new(GmlLodScanner::new()))
    }

    /// Index a dataset served by the catalog at `catalog_root_url`.
    pub fn create_remote(catalog_root_url: &str, dataset_id: &str) -> Result<Self> {
        let client = Arc::new(HttpCatalogClient::new(catalog_root_url)?);
        let backend = Backend::Remote { client, dataset_id: dataset_id.to_string() };
        Self::from_backend(backend, Arc::new(GmlLodScanner::new()))
    }

    /// Build the index for `backend`, reading GML content through `reader`.
    ///
    /// Fails with `RootUnavailable` when the folder or catalog cannot be
    /// listed; no partial index is ever exposed.
    pub fn from_backend(backend: Backend, reader: Arc<dyn GmlContentReader>) -> Result<Self> {
        let index = Arc::new(backend.build_index(reader)?);
        Ok(Self { backend, index })
    }

    pub fn mode(&self) -> SourceMode {
        self.backend.mode()
    }

    pub fn root(&self) -> String {
        self.backend.root()
    }

    pub fn backend(&self) -> &Backend {
        &self.backend
    }

    /// A query view over the whole dataset.
    pub fn accessor(&self) -> DatasetAccessor {
        DatasetAccessor::new(Arc::clone(&self.index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::remote::StaticCatalogClient;
    use cityudx_core::models::FileLocator;
    use cityudx_core::ports::CatalogFile;
    use cityudx_core::UdxError;
    use std::fs;
    use tempfile::TempDir;

    struct NoContent;

    impl GmlContentReader for NoContent {
        fn max_lod(&self, _locator: &FileLocator) -> Result<u32> {
            Ok(0)
        }
    }

    #[test]
    fn test_local_source() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("udx/bldg");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("53392642_bldg_6697_op.gml"), "<x/>").unwrap();

        let source = DatasetSource::create_local(temp.path()).unwrap();
        assert_eq!(source.mode(), SourceMode::Local);
        assert_eq!(source.accessor().mesh_code_count(), 1);
    }

    #[test]
    fn test_local_source_missing_root() {
        let result = DatasetSource::create_local("/definitely/not/a/dataset");
        assert!(matches!(result, Err(UdxError::RootUnavailable { .. })));
    }

    #[test]
    fn test_remote_source_with_static_client() {
        let url = "https://catalog.example.com/d/udx/tran/53392642_tran_6697_op.gml";
        let client = StaticCatalogClient::new("https://catalog.example.com")
            .with_dataset("demo", vec![CatalogFile::new(url)]);
        let backend = Backend::Remote { client: Arc::new(client), dataset_id: "demo".into() };
        let source = DatasetSource::from_backend(backend, Arc::new(NoContent)).unwrap();

        assert_eq!(source.mode(), SourceMode::Remote);
        assert_eq!(source.root(), "https://catalog.example.com");
        assert_eq!(source.accessor().gml_file_count(cityudx_core::models::PackageFlags::ROAD), 1);
    }

    #[test]
    fn test_accessors_share_one_index() {
        let client = StaticCatalogClient::new("mem").with_dataset(
            "demo",
            vec![CatalogFile::new("mem/udx/bldg/53392642_bldg_6697_op.gml")],
        );
        let backend = Backend::Remote { client: Arc::new(client), dataset_id: "demo".into() };
        let source = DatasetSource::from_backend(backend, Arc::new(NoContent)).unwrap();

        let a = source.accessor();
        let b = source.accessor();
        assert!(a.shares_index_with(&b));
    }
}
