//! Read-only query view over a dataset index

use cityudx_core::error::{Result, UdxError};
use cityudx_core::models::{GeoCoordinate, GmlFileEntry, MeshCode, PackageFlags, Vector3d};
use cityudx_geo::GeoReference;
use geo::Rect;
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::debug;

use crate::index::CatalogIndex;

/// Queries over the entries visible through one [`CatalogIndex`].
///
/// Cloning is cheap; filtered accessors own a new index that shares entry
/// storage with the parent, and either can be dropped first.
#[derive(Debug, Clone)]
pub struct DatasetAccessor {
    index: Arc<CatalogIndex>,
}

impl DatasetAccessor {
    pub fn new(index: Arc<CatalogIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &CatalogIndex {
        &self.index
    }

    /// Distinct cells, sorted by mesh code order.
    pub fn mesh_codes(&self) -> Vec<MeshCode> {
        self.index.mesh_codes().collect()
    }

    pub fn mesh_code_count(&self) -> usize {
        self.index.mesh_code_count()
    }

    /// OR of the packages visible through this accessor.
    pub fn packages(&self) -> PackageFlags {
        self.index.packages()
    }

    /// Entries whose package intersects `package`, in mesh then discovery order.
    pub fn get_gml_files(&self, package: PackageFlags) -> Vec<&GmlFileEntry> {
        self.index.files(package)
    }

    pub fn gml_file_count(&self, package: PackageFlags) -> usize {
        self.index.file_count(package)
    }

    pub fn entries(&self) -> impl Iterator<Item = &GmlFileEntry> + '_ {
        self.index.entries()
    }

    /// Keep only entries whose cell is exactly one of `cells`.
    ///
    /// Cells the dataset does not cover are ignored.
    pub fn filter_by_mesh_codes<'a>(
        &self,
        cells: impl IntoIterator<Item = &'a MeshCode>,
    ) -> DatasetAccessor {
        let filtered = self.index.retain_cells(cells);
        debug!(
            cells = filtered.mesh_code_count(),
            entries = filtered.len(),
            "Filtered dataset by mesh codes"
        );
        DatasetAccessor::new(Arc::new(filtered))
    }

    /// Keep entries whose cell overlaps a lon/lat rectangle.
    ///
    /// The third-level cells overlapping the rectangle are selected together
    /// with their second-level parents, so area-wide files stay alongside the
    /// detailed ones. Cells that only touch the rectangle's edge are left out.
    /// Only indexed cells reached by the rectangle are enumerated.
    pub fn filter_by_extent(&self, extent: &Rect<f64>) -> DatasetAccessor {
        let mut cells = BTreeSet::new();
        for covered in self.index.cells_overlapping(extent) {
            for third in covered.thirds_overlapping(extent) {
                cells.insert(third.as_second());
                cells.insert(third);
            }
        }
        self.filter_by_mesh_codes(&cells)
    }

    /// Mean of the distinct cell centers, projected through `geo_reference`.
    pub fn calculate_center_point(&self, geo_reference: &GeoReference) -> Result<Vector3d> {
        let codes: BTreeSet<MeshCode> = self.index.mesh_codes().collect();
        if codes.is_empty() {
            return Err(UdxError::EmptyAccessor);
        }

        let count = codes.len() as f64;
        let (lat, lon, height) = codes.iter().map(MeshCode::center_point).fold(
            (0.0, 0.0, 0.0),
            |(lat, lon, height), c| (lat + c.latitude, lon + c.longitude, height + c.height),
        );
        let mean = GeoCoordinate::new(lat / count, lon / count, height / count);
        geo_reference.project(&mean)
    }

    /// True when both accessors read the same index.
    pub fn shares_index_with(&self, other: &DatasetAccessor) -> bool {
        Arc::ptr_eq(&self.index, &other.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::coord;
    use cityudx_core::models::{CoordinateSystem, FileLocator};
    use cityudx_core::ports::GmlContentReader;

    struct NoContent;

    impl GmlContentReader for NoContent {
        fn max_lod(&self, _locator: &FileLocator) -> Result<u32> {
            Ok(0)
        }
    }

    fn accessor(paths: &[&str]) -> DatasetAccessor {
        let entries = paths
            .iter()
            .map(|p| {
                GmlFileEntry::from_locator(FileLocator::Local((*p).into()), Arc::new(NoContent))
                    .unwrap()
            })
            .collect();
        DatasetAccessor::new(Arc::new(CatalogIndex::from_entries("/d", entries)))
    }

    fn code(s: &str) -> MeshCode {
        MeshCode::parse(s).unwrap()
    }

    #[test]
    fn test_empty_accessor_center() {
        let empty = accessor(&[]);
        let geo_ref = GeoReference::for_zone(9).unwrap();
        assert!(matches!(empty.calculate_center_point(&geo_ref), Err(UdxError::EmptyAccessor)));
    }

    #[test]
    fn test_center_weights_cells_not_files() {
        let few = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/bldg/53392670_bldg_6697_op.gml",
        ]);
        let many = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/tran/53392642_tran_6697_op.gml",
            "/d/udx/urf/53392642_urf_6697_op.gml",
            "/d/udx/bldg/53392670_bldg_6697_op.gml",
        ]);
        let geo_ref = GeoReference::for_zone(9).unwrap();
        assert_eq!(
            few.calculate_center_point(&geo_ref).unwrap(),
            many.calculate_center_point(&geo_ref).unwrap()
        );
    }

    #[test]
    fn test_center_of_single_cell_matches_its_projection() {
        let single = accessor(&["/d/udx/bldg/53392642_bldg_6697_op.gml"]);
        let geo_ref = GeoReference::new(9, Vector3d::ZERO, 1.0, CoordinateSystem::Eun).unwrap();
        let expected = geo_ref.project(&code("53392642").center_point()).unwrap();
        let center = single.calculate_center_point(&geo_ref).unwrap();
        assert!((center - expected).length() < 1e-6);
    }

    #[test]
    fn test_filter_is_independent_of_parent() {
        let parent = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/bldg/53392670_bldg_6697_op.gml",
        ]);
        let child = parent.filter_by_mesh_codes(&[code("53392670")]);
        assert!(!child.shares_index_with(&parent));
        drop(parent);
        assert_eq!(child.mesh_codes(), vec![code("53392670")]);
        assert_eq!(child.get_gml_files(PackageFlags::BUILDING).len(), 1);
    }

    #[test]
    fn test_filter_by_extent_includes_second_level_parent() {
        let dataset = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/bldg/53392670_bldg_6697_op.gml",
            "/d/udx/luse/533926_luse_6697_op.gml",
            "/d/udx/luse/533927_luse_6697_op.gml",
        ]);
        let extent = code("53392642").extent();
        let inner = Rect::new(
            coord! { x: extent.min().x + 1e-5, y: extent.min().y + 1e-5 },
            coord! { x: extent.max().x - 1e-5, y: extent.max().y - 1e-5 },
        );

        let filtered = dataset.filter_by_extent(&inner);
        assert_eq!(filtered.mesh_codes(), vec![code("533926"), code("53392642")]);
        assert_eq!(filtered.packages(), PackageFlags::BUILDING | PackageFlags::LAND_USE);
    }

    #[test]
    fn test_filter_by_exact_cell_extent_skips_touching_neighbours() {
        let dataset = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/bldg/53392643_bldg_6697_op.gml",
            "/d/udx/bldg/53392652_bldg_6697_op.gml",
            "/d/udx/bldg/53392632_bldg_6697_op.gml",
            "/d/udx/luse/533926_luse_6697_op.gml",
        ]);

        let filtered = dataset.filter_by_extent(&code("53392642").extent());
        assert_eq!(filtered.mesh_codes(), vec![code("533926"), code("53392642")]);
    }

    #[test]
    fn test_filter_by_extent_outside_coverage_is_empty() {
        let dataset = accessor(&["/d/udx/bldg/53392642_bldg_6697_op.gml"]);
        let far = Rect::new(coord! { x: 135.0, y: 34.0 }, coord! { x: 135.1, y: 34.1 });
        assert_eq!(dataset.filter_by_extent(&far).mesh_code_count(), 0);
    }

    #[test]
    fn test_entries_match_all_packages() {
        let dataset = accessor(&[
            "/d/udx/bldg/53392642_bldg_6697_op.gml",
            "/d/udx/zzz/53392642_zzz_6697_op.gml",
        ]);
        assert_eq!(dataset.entries().count(), 2);
        assert_eq!(dataset.get_gml_files(PackageFlags::all()).len(), 2);
        assert!(dataset.packages().contains(PackageFlags::UNKNOWN));
    }
}
