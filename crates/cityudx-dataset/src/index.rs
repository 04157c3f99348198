//! Immutable registry of the GML files in a dataset
//!
//! Entries live in a shared arena. The mesh and package maps hold arena
//! indices, so a filtered index reuses the parent's entries (and their LOD
//! caches) and only allocates index vectors for the records it keeps.

use cityudx_core::models::{GmlFileEntry, MeshCode, PackageFlags};
use rstar::{RTree, RTreeObject, AABB};
use std::collections::BTreeMap;
use std::sync::Arc;

/// A mesh cell in the coverage tree
#[derive(Debug, Clone, PartialEq)]
struct CoveredCell {
    code: MeshCode,
    envelope: AABB<[f64; 2]>,
}

impl CoveredCell {
    fn new(code: MeshCode) -> Self {
        let extent = code.extent();
        let (min, max) = (extent.min(), extent.max());
        Self { code, envelope: AABB::from_corners([min.x, min.y], [max.x, max.y]) }
    }
}

impl RTreeObject for CoveredCell {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

pub struct CatalogIndex {
    root: String,
    arena: Arc<Vec<GmlFileEntry>>,
    /// Arena indices per cell, in discovery order
    by_mesh: BTreeMap<MeshCode, Vec<usize>>,
    /// Arena indices per single package, in mesh then discovery order
    by_package: BTreeMap<PackageFlags, Vec<usize>>,
    coverage: RTree<CoveredCell>,
}

impl CatalogIndex {
    /// Index `entries`, which must be in discovery order.
    pub fn from_entries(root: impl Into<String>, entries: Vec<GmlFileEntry>) -> Self {
        let arena = Arc::new(entries);
        let selected: Vec<usize> = (0..arena.len()).collect();
        Self::from_selection(root.into(), arena, selected)
    }

    fn from_selection(root: String, arena: Arc<Vec<GmlFileEntry>>, selected: Vec<usize>) -> Self {
        let mut by_mesh: BTreeMap<MeshCode, Vec<usize>> = BTreeMap::new();
        for &i in &selected {
            by_mesh.entry(arena[i].mesh_code()).or_default().push(i);
        }

        let mut by_package: BTreeMap<PackageFlags, Vec<usize>> = BTreeMap::new();
        for indices in by_mesh.values() {
            for &i in indices {
                by_package.entry(arena[i].package()).or_default().push(i);
            }
        }

        let coverage = RTree::bulk_load(by_mesh.keys().copied().map(CoveredCell::new).collect());
        Self { root, arena, by_mesh, by_package, coverage }
    }

    /// Root locator the index was built from, for diagnostics.
    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.by_mesh.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_mesh.is_empty()
    }

    /// Distinct cells, sorted.
    pub fn mesh_codes(&self) -> impl Iterator<Item = MeshCode> + '_ {
        self.by_mesh.keys().copied()
    }

    pub fn mesh_code_count(&self) -> usize {
        self.by_mesh.len()
    }

    /// OR of the package of every entry in the index.
    pub fn packages(&self) -> PackageFlags {
        self.by_package.keys().fold(PackageFlags::NONE, |acc, flag| acc | *flag)
    }

    /// Entries whose package intersects `flags`, in mesh then discovery order.
    pub fn files(&self, flags: PackageFlags) -> Vec<&GmlFileEntry> {
        let mut matching: Vec<usize> = self
            .by_package
            .iter()
            .filter(|(package, _)| package.intersects(flags))
            .flat_map(|(_, indices)| indices.iter().copied())
            .collect();
        // A single package list is already ordered; merging several is not.
        matching.sort_unstable_by_key(|&i| (self.arena[i].mesh_code(), i));
        matching.into_iter().map(|i| &self.arena[i]).collect()
    }

    pub fn file_count(&self, flags: PackageFlags) -> usize {
        self.by_package
            .iter()
            .filter(|(package, _)| package.intersects(flags))
            .map(|(_, indices)| indices.len())
            .sum()
    }

    /// Every entry, in mesh then discovery order.
    pub fn entries(&self) -> impl Iterator<Item = &GmlFileEntry> + '_ {
        self.by_mesh.values().flatten().map(|&i| &self.arena[i])
    }

    /// A new index holding only entries whose cell is one of `cells`.
    pub fn retain_cells<'a>(&self, cells: impl IntoIterator<Item = &'a MeshCode>) -> CatalogIndex {
        let mut wanted: Vec<MeshCode> = cells.into_iter().copied().collect();
        wanted.sort_unstable();
        wanted.dedup();

        let selected: Vec<usize> = wanted
            .iter()
            .filter_map(|code| self.by_mesh.get(code))
            .flatten()
            .copied()
            .collect();
        Self::from_selection(self.root.clone(), Arc::clone(&self.arena), selected)
    }

    /// Indexed cells whose extent overlaps a lon/lat rectangle.
    pub fn cells_overlapping(&self, extent: &geo::Rect<f64>) -> Vec<MeshCode> {
        let (min, max) = (extent.min(), extent.max());
        let query = AABB::from_corners([min.x, min.y], [max.x, max.y]);
        let mut cells: Vec<MeshCode> =
            self.coverage.locate_in_envelope_intersecting(&query).map(|cell| cell.code).collect();
        cells.sort_unstable();
        cells
    }

    /// Path of an entry below its `udx` folder, with `/` separators.
    ///
    /// `None` when the locator does not follow the UDX layout.
    pub fn relative_path(entry: &GmlFileEntry) -> Option<String> {
        let locator = entry.locator().to_string();
        let segments: Vec<&str> = locator.split(['/', '\\']).filter(|s| !s.is_empty()).collect();
        let udx = segments.iter().rposition(|s| *s == "udx")?;
        let rest = &segments[udx + 1..];
        (!rest.is_empty()).then(|| rest.join("/"))
    }
}

impl std::fmt::Debug for CatalogIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogIndex")
            .field("root", &self.root)
            .field("cells", &self.by_mesh.len())
            .field("entries", &self.len())
            .finish()
    }
}
