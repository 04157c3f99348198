//! Shared dataset fixtures

#![allow(dead_code)]

use cityudx_core::ports::CatalogFile;
use cityudx_dataset::StaticCatalogClient;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const MOCK_ROOT: &str = "https://mock.example.com";
pub const TOKYO_23KU: &str = "13100_tokyo23-ku_2020_citygml_3_2_op";

pub const BUILDING_LOD2: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<core:CityModel xmlns:core="http://www.opengis.net/citygml/2.0"
                xmlns:bldg="http://www.opengis.net/citygml/building/2.0"
                xmlns:gml="http://www.opengis.net/gml">
  <core:cityObjectMember>
    <bldg:Building gml:id="bldg_a">
      <bldg:lod0RoofEdge><gml:MultiSurface/></bldg:lod0RoofEdge>
      <bldg:lod1Solid><gml:Solid/></bldg:lod1Solid>
    </bldg:Building>
  </core:cityObjectMember>
  <core:cityObjectMember>
    <bldg:Building gml:id="bldg_b">
      <bldg:lod2MultiSurface><gml:MultiSurface/></bldg:lod2MultiSurface>
    </bldg:Building>
  </core:cityObjectMember>
</core:CityModel>"#;

/// A local dataset with one LOD2 building file in cell 53392642.
pub fn local_dataset() -> TempDir {
    let temp = TempDir::new().unwrap();
    write_file(temp.path(), "udx/bldg/53392642_bldg_6697_op2.gml", BUILDING_LOD2);
    temp
}

pub fn write_file(root: &Path, relative: &str, content: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

pub fn mock_url(relative: &str) -> String {
    format!("{}/{}/udx/{}", MOCK_ROOT, TOKYO_23KU, relative)
}

/// Catalog listing of the Tokyo 23 wards sample: two cells, four packages.
pub fn tokyo_23ku_files() -> Vec<CatalogFile> {
    vec![
        CatalogFile::new(mock_url("bldg/53392642_bldg_6697_2_op.gml")).with_max_lod(2),
        CatalogFile::new(mock_url("bldg/53392670_bldg_6697_2_op.gml")).with_max_lod(2),
        CatalogFile::new(mock_url("tran/53392642_tran_6697_op.gml")).with_max_lod(1),
        CatalogFile::new(mock_url("urf/53392642_urf_6697_op.gml")),
        CatalogFile::new(mock_url("luse/53392670_luse_6697_op.gml")),
    ]
}

pub fn mock_catalog() -> StaticCatalogClient {
    StaticCatalogClient::new(MOCK_ROOT).with_dataset("23ku", tokyo_23ku_files())
}
