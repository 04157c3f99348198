//! GeoJSON view of the covered cells

use crate::cli::{Cli, FilterArgs};
use crate::output::OutputWriter;
use anyhow::Result;
use cityudx_core::models::{MeshCode, PackageFlags};
use cityudx_dataset::DatasetAccessor;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};

pub fn execute(cli: &Cli, args: &FilterArgs, output: &OutputWriter) -> Result<()> {
    let accessor = super::open_accessor(cli, args)?;
    let collection = coverage_collection(&accessor);

    if output.is_json() {
        output.result(collection)
    } else {
        output.data(&collection)
    }
}

pub(crate) fn coverage_collection(accessor: &DatasetAccessor) -> FeatureCollection {
    let entries = accessor.get_gml_files(PackageFlags::all());

    let features = accessor
        .mesh_codes()
        .into_iter()
        .map(|code| {
            let files = entries.iter().filter(|e| e.mesh_code() == code).count();
            let packages = entries
                .iter()
                .filter(|e| e.mesh_code() == code)
                .fold(PackageFlags::NONE, |acc, e| acc | e.package());
            cell_feature(code, files, packages)
        })
        .collect();

    FeatureCollection { bbox: None, features, foreign_members: None }
}

fn cell_feature(code: MeshCode, files: usize, packages: PackageFlags) -> Feature {
    let extent = code.extent();
    let (min, max) = (extent.min(), extent.max());
    let ring = vec![
        vec![min.x, min.y],
        vec![max.x, min.y],
        vec![max.x, max.y],
        vec![min.x, max.y],
        vec![min.x, min.y],
    ];

    let mut properties = JsonObject::new();
    properties.insert("mesh_code".to_string(), code.to_string().into());
    properties.insert("level".to_string(), code.level().to_string().into());
    properties.insert("files".to_string(), files.into());
    properties.insert("packages".to_string(), packages.to_string().into());

    Feature {
        bbox: None,
        geometry: Some(Geometry::new(Value::Polygon(vec![ring]))),
        id: None,
        properties: Some(properties),
        foreign_members: None,
    }
}
