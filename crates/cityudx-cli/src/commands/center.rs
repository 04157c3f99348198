use crate::cli::{CenterArgs, Cli};
use crate::config_loader::{load_config, open_source};
use crate::output::OutputWriter;
use crate::output_types::CenterOutput;
use anyhow::Result;
use cityudx_core::models::{MeshCode, MeshLevel};
use cityudx_geo::GeoReference;

pub fn execute(cli: &Cli, args: &CenterArgs, output: &OutputWriter) -> Result<()> {
    let config = load_config(cli, Some(args))?;
    let geo_reference = GeoReference::from_config(&config)?;
    let accessor = args.filter.apply(open_source(cli, &config)?.accessor())?;

    let center = accessor.calculate_center_point(&geo_reference)?;
    let geodetic = geo_reference.unproject(&center)?;
    let mesh_code =
        MeshCode::from_coordinate(geodetic.latitude, geodetic.longitude, MeshLevel::Third);

    let result = CenterOutput {
        zone_id: geo_reference.zone_id(),
        coordinate_system: geo_reference.coordinate_system().to_string(),
        unit_scale: geo_reference.unit_scale(),
        backend: geo_reference.backend().to_string(),
        mesh_code_count: accessor.mesh_code_count(),
        x: center.x,
        y: center.y,
        z: center.z,
        latitude: geodetic.latitude,
        longitude: geodetic.longitude,
        mesh_code: mesh_code.map(|code| code.to_string()),
    };

    if output.is_json() {
        return output.result(result);
    }

    output.section("Center point");
    output.kv("Zone", result.zone_id);
    output.kv("Axes", &result.coordinate_system);
    output.kv("Unit scale", result.unit_scale);
    output.kv("Cells", result.mesh_code_count);
    output.kv("Position", center);
    output.kv("Latitude", format!("{:.8}", result.latitude));
    output.kv("Longitude", format!("{:.8}", result.longitude));
    if let Some(code) = &result.mesh_code {
        output.kv("Mesh code", code);
    }
    output.kv("Backend", &result.backend);
    Ok(())
}
