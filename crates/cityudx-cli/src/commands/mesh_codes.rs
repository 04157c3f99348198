use crate::cli::{Cli, FilterArgs};
use crate::output::OutputWriter;
use crate::output_types::MeshCodeRow;
use anyhow::Result;
use cityudx_core::models::{MeshCode, PackageFlags};
use std::collections::BTreeMap;

pub fn execute(cli: &Cli, args: &FilterArgs, output: &OutputWriter) -> Result<()> {
    let accessor = super::open_accessor(cli, args)?;

    let mut counts: BTreeMap<MeshCode, usize> = BTreeMap::new();
    for entry in accessor.get_gml_files(PackageFlags::all()) {
        *counts.entry(entry.mesh_code()).or_default() += 1;
    }

    let rows: Vec<MeshCodeRow> = accessor
        .mesh_codes()
        .into_iter()
        .map(|code| MeshCodeRow {
            mesh_code: code.to_string(),
            level: code.level().to_string(),
            files: counts.get(&code).copied().unwrap_or_default(),
        })
        .collect();

    output.table(rows)
}
