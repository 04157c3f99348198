use crate::cli::{Cli, FilesArgs};
use crate::output::OutputWriter;
use crate::output_types::MaxLodRow;
use anyhow::Result;
use cityudx_core::models::PackageFlags;
use cityudx_dataset::CatalogIndex;

/// Unreadable files are reported per row; the command still succeeds.
pub fn execute(cli: &Cli, args: &FilesArgs, output: &OutputWriter) -> Result<()> {
    let accessor = super::open_accessor(cli, &args.filter)?;
    let packages = args.package.unwrap_or_else(PackageFlags::all);

    let mut rows = Vec::new();
    for entry in accessor.get_gml_files(packages) {
        let max_lod = match entry.max_lod() {
            Ok(lod) => Some(lod),
            Err(e) => {
                output.warning(&e);
                None
            }
        };
        rows.push(MaxLodRow {
            mesh_code: entry.mesh_code().to_string(),
            path: CatalogIndex::relative_path(entry).unwrap_or_else(|| entry.locator().to_string()),
            max_lod,
        });
    }

    output.table(rows)
}
