use crate::cli::{Cli, FilesArgs};
use crate::output::OutputWriter;
use crate::output_types::FileRow;
use anyhow::Result;
use cityudx_core::models::PackageFlags;
use cityudx_dataset::CatalogIndex;

pub fn execute(cli: &Cli, args: &FilesArgs, output: &OutputWriter) -> Result<()> {
    let accessor = super::open_accessor(cli, &args.filter)?;
    let packages = args.package.unwrap_or_else(PackageFlags::all);

    let rows: Vec<FileRow> = accessor
        .get_gml_files(packages)
        .into_iter()
        .map(|entry| FileRow {
            mesh_code: entry.mesh_code().to_string(),
            package: entry.package().to_string(),
            path: if output.is_json() {
                entry.locator().to_string()
            } else {
                CatalogIndex::relative_path(entry).unwrap_or_else(|| entry.locator().to_string())
            },
        })
        .collect();

    output.table(rows)
}
