use crate::cli::{Cli, FilterArgs};
use crate::output::OutputWriter;
use crate::output_types::PackageRow;
use anyhow::Result;

pub fn execute(cli: &Cli, args: &FilterArgs, output: &OutputWriter) -> Result<()> {
    let accessor = super::open_accessor(cli, args)?;

    let rows: Vec<PackageRow> = accessor
        .packages()
        .iter()
        .map(|package| PackageRow {
            package: package.name().unwrap_or("Unknown").to_string(),
            token: package.token().unwrap_or("-").to_string(),
            files: accessor.gml_file_count(package),
        })
        .collect();

    output.table(rows)
}
