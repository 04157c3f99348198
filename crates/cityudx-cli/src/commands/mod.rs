//! Command implementations

mod center;
mod config;
mod coverage;
mod files;
mod max_lod;
mod mesh_codes;
mod packages;

use crate::cli::{Cli, Commands, FilterArgs};
use crate::config_loader::{load_config, open_source};
use crate::output::OutputWriter;
use anyhow::Result;
use cityudx_dataset::DatasetAccessor;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match &cli.command {
        Commands::MeshCodes(args) => mesh_codes::execute(&cli, args, &output),
        Commands::Packages(args) => packages::execute(&cli, args, &output),
        Commands::Files(args) => files::execute(&cli, args, &output),
        Commands::Center(args) => center::execute(&cli, args, &output),
        Commands::Coverage(args) => coverage::execute(&cli, args, &output),
        Commands::MaxLod(args) => max_lod::execute(&cli, args, &output),
        Commands::Config => config::execute(&cli, &output),
    }
}

/// Open the selected dataset and narrow it by `filter`.
fn open_accessor(cli: &Cli, filter: &FilterArgs) -> Result<DatasetAccessor> {
    let config = load_config(cli, None)?;
    let source = open_source(cli, &config)?;
    filter.apply(source.accessor())
}
