use cityudx_core::models::PackageFlags;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// cityudx - Inspect 3D city model datasets keyed by mesh code
#[derive(Parser, Debug)]
#[command(name = "cityudx")]
#[command(about = "Inspect 3D city model (CityGML/UDX) datasets", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Configuration file (TOML); defaults to ./cityudx.toml when present
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Dataset folder containing `udx/`
    #[arg(long, global = true, value_name = "PATH", conflicts_with = "remote")]
    pub local: Option<PathBuf>,

    /// Dataset id served by the remote catalog
    #[arg(long, global = true, value_name = "DATASET_ID")]
    pub remote: Option<String>,

    /// Base URL of the remote catalog
    #[arg(long, global = true, value_name = "URL")]
    pub catalog_url: Option<String>,

    /// HTTP timeout in seconds for catalog and GML downloads
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the mesh codes covered by the dataset
    MeshCodes(FilterArgs),

    /// Show the packages present in the dataset
    Packages(FilterArgs),

    /// List GML files
    Files(FilesArgs),

    /// Project the mean cell center into the local frame
    Center(CenterArgs),

    /// Print covered cells as a GeoJSON FeatureCollection
    Coverage(FilterArgs),

    /// Read the maximum LOD of GML files
    MaxLod(FilesArgs),

    /// Show resolved configuration and where each value came from
    Config,
}

/// Narrow the dataset before running a command
#[derive(Args, Debug, Default)]
pub struct FilterArgs {
    /// Keep only these mesh codes (repeatable)
    #[arg(long = "mesh", value_name = "CODE")]
    pub mesh_codes: Vec<String>,

    /// Keep cells overlapping a lon/lat box: MIN_LON,MIN_LAT,MAX_LON,MAX_LAT
    #[arg(long, value_name = "BBOX", allow_hyphen_values = true)]
    pub bbox: Option<String>,
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Packages to include, as tokens or names separated by commas (e.g. bldg,tran)
    #[arg(long, short = 'p', value_parser = parse_packages)]
    pub package: Option<PackageFlags>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

#[derive(Args, Debug)]
pub struct CenterArgs {
    /// Plane rectangular zone (1 to 19)
    #[arg(long)]
    pub zone: Option<i32>,

    /// Axis convention of the output: ENU, WUN, EUN or ESU
    #[arg(long, value_name = "AXES")]
    pub axis: Option<String>,

    /// Scene units per metre divisor (e.g. 0.01 for centimetres)
    #[arg(long)]
    pub unit_scale: Option<f64>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Parse `bldg,tran` or `Building,Road` into one flag set.
pub fn parse_packages(s: &str) -> Result<PackageFlags, String> {
    s.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .try_fold(PackageFlags::NONE, |acc, part| {
            PackageFlags::parse_token_or_name(part)
                .map(|flag| acc | flag)
                .ok_or_else(|| format!("unknown package {:?}", part))
        })
        .and_then(|flags| {
            if flags.is_empty() {
                Err("no package given".to_string())
            } else {
                Ok(flags)
            }
        })
}
