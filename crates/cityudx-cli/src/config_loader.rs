//! Resolve configuration and open the selected dataset

use anyhow::{bail, Context, Result};
use cityudx_core::config::{
    parse_coordinate_system, validate_zone, CliConfigOverrides, LayeredConfig,
};
use cityudx_core::formats::GmlLodScanner;
use cityudx_core::models::MeshCode;
use cityudx_dataset::{Backend, DatasetAccessor, DatasetSource, HttpCatalogClient};
use geo::{coord, Rect};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::cli::{CenterArgs, Cli, FilterArgs};

const DEFAULT_CONFIG_FILE: &str = "cityudx.toml";

/// Layer defaults, config file, environment and CLI flags, in that order.
pub fn load_config(cli: &Cli, center: Option<&CenterArgs>) -> Result<LayeredConfig> {
    let mut config = LayeredConfig::with_defaults();

    match &cli.config {
        Some(path) => {
            config = config
                .load_from_file(path)
                .with_context(|| format!("Failed to load config file {}", path.display()))?;
        }
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => {
            config = config
                .load_from_file(DEFAULT_CONFIG_FILE)
                .with_context(|| format!("Failed to load {}", DEFAULT_CONFIG_FILE))?;
        }
        None => {}
    }

    config = config.load_from_env();

    let mut overrides = CliConfigOverrides {
        catalog_url: cli.catalog_url.clone(),
        http_timeout_secs: cli.timeout,
        ..Default::default()
    };
    if let Some(args) = center {
        overrides.zone_id = args.zone.map(validate_zone).transpose()?;
        overrides.coordinate_system =
            args.axis.as_deref().map(parse_coordinate_system).transpose()?;
        overrides.unit_scale = args.unit_scale;
    }
    config.update_from_cli(overrides);
    debug!(
        zone = config.zone_id.value,
        axes = %config.coordinate_system.value,
        "configuration resolved"
    );

    Ok(config)
}

/// Build the dataset named by `--local` or `--remote`.
pub fn open_source(cli: &Cli, config: &LayeredConfig) -> Result<DatasetSource> {
    let timeout = Duration::from_secs(config.http_timeout_secs.value);

    match (&cli.local, &cli.remote) {
        (Some(root), None) => DatasetSource::create_local(root)
            .with_context(|| format!("Failed to open dataset at {}", root.display())),
        (None, Some(dataset_id)) => {
            let url = config.require_catalog_url()?;
            let client = HttpCatalogClient::with_timeout(url, timeout)?;
            let backend =
                Backend::Remote { client: Arc::new(client), dataset_id: dataset_id.clone() };
            DatasetSource::from_backend(backend, Arc::new(GmlLodScanner::with_timeout(timeout)))
                .with_context(|| format!("Failed to list dataset {} from {}", dataset_id, url))
        }
        _ => bail!("Select a dataset with --local PATH or --remote DATASET_ID"),
    }
}

impl FilterArgs {
    /// Narrow `accessor` by the requested mesh codes, then by the bounding box.
    pub fn apply(&self, accessor: DatasetAccessor) -> Result<DatasetAccessor> {
        let mut accessor = accessor;

        if !self.mesh_codes.is_empty() {
            let codes = self
                .mesh_codes
                .iter()
                .map(|s| MeshCode::parse(s).with_context(|| format!("Invalid mesh code {:?}", s)))
                .collect::<Result<Vec<_>>>()?;
            accessor = accessor.filter_by_mesh_codes(&codes);
        }

        if let Some(bbox) = &self.bbox {
            accessor = accessor.filter_by_extent(&parse_bbox(bbox)?);
        }

        Ok(accessor)
    }
}

/// Parse `MIN_LON,MIN_LAT,MAX_LON,MAX_LAT`.
pub fn parse_bbox(s: &str) -> Result<Rect<f64>> {
    let values = s
        .split(',')
        .map(|part| part.trim().parse::<f64>())
        .collect::<std::result::Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid bounding box {:?}", s))?;

    match values.as_slice() {
        [min_lon, min_lat, max_lon, max_lat] => Ok(Rect::new(
            coord! { x: *min_lon, y: *min_lat },
            coord! { x: *max_lon, y: *max_lat },
        )),
        _ => bail!("Bounding box needs four comma-separated numbers, got {:?}", s),
    }
}
