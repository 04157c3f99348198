//! Local UDX folder backend
//!
//! Layout: `<root>/udx/<package token>/.../<mesh code>_<token>_<version>.gml`.
//! Each package folder is searched breadth first. GML files of one package sit
//! at a common depth, so the search stops descending once a level yields one.

use cityudx_core::error::{Result, UdxError};
use cityudx_core::models::{mesh_code_from_file_name, FileLocator, GmlFileEntry, PackageFlags};
use cityudx_core::ports::GmlContentReader;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::index::CatalogIndex;

/// Build an index from a local dataset rooted at `root`.
pub fn build_index(root: &Path, reader: Arc<dyn GmlContentReader>) -> Result<CatalogIndex> {
    let udx = root.join("udx");
    let package_dirs = sorted_entries(&udx).map_err(|e| UdxError::RootUnavailable {
        root: root.display().to_string(),
        reason: format!("cannot read {}: {}", udx.display(), e),
    })?;

    let mut entries = Vec::new();
    for dir in package_dirs.into_iter().filter(|p| p.is_dir()) {
        let token = dir.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let package = PackageFlags::from_token(token);
        if package == PackageFlags::UNKNOWN {
            warn!(folder = %dir.display(), "Unrecognized package folder, indexing as Unknown");
        }

        for path in find_gmls_breadth_first(&dir) {
            let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
            match mesh_code_from_file_name(file_name) {
                Ok(mesh_code) => entries.push(GmlFileEntry::new(
                    mesh_code,
                    package,
                    FileLocator::Local(path),
                    Arc::clone(&reader),
                )),
                Err(e) => warn!(file = %path.display(), error = %e, "Skipping GML file"),
            }
        }
    }

    let index = CatalogIndex::from_entries(root.display().to_string(), entries);
    info!(
        backend = "local",
        root = %root.display(),
        cells = index.mesh_code_count(),
        entries = index.len(),
        "Dataset index built"
    );
    Ok(index)
}

/// GML files under `start`, shallowest level first.
fn find_gmls_breadth_first(start: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    let mut queue = VecDeque::from([start.to_path_buf()]);
    let mut descend = true;

    while let Some(dir) = queue.pop_front() {
        debug!(dir = %dir.display(), "Searching for GML files");
        let children = match sorted_entries(&dir) {
            Ok(children) => children,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "Skipping unreadable directory");
                continue;
            }
        };

        let (dirs, files): (Vec<PathBuf>, Vec<PathBuf>) =
            children.into_iter().partition(|p| p.is_dir());
        for file in files {
            if FileLocator::Local(file.clone()).is_gml() {
                found.push(file);
                descend = false;
            }
        }
        // Folders at the current depth are already queued, so siblings of the
        // first GML folder are still searched.
        if descend {
            queue.extend(dirs);
        }
    }
    found
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut paths = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<std::io::Result<Vec<_>>>()?;
    paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(paths)
}
