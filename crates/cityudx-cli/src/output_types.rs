use serde::Serialize;
use tabled::Tabled;

/// Row of the mesh-codes command
#[derive(Debug, Serialize, Tabled)]
pub struct MeshCodeRow {
    #[tabled(rename = "Mesh Code")]
    pub mesh_code: String,
    #[tabled(rename = "Level")]
    pub level: String,
    #[tabled(rename = "Files")]
    pub files: usize,
}

/// Row of the packages command
#[derive(Debug, Serialize, Tabled)]
pub struct PackageRow {
    #[tabled(rename = "Package")]
    pub package: String,
    #[tabled(rename = "Token")]
    pub token: String,
    #[tabled(rename = "Files")]
    pub files: usize,
}

/// Row of the files command
#[derive(Debug, Serialize, Tabled)]
pub struct FileRow {
    #[tabled(rename = "Mesh Code")]
    pub mesh_code: String,
    #[tabled(rename = "Package")]
    pub package: String,
    #[tabled(rename = "Path")]
    pub path: String,
}

/// Row of the max-lod command
#[derive(Debug, Serialize, Tabled)]
pub struct MaxLodRow {
    #[tabled(rename = "Mesh Code")]
    pub mesh_code: String,
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Max LOD")]
    #[tabled(display_with = "display_lod")]
    pub max_lod: Option<u32>,
}

fn display_lod(lod: &Option<u32>) -> String {
    lod.map(|l| l.to_string()).unwrap_or_else(|| "unreadable".to_string())
}

/// Output of the center command
#[derive(Debug, Serialize)]
pub struct CenterOutput {
    pub zone_id: i32,
    pub coordinate_system: String,
    pub unit_scale: f64,
    pub backend: String,
    pub mesh_code_count: usize,
    pub x: f64,
    pub y: f64,
    pub z: f64,
    pub latitude: f64,
    pub longitude: f64,
    /// Third-level cell containing the center, if inside the grid
    pub mesh_code: Option<String>,
}

/// Row of the config command
#[derive(Debug, Serialize, Tabled)]
pub struct ConfigRow {
    #[tabled(rename = "Key")]
    pub key: String,
    #[tabled(rename = "Value")]
    pub value: String,
    #[tabled(rename = "Source")]
    pub source: String,
}
