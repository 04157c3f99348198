pub mod geometry;
pub mod gml_file;
pub mod mesh_code;
pub mod package;

pub use geometry::{CoordinateSystem, GeoCoordinate, Vector3d};
pub use gml_file::{mesh_code_from_file_name, FileLocator, GmlFileEntry};
pub use mesh_code::{MeshCode, MeshLevel};
pub use package::{classify_path, PackageFlags};
