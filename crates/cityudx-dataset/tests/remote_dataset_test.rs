//! Integration tests for catalog-backed datasets

mod common;

use cityudx_core::formats::GmlLodScanner;
use cityudx_core::models::{CoordinateSystem, FileLocator, MeshCode, PackageFlags, Vector3d};
use cityudx_core::ports::{CatalogClient, GmlContentReader};
use cityudx_core::{Result, UdxError};
use cityudx_dataset::{Backend, DatasetAccessor, DatasetSource, HttpCatalogClient};
use cityudx_geo::GeoReference;
use common::{mock_catalog, MOCK_ROOT, TOKYO_23KU};
use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Content reader that must never be reached.
struct Unreachable;

impl GmlContentReader for Unreachable {
    fn max_lod(&self, locator: &FileLocator) -> Result<u32> {
        Err(UdxError::UnreadableContent {
            locator: locator.to_string(),
            reason: "no network in tests".to_string(),
        })
    }
}

fn tokyo_23ku() -> DatasetAccessor {
    let backend = Backend::Remote { client: Arc::new(mock_catalog()), dataset_id: "23ku".into() };
    DatasetSource::from_backend(backend, Arc::new(Unreachable)).unwrap().accessor()
}

#[test]
fn test_remote_mesh_codes() {
    let codes = tokyo_23ku().mesh_codes();
    assert_eq!(codes.len(), 2);
    assert_eq!(codes[1].to_string(), "53392670");
}

#[test]
fn test_remote_gml_files() {
    let accessor = tokyo_23ku();
    let buildings = accessor.get_gml_files(PackageFlags::BUILDING);
    assert_eq!(buildings.len(), 2);
    assert_eq!(
        buildings[0].locator().as_url(),
        Some(format!("{}/{}/udx/bldg/53392642_bldg_6697_2_op.gml", MOCK_ROOT, TOKYO_23KU).as_str())
    );
}

#[test]
fn test_remote_packages() {
    assert_eq!(
        tokyo_23ku().packages(),
        PackageFlags::BUILDING
            | PackageFlags::ROAD
            | PackageFlags::URBAN_PLANNING_DECISION
            | PackageFlags::LAND_USE
    );
}

#[test]
fn test_remote_max_lod_comes_from_listing() {
    let accessor = tokyo_23ku();
    let buildings = accessor.get_gml_files(PackageFlags::BUILDING);
    assert_eq!(buildings[1].max_lod().unwrap(), 2);

    // No hint in the listing: the reader is consulted and its failure surfaces.
    let urf = accessor.get_gml_files(PackageFlags::URBAN_PLANNING_DECISION);
    assert!(matches!(urf[0].max_lod(), Err(UdxError::UnreadableContent { .. })));
}

#[test]
fn test_remote_center_point() {
    let geo_ref = GeoReference::new(9, Vector3d::ZERO, 1.0, CoordinateSystem::Eun).unwrap();
    assert_eq!(geo_ref.backend(), "proj");
    let center = tokyo_23ku().calculate_center_point(&geo_ref).unwrap();
    assert!((center.z + 50_000.0).abs() < 2_000.0, "south {}", center.z);
    assert!((center.x + 5_000.0).abs() < 1_000.0, "west {}", center.x);
}

#[test]
fn test_remote_filter_contains_only_present_cell() {
    let accessor = tokyo_23ku();
    let present = MeshCode::parse("53392642").unwrap();
    let filtered = accessor.filter_by_mesh_codes(&[present]);
    let buildings = filtered.get_gml_files(PackageFlags::BUILDING);
    assert!(buildings.iter().any(|e| e.mesh_code() == present));
    assert_eq!(
        filtered.packages(),
        PackageFlags::BUILDING | PackageFlags::ROAD | PackageFlags::URBAN_PLANNING_DECISION
    );

    let absent = MeshCode::parse("53394611").unwrap();
    let filtered = accessor.filter_by_mesh_codes(&[absent]);
    assert!(filtered.get_gml_files(PackageFlags::BUILDING).is_empty());
}

#[test]
fn test_filtered_view_shares_lod_cache() {
    struct Fixed;
    impl GmlContentReader for Fixed {
        fn max_lod(&self, _locator: &FileLocator) -> Result<u32> {
            Ok(3)
        }
    }

    let backend = Backend::Remote { client: Arc::new(mock_catalog()), dataset_id: "23ku".into() };
    let accessor = DatasetSource::from_backend(backend, Arc::new(Fixed)).unwrap().accessor();
    let cell = MeshCode::parse("53392642").unwrap();
    let filtered = accessor.filter_by_mesh_codes(&[cell]);

    let urf = filtered.get_gml_files(PackageFlags::URBAN_PLANNING_DECISION);
    assert_eq!(urf[0].max_lod().unwrap(), 3);
    let parent_urf = accessor.get_gml_files(PackageFlags::URBAN_PLANNING_DECISION);
    assert_eq!(parent_urf[0].cached_max_lod(), Some(3));
}

/// Serve exactly one HTTP response on a loopback port and return the base URL.
fn serve_once(status: &'static str, body: &'static str) -> (String, thread::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let handle = thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut reader = BufReader::new(stream.try_clone().unwrap());
        let mut request_line = String::new();
        reader.read_line(&mut request_line).unwrap();
        // Drain headers
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap() > 2 {
            line.clear();
        }
        write!(
            stream,
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        )
        .unwrap();
        stream.flush().unwrap();
        request_line
    });
    (base, handle)
}

#[test]
fn test_http_catalog_listing() {
    let body = r#"{
        "bldg": [
            {"code": "53392642", "url": "https://mock.example.com/d/udx/bldg/53392642_bldg_6697_2_op.gml", "maxLod": 2}
        ],
        "tran": [
            {"code": "53392670", "url": "https://mock.example.com/d/udx/tran/53392670_tran_6697_op.gml", "maxLod": 1}
        ]
    }"#;
    let (base, server) = serve_once("200 OK", body);

    let client = HttpCatalogClient::with_timeout(&base, Duration::from_secs(5)).unwrap();
    let backend = Backend::Remote { client: Arc::new(client), dataset_id: "23ku".into() };
    let accessor = DatasetSource::from_backend(backend, Arc::new(GmlLodScanner::new()))
        .unwrap()
        .accessor();

    let request_line = server.join().unwrap();
    assert!(request_line.starts_with("GET /api/sdk/datasets/23ku/files "), "{request_line}");

    assert_eq!(accessor.mesh_code_count(), 2);
    assert_eq!(accessor.packages(), PackageFlags::BUILDING | PackageFlags::ROAD);
    assert_eq!(accessor.get_gml_files(PackageFlags::ROAD)[0].max_lod().unwrap(), 1);
}

#[test]
fn test_http_error_status_is_root_unavailable() {
    let (base, server) = serve_once("404 Not Found", "{}");
    let client = HttpCatalogClient::with_timeout(&base, Duration::from_secs(5)).unwrap();

    let result = client.list_files("missing");
    server.join().unwrap();
    assert!(matches!(result, Err(UdxError::RootUnavailable { .. })));
}

#[test]
fn test_http_undecodable_body_is_catalog_error() {
    let (base, server) = serve_once("200 OK", r#"{"error": "maintenance"}"#);
    let client = HttpCatalogClient::with_timeout(&base, Duration::from_secs(5)).unwrap();

    let result = client.list_files("23ku");
    server.join().unwrap();
    assert!(matches!(result, Err(UdxError::Catalog { .. })));
}

#[test]
fn test_unreachable_catalog_is_root_unavailable() {
    // Bind then release a port so nothing is listening on it.
    let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
    let url = format!("http://127.0.0.1:{}", port);
    let client = HttpCatalogClient::with_timeout(url, Duration::from_secs(2)).unwrap();
    let backend = Backend::Remote { client: Arc::new(client), dataset_id: "23ku".into() };

    let result = DatasetSource::from_backend(backend, Arc::new(Unreachable));
    assert!(matches!(result, Err(UdxError::RootUnavailable { .. })));
}
