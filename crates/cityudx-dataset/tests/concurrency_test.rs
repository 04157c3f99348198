//! Accessors shared across threads

use cityudx_core::models::{FileLocator, GmlFileEntry, MeshCode, PackageFlags};
use cityudx_core::ports::GmlContentReader;
use cityudx_core::Result;
use cityudx_dataset::{CatalogIndex, DatasetAccessor};
use cityudx_geo::GeoReference;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;

#[derive(Default)]
struct CountingReader {
    calls: AtomicUsize,
}

impl CountingReader {
    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GmlContentReader for CountingReader {
    fn max_lod(&self, _locator: &FileLocator) -> Result<u32> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(2)
    }
}

fn accessor(reader: &Arc<CountingReader>) -> DatasetAccessor {
    let entries = ["53392642_bldg_6697_op.gml", "53392670_bldg_6697_op.gml"]
        .iter()
        .map(|name| {
            let locator = FileLocator::Local(format!("/d/udx/bldg/{name}").into());
            GmlFileEntry::from_locator(locator, reader.clone()).unwrap()
        })
        .collect();
    DatasetAccessor::new(Arc::new(CatalogIndex::from_entries("/d", entries)))
}

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn test_shared_types_are_send_and_sync() {
    assert_send_sync::<DatasetAccessor>();
    assert_send_sync::<CatalogIndex>();
    assert_send_sync::<GmlFileEntry>();
    assert_send_sync::<GeoReference>();
}

#[test]
fn test_filtered_child_on_another_thread_sees_parent_cache() {
    let reader = Arc::new(CountingReader::default());
    let parent = accessor(&reader);
    let child = parent.filter_by_mesh_codes(&[MeshCode::parse("53392642").unwrap()]);

    let from_parent = thread::scope(|scope| {
        scope.spawn(|| parent.get_gml_files(PackageFlags::BUILDING)[0].max_lod().unwrap()).join()
    })
    .unwrap();
    let from_child = thread::scope(|scope| {
        scope.spawn(|| child.get_gml_files(PackageFlags::BUILDING)[0].max_lod().unwrap()).join()
    })
    .unwrap();

    assert_eq!(from_parent, 2);
    assert_eq!(from_child, from_parent);
    assert_eq!(reader.calls(), 1);
}

#[test]
fn test_concurrent_readers_agree_and_fill_cache() {
    let reader = Arc::new(CountingReader::default());
    let parent = accessor(&reader);
    let child = parent.filter_by_mesh_codes(&[MeshCode::parse("53392642").unwrap()]);
    assert!(parent.shares_index_with(&parent.clone()));

    let lods: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|n| {
                let accessor = if n % 2 == 0 { &parent } else { &child };
                scope.spawn(move || {
                    accessor.get_gml_files(PackageFlags::BUILDING)[0].max_lod().unwrap()
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert!(lods.iter().all(|&lod| lod == 2), "{lods:?}");
    // Racing first calls may each read the file; none can after the cache is set.
    let after_race = reader.calls();
    assert!((1..=THREADS).contains(&after_race), "{after_race} reads");

    let entry = &child.get_gml_files(PackageFlags::BUILDING)[0];
    assert_eq!(entry.cached_max_lod(), Some(2));
    assert_eq!(parent.get_gml_files(PackageFlags::BUILDING)[0].max_lod().unwrap(), 2);
    assert_eq!(reader.calls(), after_race);
}

#[test]
fn test_center_point_from_many_threads() {
    let reader = Arc::new(CountingReader::default());
    let accessor = accessor(&reader);
    let geo_ref = GeoReference::for_zone(9).unwrap();
    let expected = accessor.calculate_center_point(&geo_ref).unwrap();

    thread::scope(|scope| {
        for _ in 0..THREADS {
            scope.spawn(|| {
                assert_eq!(accessor.calculate_center_point(&geo_ref).unwrap(), expected);
            });
        }
    });
    assert_eq!(reader.calls(), 0);
}
