//! Lazy map resources backed by real SQLite files.

use std::sync::{Arc, Barrier};
use std::thread;

use waypost::resources::ResourceState;

use crate::helpers::TestContext;

#[test]
fn test_index_lists_maps_from_bundled_basemap() {
    let ctx = TestContext::with_basemap(&[(70, 40, 3, 1_700_000_000), (12, 8, 1, 1_600_000_000)]);
    let resources = ctx.context.resources();

    let index = resources.map_index();
    assert_eq!(resources.database_state(), ResourceState::Ready);
    assert_eq!(resources.index_state(), ResourceState::Ready);
    assert_eq!(index.len(), 2);
    assert!(index.is_downloaded(12, 8));
    assert_eq!(index.tile(70, 40).unwrap().date, 1_700_000_000);
    assert!(resources.database_path().starts_with(ctx.config.native_dir()));
    assert!(resources.database_path().is_file());
}

#[test]
fn test_materialized_database_is_reused_after_restart() {
    let ctx = TestContext::with_basemap(&[(1, 1, 1, 0)]);
    let database = ctx.context.resources().database();
    database
        .with_connection(|conn| conn.execute("INSERT INTO maps VALUES (2, 2, 1, 0)", []))
        .unwrap();
    drop(database);

    let restarted = ctx.reopen();
    assert_eq!(restarted.resources().map_index().len(), 2);
}

#[test]
fn test_concurrent_index_access_shares_one_instance() {
    const THREADS: usize = 10;
    let ctx = TestContext::with_basemap(&[(5, 5, 1, 0)]);
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|_| {
            let context = ctx.context.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                context.resources().map_index()
            })
        })
        .collect();
    let indexes: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert!(indexes.iter().all(|i| Arc::ptr_eq(i, &indexes[0])));
    assert_eq!(indexes[0].len(), 1);
}

#[test]
fn test_missing_assets_give_empty_index() {
    let ctx = TestContext::new();
    let index = ctx.context.resources().map_index();
    assert!(index.is_empty());
    assert!(!index.database().is_detached());
}

#[test]
fn test_unopenable_database_degrades_without_failing() {
    let ctx = TestContext::with_basemap(&[(1, 1, 1, 0)]);
    let path = ctx.context.resources().database_path();
    std::fs::create_dir_all(&path).unwrap();

    let database = ctx.context.resources().database();
    assert!(database.is_detached());
    let err = database.has_table("maps").unwrap_err();
    assert!(err.is_unavailable());
    assert!(ctx.context.resources().map_index().is_empty());
}
