//! Registry behaviour through a full context: UIDs, events and concurrency.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use waypost::{Bitmap, MapObject, MapObjectEvent};

use crate::helpers::{EventLog, TestContext};

#[test]
fn test_ids_keep_increasing_across_restarts() {
    let ctx = TestContext::new();
    let registry = ctx.context.registry();
    let a = registry.register(MapObject::new("a", 1.0, 1.0)).unwrap();
    let b = registry.register(MapObject::new("b", 2.0, 2.0)).unwrap();
    assert!(registry.unregister(a));

    let restarted = ctx.reopen();
    let c = restarted
        .registry()
        .register(MapObject::new("c", 3.0, 3.0))
        .unwrap();
    assert!(a < b && b < c);
    assert!(restarted.registry().lookup(a).is_none());
}

#[test]
fn test_removal_detaches_bitmap_before_notifying() {
    let ctx = TestContext::new();
    let (log, observer) = EventLog::new();
    let _subscription = ctx.context.notifier().subscribe(observer).unwrap();

    let object = MapObject::new("Photo", 60.0, 25.0).with_bitmap(Bitmap::new(2, 2, vec![0u8; 16]));
    let id = ctx.context.registry().register(object).unwrap();
    let registered = ctx.context.registry().lookup(id).unwrap();
    assert!(registered.bitmap().is_some());

    assert!(ctx.context.registry().unregister(id));
    assert!(!ctx.context.registry().unregister(id));

    let events = log.take(2);
    assert!(matches!(&events[0], MapObjectEvent::Added(o) if o.id() == id));
    match &events[1] {
        MapObjectEvent::Removed(object) => {
            assert_eq!(object.id(), id);
            assert!(object.bitmap().is_none());
        }
        other => panic!("Expected Removed, got {other:?}"),
    }
    log.assert_quiet();
}

#[test]
fn test_concurrent_churn_delivers_ordered_events_per_object() {
    const THREADS: usize = 6;
    const PER_THREAD: usize = 50;

    let ctx = TestContext::new();
    let (log, observer) = EventLog::new();
    let _subscription = ctx.context.notifier().subscribe(observer).unwrap();
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let context = ctx.context.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let mut ids = Vec::new();
                for i in 0..PER_THREAD {
                    let id = context
                        .registry()
                        .register(MapObject::new(format!("{t}-{i}"), 0.0, 0.0))
                        .unwrap();
                    if i % 2 == 0 {
                        assert!(context.registry().unregister(id));
                    } else {
                        ids.push(id);
                    }
                }
                ids
            })
        })
        .collect();

    let kept: Vec<i64> = handles
        .into_iter()
        .flat_map(|h| h.join().unwrap())
        .collect();
    let removed = THREADS * PER_THREAD / 2;
    assert_eq!(ctx.context.registry().len(), kept.len());

    let events = log.take(THREADS * PER_THREAD + removed);
    let mut added = HashSet::new();
    for event in &events {
        match event {
            MapObjectEvent::Added(object) => assert!(added.insert(object.id())),
            MapObjectEvent::Removed(object) => {
                assert!(added.contains(&object.id()), "Removed before Added");
            }
        }
    }
    assert_eq!(added.len(), THREADS * PER_THREAD);
    let live: HashSet<i64> = ctx.context.registry().iter().map(|o| o.id()).collect();
    assert_eq!(live, kept.into_iter().collect());
    log.assert_quiet();
}

#[test]
fn test_iteration_is_a_snapshot() {
    let ctx = TestContext::new();
    let registry = ctx.context.registry();
    for i in 0..10 {
        registry.register(MapObject::new(format!("{i}"), 0.0, 0.0)).unwrap();
    }

    let snapshot = registry.iter();
    assert_eq!(snapshot.len(), 10);
    registry.clear();
    assert!(registry.is_empty());
    assert_eq!(snapshot.count(), 10);
}
