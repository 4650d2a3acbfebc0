//! Integration test: hazard tracking records clobbers and promotions
//! without changing what any operation returns.

use tangle::prelude::*;
use tangle_test_utils::{five_element_array, init_test_logging, tracked_arena, ClobberScenario};

#[test]
fn clobber_is_attributed_to_writer_and_victim() {
    init_test_logging();
    let mut arena = tracked_arena();
    let scenario = ClobberScenario::run(&mut arena);

    let events: Vec<_> = arena.hazard_events(&scenario.arr).collect();
    assert_eq!(events.len(), 1);
    match &events[0] {
        HazardEvent::CrossViewClobber {
            writer,
            victim,
            clobbered,
            kind,
            ..
        } => {
            assert_eq!(*writer, scenario.sub.id());
            assert_eq!(*victim, scenario.arr.id());
            assert_eq!(*clobbered, 3..5);
            assert_eq!(*kind, WriteKind::Append);
        }
        other => panic!("expected a clobber, got {other}"),
    }
}

#[test]
fn writes_inside_own_range_are_not_hazards() {
    let mut arena = tracked_arena();
    let arr = five_element_array(&mut arena);
    let sub = arena.slice(&arr, 1, 3).unwrap();
    arena.set(&sub, 0, 20).unwrap();
    arena.set(&arr, 4, 50).unwrap();
    assert_eq!(arena.hazard_events(&arr).count(), 0);
}

#[test]
fn dropped_views_are_not_victims() {
    let mut arena = tracked_arena();
    let sub = {
        let arr = five_element_array(&mut arena);
        arena.slice(&arr, 0, 3).unwrap()
    };
    // Only `sub` is alive; the parent it would have clobbered is gone.
    let grown = arena.append(&sub, [6, 7]).unwrap();
    assert!(!grown.is_promoted());
    let clobbers = arena
        .hazard_events(&sub)
        .filter(|event| matches!(event, HazardEvent::CrossViewClobber { .. }))
        .count();
    assert_eq!(clobbers, 0);
}

#[test]
fn promotion_is_logged_with_discarded_tail() {
    init_test_logging();
    let mut arena = tracked_arena();
    let arr = five_element_array(&mut arena);
    let sub = arena.slice(&arr, 0, 2).unwrap();
    let grown = arena.append(&sub, [6, 7, 8, 9]).unwrap();
    assert!(grown.is_promoted());

    let promotions: Vec<_> = arena
        .hazard_events(&grown)
        .filter_map(|event| match event {
            HazardEvent::Promotion {
                view,
                old_capacity,
                new_capacity,
                discarded_tail,
                ..
            } => Some((view, old_capacity, new_capacity, discarded_tail)),
            HazardEvent::CrossViewClobber { .. } => None,
        })
        .collect();
    assert_eq!(promotions, vec![(sub.id(), 5, 10, 3)]);
}

#[test]
fn tracking_does_not_change_results() {
    let mut plain = SliceArena::new();
    let mut tracked = tracked_arena();
    for arena in [&mut plain, &mut tracked] {
        let scenario = ClobberScenario::run(arena);
        let promoted = arena.append(&scenario.grown, [8]).unwrap();
        arena.set(&promoted, 0, 100).unwrap();
        assert_eq!(arena.to_vec(&scenario.arr).unwrap(), vec![1, 2, 3, 6, 7]);
        assert_eq!(arena.to_vec(&promoted).unwrap(), vec![100, 2, 3, 6, 7, 8]);
    }
    let untracked = ClobberScenario::run(&mut plain);
    assert_eq!(plain.hazard_events(&untracked.arr).count(), 0);
}

#[test]
fn event_log_is_bounded() {
    let config = ArenaConfig {
        max_hazard_events: 4,
        ..ArenaConfig::tracked()
    };
    let mut arena = SliceArena::with_config(config).unwrap();
    let arr = arena.from_elements(vec![0u8; 16]).unwrap();
    let empty = arena.slice(&arr, 0, 0).unwrap();
    for _ in 0..10 {
        let _ = arena.append(&empty, [1]).unwrap();
    }

    let tracker = arena.hazard_tracker().unwrap();
    assert_eq!(tracker.event_count(), 4);
    assert_eq!(tracker.evicted_count(), 6);
}

#[test]
fn reclaim_forgets_tracked_views() {
    let mut arena = tracked_arena();
    let arr = five_element_array(&mut arena);
    let store = arr.store();
    let promoted = arena.append(&arr, [6]).unwrap();
    assert_eq!(arena.hazard_tracker().unwrap().live_views(store), 1);

    drop(arr);
    assert_eq!(arena.reclaim(), 1);
    assert_eq!(arena.hazard_tracker().unwrap().live_views(store), 0);
    assert_eq!(arena.to_vec(&promoted).unwrap(), vec![1, 2, 3, 4, 5, 6]);
}

#[test]
fn repeated_slicing_keeps_registry_bounded() {
    let mut arena = tracked_arena();
    let arr = five_element_array(&mut arena);
    for _ in 0..10_000 {
        let sub = arena.slice(&arr, 0, 3).unwrap();
        assert_eq!(arena.get(&sub, 0).unwrap(), 1);
    }

    let tracker = arena.hazard_tracker().unwrap();
    assert_eq!(tracker.live_views(arr.store()), 1);
    // `arr` plus the last slice, dropped but not yet pruned.
    assert_eq!(tracker.registered_entries(arr.store()), 2);
}
