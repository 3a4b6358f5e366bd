//! Tests for records, registries, handles and cursors

use super::*;
use crate::config::GcConfig;
use crate::error::{GcError, Operation};
use crate::heap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Value that counts its own destruction
#[derive(Debug)]
struct Probe {
    id: usize,
    drops: Arc<AtomicUsize>,
}

impl Drop for Probe {
    fn drop(&mut self) {
        self.drops.fetch_add(1, Ordering::SeqCst);
    }
}

fn probe(id: usize, drops: &Arc<AtomicUsize>) -> Probe {
    Probe { id, drops: Arc::clone(drops) }
}

fn counter() -> Arc<AtomicUsize> {
    Arc::new(AtomicUsize::new(0))
}

fn drops(counter: &Arc<AtomicUsize>) -> usize {
    counter.load(Ordering::SeqCst)
}

#[cfg(test)]
mod record_tests {
    use super::*;

    #[test]
    fn test_single_record() {
        let record = AllocationRecord::new(0x1000 as *mut u32, 0);
        assert_eq!(record.ref_count(), 1);
        assert!(!record.is_array());
        assert_eq!(record.element_count(), 0);
        assert!(!record.is_garbage());
    }

    #[test]
    fn test_array_record() {
        let record = AllocationRecord::new(0x1000 as *mut u32, 10);
        assert!(record.is_array());
        assert_eq!(record.element_count(), 10);
    }

    #[test]
    fn test_equality_ignores_count() {
        let mut a = AllocationRecord::new(0x1000 as *mut u32, 0);
        let b = AllocationRecord::new(0x1000 as *mut u32, 0);
        let c = AllocationRecord::new(0x2000 as *mut u32, 0);

        a.retain();
        a.retain();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_retain_release() {
        let mut record = AllocationRecord::new(0x1000 as *mut u32, 0);
        assert_eq!(record.retain(), 2);
        assert_eq!(record.release(), 1);
        assert_eq!(record.release(), 0);
        assert!(record.is_garbage());
    }
}

#[cfg(test)]
mod table_tests {
    use super::*;

    #[test]
    fn test_find_absent_is_none() {
        let table = RecordTable::<u32>::with_capacity(4);
        assert!(table.find(0x1000 as *const u32).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_insert_find_remove() {
        let mut table = RecordTable::with_capacity(4);
        table.insert(AllocationRecord::new(0x1000 as *mut u32, 0));
        table.insert(AllocationRecord::new(0x2000 as *mut u32, 3));
        assert_eq!(table.len(), 2);

        let found = table.find(0x2000 as *const u32).unwrap();
        assert_eq!(found.element_count(), 3);

        let probe = AllocationRecord::new(0x1000 as *mut u32, 0);
        let removed = table.remove(&probe).unwrap();
        assert_eq!(removed.key(), 0x1000);
        assert_eq!(table.len(), 1);
        assert!(table.remove(&probe).is_none());
    }

    #[test]
    fn test_find_mut_updates_in_place() {
        let mut table = RecordTable::with_capacity(4);
        table.insert(AllocationRecord::new(0x1000 as *mut u32, 0));
        table.find_mut(0x1000 as *const u32).unwrap().retain();
        assert_eq!(table.find(0x1000 as *const u32).unwrap().ref_count(), 2);
    }
}

#[cfg(test)]
mod registry_tests {
    use super::*;

    #[test]
    fn test_collect_empty_returns_false() {
        let registry = Registry::<u32>::new();
        assert!(!registry.collect());
        assert_eq!(registry.stats().collections, 1);
    }

    #[test]
    fn test_collect_never_frees_live_records() {
        let registry = Registry::<u32>::new();
        let a = Gc::new_in(1, &registry);
        let b = Gc::new_in(2, &registry);

        assert!(!registry.collect());
        assert_eq!(registry.len(), 2);
        assert_eq!(a.ref_count(), Some(1));
        assert_eq!(b.ref_count(), Some(1));
    }

    #[test]
    fn test_collect_frees_every_zero_record() {
        let dropped = counter();
        let registry = Registry::<Probe>::with_config(GcConfig::default().deferred());

        let handles: Vec<_> = (0..5).map(|i| Gc::new_in(probe(i, &dropped), &registry)).collect();
        let keep = handles[0].clone();
        drop(handles);

        assert_eq!(registry.len(), 5);
        assert_eq!(drops(&dropped), 0);

        assert!(registry.collect());
        assert_eq!(registry.len(), 1);
        assert_eq!(drops(&dropped), 4);
        assert_eq!(unsafe { keep.get().id }, 0);

        assert!(!registry.collect());
    }

    #[test]
    fn test_construct_same_address_increments() {
        let registry = Registry::<u32>::new();
        let addr = heap::allocate_single(9u32);

        let a = unsafe { Gc::from_raw_in(addr, &registry) };
        let b = unsafe { Gc::from_raw_in(addr, &registry) };

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.ref_count(addr), Some(2));
        drop(a);
        assert_eq!(b.ref_count(), Some(1));
    }

    #[test]
    fn test_distinct_sizes_do_not_share() {
        #[derive(Debug)]
        struct Cell(#[allow(dead_code)] u8);

        let single = Registry::<Cell, 0>::global();
        let array = Registry::<Cell, 3>::global();

        let _a = Gc::new_in(Cell(1), &single);
        let _b = Gc::<Cell, 3>::from_vec_in(vec![Cell(1), Cell(2), Cell(3)], &array).unwrap();

        assert_eq!(single.len(), 1);
        assert_eq!(array.len(), 1);
        assert!(Registry::<Cell, 0>::global().ptr_eq(&single));
    }

    #[test]
    fn test_shutdown_drains_and_empties() {
        let dropped = counter();
        let registry = Registry::<Probe>::new();
        let a = Gc::new_in(probe(1, &dropped), &registry);
        let b = a.clone();
        let c = Gc::new_in(probe(2, &dropped), &registry);

        registry.shutdown();
        assert!(registry.is_empty());
        assert_eq!(drops(&dropped), 2);

        // Surviving handles are dangling; dropping them must stay quiet
        drop(a);
        drop(b);
        drop(c);
        assert_eq!(drops(&dropped), 2);
    }

    #[test]
    fn test_shutdown_is_idempotent() {
        let registry = Registry::<u32>::new();
        registry.shutdown();
        let _a = Gc::new_in(3, &registry);
        registry.shutdown();
        registry.shutdown();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_last_clone_drains_registry() {
        let dropped = counter();
        {
            let registry = Registry::<Probe>::with_config(GcConfig::default().deferred());
            let handle = Gc::new_in(probe(1, &dropped), &registry);
            drop(handle);
            assert_eq!(registry.len(), 1);
            assert_eq!(drops(&dropped), 0);
        }
        assert_eq!(drops(&dropped), 1);
    }

    #[test]
    fn test_stats_track_activity() {
        let registry = Registry::<u32>::with_config(GcConfig::default().deferred());
        let a = Gc::new_in(1, &registry);
        let _b = Gc::new_in(2, &registry);
        drop(a);

        let stats = registry.stats();
        assert_eq!(stats.tracked, 2);
        assert_eq!(stats.live, 1);
        assert_eq!(stats.freed, 0);

        registry.collect();
        let stats = registry.stats();
        assert_eq!(stats.tracked, 1);
        assert_eq!(stats.freed, 1);
    }

    #[test]
    fn test_snapshot_sorted_and_serializable() {
        let registry = Registry::<u32, 2>::new();
        let _a = Gc::from_vec_in(vec![1, 2], &registry).unwrap();
        let _b = Gc::from_vec_in(vec![3, 4], &registry).unwrap();

        let snapshot = registry.snapshot();
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot[0].address < snapshot[1].address);
        assert!(snapshot.iter().all(|r| r.is_array && r.element_count == 2 && r.ref_count == 1));

        let json = registry.snapshot_json().unwrap();
        assert!(json.contains("\"ref_count\": 1"));
    }

    #[test]
    fn test_debug_dump_lists_records() {
        let registry = Registry::<i32>::new();
        assert!(registry.debug_dump().contains("Container is empty!"));

        let _value = Gc::new_in(5, &registry);
        let _null = Gc::null_in(&registry);

        let dump = registry.debug_dump();
        assert!(dump.starts_with("registry<i32, 0>:"));
        assert!(dump.contains("] 1 5"));
        assert!(dump.contains("---"));
    }

    #[test]
    fn test_debug_dump_arrays() {
        let registry = Registry::<i32, 3>::new();
        let _values = Gc::from_vec_in(vec![7, 8, 9], &registry).unwrap();
        assert!(registry.debug_dump().contains("[7, 8, 9]"));
    }

    #[test]
    fn test_strict_drop_does_not_panic() {
        let registry = Registry::<u32>::with_config(GcConfig::default().with_strict_drop(true));
        let handle = Gc::new_in(1, &registry);
        registry.shutdown();
        drop(handle);
    }

    #[test]
    fn test_first_handle_registers_exit_hook() {
        let registry = Registry::<u32>::new();
        let _a = Gc::new_in(1, &registry);
        assert!(pending_exit_hooks() >= 1);
    }
}

#[cfg(test)]
mod handle_tests {
    use super::*;

    #[test]
    fn test_clone_and_drop_track_live_handles() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(5, &registry);
        let addr = a.as_ptr();

        let b = a.clone();
        assert_eq!(registry.ref_count(addr), Some(2));

        drop(b);
        assert_eq!(registry.ref_count(addr), Some(1));

        drop(a);
        assert_eq!(registry.ref_count(addr), None);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_single_handle_metadata() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(5, &registry);
        assert!(!a.is_array());
        assert!(!a.is_null());
        assert_eq!(a.len(), 0);
        assert_eq!(unsafe { *a.get() }, 5);
    }

    #[test]
    fn test_from_box() {
        let registry = Registry::<String>::new();
        let a = Gc::from_box_in(Box::new("boxed".to_string()), &registry);
        assert_eq!(unsafe { a.get() }, "boxed");
    }

    #[test]
    fn test_get_mut_is_visible_through_aliases() {
        let registry = Registry::<i32>::new();
        let mut a = Gc::new_in(1, &registry);
        let b = a.clone();

        unsafe { *a.get_mut() = 42 };
        assert_eq!(unsafe { *b.get() }, 42);
    }

    #[test]
    fn test_null_handle_has_record() {
        let registry = Registry::<i32>::new();
        let a = Gc::null_in(&registry);
        assert!(a.is_null());
        assert_eq!(registry.len(), 1);
        assert_eq!(a.ref_count(), Some(1));

        let b = Gc::null_in(&registry);
        assert_eq!(registry.len(), 1);
        assert_eq!(b.ref_count(), Some(2));
    }

    #[test]
    fn test_self_assignment_keeps_count() {
        let registry = Registry::<i32>::new();
        let mut a = Gc::new_in(5, &registry);
        let b = a.clone();

        a.assign(&b);
        assert_eq!(a.ref_count(), Some(2));

        a.clone_from(&b);
        assert_eq!(a.ref_count(), Some(2));
        assert_eq!(registry.len(), 1);
        assert_eq!(unsafe { *a.get() }, 5);
    }

    #[test]
    fn test_assign_moves_reference() {
        let dropped = counter();
        let registry = Registry::<Probe>::with_config(GcConfig::default().deferred());
        let mut a = Gc::new_in(probe(1, &dropped), &registry);
        let b = Gc::new_in(probe(2, &dropped), &registry);
        let old = a.as_ptr();

        a.assign(&b);
        assert!(Gc::ptr_eq(&a, &b));
        assert_eq!(b.ref_count(), Some(2));
        assert_eq!(registry.ref_count(old), Some(0));

        // Assignment decrements but never sweeps
        assert_eq!(drops(&dropped), 0);
        assert!(registry.collect());
        assert_eq!(drops(&dropped), 1);
    }

    #[test]
    fn test_assign_across_registries() {
        let left = Registry::<i32>::new();
        let right = Registry::<i32>::new();
        let mut a = Gc::new_in(1, &left);
        let b = Gc::new_in(2, &right);

        a.assign(&b);
        assert!(a.registry().ptr_eq(&right));
        assert_eq!(b.ref_count(), Some(2));
        assert_eq!(left.stats().live, 0);

        left.collect();
        assert!(left.is_empty());
    }

    #[test]
    fn test_assign_raw_from_null() {
        let registry = Registry::<i32>::with_config(GcConfig::default().deferred());
        let mut x = Gc::null_in(&registry);

        let addr = heap::allocate_single(7);
        let returned = unsafe { x.assign_raw(addr) };

        assert_eq!(returned, addr);
        assert_eq!(x.as_ptr(), addr);
        assert_eq!(unsafe { *x.get() }, 7);
        assert_eq!(registry.ref_count(core::ptr::null()), Some(0));
        assert_eq!(registry.ref_count(addr), Some(1));

        assert!(registry.collect());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_assign_raw_existing_address() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(1, &registry);
        let mut b = Gc::new_in(2, &registry);

        unsafe { b.assign_raw(a.as_ptr()) };
        assert_eq!(a.ref_count(), Some(2));

        // Same address again nets out
        unsafe { b.assign_raw(a.as_ptr()) };
        assert_eq!(a.ref_count(), Some(2));
    }

    #[test]
    fn test_assign_new() {
        let registry = Registry::<i32>::new();
        let mut a = Gc::new_in(1, &registry);
        a.assign_new(10);
        assert_eq!(unsafe { *a.get() }, 10);
        assert_eq!(registry.stats().live, 1);
    }

    #[test]
    fn test_array_construction_checks_length() {
        let registry = Registry::<i32, 4>::new();
        let err = Gc::from_vec_in(vec![1, 2, 3], &registry).unwrap_err();
        assert_eq!(err, GcError::LengthMismatch { expected: 4, found: 3 });
        assert!(registry.is_empty());

        let single = Registry::<i32, 0>::new();
        assert!(Gc::from_vec_in(vec![1], &single).is_err());
    }

    #[test]
    fn test_array_metadata_and_indexing() {
        let registry = Registry::<i32, 4>::new();
        let mut arr = Gc::from_vec_in(vec![10, 20, 30, 40], &registry).unwrap();
        assert!(arr.is_array());
        assert_eq!(arr.len(), 4);

        unsafe {
            assert_eq!(*arr.get_unchecked(2), 30);
            *arr.get_unchecked_mut(3) = 99;
            assert_eq!(arr.as_slice(), &[10, 20, 30, 99]);
        }
    }

    #[test]
    fn test_assign_boxed_slice() {
        let registry = Registry::<i32, 2>::new();
        let mut arr = Gc::from_vec_in(vec![1, 2], &registry).unwrap();

        arr.assign_boxed_slice(vec![3, 4].into_boxed_slice()).unwrap();
        assert_eq!(unsafe { arr.as_slice() }, &[3, 4]);

        let err = arr.assign_boxed_slice(vec![5].into_boxed_slice()).unwrap_err();
        assert_eq!(err, GcError::LengthMismatch { expected: 2, found: 1 });
    }

    #[test]
    fn test_array_elements_dropped_once() {
        let dropped = counter();
        let registry = Registry::<Probe, 3>::new();
        let arr = Gc::from_vec_in((0..3).map(|i| probe(i, &dropped)).collect(), &registry).unwrap();
        let alias = arr.clone();

        drop(arr);
        assert_eq!(drops(&dropped), 0);
        drop(alias);
        assert_eq!(drops(&dropped), 3);
    }

    #[test]
    fn test_try_clone_after_shutdown() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(1, &registry);
        let addr = a.as_ptr() as usize;
        registry.shutdown();

        let err = a.try_clone().unwrap_err();
        assert_eq!(err, GcError::RecordNotFound { address: addr, operation: Operation::Clone });
    }

    #[test]
    #[should_panic(expected = "No allocation record")]
    fn test_clone_after_shutdown_is_fatal() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(1, &registry);
        registry.shutdown();
        let _ = a.clone();
    }

    #[test]
    fn test_try_assign_failure_changes_nothing() {
        let registry = Registry::<i32>::new();
        let mut a = Gc::new_in(1, &registry);
        let stale = Gc::new_in(2, &Registry::<i32>::new());
        let orphaned = {
            let other = Registry::<i32>::new();
            let h = Gc::new_in(3, &other);
            other.shutdown();
            h
        };

        assert!(a.try_assign(&orphaned).is_err());
        assert_eq!(a.ref_count(), Some(1));
        assert_eq!(unsafe { *a.get() }, 1);

        a.assign(&stale);
        assert_eq!(stale.ref_count(), Some(2));
    }

    #[test]
    fn test_try_assign_raw_after_shutdown() {
        let registry = Registry::<i32>::new();
        let mut a = Gc::new_in(1, &registry);
        registry.shutdown();

        let err = unsafe { a.try_assign_raw(core::ptr::null_mut()) }.unwrap_err();
        assert!(matches!(err, GcError::RecordNotFound { operation: Operation::AssignRaw, .. }));
    }

    #[test]
    fn test_deferred_collection() {
        let dropped = counter();
        let registry = Registry::<Probe>::with_config(GcConfig::default().deferred());
        let a = Gc::new_in(probe(1, &dropped), &registry);
        drop(a);

        assert_eq!(registry.len(), 1);
        assert_eq!(drops(&dropped), 0);
        assert!(registry.collect());
        assert_eq!(drops(&dropped), 1);
    }

    #[test]
    fn test_independent_addresses_do_not_interfere() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(1, &registry);
        let b = Gc::new_in(2, &registry);
        let a2 = a.clone();

        drop(b);
        assert_eq!(a.ref_count(), Some(2));
        assert_eq!(registry.len(), 1);
        drop(a2);
        assert_eq!(a.ref_count(), Some(1));
    }

    struct Node {
        value: i32,
        next: Option<Gc<Node>>,
        drops: Arc<AtomicUsize>,
    }

    impl Drop for Node {
        fn drop(&mut self) {
            self.drops.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_nested_handles_release_transitively() {
        let dropped = counter();
        let registry = Registry::<Node>::new();

        let tail = Gc::new_in(Node { value: 3, next: None, drops: dropped.clone() }, &registry);
        let mid = Gc::new_in(Node { value: 2, next: Some(tail), drops: dropped.clone() }, &registry);
        let head = Gc::new_in(Node { value: 1, next: Some(mid), drops: dropped.clone() }, &registry);
        assert_eq!(registry.len(), 3);

        let second = unsafe { head.get().next.as_ref().map(|next| next.get().value) };
        assert_eq!(second, Some(2));

        drop(head);
        assert_eq!(drops(&dropped), 3);
        assert!(registry.is_empty());
    }

    #[test]
    fn test_concurrent_clones_balance() {
        let registry = Registry::<u64>::new();
        let handle = Gc::new_in(7u64, &registry);

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| {
                    for _ in 0..500 {
                        let copy = handle.clone();
                        drop(copy);
                    }
                });
            }
        });

        assert_eq!(handle.ref_count(), Some(1));
        assert_eq!(registry.len(), 1);
    }
}

#[cfg(test)]
mod cursor_tests {
    use super::*;

    #[test]
    fn test_begin_end_span_array() {
        let registry = Registry::<i32, 10>::new();
        let arr = Gc::from_vec_in((0..10).collect(), &registry).unwrap();

        let begin = arr.begin();
        let end = arr.end();
        assert_eq!(begin.distance_to(&end), 10);
        assert_eq!(begin.len(), 10);
        assert_ne!(begin, end);
    }

    #[test]
    fn test_single_object_spans_one() {
        let registry = Registry::<i32>::new();
        let a = Gc::new_in(5, &registry);

        let mut cursor = a.begin();
        assert_eq!(unsafe { *cursor.get() }, 5);
        cursor.step_forward();
        assert_eq!(cursor, a.end());
    }

    #[test]
    fn test_walk_forward_and_back() {
        let registry = Registry::<i32, 4>::new();
        let arr = Gc::from_vec_in(vec![1, 2, 3, 4], &registry).unwrap();

        let mut cursor = arr.begin();
        let mut seen = Vec::new();
        while cursor != arr.end() {
            seen.push(unsafe { *cursor.get() });
            cursor.step_forward();
        }
        assert_eq!(seen, vec![1, 2, 3, 4]);

        cursor.step_back();
        assert_eq!(unsafe { *cursor.get() }, 4);
        cursor.retreat(3);
        assert_eq!(cursor, arr.begin());
        cursor.advance(2);
        assert_eq!(cursor.position(), 2);
    }

    #[test]
    fn test_dereference_past_end_is_error() {
        let registry = Registry::<i32, 10>::new();
        let arr = Gc::from_vec_in((0..10).collect(), &registry).unwrap();

        let end = arr.end();
        assert!(!end.in_bounds());
        let err = unsafe { end.try_get() }.unwrap_err();
        assert_eq!(err, GcError::OutOfBounds { position: 10, len: 10 });
    }

    #[test]
    fn test_dereference_before_begin_is_error() {
        let registry = Registry::<i32, 2>::new();
        let arr = Gc::from_vec_in(vec![1, 2], &registry).unwrap();

        let mut cursor = arr.begin();
        cursor.step_back();
        assert_eq!(cursor.position(), -1);
        assert!(unsafe { cursor.try_get() }.is_err());
    }

    #[test]
    #[should_panic(expected = "outside bounds")]
    fn test_get_past_end_panics() {
        let registry = Registry::<i32, 10>::new();
        let arr = Gc::from_vec_in((0..10).collect(), &registry).unwrap();
        let _ = unsafe { arr.end().get() };
    }

    #[test]
    fn test_get_mut_writes_through() {
        let registry = Registry::<i32, 3>::new();
        let arr = Gc::from_vec_in(vec![0, 0, 0], &registry).unwrap();

        let mut cursor = arr.begin();
        cursor.advance(1);
        unsafe { *cursor.get_mut() = 8 };
        assert_eq!(unsafe { arr.as_slice() }, &[0, 8, 0]);
    }

    #[test]
    fn test_from_raw_parts() {
        let mut values = [1u16, 2, 3, 4, 5];
        let lower = values.as_mut_ptr();
        let cursor = unsafe { Cursor::from_raw_parts(lower.add(2), lower, lower.add(5)) };

        assert_eq!(cursor.position(), 2);
        assert_eq!(cursor.len(), 5);
        assert_eq!(unsafe { *cursor.get() }, 3);
    }

    #[test]
    fn test_zero_sized_single_walk_visits_one() {
        let registry = Registry::<()>::new();
        let unit = Gc::new_in((), &registry);

        assert_ne!(unit.begin(), unit.end());

        let mut cursor = unit.begin();
        let mut visited = 0;
        while cursor != unit.end() {
            unsafe { cursor.get() };
            visited += 1;
            cursor.step_forward();
        }
        assert_eq!(visited, 1);
    }

    #[test]
    fn test_zero_sized_array_walk_visits_every_slot() {
        let registry = Registry::<(), 3>::new();
        let units = Gc::from_vec_in(vec![(), (), ()], &registry).unwrap();

        let mut cursor = units.begin();
        let mut visited = 0;
        while cursor != units.end() {
            visited += 1;
            cursor.step_forward();
        }
        assert_eq!(visited, 3);
        assert_eq!(units.begin().distance_to(&units.end()), 3);
    }

    #[test]
    #[should_panic(expected = "outside bounds")]
    fn test_advance_overflow_panics() {
        let registry = Registry::<i32, 2>::new();
        let arr = Gc::from_vec_in(vec![1, 2], &registry).unwrap();

        let mut cursor = arr.begin();
        cursor.advance(usize::MAX);
    }

    #[test]
    #[should_panic(expected = "outside bounds")]
    fn test_retreat_overflow_panics() {
        let registry = Registry::<i32, 2>::new();
        let arr = Gc::from_vec_in(vec![1, 2], &registry).unwrap();

        let mut cursor = arr.begin();
        cursor.retreat(1).retreat(isize::MAX as usize);
        cursor.retreat(1);
    }

    #[test]
    fn test_from_raw_parts_zero_sized_is_empty() {
        let mut units = [(), (), ()];
        let lower = units.as_mut_ptr();
        let cursor = unsafe { Cursor::from_raw_parts(lower, lower, lower.wrapping_add(3)) };

        assert_eq!(cursor.position(), 0);
        assert!(cursor.is_empty());
        assert!(unsafe { cursor.try_get() }.is_err());
    }
}
