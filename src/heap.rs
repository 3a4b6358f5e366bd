//! Allocation capability - where managed memory is created and released
//!
//! Design: Thin layer over the global allocator via `Box`:
//! - Single objects are `Box<T>` turned into raw pointers
//! - Arrays are `Box<[T]>` turned into a pointer to their first element
//! - Release rebuilds the box so element destructors run exactly once
//!
//! Every pointer handed to `Gc::from_raw` must come from here, and must be
//! released the same way it was created (single vs. array, same length).

use core::ptr;
use std::sync::atomic::{AtomicUsize, Ordering};
use crate::logging::{log_allocation, log_deallocation};

static ALLOCATIONS: AtomicUsize = AtomicUsize::new(0);
static RELEASES: AtomicUsize = AtomicUsize::new(0);

/// Move a value onto the heap
#[inline]
pub fn allocate_single<T>(value: T) -> *mut T {
    adopt_single(Box::new(value))
}

/// Take ownership of an existing box
#[inline]
pub fn adopt_single<T>(boxed: Box<T>) -> *mut T {
    let ptr = Box::into_raw(boxed);
    record_allocation(core::mem::size_of::<T>(), ptr as *const u8);
    ptr
}

/// Allocate `len` default-initialized elements
pub fn allocate_array<T: Default>(len: usize) -> *mut T {
    let values: Vec<T> = core::iter::repeat_with(T::default).take(len).collect();
    adopt_array(values.into_boxed_slice())
}

/// Take ownership of an existing boxed slice, returning its first element
#[inline]
pub fn adopt_array<T>(slice: Box<[T]>) -> *mut T {
    let size = core::mem::size_of_val(&*slice);
    let ptr = Box::into_raw(slice) as *mut T;
    record_allocation(size, ptr as *const u8);
    ptr
}

/// Release a single object
///
/// # Safety
/// `ptr` must come from [`allocate_single`] or [`adopt_single`] and must not
/// have been released already.
pub unsafe fn release_single<T>(ptr: *mut T) {
    log_deallocation(ptr as *const u8);
    RELEASES.fetch_add(1, Ordering::Relaxed);
    drop(Box::from_raw(ptr));
}

/// Release an array of `len` elements
///
/// # Safety
/// `ptr` must come from [`allocate_array`] or [`adopt_array`] with exactly
/// `len` elements and must not have been released already.
pub unsafe fn release_array<T>(ptr: *mut T, len: usize) {
    log_deallocation(ptr as *const u8);
    RELEASES.fetch_add(1, Ordering::Relaxed);
    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(ptr, len)));
}

#[inline]
fn record_allocation(size: usize, ptr: *const u8) {
    ALLOCATIONS.fetch_add(1, Ordering::Relaxed);
    log_allocation(size, ptr);
}

/// Process-wide allocation counters
pub fn stats() -> HeapStats {
    HeapStats {
        allocations: ALLOCATIONS.load(Ordering::Relaxed),
        releases: RELEASES.load(Ordering::Relaxed),
    }
}

/// Heap statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeapStats {
    pub allocations: usize,
    pub releases: usize,
}

impl HeapStats {
    /// Allocations not yet released
    pub fn outstanding(&self) -> usize {
        self.allocations.saturating_sub(self.releases)
    }
}
