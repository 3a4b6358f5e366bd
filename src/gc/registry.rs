//! Registry - allocation records for one (element type, fixed size) pair
//!
//! Design: keyed table behind a single lock.
//! 1. Every find-then-modify sequence holds the lock for its whole duration
//! 2. Allocations are released with the lock dropped, so destructors of
//!    managed values may freely create or drop handles (even on this registry)
//! 3. `collect` rescans after every batch it releases, until a fixed point
//!
//! `Registry<T, 0>` and `Registry<T, 10>` are distinct types with distinct
//! tables; handles of one never see records of the other.

use core::any::type_name;
use core::fmt::{self, Write};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use serde::Serialize;

use super::record::AllocationRecord;
use super::Drain;
use crate::config::GcConfig;
use crate::error::{GcError, Operation};
use crate::logging::{
    debug, log_collect_complete, log_count_changed, log_missing_record, log_record_created,
    log_shutdown, perf,
};

/// Address-keyed collection of allocation records
pub struct RecordTable<T> {
    records: HashMap<usize, AllocationRecord<T>>,
}

impl<T> RecordTable<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: HashMap::with_capacity(capacity),
        }
    }

    /// Absence is the normal "not yet tracked" outcome
    #[inline]
    pub fn find(&self, address: *const T) -> Option<&AllocationRecord<T>> {
        self.records.get(&(address as usize))
    }

    #[inline]
    pub fn find_mut(&mut self, address: *const T) -> Option<&mut AllocationRecord<T>> {
        self.records.get_mut(&(address as usize))
    }

    /// Caller has already checked the address is untracked
    #[inline]
    pub fn insert(&mut self, record: AllocationRecord<T>) {
        debug_assert!(!self.records.contains_key(&record.key()), "duplicate record");
        self.records.insert(record.key(), record);
    }

    /// Remove by address equality
    #[inline]
    pub fn remove(&mut self, record: &AllocationRecord<T>) -> Option<AllocationRecord<T>> {
        self.records.remove(&record.key())
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AllocationRecord<T>> {
        self.records.values()
    }

    /// Unlink every zero-count record
    fn take_garbage(&mut self) -> Vec<AllocationRecord<T>> {
        let dead: Vec<usize> = self
            .records
            .values()
            .filter(|record| record.is_garbage())
            .map(AllocationRecord::key)
            .collect();

        dead.into_iter()
            .filter_map(|key| self.records.remove(&key))
            .collect()
    }

    fn clear_counts(&mut self) {
        self.records.values_mut().for_each(AllocationRecord::clear);
    }
}

// Safety: records hold addresses, never references; access is serialized by the registry lock
unsafe impl<T: Send> Send for RecordTable<T> {}

/// State shared by every clone of a registry and every handle on it
struct Shared<T, const N: usize> {
    table: Mutex<RecordTable<T>>,
    config: GcConfig,
    /// Exit hook registered (set by the first handle)
    hooked: AtomicBool,
    collections: AtomicUsize,
    freed: AtomicUsize,
}

impl<T, const N: usize> Shared<T, N> {
    fn collect(&self) -> bool {
        let timer = perf::track("collect");
        let mut freed = 0;

        loop {
            let garbage = self.table.lock().take_garbage();
            if garbage.is_empty() {
                break;
            }

            freed += garbage.len();
            for record in garbage {
                // Safety: records are only created by `Gc` constructors, whose
                // contract ties each address to the shape recorded for it
                unsafe { record.reclaim() };
            }
        }

        self.collections.fetch_add(1, Ordering::Relaxed);

        if freed > 0 {
            self.freed.fetch_add(freed, Ordering::Relaxed);
            let remaining = self.table.lock().len();
            log_collect_complete(timer.elapsed_us(), freed, remaining);
        }

        freed > 0
    }

    fn shutdown(&self) {
        let tracked = {
            let mut table = self.table.lock();
            if table.is_empty() {
                return;
            }
            table.clear_counts();
            table.len()
        };

        log_shutdown(&label::<T, N>(), tracked);
        self.collect();
    }
}

impl<T: Send, const N: usize> Drain for Shared<T, N> {
    fn drain(&self) {
        self.shutdown();
    }
}

impl<T, const N: usize> Drop for Shared<T, N> {
    fn drop(&mut self) {
        // No handle or registry clone remains; anything still tracked is leaked otherwise
        self.shutdown();
    }
}

fn label<T, const N: usize>() -> String {
    format!("{}, {}", type_name::<T>(), N)
}

fn not_found<T>(address: *const T, operation: Operation) -> GcError {
    GcError::RecordNotFound {
        address: address as usize,
        operation,
    }
}

/// Shared bookkeeping for every `Gc<T, N>` built on it
///
/// Cloning a registry is cheap and yields another view of the same table.
pub struct Registry<T, const N: usize = 0> {
    shared: Arc<Shared<T, N>>,
}

impl<T, const N: usize> Registry<T, N> {
    /// Create an isolated registry with default configuration
    pub fn new() -> Self {
        Self::with_config(GcConfig::default())
    }

    pub fn with_config(config: GcConfig) -> Self {
        Self {
            shared: Arc::new(Shared {
                table: Mutex::new(RecordTable::with_capacity(config.initial_capacity)),
                config,
                hooked: AtomicBool::new(false),
                collections: AtomicUsize::new(0),
                freed: AtomicUsize::new(0),
            }),
        }
    }

    #[inline]
    pub fn config(&self) -> &GcConfig {
        &self.shared.config
    }

    /// Number of tracked records, live or awaiting collection
    pub fn len(&self) -> usize {
        self.shared.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.table.lock().is_empty()
    }

    pub fn contains(&self, address: *const T) -> bool {
        self.shared.table.lock().find(address).is_some()
    }

    /// Current count for `address`, `None` if untracked
    pub fn ref_count(&self, address: *const T) -> Option<u32> {
        self.shared
            .table
            .lock()
            .find(address)
            .map(AllocationRecord::ref_count)
    }

    /// Release every zero-count record
    ///
    /// Returns true iff at least one record was freed.
    pub fn collect(&self) -> bool {
        self.shared.collect()
    }

    /// Force every count to zero and collect
    ///
    /// Handles still alive afterwards are dangling: their unchecked views are
    /// undefined, cloning or assigning them fails, and dropping them is a no-op.
    pub fn shutdown(&self) {
        self.shared.shutdown();
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub fn stats(&self) -> RegistryStats {
        let table = self.shared.table.lock();
        RegistryStats {
            tracked: table.len(),
            live: table.iter().filter(|record| !record.is_garbage()).count(),
            collections: self.shared.collections.load(Ordering::Relaxed),
            freed: self.shared.freed.load(Ordering::Relaxed),
        }
    }

    /// Records ordered by address
    pub fn snapshot(&self) -> Vec<RecordSnapshot> {
        let mut records: Vec<_> = self
            .shared
            .table
            .lock()
            .iter()
            .map(RecordSnapshot::from)
            .collect();
        records.sort_by_key(|record| record.address);
        records
    }

    pub fn snapshot_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.snapshot())
    }

    // ------------------------------------------------------------------
    // Handle plumbing
    // ------------------------------------------------------------------

    /// Copy-construct: the record must already exist
    pub(crate) fn retain(&self, address: *const T, operation: Operation) -> Result<(), GcError> {
        let mut table = self.shared.table.lock();
        let record = table
            .find_mut(address)
            .ok_or_else(|| not_found(address, operation))?;
        let count = record.retain();
        log_count_changed(address as *const u8, count);
        Ok(())
    }

    /// Destruct: a missing record is tolerated and only logged
    pub(crate) fn release(&self, address: *const T) -> bool {
        let mut table = self.shared.table.lock();
        match table.find_mut(address) {
            Some(record) => {
                if record.ref_count() > 0 {
                    let count = record.release();
                    log_count_changed(address as *const u8, count);
                }
                true
            }
            None => {
                log_missing_record(address as *const u8, self.shared.config.strict_drop);
                false
            }
        }
    }

    /// Decrement a record that must exist
    pub(crate) fn release_strict(&self, address: *const T, operation: Operation) -> Result<(), GcError> {
        let mut table = self.shared.table.lock();
        let record = table
            .find_mut(address)
            .ok_or_else(|| not_found(address, operation))?;
        let count = record.release();
        log_count_changed(address as *const u8, count);
        Ok(())
    }

    /// Handle assignment within this registry
    ///
    /// Both records must exist. Decrement and increment happen under one lock
    /// acquisition, so no sweep can observe the transient count.
    pub(crate) fn reassign(&self, from: *const T, to: *const T, operation: Operation) -> Result<(), GcError> {
        let mut table = self.shared.table.lock();
        if table.find(from).is_none() {
            return Err(not_found(from, operation));
        }
        if table.find(to).is_none() {
            return Err(not_found(to, operation));
        }

        if let Some(record) = table.find_mut(from) {
            record.release();
        }
        if let Some(record) = table.find_mut(to) {
            let count = record.retain();
            log_count_changed(to as *const u8, count);
        }
        Ok(())
    }

    /// Raw assignment: `from` must exist, `to` is created on first sight
    ///
    /// Returns the array metadata of the record now referenced.
    pub(crate) fn reassign_raw(&self, from: *const T, to: *mut T) -> Result<(bool, usize), GcError> {
        let mut table = self.shared.table.lock();
        let current = table
            .find_mut(from)
            .ok_or_else(|| not_found(from, Operation::AssignRaw))?;
        current.release();

        Ok(Self::retain_or_insert(&mut table, to))
    }

    fn retain_or_insert(table: &mut RecordTable<T>, address: *mut T) -> (bool, usize) {
        match table.find_mut(address) {
            Some(record) => {
                let count = record.retain();
                log_count_changed(address as *const u8, count);
                (record.is_array(), record.element_count())
            }
            None => {
                let record = AllocationRecord::new(address, N);
                let meta = (record.is_array(), record.element_count());
                log_record_created(address as *const u8, N);
                table.insert(record);
                meta
            }
        }
    }
}

impl<T: Send + 'static, const N: usize> Registry<T, N> {
    /// Process-wide registry for this exact (T, N) pair
    pub fn global() -> Self {
        super::global_registry::<T, N>()
    }

    /// Construct: retain an existing record or create one with count 1
    pub(crate) fn acquire(&self, address: *mut T) -> (bool, usize) {
        self.arm_exit_hook();
        let mut table = self.shared.table.lock();
        Self::retain_or_insert(&mut table, address)
    }

    /// First handle on this registry schedules its drain at process cleanup
    fn arm_exit_hook(&self) {
        if !self.shared.hooked.swap(true, Ordering::AcqRel) {
            debug!(registry = %label::<T, N>(), "Registering exit hook");
            let hook: Weak<dyn Drain> = Arc::downgrade(&self.shared) as Weak<dyn Drain>;
            super::register_exit_hook(hook);
        }
    }
}

impl<T: fmt::Debug, const N: usize> Registry<T, N> {
    /// Human-readable table of (address, count, value)
    ///
    /// The lock is held while values are formatted, so a value's `Debug`
    /// impl must not touch this registry.
    pub fn debug_dump(&self) -> String {
        let table = self.shared.table.lock();
        let mut out = String::new();

        let _ = writeln!(out, "registry<{}>:", label::<T, N>());
        let _ = writeln!(out, "address refcount value");

        if table.is_empty() {
            let _ = writeln!(out, " Container is empty!");
        }

        for record in table.iter() {
            let _ = write!(out, "[{:p}] {} ", record.address(), record.ref_count());
            if record.address().is_null() {
                let _ = writeln!(out, "---");
            } else if record.is_array() {
                // Safety: tracked addresses stay allocated until removed under this lock
                let values = unsafe {
                    core::slice::from_raw_parts(record.address(), record.element_count())
                };
                let _ = writeln!(out, "{:?}", values);
            } else {
                let _ = writeln!(out, "{:?}", unsafe { &*record.address() });
            }
        }

        debug!(event = "registry_dump", records = table.len(), "\n{}", out);
        out
    }
}

impl<T, const N: usize> Clone for Registry<T, N> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T, const N: usize> Default for Registry<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> fmt::Debug for Registry<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("instance", &label::<T, N>())
            .field("tracked", &self.len())
            .finish()
    }
}

/// Registry statistics for monitoring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    /// Records in the table
    pub tracked: usize,
    /// Records with a nonzero count
    pub live: usize,
    /// Sweeps run so far
    pub collections: usize,
    /// Records released so far
    pub freed: usize,
}

/// Serializable view of one record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordSnapshot {
    pub address: usize,
    pub ref_count: u32,
    pub is_array: bool,
    pub element_count: usize,
}

impl<T> From<&AllocationRecord<T>> for RecordSnapshot {
    fn from(record: &AllocationRecord<T>) -> Self {
        Self {
            address: record.key(),
            ref_count: record.ref_count(),
            is_array: record.is_array(),
            element_count: record.element_count(),
        }
    }
}
