//! Reference-counted handles with an explicit sweep
//!
//! Design: counting only, no tracing:
//! 1. Every `Gc<T, N>` is a view onto a record in a `Registry<T, N>`
//! 2. Construction, cloning and assignment adjust that record's count
//! 3. Dropping a handle decrements and sweeps zero-count records
//! 4. `cleanup()` drains every registry still holding records
//!
//! Cycles are never discovered; a cycle of handles stays alive until its
//! registry is shut down.

mod record;
mod registry;
mod pointer;
mod cursor;

#[cfg(test)]
mod tests;

pub use record::AllocationRecord;
pub use registry::{RecordSnapshot, RecordTable, Registry, RegistryStats};
pub use pointer::Gc;
pub use cursor::Cursor;

use core::any::{Any, TypeId};
use std::sync::Weak;

use dashmap::DashMap;
use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::config::GcConfig;
use crate::logging::{debug, info};

/// Process-wide registries, one per (T, N) pair
static REGISTRIES: Lazy<DashMap<TypeId, Box<dyn Any + Send + Sync>>> = Lazy::new(DashMap::new);

/// Registries to drain at process cleanup
static EXIT_HOOKS: Lazy<Mutex<Vec<Weak<dyn Drain>>>> = Lazy::new(|| Mutex::new(Vec::new()));

/// Something that can be forced empty at process cleanup
pub(crate) trait Drain: Send + Sync {
    fn drain(&self);
}

/// Initialize process-wide tables (idempotent)
pub fn init() {
    Lazy::force(&REGISTRIES);
    Lazy::force(&EXIT_HOOKS);
    debug!("GC tables initialized");
}

/// Drain every registry that ever held a handle and is still alive
///
/// Each registered hook runs at most once; registries that gain their first
/// handle afterwards register again.
pub fn cleanup() {
    let hooks = core::mem::take(&mut *EXIT_HOOKS.lock());
    info!(hooks = hooks.len(), "GC cleanup starting");

    let mut drained = 0;
    for hook in hooks {
        if let Some(registry) = hook.upgrade() {
            registry.drain();
            drained += 1;
        }
    }

    debug!(drained, "GC cleanup complete");
}

/// Number of exit hooks whose registry is still alive
pub fn pending_exit_hooks() -> usize {
    EXIT_HOOKS
        .lock()
        .iter()
        .filter(|hook| hook.strong_count() > 0)
        .count()
}

pub(crate) fn register_exit_hook(hook: Weak<dyn Drain>) {
    let mut hooks = EXIT_HOOKS.lock();
    hooks.retain(|existing| existing.strong_count() > 0);
    hooks.push(hook);
}

pub(crate) fn global_registry<T: Send + 'static, const N: usize>() -> Registry<T, N> {
    let key = TypeId::of::<Registry<T, N>>();

    if let Some(entry) = REGISTRIES.get(&key) {
        if let Some(registry) = entry.downcast_ref::<Registry<T, N>>() {
            return registry.clone();
        }
    }

    let entry = REGISTRIES
        .entry(key)
        .or_insert_with(|| {
            Box::new(Registry::<T, N>::with_config(GcConfig::from_env())) as Box<dyn Any + Send + Sync>
        });

    match entry.downcast_ref::<Registry<T, N>>() {
        Some(registry) => registry.clone(),
        None => unreachable!("registry table entry keyed by a different type"),
    }
}
