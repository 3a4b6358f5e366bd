//! gc-pointer - reference-counted handles with an explicit sweep
//!
//! A `Gc<T, N>` wraps a raw allocation and counts how many handles alias it.
//! Allocations whose count reaches zero are released by a sweep, run when a
//! handle drops and once more at process cleanup.
//!
//! ```
//! use gc_pointer::{Gc, Registry};
//!
//! let registry = Registry::<i32>::new();
//! let a = Gc::new_in(5, &registry);
//! let b = a.clone();
//! assert_eq!(a.ref_count(), Some(2));
//!
//! drop(b);
//! drop(a);
//! assert!(registry.is_empty());
//! ```

pub mod config;
pub mod error;
pub mod gc;
pub mod heap;
pub mod logging;

// Re-export core types
pub use config::GcConfig;
pub use error::{GcError, Operation};
pub use gc::{AllocationRecord, Cursor, Gc, RecordSnapshot, Registry, RegistryStats};

/// Initialize logging and process-wide tables
pub fn init() {
    logging::init();
    logging::info!(event = "gc_init", "gc-pointer initializing");
    gc::init();
}

/// Drain every registry still holding records
///
/// Replaces an exit hook: call once after the main program logic completes.
pub fn cleanup() {
    logging::info!(event = "gc_cleanup", "gc-pointer shutting down");
    gc::cleanup();
}

/// Runs [`cleanup`] when dropped
///
/// ```
/// fn main() {
///     let _gc = gc_pointer::ShutdownGuard::new();
///     let _value = gc_pointer::Gc::new(42u64);
///     // every registry is drained when `_gc` drops
/// }
/// ```
#[must_use = "cleanup runs when the guard is dropped"]
pub struct ShutdownGuard {
    _private: (),
}

impl ShutdownGuard {
    pub fn new() -> Self {
        init();
        Self { _private: () }
    }
}

impl Default for ShutdownGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ShutdownGuard {
    fn drop(&mut self) {
        cleanup();
    }
}
