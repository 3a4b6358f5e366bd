//! Gc handle - a counted view onto a registry record
//!
//! Handles never own a record alone: every handle holding the same address
//! shares one record, and the registry alone decides when the allocation is
//! released. The element accessors are unchecked and therefore `unsafe`;
//! the counting API is safe.

use core::fmt;
use core::ptr;

use super::cursor::Cursor;
use super::registry::Registry;
use crate::error::{fatal, GcError, Operation};
use crate::heap;

/// Reference-counted handle to a single object (`N == 0`) or an array of
/// exactly `N` elements
///
/// Handles with different `N` use different registries even for the same `T`.
pub struct Gc<T: Send + 'static, const N: usize = 0> {
    addr: *mut T,
    /// Mirrored from the record at construction
    is_array: bool,
    len: usize,
    registry: Registry<T, N>,
}

impl<T: Send + 'static> Gc<T, 0> {
    /// Allocate `value` and manage it on the global registry
    pub fn new(value: T) -> Self {
        Self::new_in(value, &Registry::global())
    }

    pub fn new_in(value: T, registry: &Registry<T, 0>) -> Self {
        // Safety: fresh single allocation from the heap module
        unsafe { Self::from_raw_in(heap::allocate_single(value), registry) }
    }

    pub fn from_box(boxed: Box<T>) -> Self {
        Self::from_box_in(boxed, &Registry::global())
    }

    pub fn from_box_in(boxed: Box<T>, registry: &Registry<T, 0>) -> Self {
        // Safety: the box's allocation is handed over whole
        unsafe { Self::from_raw_in(heap::adopt_single(boxed), registry) }
    }

    /// Allocate `value` and repoint this handle at it
    pub fn assign_new(&mut self, value: T) {
        // Safety: fresh single allocation from the heap module
        unsafe { self.assign_raw(heap::allocate_single(value)) };
    }
}

impl<T: Send + 'static, const N: usize> Gc<T, N> {
    /// Manage an array of exactly `N` elements on the global registry
    pub fn from_boxed_slice(values: Box<[T]>) -> Result<Self, GcError> {
        Self::from_boxed_slice_in(values, &Registry::global())
    }

    pub fn from_boxed_slice_in(values: Box<[T]>, registry: &Registry<T, N>) -> Result<Self, GcError> {
        check_len::<N>(values.len())?;
        // Safety: length matches the registry's fixed size
        Ok(unsafe { Self::from_raw_in(heap::adopt_array(values), registry) })
    }

    pub fn from_vec(values: Vec<T>) -> Result<Self, GcError> {
        Self::from_boxed_slice(values.into_boxed_slice())
    }

    pub fn from_vec_in(values: Vec<T>, registry: &Registry<T, N>) -> Result<Self, GcError> {
        Self::from_boxed_slice_in(values.into_boxed_slice(), registry)
    }

    /// Handle over the null address
    ///
    /// The null address gets a record like any other address.
    pub fn null() -> Self {
        Self::null_in(&Registry::global())
    }

    pub fn null_in(registry: &Registry<T, N>) -> Self {
        // Safety: null is never released
        unsafe { Self::from_raw_in(ptr::null_mut(), registry) }
    }

    /// Manage a raw address on the global registry
    ///
    /// # Safety
    /// See [`Gc::from_raw_in`].
    pub unsafe fn from_raw(addr: *mut T) -> Self {
        Self::from_raw_in(addr, &Registry::global())
    }

    /// Manage a raw address, retaining its record or creating one
    ///
    /// # Safety
    /// `addr` must be null, or come from [`heap`]: a single object when
    /// `N == 0`, otherwise an array of exactly `N` elements. It must not be
    /// managed by any other registry.
    pub unsafe fn from_raw_in(addr: *mut T, registry: &Registry<T, N>) -> Self {
        let (is_array, len) = registry.acquire(addr);
        Self {
            addr,
            is_array,
            len,
            registry: registry.clone(),
        }
    }

    /// Copy-construct, failing if this handle's record has vanished
    pub fn try_clone(&self) -> Result<Self, GcError> {
        self.registry.retain(self.addr, Operation::Clone)?;
        Ok(Self {
            addr: self.addr,
            is_array: self.is_array,
            len: self.len,
            registry: self.registry.clone(),
        })
    }

    /// Repoint at `other`'s address; panics if either record is missing
    #[track_caller]
    pub fn assign(&mut self, other: &Self) {
        if let Err(err) = self.try_assign(other) {
            fatal(err);
        }
    }

    /// Repoint at `other`'s address
    ///
    /// On error nothing changes. Assigning from a handle on the same address
    /// leaves the count as it was and never exposes it to a sweep.
    pub fn try_assign(&mut self, other: &Self) -> Result<(), GcError> {
        if self.registry.ptr_eq(&other.registry) {
            self.registry.reassign(self.addr, other.addr, Operation::AssignHandle)?;
        } else {
            other.registry.retain(other.addr, Operation::AssignHandle)?;
            if let Err(err) = self.registry.release_strict(self.addr, Operation::AssignHandle) {
                other.registry.release(other.addr);
                return Err(err);
            }
            self.registry = other.registry.clone();
        }

        self.addr = other.addr;
        self.is_array = other.is_array;
        self.len = other.len;
        Ok(())
    }

    /// Repoint at a raw address, returning it; panics if this handle's record is missing
    ///
    /// The old record is decremented but not swept.
    ///
    /// # Safety
    /// Same contract as [`Gc::from_raw_in`].
    #[track_caller]
    pub unsafe fn assign_raw(&mut self, addr: *mut T) -> *mut T {
        match self.try_assign_raw(addr) {
            Ok(addr) => addr,
            Err(err) => fatal(err),
        }
    }

    /// # Safety
    /// Same contract as [`Gc::from_raw_in`].
    pub unsafe fn try_assign_raw(&mut self, addr: *mut T) -> Result<*mut T, GcError> {
        let (is_array, len) = self.registry.reassign_raw(self.addr, addr)?;
        self.addr = addr;
        self.is_array = is_array;
        self.len = len;
        Ok(addr)
    }

    /// Replace with a fresh array of exactly `N` elements
    pub fn assign_boxed_slice(&mut self, values: Box<[T]>) -> Result<(), GcError> {
        check_len::<N>(values.len())?;
        let addr = heap::adopt_array(values);
        // Safety: length matches the registry's fixed size
        if let Err(err) = unsafe { self.try_assign_raw(addr) } {
            // Safety: never reached the registry
            unsafe { heap::release_array(addr, N) };
            return Err(err);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Unchecked views
    // ------------------------------------------------------------------

    /// Raw address (member access / implicit conversion)
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.addr
    }

    /// # Safety
    /// The address must be non-null and its record not yet collected.
    #[inline]
    pub unsafe fn get(&self) -> &T {
        &*self.addr
    }

    /// # Safety
    /// As [`Gc::get`], and no other handle's view of the value may be in use.
    #[inline]
    pub unsafe fn get_mut(&mut self) -> &mut T {
        &mut *self.addr
    }

    /// Element `index` with no bounds check
    ///
    /// # Safety
    /// As [`Gc::get`], and `index` must be within the allocation.
    #[inline]
    pub unsafe fn get_unchecked(&self, index: usize) -> &T {
        &*self.addr.add(index)
    }

    /// # Safety
    /// As [`Gc::get_unchecked`] and [`Gc::get_mut`].
    #[inline]
    pub unsafe fn get_unchecked_mut(&mut self, index: usize) -> &mut T {
        &mut *self.addr.add(index)
    }

    /// Every element as a slice
    ///
    /// # Safety
    /// As [`Gc::get`].
    #[inline]
    pub unsafe fn as_slice(&self) -> &[T] {
        core::slice::from_raw_parts(self.addr, self.extent())
    }

    // ------------------------------------------------------------------
    // Cursors
    // ------------------------------------------------------------------

    /// Cursor at the first element
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::new(self.addr, self.extent(), 0)
    }

    /// Cursor one past the last element
    pub fn end(&self) -> Cursor<'_, T> {
        let extent = self.extent();
        Cursor::new(self.addr, extent, extent as isize)
    }

    /// Elements reachable through cursors: `N` for arrays, 1 otherwise
    #[inline]
    fn extent(&self) -> usize {
        if self.is_array {
            self.len
        } else {
            1
        }
    }

    // ------------------------------------------------------------------
    // Introspection
    // ------------------------------------------------------------------

    #[inline]
    pub fn is_null(&self) -> bool {
        self.addr.is_null()
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    /// Element count recorded for arrays, 0 for single objects
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Count on this handle's record, `None` once it has been collected
    pub fn ref_count(&self) -> Option<u32> {
        self.registry.ref_count(self.addr)
    }

    #[inline]
    pub fn registry(&self) -> &Registry<T, N> {
        &self.registry
    }

    #[inline]
    pub fn ptr_eq(this: &Self, other: &Self) -> bool {
        this.addr == other.addr
    }

    // ------------------------------------------------------------------
    // Global registry operations for this (T, N)
    // ------------------------------------------------------------------

    /// Sweep the global registry
    pub fn collect() -> bool {
        Registry::<T, N>::global().collect()
    }

    pub fn registry_size() -> usize {
        Registry::<T, N>::global().len()
    }

    /// Force the global registry empty
    pub fn shutdown() {
        Registry::<T, N>::global().shutdown();
    }
}

impl<T: Send + fmt::Debug + 'static, const N: usize> Gc<T, N> {
    /// Dump the global registry
    pub fn debug_dump() -> String {
        Registry::<T, N>::global().debug_dump()
    }
}

fn check_len<const N: usize>(found: usize) -> Result<(), GcError> {
    if N == 0 || found != N {
        return Err(GcError::LengthMismatch { expected: N, found });
    }
    Ok(())
}

impl<T: Send + 'static, const N: usize> Clone for Gc<T, N> {
    #[track_caller]
    fn clone(&self) -> Self {
        match self.try_clone() {
            Ok(handle) => handle,
            Err(err) => fatal(err),
        }
    }

    #[track_caller]
    fn clone_from(&mut self, source: &Self) {
        self.assign(source);
    }
}

impl<T: Send + 'static, const N: usize> Drop for Gc<T, N> {
    fn drop(&mut self) {
        self.registry.release(self.addr);

        if self.registry.config().collect_on_drop {
            self.registry.collect();
        }
    }
}

impl<T: Send + 'static, const N: usize> Default for Gc<T, N> {
    fn default() -> Self {
        Self::null()
    }
}

impl<T: Send + 'static, const N: usize> fmt::Debug for Gc<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gc")
            .field("addr", &self.addr)
            .field("is_array", &self.is_array)
            .field("len", &self.len)
            .finish()
    }
}

impl<T: Send + 'static, const N: usize> fmt::Pointer for Gc<T, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Pointer::fmt(&self.addr, f)
    }
}

// Handles alias their value across threads; counting is serialized by the registry lock
unsafe impl<T: Send + Sync + 'static, const N: usize> Send for Gc<T, N> {}
unsafe impl<T: Send + Sync + 'static, const N: usize> Sync for Gc<T, N> {}
