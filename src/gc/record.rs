//! Allocation record - bookkeeping for one managed address
//!
//! Identity is the address alone: two records are equal iff they describe the
//! same allocation, whatever their counts.

use core::fmt;
use crate::heap;
use crate::logging::log_release;

/// Reference count plus array metadata for one allocation
pub struct AllocationRecord<T> {
    address: *mut T,
    ref_count: u32,
    is_array: bool,
    element_count: usize,
}

impl<T> AllocationRecord<T> {
    /// Record the first reference to `address`
    ///
    /// `size == 0` marks a single object; anything else an array of `size` elements.
    #[inline]
    pub fn new(address: *mut T, size: usize) -> Self {
        Self {
            address,
            ref_count: 1,
            is_array: size != 0,
            element_count: size,
        }
    }

    #[inline]
    pub fn address(&self) -> *mut T {
        self.address
    }

    /// Lookup key in the record table
    #[inline]
    pub fn key(&self) -> usize {
        self.address as usize
    }

    #[inline]
    pub fn ref_count(&self) -> u32 {
        self.ref_count
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.is_array
    }

    #[inline]
    pub fn element_count(&self) -> usize {
        self.element_count
    }

    /// Eligible for reclamation
    #[inline]
    pub fn is_garbage(&self) -> bool {
        self.ref_count == 0
    }

    #[inline]
    pub(crate) fn retain(&mut self) -> u32 {
        debug_assert!(self.ref_count < u32::MAX, "refcount overflow");
        self.ref_count += 1;
        self.ref_count
    }

    #[inline]
    pub(crate) fn release(&mut self) -> u32 {
        debug_assert!(self.ref_count > 0, "refcount underflow");
        self.ref_count = self.ref_count.saturating_sub(1);
        self.ref_count
    }

    #[inline]
    pub(crate) fn clear(&mut self) {
        self.ref_count = 0;
    }

    /// Release the underlying allocation
    ///
    /// Null records own nothing and are simply discarded.
    ///
    /// # Safety
    /// The address must have come from [`heap`] in the shape this record
    /// describes and must not be released through any other record.
    pub(crate) unsafe fn reclaim(self) {
        if self.address.is_null() {
            return;
        }

        log_release(self.address as *const u8, self.is_array);

        if self.is_array {
            heap::release_array(self.address, self.element_count);
        } else {
            heap::release_single(self.address);
        }
    }
}

impl<T> PartialEq for AllocationRecord<T> {
    fn eq(&self, other: &Self) -> bool {
        self.address == other.address
    }
}

impl<T> Eq for AllocationRecord<T> {}

impl<T> fmt::Debug for AllocationRecord<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AllocationRecord")
            .field("address", &self.address)
            .field("ref_count", &self.ref_count)
            .field("is_array", &self.is_array)
            .field("element_count", &self.element_count)
            .finish()
    }
}

// Safety: the raw address is only dereferenced by its owning registry
unsafe impl<T: Send> Send for AllocationRecord<T> {}
