//! Bounds-checked cursor over the elements behind a handle
//!
//! A cursor is a position plus a `[lower, upper)` window. Stepping is free to
//! leave the window (so `end()` is representable); dereferencing outside it
//! fails.

use core::fmt;
use core::marker::PhantomData;

use crate::error::{fatal, GcError};

/// Non-owning traversal position; borrows the handle it was made from
pub struct Cursor<'a, T> {
    lower: *mut T,
    len: usize,
    position: isize,
    _handle: PhantomData<&'a T>,
}

impl<'a, T> Cursor<'a, T> {
    #[inline]
    pub(crate) fn new(lower: *mut T, len: usize, position: isize) -> Self {
        Self {
            lower,
            len,
            position,
            _handle: PhantomData,
        }
    }

    /// Build from raw `current`, `lower` and exclusive `upper` addresses
    ///
    /// Zero-sized `T` has no address arithmetic, so the window is always
    /// empty and the cursor sits at position 0.
    ///
    /// # Safety
    /// All three pointers must lie in (or one past) the same allocation, with
    /// `lower <= upper`, and that allocation must outlive `'a`.
    pub unsafe fn from_raw_parts(current: *mut T, lower: *mut T, upper: *mut T) -> Self {
        let len = elements_between(lower, upper);
        debug_assert!(len >= 0, "cursor bounds inverted");
        Self::new(lower, len as usize, elements_between(lower, current))
    }

    /// Offset from the lower bound
    #[inline]
    pub fn position(&self) -> isize {
        self.position
    }

    /// Width of the window
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[inline]
    pub fn in_bounds(&self) -> bool {
        self.position >= 0 && (self.position as usize) < self.len
    }

    /// Current address (may be outside the window)
    #[inline]
    pub fn as_ptr(&self) -> *mut T {
        self.lower.wrapping_offset(self.position)
    }

    #[inline]
    pub fn step_forward(&mut self) -> &mut Self {
        self.position += 1;
        self
    }

    #[inline]
    pub fn step_back(&mut self) -> &mut Self {
        self.position -= 1;
        self
    }

    /// Step `n` elements forward; panics if the position would overflow
    #[track_caller]
    pub fn advance(&mut self, n: usize) -> &mut Self {
        let moved = isize::try_from(n)
            .ok()
            .and_then(|n| self.position.checked_add(n));
        self.move_to(moved)
    }

    /// Step `n` elements back; panics if the position would overflow
    #[track_caller]
    pub fn retreat(&mut self, n: usize) -> &mut Self {
        let moved = isize::try_from(n)
            .ok()
            .and_then(|n| self.position.checked_sub(n));
        self.move_to(moved)
    }

    #[track_caller]
    fn move_to(&mut self, position: Option<isize>) -> &mut Self {
        match position {
            Some(position) => {
                self.position = position;
                self
            }
            None => fatal(GcError::OutOfBounds {
                position: self.position,
                len: self.len,
            }),
        }
    }

    /// Signed element distance from `self` to `other`
    #[inline]
    pub fn distance_to(&self, other: &Self) -> isize {
        other.position + elements_between(self.lower, other.lower) - self.position
    }

    /// Element at the current position, or `OutOfBounds`
    ///
    /// # Safety
    /// The allocation behind the originating handle must still be live.
    pub unsafe fn try_get(&self) -> Result<&'a T, GcError> {
        self.check()?;
        Ok(&*self.as_ptr())
    }

    /// Element at the current position; panics outside the window
    ///
    /// # Safety
    /// The allocation behind the originating handle must still be live.
    #[track_caller]
    pub unsafe fn get(&self) -> &'a T {
        match self.try_get() {
            Ok(value) => value,
            Err(err) => fatal(err),
        }
    }

    /// Mutable element at the current position; panics outside the window
    ///
    /// # Safety
    /// The allocation must still be live and no other reference to this
    /// element may be in use.
    #[track_caller]
    pub unsafe fn get_mut(&mut self) -> &mut T {
        if let Err(err) = self.check() {
            fatal(err);
        }
        &mut *self.as_ptr()
    }

    #[inline]
    fn check(&self) -> Result<(), GcError> {
        if self.in_bounds() {
            Ok(())
        } else {
            Err(GcError::OutOfBounds {
                position: self.position,
                len: self.len,
            })
        }
    }
}

/// Whole elements from `from` to `to`; always 0 for zero-sized `T`
#[inline]
fn elements_between<T>(from: *const T, to: *const T) -> isize {
    match core::mem::size_of::<T>() {
        0 => 0,
        size => (to as isize).wrapping_sub(from as isize) / size as isize,
    }
}

impl<T> Clone for Cursor<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Cursor<'_, T> {}

/// Cursors compare by current position only
///
/// Positions are compared in elements rather than addresses, so cursors over
/// zero-sized values still tell `begin()` from `end()`.
impl<T> PartialEq for Cursor<'_, T> {
    fn eq(&self, other: &Self) -> bool {
        self.distance_to(other) == 0
    }
}

impl<T> Eq for Cursor<'_, T> {}

impl<T> fmt::Debug for Cursor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("lower", &self.lower)
            .field("position", &self.position)
            .field("len", &self.len)
            .finish()
    }
}
