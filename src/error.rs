//! Error taxonomy for handle and cursor operations
//!
//! Three kinds of failure are reported here:
//! - A handle's own address missing from its registry (precondition violation)
//! - A cursor dereferenced outside its `[lower, upper)` window
//! - An array allocation whose length disagrees with the handle's fixed size
//!
//! Benign absence (a never-seen address during construction) is not an error
//! and never shows up as one.

use core::fmt;
use crate::logging::error;

/// Handle operation that performed a registry lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Clone,
    AssignRaw,
    AssignHandle,
    Drop,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clone => write!(f, "clone"),
            Self::AssignRaw => write!(f, "raw assignment"),
            Self::AssignHandle => write!(f, "handle assignment"),
            Self::Drop => write!(f, "drop"),
        }
    }
}

/// Handle and cursor errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GcError {
    /// A live handle's address has no record in its registry
    RecordNotFound { address: usize, operation: Operation },
    /// Cursor position outside `[0, len)`
    OutOfBounds { position: isize, len: usize },
    /// Array allocation length differs from the handle's fixed size
    LengthMismatch { expected: usize, found: usize },
}

impl fmt::Display for GcError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RecordNotFound { address, operation } => {
                write!(f, "No allocation record for {:#x} during {}", address, operation)
            }
            Self::OutOfBounds { position, len } => {
                write!(f, "Cursor position {} outside bounds [0, {})", position, len)
            }
            Self::LengthMismatch { expected, found } => {
                write!(f, "Array length mismatch: expected {}, found {}", expected, found)
            }
        }
    }
}

impl std::error::Error for GcError {}

/// Report an unrecoverable invariant breach and abort the current operation
#[cold]
#[track_caller]
pub(crate) fn fatal(err: GcError) -> ! {
    error!(event = "invariant_violation", error = %err, "GC invariant violated");
    panic!("{}", err)
}
