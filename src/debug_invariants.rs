//! Opt-in structural checks for decompositions and local slabs.
//!
//! Checks are compiled in for debug builds and whenever the
//! `strict-invariants` or `check-invariants` feature is enabled; release
//! builds skip them entirely.

use crate::heat_error::HeatError;

/// Types whose internal layout can be verified after construction.
pub trait DebugInvariants {
    /// Validate invariants and return the first violation found.
    fn validate_invariants(&self) -> Result<(), HeatError>;

    /// Panic on the first violation when invariant checking is enabled.
    fn debug_assert_invariants(&self) {
        crate::debug_invariants!(self.validate_invariants(), "structural check");
    }
}

/// Run a fallible check and panic with `ctx` on error when invariant
/// checking is enabled. Expands to nothing otherwise.
#[macro_export]
macro_rules! debug_invariants {
    ($expr:expr, $($ctx:tt)*) => {
        #[cfg(any(debug_assertions, feature = "strict-invariants", feature = "check-invariants"))]
        if let Err(e) = $expr {
            panic!(concat!("[invariants] ", $($ctx)*, ": {}"), e);
        }
    };
}
