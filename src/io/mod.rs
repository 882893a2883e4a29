//! Output collaborators for assembled fields.
//!
//! The solvers never touch the filesystem; callers hand the returned
//! [`GlobalField`](crate::data::global_field::GlobalField) to a writer here.

pub mod csv;

pub use csv::{save_csv, write_csv};
