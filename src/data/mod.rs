//! Data module: local slabs, assembled fields and boundary conditions

pub mod bc;
pub mod global_field;
pub mod local_grid;

pub use crate::debug_invariants::DebugInvariants;

pub use bc::DirichletBoundary;
pub use global_field::GlobalField;
pub use local_grid::LocalGridBuffer;
