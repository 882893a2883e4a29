//! Re-export public algorithms.

pub mod collect;
pub mod communicator;
pub mod halo_exchange;
pub mod stencil;
pub mod wire;

pub use collect::ResultCollector;
pub use halo_exchange::{ExchangeStats, HaloExchanger, PendingExchange};
pub use stencil::StencilUpdater;
