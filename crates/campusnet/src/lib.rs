//! Top-level facade crate for campusnet.
//!
//! Re-exports the policy model and the controller library so users can
//! depend on a single crate.

pub mod core {
    pub use campusnet_core::*;
}

pub mod controller {
    pub use campusnet_controller::*;
}
