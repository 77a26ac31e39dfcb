//! Path installation: hop list + service -> ordered flow-rule submissions.

pub mod installer;

pub use installer::{InstallFailure, InstallRequest, PathInstaller};
