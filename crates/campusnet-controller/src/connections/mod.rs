//! Connection lifecycle: registry of active sessions plus the orchestration
//! that programs and tears down their paths.

mod manager;
mod registry;

pub use manager::{ConnectionManager, ConnectionTarget};
pub use registry::ConnectionRegistry;
