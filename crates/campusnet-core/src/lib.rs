//! campusnet core: data model, flow-rule descriptors, and the shared error type.
//!
//! This crate defines the entities the controller reasons about (identities,
//! servers, enrollment groups, connections) and the typed structures exchanged
//! with the topology/flow authority. It intentionally carries no transport or
//! runtime dependencies so the policy model can be reused by tooling and tests.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `CampusNetError`/`Result` so malformed
//! administrative input never brings the controller down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod flow;
pub mod model;

/// Shared result type.
pub use error::{CampusNetError, EntityKind, Result};
