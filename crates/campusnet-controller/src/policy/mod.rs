//! Policy layer (enrollment groups, allow rules, authorization).
//!
//! The store owns group state; the engine is a pure read-only decision over
//! the directory and the store.

pub mod allowlist;
pub mod engine;
pub mod store;

pub use engine::{AccessDecision, AuthorizationEngine, DenyReason};
pub use store::PolicyStore;
