//! campusnet controller library entry.
//!
//! Wires the directory, policy store, authorization engine, topology client,
//! path installer and connection registry into one application state served
//! over an admin HTTP API. Consumed by the binary (`main.rs`) and by
//! integration tests.

pub mod api;
pub mod app_state;
pub mod config;
pub mod connections;
pub mod directory;
pub mod install;
pub mod inventory;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod router;
pub mod topology;
