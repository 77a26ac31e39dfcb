//! Admin HTTP API (JSON, plus YAML for inventory).
//!
//! Handlers are thin: they decode, call into `AppState`, and map
//! `CampusNetError` through `ApiError`.

pub mod connections;
pub mod directory;
pub mod error;
pub mod groups;
pub mod inventory;

pub use error::{ApiError, ApiResult};
