//! Controller config loader (strict parsing).

pub mod schema;

use std::fs;

use campusnet_core::error::{CampusNetError, Result};

pub use schema::{ControllerConfig, ControllerSection, FlowSection, ServerAttachment, TopologySection};

pub fn load_from_file(path: &str) -> Result<ControllerConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| CampusNetError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<ControllerConfig> {
    let cfg: ControllerConfig = serde_yaml::from_str(s)
        .map_err(|e| CampusNetError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
