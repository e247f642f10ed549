//! Configuration loading for the yawns daemon.
//!
//! The daemon reads a single TOML file with a `[logging]` section, a
//! `[general]` section, and one section per presentation lane (`[corner]`,
//! `[center]`, `[media]`). Missing sections and fields fall back to built-in
//! defaults; unknown keys are rejected so typos surface at startup.

mod defaults;
mod loader;
mod types;

pub use loader::{load_config, load_config_from_path};
pub use types::{GeneralConfig, LaneConfig, LoggingConfig, YawnsConfig};
