//! Foundational layer for the yawns notification daemon.
//!
//! Provides configuration loading, the logging bootstrap, and the shared
//! error types. The notification engine lives in `yawns-domain`; the D-Bus
//! frontend and daemon binary live in `yawns-system`.

pub mod config;
pub mod error;
pub mod logging;

pub use config::YawnsConfig;
pub use error::{ConfigError, CoreError};
