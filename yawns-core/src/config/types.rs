//! Configuration data structures for the yawns daemon.
//!
//! The TOML file is first deserialized into a raw form where every field is
//! optional, then resolved against the per-lane defaults in
//! [`super::defaults`]. The resolved [`YawnsConfig`] is what the rest of the
//! daemon consumes; it never contains `Option`s for values that have a
//! built-in default.

use serde::Deserialize;
use std::path::PathBuf;

use super::defaults;
use crate::error::ConfigError;

/// Configuration for the logging subsystem.
///
/// Consumed by `yawns_core::logging` to initialize the global `tracing`
/// subscriber.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct LoggingConfig {
    /// Minimum level to record: "trace", "debug", "info", "warn" or "error".
    #[serde(default = "defaults::log_level")]
    pub level: String,
    /// Optional log file. `None` disables file logging.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
            file_path: None,
        }
    }
}

/// Options that apply to the daemon as a whole rather than to one lane.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct GeneralConfig {
    /// Shell command spawned (fire and forget) each time a notification is
    /// first shown. Empty/absent disables the hook.
    #[serde(default)]
    pub command: Option<String>,
    /// Screen geometry used to resolve far-edge anchors until a
    /// presentation frontend reports the real one.
    #[serde(default = "defaults::screen_width")]
    pub screen_width: u32,
    #[serde(default = "defaults::screen_height")]
    pub screen_height: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            command: None,
            screen_width: defaults::screen_width(),
            screen_height: defaults::screen_height(),
        }
    }
}

/// Resolved per-lane options.
///
/// Negative offsets anchor to the far screen edge, mirroring the window
/// geometry convention the presentation layer uses: `x_offset = -40` means
/// "40 px from the right edge", and a negative `y_offset` additionally flips
/// the stacking direction so notifications grow upward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneConfig {
    pub width: u32,
    pub height: u32,
    pub x_offset: i32,
    pub y_offset: i32,
    /// Vertical gap between stacked notifications, in pixels.
    pub gap: u32,
    /// Default expiry timeout in milliseconds, used when a request carries
    /// `expire_timeout <= 0`.
    pub timeout: u64,
    pub icon_size: u32,
    /// Minimum urgency (0 = low, 1 = normal, 2 = critical) a notification
    /// needs to stay visible while a fullscreen window is active.
    pub fullscreen_min_urgency: u8,
    /// Whitespace-separated glob patterns matched against the sending
    /// application's name.
    pub app_name_filters: String,
    /// Whitespace-separated glob patterns matched against the summary.
    pub summary_filters: String,
    /// Whitespace-separated glob patterns matched against the body.
    pub body_filters: String,
}

/// Root of the resolved daemon configuration.
#[derive(Debug, Clone)]
pub struct YawnsConfig {
    pub logging: LoggingConfig,
    pub general: GeneralConfig,
    pub corner: LaneConfig,
    pub center: LaneConfig,
    pub media: LaneConfig,
}

impl Default for YawnsConfig {
    fn default() -> Self {
        RawConfig::default().resolve().expect("built-in defaults are valid")
    }
}

/// Raw, fully-optional form of a lane section as it appears in the file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub(super) struct RawLaneSection {
    width: Option<u32>,
    height: Option<u32>,
    x_offset: Option<i32>,
    y_offset: Option<i32>,
    gap: Option<u32>,
    timeout: Option<u64>,
    icon_size: Option<u32>,
    fullscreen_min_urgency: Option<u8>,
    app_name_filters: Option<String>,
    summary_filters: Option<String>,
    body_filters: Option<String>,
}

impl RawLaneSection {
    fn resolve(self, base: LaneConfig) -> Result<LaneConfig, ConfigError> {
        let resolved = LaneConfig {
            width: self.width.unwrap_or(base.width),
            height: self.height.unwrap_or(base.height),
            x_offset: self.x_offset.unwrap_or(base.x_offset),
            y_offset: self.y_offset.unwrap_or(base.y_offset),
            gap: self.gap.unwrap_or(base.gap),
            timeout: self.timeout.unwrap_or(base.timeout),
            icon_size: self.icon_size.unwrap_or(base.icon_size),
            fullscreen_min_urgency: self
                .fullscreen_min_urgency
                .unwrap_or(base.fullscreen_min_urgency),
            app_name_filters: self.app_name_filters.unwrap_or(base.app_name_filters),
            summary_filters: self.summary_filters.unwrap_or(base.summary_filters),
            body_filters: self.body_filters.unwrap_or(base.body_filters),
        };
        if resolved.width == 0 || resolved.height == 0 {
            return Err(ConfigError::Validation(
                "lane width and height must be non-zero".to_string(),
            ));
        }
        if resolved.fullscreen_min_urgency > 2 {
            return Err(ConfigError::Validation(format!(
                "fullscreen-min-urgency must be 0, 1 or 2 (got {})",
                resolved.fullscreen_min_urgency
            )));
        }
        Ok(resolved)
    }
}

/// Raw form of the whole configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub(super) struct RawConfig {
    #[serde(default)]
    logging: LoggingConfig,
    #[serde(default)]
    general: GeneralConfig,
    #[serde(default)]
    corner: RawLaneSection,
    #[serde(default)]
    center: RawLaneSection,
    #[serde(default)]
    media: RawLaneSection,
}

impl RawConfig {
    pub(super) fn parse(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub(super) fn resolve(self) -> Result<YawnsConfig, ConfigError> {
        Ok(YawnsConfig {
            logging: self.logging,
            general: self.general,
            corner: self.corner.resolve(defaults::corner_lane())?,
            center: self.center.resolve(defaults::center_lane())?,
            media: self.media.resolve(defaults::media_lane())?,
        })
    }
}
