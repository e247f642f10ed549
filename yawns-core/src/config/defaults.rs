//! Built-in defaults for the yawns configuration.
//!
//! Corner cards anchor to the bottom-right and stack upward, the center
//! overlay is a small square, and the media widget sits in the bottom-left.

use super::types::LaneConfig;

pub(super) fn log_level() -> String {
    "info".to_string()
}

pub(super) fn screen_width() -> u32 {
    1920
}

pub(super) fn screen_height() -> u32 {
    1080
}

const DEFAULT_TIMEOUT_MS: u64 = 5250;
const URGENCY_CRITICAL: u8 = 2;

pub(super) fn corner_lane() -> LaneConfig {
    LaneConfig {
        width: 400,
        height: 500,
        x_offset: -40,
        y_offset: -40,
        gap: 10,
        timeout: DEFAULT_TIMEOUT_MS,
        icon_size: 64,
        fullscreen_min_urgency: URGENCY_CRITICAL,
        app_name_filters: String::new(),
        summary_filters: String::new(),
        body_filters: String::new(),
    }
}

pub(super) fn center_lane() -> LaneConfig {
    LaneConfig {
        width: 220,
        height: 220,
        x_offset: 0,
        y_offset: 0,
        gap: 10,
        timeout: DEFAULT_TIMEOUT_MS,
        icon_size: 64,
        fullscreen_min_urgency: URGENCY_CRITICAL,
        app_name_filters: String::new(),
        summary_filters: String::new(),
        body_filters: String::new(),
    }
}

pub(super) fn media_lane() -> LaneConfig {
    LaneConfig {
        width: 400,
        height: 500,
        x_offset: 40,
        y_offset: -40,
        gap: 10,
        timeout: DEFAULT_TIMEOUT_MS,
        icon_size: 64,
        fullscreen_min_urgency: URGENCY_CRITICAL,
        app_name_filters: String::new(),
        summary_filters: String::new(),
        body_filters: String::new(),
    }
}
