use globset::{Glob, GlobMatcher};
use tracing::{debug, warn};

use yawns_core::config::LaneConfig;

use super::types::{LaneKind, NotificationRecord};

/// Record field a filter pattern is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FilterField {
    AppName,
    Summary,
    Body,
}

impl FilterField {
    const ALL: [FilterField; 3] = [FilterField::AppName, FilterField::Summary, FilterField::Body];

    fn value<'r>(self, record: &'r NotificationRecord) -> &'r str {
        match self {
            FilterField::AppName => &record.app_name,
            FilterField::Summary => &record.summary,
            FilterField::Body => &record.body,
        }
    }

    fn patterns(self, config: &LaneConfig) -> &str {
        match self {
            FilterField::AppName => &config.app_name_filters,
            FilterField::Summary => &config.summary_filters,
            FilterField::Body => &config.body_filters,
        }
    }
}

#[derive(Debug)]
struct FilterRule {
    lane: LaneKind,
    field: FilterField,
    matcher: GlobMatcher,
}

/// Decides which lane a notification belongs to.
///
/// Evaluation starts from the explicit `yawn-type` hint if present, then
/// walks every configured filter in a fixed order: lanes corner, center,
/// media; fields app name, summary, body; patterns in config order. The
/// last matching rule wins, so later filters deliberately override earlier
/// ones and the hint. No match and no hint falls back to the corner lane.
///
/// Routing is pure: the same record always routes to the same lane.
#[derive(Debug)]
pub struct LaneRouter {
    rules: Vec<FilterRule>,
}

impl LaneRouter {
    /// Compiles the filter table from the three lanes' configuration.
    ///
    /// Glob matching is case sensitive with the usual `*`/`?` semantics.
    /// Patterns that fail to compile are logged and skipped.
    pub fn from_config(corner: &LaneConfig, center: &LaneConfig, media: &LaneConfig) -> Self {
        let configs = [
            (LaneKind::Corner, corner),
            (LaneKind::Center, center),
            (LaneKind::Media, media),
        ];
        let mut rules = Vec::new();
        for (lane, config) in configs {
            for field in FilterField::ALL {
                for pattern in field.patterns(config).split_whitespace() {
                    match Glob::new(pattern) {
                        Ok(glob) => rules.push(FilterRule {
                            lane,
                            field,
                            matcher: glob.compile_matcher(),
                        }),
                        Err(error) => {
                            warn!(%pattern, lane = lane.name(), %error, "skipping invalid filter pattern");
                        }
                    }
                }
            }
        }
        Self { rules }
    }

    pub fn route(&self, record: &NotificationRecord) -> LaneKind {
        let mut selected = record.hints.lane_hint();
        for rule in &self.rules {
            if rule.matcher.is_match(rule.field.value(record)) {
                selected = Some(rule.lane);
            }
        }
        let lane = selected.unwrap_or(LaneKind::Corner);
        debug!(id = record.id, lane = lane.name(), "routed notification");
        lane
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notifications::types::{HintValue, Hints};
    use chrono::Utc;
    use yawns_core::YawnsConfig;

    fn record(app_name: &str, summary: &str, body: &str, hints: Hints) -> NotificationRecord {
        NotificationRecord {
            id: 1,
            replaces_id: 0,
            sender: None,
            app_name: app_name.to_string(),
            summary: summary.to_string(),
            body: body.to_string(),
            app_icon: String::new(),
            icon_bytes: None,
            actions: Vec::new(),
            hints,
            expire_timeout_ms: -1,
            created_at: Utc::now(),
        }
    }

    fn router_with(
        corner: (&str, &str, &str),
        center: (&str, &str, &str),
        media: (&str, &str, &str),
    ) -> LaneRouter {
        let defaults = YawnsConfig::default();
        let mut corner_cfg = defaults.corner.clone();
        let mut center_cfg = defaults.center.clone();
        let mut media_cfg = defaults.media.clone();
        for (cfg, (app, summary, body)) in [
            (&mut corner_cfg, corner),
            (&mut center_cfg, center),
            (&mut media_cfg, media),
        ] {
            cfg.app_name_filters = app.to_string();
            cfg.summary_filters = summary.to_string();
            cfg.body_filters = body.to_string();
        }
        LaneRouter::from_config(&corner_cfg, &center_cfg, &media_cfg)
    }

    #[test]
    fn falls_back_to_corner() {
        let router = router_with(("", "", ""), ("", "", ""), ("", "", ""));
        assert_eq!(router.route(&record("mail", "s", "b", Hints::new())), LaneKind::Corner);
    }

    #[test]
    fn explicit_hint_selects_lane() {
        let router = router_with(("", "", ""), ("", "", ""), ("", "", ""));
        let mut hints = Hints::new();
        hints.insert("yawn-type", HintValue::Str("center".to_string()));
        assert_eq!(router.route(&record("mail", "s", "b", hints)), LaneKind::Center);
    }

    #[test]
    fn last_match_wins_across_lanes() {
        // Both the corner app-name filter and the media body filter match;
        // media is evaluated later and wins.
        let router = router_with(("spotify", "", ""), ("", "", ""), ("", "", "*playing*"));
        let routed = router.route(&record("spotify", "track", "now playing: x", Hints::new()));
        assert_eq!(routed, LaneKind::Media);
    }

    #[test]
    fn later_filter_overrides_explicit_hint() {
        let router = router_with(("", "", ""), ("volume*", "", ""), ("", "", ""));
        let mut hints = Hints::new();
        hints.insert("yawn-type", HintValue::Str("media".to_string()));
        assert_eq!(
            router.route(&record("volumectl", "s", "b", hints)),
            LaneKind::Center
        );
    }

    #[test]
    fn later_lane_wins_regardless_of_field() {
        // Corner matches on app name, center on summary; center is
        // evaluated after corner and takes the record.
        let router = router_with(("mail", "", ""), ("", "mail", ""), ("", "", ""));
        assert_eq!(
            router.route(&record("mail", "mail", "b", Hints::new())),
            LaneKind::Center
        );
    }

    #[test]
    fn glob_semantics_are_case_sensitive() {
        let router = router_with(("", "", ""), ("", "", ""), ("Spot?fy", "", ""));
        assert_eq!(
            router.route(&record("Spotify", "s", "b", Hints::new())),
            LaneKind::Media
        );
        assert_eq!(
            router.route(&record("spotify", "s", "b", Hints::new())),
            LaneKind::Corner
        );
    }

    #[test]
    fn invalid_patterns_are_skipped() {
        let router = router_with(("[", "", ""), ("", "", ""), ("", "", ""));
        // The broken pattern is dropped; routing still works.
        assert_eq!(router.route(&record("x", "s", "b", Hints::new())), LaneKind::Corner);
    }
}
