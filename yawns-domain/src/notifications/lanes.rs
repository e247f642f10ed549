use std::collections::HashMap;

use tracing::warn;
use yawns_core::config::LaneConfig;

use super::surface::PresentationSurface;
use super::types::{LaneKind, NotificationId, NotificationRecord};

/// Where a record is in its on-screen lifecycle.
///
/// `Pending` is the window between insertion and the first suppression
/// pass. Records oscillate between `Visible` and `Hidden` as fullscreen
/// state changes; removal from the arena is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Visibility {
    Pending,
    Visible,
    Hidden,
}

/// A record currently owned by a lane, together with its widget.
pub(crate) struct ActiveRecord {
    pub record: NotificationRecord,
    pub lane: LaneKind,
    pub visibility: Visibility,
    pub surface: Box<dyn PresentationSurface>,
}

impl ActiveRecord {
    /// Size for stacking math. A surface that cannot answer counts as
    /// zero-sized so the rest of the stack still lays out.
    fn size_or_zero(&self) -> (u32, u32) {
        match self.surface.requested_size() {
            Some(size) => size,
            None => {
                warn!(id = self.record.id, "surface reported no size, stacking it as zero");
                (0, 0)
            }
        }
    }
}

/// Ordered membership and placement policy for one presentation lane.
///
/// The lane holds arena keys, not records: `members[i]` is the id of the
/// record at stack index `i`, in insertion order. Removing a member
/// renumbers everything after it simply by virtue of `Vec` semantics.
pub(crate) struct Lane {
    pub kind: LaneKind,
    pub config: LaneConfig,
    pub members: Vec<NotificationId>,
}

pub(crate) type Arena = HashMap<NotificationId, ActiveRecord>;

impl Lane {
    pub fn new(kind: LaneKind, config: LaneConfig) -> Self {
        Self {
            kind,
            config,
            members: Vec::new(),
        }
    }

    /// Media-style lanes display a single widget at a time.
    pub fn singleton(&self) -> bool {
        self.kind == LaneKind::Media
    }

    fn centered(&self) -> bool {
        self.kind == LaneKind::Center
    }

    pub fn index_of(&self, id: NotificationId) -> Option<usize> {
        self.members.iter().position(|member| *member == id)
    }

    pub fn remove_member(&mut self, id: NotificationId) -> bool {
        match self.index_of(id) {
            Some(index) => {
                self.members.remove(index);
                true
            }
            None => false,
        }
    }

    /// Applies the urgency-vs-fullscreen policy to every member, then
    /// recomputes stacking positions.
    pub fn refresh(&self, records: &mut Arena, fullscreen: bool, screen: (u32, u32)) {
        self.suppression_pass(records, fullscreen);
        self.restack(records, screen);
    }

    fn suppression_pass(&self, records: &mut Arena, fullscreen: bool) {
        for id in &self.members {
            let Some(entry) = records.get_mut(id) else {
                continue;
            };
            let keep_visible = !fullscreen
                || entry.record.urgency().level() >= self.config.fullscreen_min_urgency;
            match (keep_visible, entry.visibility) {
                (true, Visibility::Visible) | (false, Visibility::Hidden) => {}
                (true, _) => {
                    entry.surface.show();
                    entry.visibility = Visibility::Visible;
                }
                (false, _) => {
                    entry.surface.hide();
                    entry.visibility = Visibility::Hidden;
                }
            }
        }
    }

    /// Recomputes on-screen positions for all visible members.
    ///
    /// Each member sits at the lane anchor displaced by the cumulative
    /// height of every *earlier, still-visible* member plus the configured
    /// gap. A negative y anchor measures from the bottom edge and flips
    /// the stacking direction so the stack grows upward. Hidden members
    /// contribute nothing.
    fn restack(&self, records: &mut Arena, screen: (u32, u32)) {
        let (screen_w, screen_h) = screen;
        if self.centered() {
            for id in &self.members {
                let Some(entry) = records.get_mut(id) else {
                    continue;
                };
                if entry.visibility != Visibility::Visible {
                    continue;
                }
                let (w, h) = entry.size_or_zero();
                entry
                    .surface
                    .move_to(centered_offset(screen_w, w), centered_offset(screen_h, h));
            }
            return;
        }

        let direction: i64 = if self.config.y_offset < 0 { -1 } else { 1 };
        let mut cumulative: i64 = 0;
        for id in &self.members {
            let Some(entry) = records.get_mut(id) else {
                continue;
            };
            if entry.visibility != Visibility::Visible {
                continue;
            }
            let (w, h) = entry.size_or_zero();
            let x = anchored_offset(self.config.x_offset, screen_w, w);
            let y = anchored_offset(self.config.y_offset, screen_h, h);
            entry.surface.move_to(x, y + (cumulative * direction) as i32);
            cumulative += i64::from(h) + i64::from(self.config.gap);
        }
    }
}

/// Resolves a configured offset against a screen dimension: non-negative
/// offsets measure from the near edge, negative ones from the far edge
/// (leaving room for the widget itself).
fn anchored_offset(offset: i32, screen: u32, size: u32) -> i32 {
    if offset < 0 {
        screen as i32 + offset - size as i32
    } else {
        offset
    }
}

fn centered_offset(screen: u32, size: u32) -> i32 {
    (screen as i32 - size as i32) / 2
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::notifications::types::{HintValue, Hints};
    use chrono::Utc;
    use std::sync::{Arc, Mutex};
    use yawns_core::YawnsConfig;

    /// Chronological log of surface calls, shared across all fake surfaces
    /// of one test.
    #[derive(Clone, Default)]
    pub(crate) struct SurfaceLog(Arc<Mutex<Vec<(NotificationId, SurfaceCall)>>>);

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) enum SurfaceCall {
        Show,
        Hide,
        Update,
        Move(i32, i32),
        Close,
    }

    impl SurfaceLog {
        pub fn push(&self, id: NotificationId, call: SurfaceCall) {
            self.0.lock().unwrap().push((id, call));
        }

        pub fn calls_for(&self, id: NotificationId) -> Vec<SurfaceCall> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .filter(|(i, _)| *i == id)
                .map(|(_, c)| c.clone())
                .collect()
        }

        pub fn last_move(&self, id: NotificationId) -> Option<(i32, i32)> {
            self.0
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find_map(|(i, c)| match c {
                    SurfaceCall::Move(x, y) if *i == id => Some((*x, *y)),
                    _ => None,
                })
        }
    }

    pub(crate) struct FakeSurface {
        pub id: NotificationId,
        pub size: Option<(u32, u32)>,
        pub log: SurfaceLog,
    }

    impl PresentationSurface for FakeSurface {
        fn show(&mut self) {
            self.log.push(self.id, SurfaceCall::Show);
        }
        fn hide(&mut self) {
            self.log.push(self.id, SurfaceCall::Hide);
        }
        fn update_content(&mut self, _record: &NotificationRecord) {
            self.log.push(self.id, SurfaceCall::Update);
        }
        fn requested_size(&self) -> Option<(u32, u32)> {
            self.size
        }
        fn move_to(&mut self, x: i32, y: i32) {
            self.log.push(self.id, SurfaceCall::Move(x, y));
        }
        fn close(&mut self) {
            self.log.push(self.id, SurfaceCall::Close);
        }
    }

    pub(crate) fn record(id: NotificationId, urgency: u8) -> NotificationRecord {
        let mut hints = Hints::new();
        hints.insert("urgency", HintValue::Byte(urgency));
        NotificationRecord {
            id,
            replaces_id: 0,
            sender: None,
            app_name: "test".to_string(),
            summary: format!("summary {id}"),
            body: String::new(),
            app_icon: String::new(),
            icon_bytes: None,
            actions: Vec::new(),
            hints,
            expire_timeout_ms: -1,
            created_at: Utc::now(),
        }
    }

    fn insert(
        lane: &mut Lane,
        records: &mut Arena,
        log: &SurfaceLog,
        id: NotificationId,
        height: u32,
    ) {
        records.insert(
            id,
            ActiveRecord {
                record: record(id, 1),
                lane: lane.kind,
                visibility: Visibility::Pending,
                surface: Box::new(FakeSurface {
                    id,
                    size: Some((400, height)),
                    log: log.clone(),
                }),
            },
        );
        lane.members.push(id);
    }

    fn corner_lane() -> Lane {
        Lane::new(LaneKind::Corner, YawnsConfig::default().corner)
    }

    const SCREEN: (u32, u32) = (1920, 1080);

    #[test]
    fn bottom_right_anchor_stacks_upward() {
        let mut lane = corner_lane();
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        for (id, height) in [(1, 100), (2, 100), (3, 100)] {
            insert(&mut lane, &mut records, &log, id, height);
        }
        lane.refresh(&mut records, false, SCREEN);

        // x: 1920 - 40 - 400; first member y: 1080 - 40 - 100.
        assert_eq!(log.last_move(1), Some((1480, 940)));
        assert_eq!(log.last_move(2), Some((1480, 830)));
        assert_eq!(log.last_move(3), Some((1480, 720)));
    }

    #[test]
    fn positive_anchor_stacks_downward() {
        let mut lane = corner_lane();
        lane.config.x_offset = 40;
        lane.config.y_offset = 40;
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        insert(&mut lane, &mut records, &log, 1, 100);
        insert(&mut lane, &mut records, &log, 2, 60);
        lane.refresh(&mut records, false, SCREEN);

        assert_eq!(log.last_move(1), Some((40, 40)));
        assert_eq!(log.last_move(2), Some((40, 150)));
    }

    #[test]
    fn hidden_members_do_not_contribute_to_the_stack() {
        let mut lane = corner_lane();
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        for id in [1, 2, 3] {
            insert(&mut lane, &mut records, &log, id, 100);
        }
        records.get_mut(&2).unwrap().visibility = Visibility::Hidden;
        // Refresh without fullscreen would re-show member 2; restack only.
        lane.restack(&mut records, SCREEN);

        assert_eq!(log.last_move(1), Some((1480, 940)));
        assert_eq!(log.last_move(2), None);
        assert_eq!(log.last_move(3), Some((1480, 830)));
    }

    #[test]
    fn missing_surface_size_counts_as_zero() {
        let mut lane = corner_lane();
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        insert(&mut lane, &mut records, &log, 1, 100);
        records.get_mut(&1).unwrap().surface = Box::new(FakeSurface {
            id: 1,
            size: None,
            log: log.clone(),
        });
        insert(&mut lane, &mut records, &log, 2, 100);
        lane.refresh(&mut records, false, SCREEN);

        // Member 1 anchors as zero-sized; member 2 only shifts by the gap.
        assert_eq!(log.last_move(1), Some((1880, 1040)));
        assert_eq!(log.last_move(2), Some((1480, 930)));
    }

    #[test]
    fn center_lane_centers_every_visible_member() {
        let mut lane = Lane::new(LaneKind::Center, YawnsConfig::default().center);
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        insert(&mut lane, &mut records, &log, 1, 220);
        records.get_mut(&1).unwrap().surface = Box::new(FakeSurface {
            id: 1,
            size: Some((220, 220)),
            log: log.clone(),
        });
        lane.refresh(&mut records, false, SCREEN);

        assert_eq!(log.last_move(1), Some(((1920 - 220) / 2, (1080 - 220) / 2)));
    }

    #[test]
    fn suppression_hides_low_urgency_during_fullscreen() {
        let mut lane = corner_lane();
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        insert(&mut lane, &mut records, &log, 1, 100);
        insert(&mut lane, &mut records, &log, 2, 100);
        records.get_mut(&2).unwrap().record = record(2, 2);

        lane.refresh(&mut records, true, SCREEN);
        assert_eq!(records[&1].visibility, Visibility::Hidden);
        assert_eq!(records[&2].visibility, Visibility::Visible);
        // The critical member takes the anchor slot alone.
        assert_eq!(log.last_move(2), Some((1480, 940)));

        lane.refresh(&mut records, false, SCREEN);
        assert_eq!(records[&1].visibility, Visibility::Visible);
        assert_eq!(lane.index_of(1), Some(0));
        assert_eq!(lane.index_of(2), Some(1));
    }

    #[test]
    fn remove_member_renumbers_survivors() {
        let mut lane = corner_lane();
        let mut records = Arena::new();
        let log = SurfaceLog::default();
        for id in [1, 2, 3] {
            insert(&mut lane, &mut records, &log, id, 100);
        }
        assert!(lane.remove_member(2));
        assert!(!lane.remove_member(2));
        assert_eq!(lane.index_of(1), Some(0));
        assert_eq!(lane.index_of(3), Some(1));
    }
}
