//! Headless presentation backend.
//!
//! Pixel rendering belongs to a GUI frontend that plugs into the
//! [`SurfaceFactory`] seam. Until one is attached, the daemon runs with
//! these surfaces: they answer size queries with the lane's configured
//! geometry and trace every show/hide/move so placement decisions stay
//! observable in the logs.

use tracing::trace;

use yawns_core::YawnsConfig;
use yawns_domain::notifications::{
    LaneKind, NotificationRecord, PresentationSurface, SurfaceFactory,
};

pub struct HeadlessSurfaceFactory {
    config: YawnsConfig,
}

impl HeadlessSurfaceFactory {
    pub fn new(config: YawnsConfig) -> Self {
        Self { config }
    }
}

impl SurfaceFactory for HeadlessSurfaceFactory {
    fn create(
        &mut self,
        record: &NotificationRecord,
        lane: LaneKind,
    ) -> Box<dyn PresentationSurface> {
        let lane_config = match lane {
            LaneKind::Corner => &self.config.corner,
            LaneKind::Center => &self.config.center,
            LaneKind::Media => &self.config.media,
        };
        Box::new(HeadlessSurface {
            id: record.id,
            size: (lane_config.width, lane_config.height),
        })
    }

    fn screen_size(&self) -> (u32, u32) {
        (
            self.config.general.screen_width,
            self.config.general.screen_height,
        )
    }
}

struct HeadlessSurface {
    id: u32,
    size: (u32, u32),
}

impl PresentationSurface for HeadlessSurface {
    fn show(&mut self) {
        trace!(id = self.id, "surface show");
    }

    fn hide(&mut self) {
        trace!(id = self.id, "surface hide");
    }

    fn update_content(&mut self, record: &NotificationRecord) {
        trace!(id = self.id, summary = %record.summary, "surface content updated");
    }

    fn requested_size(&self) -> Option<(u32, u32)> {
        Some(self.size)
    }

    fn move_to(&mut self, x: i32, y: i32) {
        trace!(id = self.id, x, y, "surface moved");
    }

    fn close(&mut self) {
        trace!(id = self.id, "surface closed");
    }
}
