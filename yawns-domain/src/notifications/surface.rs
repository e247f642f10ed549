use super::types::{LaneKind, NotificationRecord};

/// One on-screen widget owned by the presentation layer.
///
/// The engine drives these from its worker task, so every method must be
/// non-blocking: a real implementation enqueues work for its toolkit's main
/// loop rather than performing it inline. User interactions travel the
/// other way — a frontend reports click-to-close and action clicks through
/// the engine handle (`close` with reason `Dismissed`, `invoke_action`),
/// not through this trait.
pub trait PresentationSurface: Send {
    fn show(&mut self);

    fn hide(&mut self);

    /// Refresh the widget from updated record content (replace path).
    fn update_content(&mut self, record: &NotificationRecord);

    /// The size the widget wants on screen, used for stacking math.
    ///
    /// `None` means the surface cannot answer right now; the engine treats
    /// that as zero size and keeps stacking the remaining members.
    fn requested_size(&self) -> Option<(u32, u32)>;

    fn move_to(&mut self, x: i32, y: i32);

    /// Destroy the widget. Called exactly once, after which the surface is
    /// dropped.
    fn close(&mut self);
}

/// Creates presentation surfaces and answers screen geometry queries.
pub trait SurfaceFactory: Send {
    fn create(&mut self, record: &NotificationRecord, lane: LaneKind)
        -> Box<dyn PresentationSurface>;

    /// Primary screen size in pixels, used to resolve far-edge anchors.
    fn screen_size(&self) -> (u32, u32);
}
