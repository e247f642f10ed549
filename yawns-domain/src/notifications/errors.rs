use thiserror::Error;

/// Errors surfaced by the notification engine's public handle.
///
/// Lane-internal anomalies (unknown ids, timer races, missing surface
/// sizes) are recovered locally inside the worker and never reach here.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The engine worker has stopped; its command channel is closed.
    #[error("notification engine is not running")]
    EngineUnavailable,

    /// The worker dropped a call's reply channel, which only happens while
    /// it is shutting down mid-request.
    #[error("notification engine shut down before replying")]
    ReplyDropped,
}
