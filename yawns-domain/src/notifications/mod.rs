//! The notification lifecycle and placement engine.
//!
//! Data flow: the bus frontend builds a [`NotificationRecord`] and hands it
//! to the [`engine`], whose worker task routes it ([`router`]), inserts or
//! replaces it in a lane ([`lanes`]), arms its expiry timer ([`expiry`]) and
//! drives the presentation surfaces ([`surface`]). Timer fires, fullscreen
//! transitions and user interactions all funnel back through the same
//! worker, so lane state is only ever mutated from one place.

pub mod engine;
pub mod errors;
mod expiry;
mod lanes;
pub mod router;
pub mod surface;
pub mod types;

pub use engine::{EngineCommand, EngineEvent, EngineHandle, NotificationEngine};
pub use errors::NotificationError;
pub use router::LaneRouter;
pub use surface::{PresentationSurface, SurfaceFactory};
pub use types::{
    pair_actions, CloseReason, HintValue, Hints, ImageData, LaneKind, NotificationAction,
    NotificationId, NotificationRecord, Urgency,
};
