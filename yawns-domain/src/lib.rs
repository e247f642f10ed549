//! Notification lifecycle and placement engine for the yawns daemon.
//!
//! This crate owns everything between the bus frontend and the pixels:
//! the canonical [`notifications::NotificationRecord`], lane routing,
//! per-lane stacking, expiry timers, and the single serialized mutation
//! point all of those funnel through. Rendering and the D-Bus surface are
//! collaborators behind the seams in [`notifications::surface`] and the
//! engine's event stream.

pub mod notifications;
