//! D-Bus frontend for the yawns notification daemon.
//!
//! Exposes the `org.freedesktop.Notifications` interface, relays close and
//! action signals back to the originating clients, resolves icon payloads,
//! and watches the compositor for fullscreen state. The `yawnsd` binary in
//! this crate wires everything to the engine in `yawns-domain`.

pub mod dbus_integration;
pub mod dbus_interfaces;
pub mod fullscreen;
pub mod icons;
pub mod presentation;
