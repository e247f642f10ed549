//! Session-bus plumbing: name acquisition and signal relay.

mod manager;

pub use manager::{spawn_signal_relay, BusError, BusManager, NOTIFICATIONS_NAME, NOTIFICATIONS_PATH};
