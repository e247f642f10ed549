//! Fullscreen detection backends.
//!
//! The engine only consumes a `watch` channel of boolean transitions; what
//! feeds it is compositor-specific. The Sway backend here subscribes to
//! window events through `swaymsg`. On other desktops the channel simply
//! never changes and no notification is ever suppressed.

use std::process::Stdio;

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// Creates the fullscreen-state channel, initially not fullscreen.
pub fn fullscreen_channel() -> (watch::Sender<bool>, watch::Receiver<bool>) {
    watch::channel(false)
}

/// Watches Sway window events and publishes fullscreen transitions.
///
/// Failing to start `swaymsg` (not on Sway, binary missing) is logged and
/// disables detection; the daemon keeps running.
pub fn spawn_sway_monitor(state: watch::Sender<bool>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let child = Command::new("swaymsg")
            .args(["-t", "subscribe", "[\"window\"]", "-m"])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn();
        let mut child = match child {
            Ok(child) => child,
            Err(error) => {
                warn!(%error, "could not start swaymsg, fullscreen detection disabled");
                return;
            }
        };
        let Some(stdout) = child.stdout.take() else {
            warn!("swaymsg started without a stdout pipe");
            return;
        };
        let mut lines = BufReader::new(stdout).lines();
        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(active) = parse_window_event(&line) {
                        debug!(active, "fullscreen transition");
                        if state.send(active).is_err() {
                            // Engine is gone; nothing left to notify.
                            break;
                        }
                    }
                }
                Ok(None) => {
                    warn!("swaymsg event stream ended");
                    break;
                }
                Err(error) => {
                    warn!(%error, "error reading swaymsg event stream");
                    break;
                }
            }
        }
    })
}

/// Extracts the fullscreen state from one Sway window event. Events
/// without a `fullscreen_mode` field (or unparsable lines) yield `None`.
fn parse_window_event(line: &str) -> Option<bool> {
    let event: serde_json::Value = serde_json::from_str(line).ok()?;
    let mode = event
        .get("container")
        .and_then(|container| container.get("fullscreen_mode"))
        .or_else(|| event.get("fullscreen_mode"))?
        .as_u64()?;
    Some(mode > 0)
}
