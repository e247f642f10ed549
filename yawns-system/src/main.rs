//! `yawnsd` — the yawns notification daemon.
//!
//! Composition root: loads configuration, spawns the notification engine,
//! claims `org.freedesktop.Notifications` on the session bus, and wires the
//! fullscreen watcher, signal relay and post-display command hook.

use std::path::Path;
use std::sync::Arc;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use yawns_core::config::{load_config, load_config_from_path};
use yawns_core::logging::init_logging;
use yawns_domain::notifications::{EngineEvent, NotificationEngine};
use yawns_system::dbus_integration::{spawn_signal_relay, BusManager, NOTIFICATIONS_NAME};
use yawns_system::dbus_interfaces::NotificationsServer;
use yawns_system::fullscreen;
use yawns_system::icons::{IconResolver, NoThemeLookup};
use yawns_system::presentation::HeadlessSurfaceFactory;

#[tokio::main]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("yawnsd: {error}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = match std::env::args().nth(1) {
        Some(path) => load_config_from_path(Path::new(&path))?,
        None => load_config()?,
    };
    init_logging(&config.logging)?;
    info!("yawns notification daemon starting");

    let (fullscreen_tx, fullscreen_rx) = fullscreen::fullscreen_channel();
    let factory = Box::new(HeadlessSurfaceFactory::new(config.clone()));
    let (engine, _engine_worker) = NotificationEngine::spawn(&config, factory, fullscreen_rx);
    let _sway_monitor = fullscreen::spawn_sway_monitor(fullscreen_tx);

    let bus = BusManager::connect_session().await?;
    let icons = Arc::new(IconResolver::new(
        Box::new(NoThemeLookup),
        config.corner.icon_size,
    ));
    let server = NotificationsServer::new(engine.clone(), icons);
    // Subscribe before the name is claimed so no early event slips past
    // the relay or the command hook.
    let _signal_relay = spawn_signal_relay(bus.connection().clone(), engine.subscribe());
    let _command_hook = config
        .general
        .command
        .clone()
        .filter(|command| !command.trim().is_empty())
        .map(|command| spawn_display_hook(engine.subscribe(), command));
    bus.serve_notifications(server).await?;

    info!("listening on {NOTIFICATIONS_NAME}");
    wait_for_shutdown_signal().await?;
    info!("shutting down");
    engine.shutdown().await;
    Ok(())
}

/// Runs the configured post-display command each time a new notification
/// is shown. Fire and forget; the command's exit status is not awaited.
fn spawn_display_hook(
    mut events: broadcast::Receiver<EngineEvent>,
    command: String,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EngineEvent::Shown { id, .. }) => {
                    match tokio::process::Command::new("sh")
                        .arg("-c")
                        .arg(&command)
                        .spawn()
                    {
                        Ok(_) => debug!(id, "spawned post-display command"),
                        Err(error) => warn!(%error, "failed to spawn post-display command"),
                    }
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(_)) => continue,
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    let mut terminate = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = terminate.recv() => {}
    }
    Ok(())
}
