use thiserror::Error;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use zbus::names::BusName;
use zbus::{Connection, MessageBuilder};

use yawns_domain::notifications::EngineEvent;

use crate::dbus_interfaces::NotificationsServer;

pub const NOTIFICATIONS_NAME: &str = "org.freedesktop.Notifications";
pub const NOTIFICATIONS_PATH: &str = "/org/freedesktop/Notifications";

#[derive(Debug, Error)]
pub enum BusError {
    #[error("D-Bus connection failed: {0}")]
    Connection(#[from] zbus::Error),

    /// Another notification daemon already provides the service. Only one
    /// provider may exist per session, so startup must be refused.
    #[error("another daemon already owns org.freedesktop.Notifications")]
    NameAlreadyOwned,

    #[error("failed to request D-Bus name '{name}': {source}")]
    NameRequest { name: String, source: zbus::Error },

    #[error("failed to serve D-Bus object at '{path}': {source}")]
    ServeAt { path: String, source: zbus::Error },
}

/// Owns the session-bus connection and the notification service
/// registration.
pub struct BusManager {
    connection: Connection,
}

impl BusManager {
    pub async fn connect_session() -> Result<Self, BusError> {
        let connection = Connection::session().await?;
        info!(
            unique_name = connection
                .unique_name()
                .map_or_else(|| "<unknown>".to_string(), |n| n.to_string()),
            "connected to the session bus"
        );
        Ok(Self { connection })
    }

    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Registers the service object and claims the well-known name.
    ///
    /// The name is claimed exclusively: if a name-owner query shows another
    /// provider, startup is refused instead of queueing behind it.
    pub async fn serve_notifications(&self, server: NotificationsServer) -> Result<(), BusError> {
        let dbus = zbus::fdo::DBusProxy::new(&self.connection).await?;
        let name = BusName::try_from(NOTIFICATIONS_NAME).map_err(zbus::Error::from)?;
        if dbus
            .name_has_owner(name)
            .await
            .map_err(zbus::Error::from)?
        {
            return Err(BusError::NameAlreadyOwned);
        }

        self.connection
            .object_server()
            .at(NOTIFICATIONS_PATH, server)
            .await
            .map_err(|source| BusError::ServeAt {
                path: NOTIFICATIONS_PATH.to_string(),
                source,
            })?;

        self.connection
            .request_name(NOTIFICATIONS_NAME)
            .await
            .map_err(|source| BusError::NameRequest {
                name: NOTIFICATIONS_NAME.to_string(),
                source,
            })?;
        info!("serving {NOTIFICATIONS_NAME} at {NOTIFICATIONS_PATH}");
        Ok(())
    }
}

/// Forwards engine events as signals addressed to the notification's
/// original sender.
///
/// Signals are directed, not broadcast: each goes to the peer recorded at
/// `Notify` time. A record without a sender (or a peer that has since
/// disconnected) is logged and skipped; relay failures never propagate.
pub fn spawn_signal_relay(
    connection: Connection,
    mut events: broadcast::Receiver<EngineEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(EngineEvent::Closed { id, reason, sender }) => {
                    send_signal(
                        &connection,
                        sender,
                        "NotificationClosed",
                        &(id, reason.code()),
                    )
                    .await;
                }
                Ok(EngineEvent::ActionInvoked {
                    id,
                    action_key,
                    sender,
                }) => {
                    send_signal(&connection, sender, "ActionInvoked", &(id, action_key)).await;
                }
                Ok(EngineEvent::Shown { .. }) => {}
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!(missed, "signal relay lagged behind the engine");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
        debug!("signal relay stopped");
    })
}

async fn send_signal<B>(connection: &Connection, sender: Option<String>, signal: &str, body: &B)
where
    B: serde::ser::Serialize + zbus::zvariant::DynamicType,
{
    let Some(destination) = sender else {
        debug!(signal, "no sender recorded, skipping signal");
        return;
    };
    let result = async {
        let message = MessageBuilder::signal(NOTIFICATIONS_PATH, NOTIFICATIONS_NAME, signal)?
            .destination(destination.as_str())?
            .build(body)?;
        connection.send_message(message).await?;
        Ok::<(), zbus::Error>(())
    }
    .await;
    match result {
        Ok(()) => debug!(signal, %destination, "relayed signal"),
        // The peer may have disconnected since it sent the notification.
        Err(error) => warn!(signal, %destination, %error, "failed to relay signal"),
    }
}
