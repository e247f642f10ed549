//! Bus-exposed interfaces.

mod notifications_server;

pub use notifications_server::NotificationsServer;
