use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, trace};
use zbus::zvariant::Value;
use zbus::{dbus_interface, MessageHeader, SignalContext};

use yawns_domain::notifications::{
    pair_actions, CloseReason, EngineHandle, HintValue, Hints, ImageData, NotificationRecord,
};

use crate::icons::IconResolver;

/// Allocates protocol notification ids.
///
/// Fresh ids come from a monotonic counter starting at 1 and are never
/// reused. A non-zero `replaces_id` is passed through untouched; whether a
/// record with that id still exists is the engine's business.
struct IdAllocator(AtomicU32);

impl IdAllocator {
    fn new() -> Self {
        Self(AtomicU32::new(1))
    }

    fn allocate(&self, replaces_id: u32) -> u32 {
        if replaces_id == 0 {
            self.0.fetch_add(1, Ordering::Relaxed)
        } else {
            replaces_id
        }
    }
}

/// The `org.freedesktop.Notifications` service object.
///
/// Translates protocol calls into engine operations. The reply to `Notify`
/// waits for the record to become a lane member (so an immediate
/// `CloseNotification` finds it) but not for any rendering.
pub struct NotificationsServer {
    engine: EngineHandle,
    icons: Arc<IconResolver>,
    ids: IdAllocator,
}

impl NotificationsServer {
    pub fn new(engine: EngineHandle, icons: Arc<IconResolver>) -> Self {
        Self {
            engine,
            icons,
            ids: IdAllocator::new(),
        }
    }
}

#[dbus_interface(name = "org.freedesktop.Notifications")]
impl NotificationsServer {
    async fn get_server_information(&self) -> (String, String, String, String) {
        (
            "yawns".to_string(),
            "kz87".to_string(),
            env!("CARGO_PKG_VERSION").to_string(),
            "1.2".to_string(),
        )
    }

    async fn get_capabilities(&self) -> Vec<String> {
        vec![
            "body".to_string(),
            "actions".to_string(),
            "icon-static".to_string(),
        ]
    }

    #[allow(clippy::too_many_arguments)]
    async fn notify(
        &self,
        app_name: String,
        replaces_id: u32,
        app_icon: String,
        summary: String,
        body: String,
        actions: Vec<String>,
        hints: HashMap<String, Value<'_>>,
        expire_timeout: i32,
        #[zbus(header)] header: MessageHeader<'_>,
    ) -> zbus::fdo::Result<u32> {
        let sender = header.sender().ok().flatten().map(|name| name.to_string());
        let hints = hints_from_dbus(&hints);
        // Icon I/O happens here, before the record enters the engine's
        // serialized mutation path.
        let icon_bytes = self.icons.resolve(&hints, &app_icon).await;
        let id = self.ids.allocate(replaces_id);
        debug!(id, replaces_id, %app_name, ?sender, "Notify");

        let record = NotificationRecord {
            id,
            replaces_id,
            sender,
            app_name,
            summary,
            body,
            app_icon,
            icon_bytes,
            actions: pair_actions(&actions),
            hints,
            expire_timeout_ms: expire_timeout,
            created_at: Utc::now(),
        };
        self.engine
            .notify(record)
            .await
            .map_err(|error| zbus::fdo::Error::Failed(error.to_string()))
    }

    async fn close_notification(&self, id: u32) -> zbus::fdo::Result<()> {
        debug!(id, "CloseNotification");
        // An id that is already gone is not an error; the close and an
        // expiry may simply have raced.
        self.engine
            .close(id, CloseReason::Closed)
            .await
            .map_err(|error| zbus::fdo::Error::Failed(error.to_string()))
    }

    #[dbus_interface(signal)]
    pub async fn notification_closed(
        context: &SignalContext<'_>,
        id: u32,
        reason: u32,
    ) -> zbus::Result<()>;

    #[dbus_interface(signal)]
    pub async fn action_invoked(
        context: &SignalContext<'_>,
        id: u32,
        action_key: String,
    ) -> zbus::Result<()>;
}

/// Converts the wire hint dictionary into the engine's tagged form.
/// Unsupported value types are logged and dropped, never an error.
fn hints_from_dbus(raw: &HashMap<String, Value<'_>>) -> Hints {
    let mut hints = Hints::new();
    for (name, value) in raw {
        match hint_value(value) {
            Some(converted) => hints.insert(name.clone(), converted),
            None => trace!(%name, "dropping hint with unsupported value type"),
        }
    }
    hints
}

fn hint_value(value: &Value<'_>) -> Option<HintValue> {
    match value {
        Value::Str(s) => Some(HintValue::Str(s.as_str().to_string())),
        Value::U8(b) => Some(HintValue::Byte(*b)),
        Value::Bool(b) => Some(HintValue::Bool(*b)),
        Value::U32(v) => Some(HintValue::U32(*v)),
        Value::I32(v) => Some(HintValue::I32(*v)),
        Value::U16(v) => Some(HintValue::U32(u32::from(*v))),
        Value::I16(v) => Some(HintValue::I32(i32::from(*v))),
        Value::U64(v) => u32::try_from(*v).ok().map(HintValue::U32),
        Value::I64(v) => i32::try_from(*v).ok().map(HintValue::I32),
        Value::Structure(_) => image_from_value(value).map(HintValue::Image),
        Value::Array(_) => Vec::<u8>::try_from(value.clone())
            .ok()
            .map(HintValue::ByteArray),
        Value::Value(inner) => hint_value(inner),
        _ => None,
    }
}

/// Parses the freedesktop `iiibiiay` image structure carried by the
/// `image-data` and `icon_data` hints.
fn image_from_value(value: &Value<'_>) -> Option<ImageData> {
    let Value::Structure(structure) = value else {
        return None;
    };
    let fields = structure.fields();
    if fields.len() != 7 {
        return None;
    }
    Some(ImageData {
        width: i32::try_from(fields[0].clone()).ok()?,
        height: i32::try_from(fields[1].clone()).ok()?,
        rowstride: i32::try_from(fields[2].clone()).ok()?,
        has_alpha: bool::try_from(fields[3].clone()).ok()?,
        bits_per_sample: i32::try_from(fields[4].clone()).ok()?,
        channels: i32::try_from(fields[5].clone()).ok()?,
        data: Vec::<u8>::try_from(fields[6].clone()).ok()?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use zbus::zvariant::StructureBuilder;

    #[test]
    fn ids_are_distinct_and_strictly_increasing() {
        let ids = IdAllocator::new();
        let allocated: Vec<u32> = (0..5).map(|_| ids.allocate(0)).collect();
        assert_eq!(allocated, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn replaces_id_is_passed_through() {
        let ids = IdAllocator::new();
        assert_eq!(ids.allocate(7), 7);
        // The counter is untouched by pass-throughs.
        assert_eq!(ids.allocate(0), 1);
    }

    #[test]
    fn urgency_hint_survives_conversion() {
        let mut raw = HashMap::new();
        raw.insert("urgency".to_string(), Value::U8(2));
        let hints = hints_from_dbus(&raw);
        assert_eq!(hints.get("urgency"), Some(&HintValue::Byte(2)));
    }

    #[test]
    fn nested_variant_values_are_unwrapped() {
        let mut raw = HashMap::new();
        raw.insert(
            "value".to_string(),
            Value::Value(Box::new(Value::I32(42))),
        );
        let hints = hints_from_dbus(&raw);
        assert_eq!(hints.progress(), Some(42));
    }

    #[test]
    fn unsupported_hint_types_are_dropped() {
        let mut raw = HashMap::new();
        raw.insert("weird".to_string(), Value::F64(0.5));
        raw.insert("urgency".to_string(), Value::U8(0));
        let hints = hints_from_dbus(&raw);
        assert!(hints.get("weird").is_none());
        assert!(hints.get("urgency").is_some());
    }

    #[test]
    fn image_data_structure_round_trips() {
        let structure = StructureBuilder::new()
            .add_field(2i32)
            .add_field(2i32)
            .add_field(6i32)
            .add_field(false)
            .add_field(8i32)
            .add_field(3i32)
            .add_field(vec![0u8; 12])
            .build();
        let mut raw = HashMap::new();
        raw.insert("image-data".to_string(), Value::Structure(structure));
        let hints = hints_from_dbus(&raw);
        let image = hints.image().expect("image hint parsed");
        assert_eq!((image.width, image.height), (2, 2));
        assert_eq!(image.channels, 3);
        assert_eq!(image.data.len(), 12);
    }

    #[test]
    fn malformed_image_structure_is_dropped() {
        let structure = StructureBuilder::new()
            .add_field(2i32)
            .add_field(2i32)
            .build();
        let mut raw = HashMap::new();
        raw.insert("image-data".to_string(), Value::Structure(structure));
        let hints = hints_from_dbus(&raw);
        assert!(hints.image().is_none());
    }

    #[test]
    fn byte_arrays_convert() {
        let mut raw = HashMap::new();
        raw.insert("payload".to_string(), Value::from(vec![1u8, 2, 3]));
        let hints = hints_from_dbus(&raw);
        assert_eq!(
            hints.get("payload"),
            Some(&HintValue::ByteArray(vec![1, 2, 3]))
        );
    }
}
