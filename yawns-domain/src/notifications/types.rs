use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Protocol-visible notification identity, allocated by the bus frontend.
pub type NotificationId = u32;

/// Urgency hint per the notification protocol: 0 = low, 1 = normal,
/// 2 = critical. Unknown values collapse to `Normal`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub enum Urgency {
    Low,
    #[default]
    Normal,
    Critical,
}

impl Urgency {
    pub fn level(self) -> u8 {
        match self {
            Urgency::Low => 0,
            Urgency::Normal => 1,
            Urgency::Critical => 2,
        }
    }
}

impl From<u8> for Urgency {
    fn from(value: u8) -> Self {
        match value {
            0 => Urgency::Low,
            2 => Urgency::Critical,
            _ => Urgency::Normal,
        }
    }
}

/// Presentation lane a notification is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LaneKind {
    /// Classic corner-anchored card; multiple members stack vertically.
    Corner,
    /// Centered overlay, meant for quick-setting feedback.
    Center,
    /// "Now playing" style widget; the lane holds at most one member.
    Media,
}

impl LaneKind {
    /// All lanes in routing priority order.
    pub const ALL: [LaneKind; 3] = [LaneKind::Corner, LaneKind::Center, LaneKind::Media];

    pub fn name(self) -> &'static str {
        match self {
            LaneKind::Corner => "corner",
            LaneKind::Center => "center",
            LaneKind::Media => "media",
        }
    }

    pub fn from_hint(value: &str) -> Option<LaneKind> {
        match value {
            "corner" => Some(LaneKind::Corner),
            "center" => Some(LaneKind::Center),
            "media" => Some(LaneKind::Media),
            _ => None,
        }
    }
}

/// Why a notification was destroyed. The numeric codes are fixed by the
/// notification protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseReason {
    /// The expiry timer fired.
    Expired,
    /// The user dismissed it (click-to-close or action invocation).
    Dismissed,
    /// A client called `CloseNotification`.
    Closed,
    /// Reserved.
    Undefined,
}

impl CloseReason {
    pub fn code(self) -> u32 {
        match self {
            CloseReason::Expired => 1,
            CloseReason::Dismissed => 2,
            CloseReason::Closed => 3,
            CloseReason::Undefined => 4,
        }
    }
}

/// One invocable action offered by a notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationAction {
    /// Key relayed back to the sender on invocation.
    pub key: String,
    /// Text shown to the user.
    pub label: String,
}

/// Pairs up the protocol's flat `[key, label, key, label, ...]` action
/// array. A trailing key without a label is dropped.
pub fn pair_actions(flat: &[String]) -> Vec<NotificationAction> {
    flat.chunks_exact(2)
        .map(|pair| NotificationAction {
            key: pair[0].clone(),
            label: pair[1].clone(),
        })
        .collect()
}

/// Raw image payload from the protocol's `image-data` hint structure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageData {
    pub width: i32,
    pub height: i32,
    pub rowstride: i32,
    pub has_alpha: bool,
    pub bits_per_sample: i32,
    pub channels: i32,
    pub data: Vec<u8>,
}

/// Tagged hint value. The protocol transports hints as variants; keeping
/// the closed set here means every consumer does explicit missing/wrong-type
/// handling instead of duck-typing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HintValue {
    Str(String),
    Byte(u8),
    U32(u32),
    I32(i32),
    Bool(bool),
    ByteArray(Vec<u8>),
    Image(ImageData),
}

impl HintValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            HintValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric coercion across the integer variants; negative values don't
    /// coerce.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            HintValue::Byte(b) => Some(u32::from(*b)),
            HintValue::U32(v) => Some(*v),
            HintValue::I32(v) => u32::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            HintValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_image(&self) -> Option<&ImageData> {
        match self {
            HintValue::Image(image) => Some(image),
            _ => None,
        }
    }
}

/// Hint dictionary keyed by the protocol hint names.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Hints(HashMap<String, HintValue>);

impl Hints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: HintValue) {
        self.0.insert(name.into(), value);
    }

    pub fn get(&self, name: &str) -> Option<&HintValue> {
        self.0.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `urgency` hint; missing or wrong-typed values read as `Normal`.
    pub fn urgency(&self) -> Urgency {
        self.get("urgency")
            .and_then(HintValue::as_u32)
            .map(|v| Urgency::from(v.min(u32::from(u8::MAX)) as u8))
            .unwrap_or_default()
    }

    /// The `value` progress hint, clamped to 0..=100.
    pub fn progress(&self) -> Option<u8> {
        self.get("value").and_then(|v| match v {
            HintValue::I32(i) => Some((*i).clamp(0, 100) as u8),
            HintValue::U32(u) => Some((*u).min(100) as u8),
            HintValue::Byte(b) => Some((*b).min(100)),
            _ => None,
        })
    }

    /// The daemon-specific `yawn-type` hint requesting a lane explicitly.
    pub fn lane_hint(&self) -> Option<LaneKind> {
        self.get("yawn-type")
            .and_then(HintValue::as_str)
            .and_then(LaneKind::from_hint)
    }

    /// The `image-data` hint payload.
    pub fn image(&self) -> Option<&ImageData> {
        self.get("image-data").and_then(HintValue::as_image)
    }

    /// The `image-path` hint.
    pub fn image_path(&self) -> Option<&str> {
        self.get("image-path").and_then(HintValue::as_str)
    }

    /// The legacy `icon_data` hint, honored as the lowest-priority image
    /// source.
    pub fn legacy_icon(&self) -> Option<&ImageData> {
        self.get("icon_data").and_then(HintValue::as_image)
    }
}

/// Canonical in-memory representation of one notification.
///
/// Everything display-facing (`app_name`, `summary`, `body`, hints) is
/// arbitrary client input and must be treated as untrusted text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: NotificationId,
    /// The id the client asked to replace; 0 for a new notification.
    pub replaces_id: u32,
    /// Bus address of the calling peer, captured at call time. Needed to
    /// route close/action signals back; never client-supplied.
    pub sender: Option<String>,
    pub app_name: String,
    pub summary: String,
    pub body: String,
    /// Icon path or theme name as sent by the client.
    pub app_icon: String,
    /// Image payload resolved by the icon collaborator; `None` renders
    /// iconless.
    pub icon_bytes: Option<Vec<u8>>,
    pub actions: Vec<NotificationAction>,
    pub hints: Hints,
    /// Requested expiry in milliseconds; `<= 0` means "use the lane
    /// default".
    pub expire_timeout_ms: i32,
    pub created_at: DateTime<Utc>,
}

impl NotificationRecord {
    pub fn urgency(&self) -> Urgency {
        self.hints.urgency()
    }

    /// Effective expiry duration given the owning lane's default.
    pub fn expiry_duration(&self, lane_default_ms: u64) -> Duration {
        if self.expire_timeout_ms > 0 {
            Duration::from_millis(self.expire_timeout_ms as u64)
        } else {
            Duration::from_millis(lane_default_ms)
        }
    }
}
