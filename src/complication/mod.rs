//! Complications: small data widgets embedded in the watch face
//!
//! A provider pushes [`ComplicationData`] for a slot, the watch face draws it
//! inside the slot's bounding box and forwards taps on the box back to the
//! provider's action.

use core::fmt;

use embedded_graphics::{
    geometry::{Point, Size},
    primitives::Rectangle,
};
use heapless::{LinearMap, String};

pub mod chooser;
pub mod inbox;

pub use inbox::{ComplicationInbox, Inbox, ProviderInbox};

pub type SlotId = u8;

/// Short text shown inside a complication
pub type ComplicationText = String<16>;

/// The one slot this watch face offers, centred at the bottom edge
pub const COMPLICATION_ID: SlotId = 0;
pub const COMPLICATION_IDS: [SlotId; 1] = [COMPLICATION_ID];

/// Data kinds the bottom slot can render
pub const SUPPORTED_TYPES: [ComplicationType; 4] = [
    ComplicationType::RangedValue,
    ComplicationType::Icon,
    ComplicationType::ShortText,
    ComplicationType::SmallImage,
];

pub const MAX_SLOTS: usize = 4;

/// Identity under which the watch face registers with complication providers
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WatchFaceId(pub &'static str);

pub const WATCH_FACE: WatchFaceId = WatchFaceId("wortuhr.TextWatchFace");

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ComplicationType {
    /// Provider has nothing to show right now
    NoData,
    /// Slot intentionally left blank
    Empty,
    /// No provider chosen for the slot
    NotConfigured,
    ShortText,
    RangedValue,
    Icon,
    SmallImage,
    /// Provider needs a permission the watch face does not have
    NoPermission,
}

/// Reference to an icon resource supplied by the provider
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IconId(pub u16);

/// Opaque handle of a provider action fired on tap
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionHandle(pub u32);

/// Payload a provider pushes for a slot
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq)]
pub struct ComplicationData {
    kind: ComplicationType,
    text: Option<ComplicationText>,
    title: Option<ComplicationText>,
    icon: Option<IconId>,
    value: i32,
    min: i32,
    max: i32,
    tap_action: Option<ActionHandle>,
    /// Inclusive validity window in wall-clock milliseconds
    start_millis: Option<i64>,
    end_millis: Option<i64>,
}

impl ComplicationData {
    pub fn new(kind: ComplicationType) -> Self {
        Self {
            kind,
            text: None,
            title: None,
            icon: None,
            value: 0,
            min: 0,
            max: 0,
            tap_action: None,
            start_millis: None,
            end_millis: None,
        }
    }

    pub fn not_configured() -> Self {
        Self::new(ComplicationType::NotConfigured)
    }

    pub fn empty() -> Self {
        Self::new(ComplicationType::Empty)
    }

    pub fn no_permission() -> Self {
        Self::new(ComplicationType::NoPermission)
    }

    /// Short text, cut to what fits into a complication
    pub fn short_text(text: &str) -> Self {
        Self {
            text: Some(truncated(text)),
            ..Self::new(ComplicationType::ShortText)
        }
    }

    pub fn ranged_value(value: i32, min: i32, max: i32) -> Self {
        Self {
            value,
            min,
            max,
            ..Self::new(ComplicationType::RangedValue)
        }
    }

    pub fn icon(icon: IconId) -> Self {
        Self {
            icon: Some(icon),
            ..Self::new(ComplicationType::Icon)
        }
    }

    pub fn small_image(image: IconId) -> Self {
        Self {
            icon: Some(image),
            ..Self::new(ComplicationType::SmallImage)
        }
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.text = Some(truncated(text));
        self
    }

    pub fn with_title(mut self, title: &str) -> Self {
        self.title = Some(truncated(title));
        self
    }

    pub fn with_tap_action(mut self, action: ActionHandle) -> Self {
        self.tap_action = Some(action);
        self
    }

    /// Limit the data to a time window, both ends inclusive
    pub fn active_between(mut self, start_millis: i64, end_millis: i64) -> Self {
        self.start_millis = Some(start_millis);
        self.end_millis = Some(end_millis);
        self
    }

    pub fn kind(&self) -> ComplicationType {
        self.kind
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn icon_id(&self) -> Option<IconId> {
        self.icon
    }

    /// Current value with its range as `(value, min, max)`
    pub fn range(&self) -> (i32, i32, i32) {
        (self.value, self.min, self.max)
    }

    pub fn tap_action(&self) -> Option<ActionHandle> {
        self.tap_action
    }

    pub fn is_active(&self, now_millis: i64) -> bool {
        self.start_millis.map_or(true, |start| now_millis >= start)
            && self.end_millis.map_or(true, |end| now_millis <= end)
    }

    /// Whether a provider actually fills the slot
    pub fn is_configured(&self) -> bool {
        !matches!(
            self.kind,
            ComplicationType::NotConfigured | ComplicationType::Empty
        )
    }
}

fn truncated(text: &str) -> ComplicationText {
    let mut out = ComplicationText::new();
    for c in text.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

/// Provider metadata as returned by the provider lookup and the chooser
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProviderInfo {
    pub app_name: String<24>,
    pub provider_name: String<24>,
    pub icon: IconId,
    pub kind: ComplicationType,
}

/// Services of the watch the complications need on tap
pub trait ComplicationHost {
    /// Fire a provider's tap action
    fn send_tap_action(&mut self, action: ActionHandle) -> Result<(), TapError>;

    /// Ask the user to grant the watch face access to complication data
    fn request_permission(&mut self, watch_face: WatchFaceId);
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapError {
    /// The provider withdrew the action
    Canceled,
    /// The action could not be delivered
    Unreachable,
}

impl fmt::Display for TapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TapError::Canceled => f.write_str("tap action canceled"),
            TapError::Unreachable => f.write_str("tap action could not be delivered"),
        }
    }
}

/// What a tap on a complication ended up doing
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TapOutcome {
    ActionSent,
    ActionFailed(TapError),
    PermissionRequested,
    Ignored,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Debug, PartialEq)]
pub struct ComplicationSlot {
    pub id: SlotId,
    pub supported_types: &'static [ComplicationType],
    pub data: Option<ComplicationData>,
    pub bounds: Rectangle,
}

impl ComplicationSlot {
    fn new(id: SlotId, supported_types: &'static [ComplicationType]) -> Self {
        Self {
            id,
            supported_types,
            data: None,
            bounds: Rectangle::zero(),
        }
    }
}

/// Complication slots of the watch face and their current data
pub struct ComplicationBridge {
    slots: LinearMap<SlotId, ComplicationSlot, MAX_SLOTS>,
}

impl ComplicationBridge {
    /// Create slots for the given ids, all sharing the same supported types.
    pub fn new(ids: &[SlotId], supported_types: &'static [ComplicationType]) -> Self {
        let mut slots = LinearMap::new();
        for &id in ids.iter().take(MAX_SLOTS) {
            // Capacity checked by take()
            let _ = slots.insert(id, ComplicationSlot::new(id, supported_types));
        }
        Self { slots }
    }

    pub fn slot(&self, id: SlotId) -> Option<&ComplicationSlot> {
        self.slots.get(&id)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ComplicationSlot> {
        self.slots.values()
    }

    /// Store fresh provider data. Returns false for unknown slots.
    pub fn on_complication_data_update(&mut self, id: SlotId, data: ComplicationData) -> bool {
        match self.slots.get_mut(&id) {
            Some(slot) => {
                debug!("Complication {} updated: {:?}", id, data.kind());
                slot.data = Some(data);
                true
            }
            None => {
                warn!("Data for unknown complication {}", id);
                false
            }
        }
    }

    pub fn set_bounds(&mut self, id: SlotId, bounds: Rectangle) {
        if let Some(slot) = self.slots.get_mut(&id) {
            slot.bounds = bounds;
        }
    }

    /// Place the bottom slot for a new surface size.
    pub fn on_surface_changed(&mut self, width: u32, height: u32, margin: i32) {
        let center_x = width as i32 / 2;
        let size = width as i32 / 4;

        let left = center_x - size / 2;
        let top = height as i32 - size;
        let right = center_x + size / 2;
        let bottom = height as i32 - margin;

        let bounds = Rectangle::new(
            Point::new(left, top),
            Size::new((right - left).max(0) as u32, (bottom - top).max(0) as u32),
        );
        self.set_bounds(COMPLICATION_ID, bounds);
    }

    /// The slot under a tap, if it holds active, configured data.
    pub fn hit_test(&self, x: i32, y: i32, now_millis: i64) -> Option<SlotId> {
        let point = Point::new(x, y);
        for slot in self.slots.values() {
            let live = slot.data.as_ref().map_or(false, |data| {
                data.is_active(now_millis) && data.is_configured()
            });
            if !live {
                continue;
            }
            if slot.bounds.size.width == 0 {
                error!("Complication {} has no bounds", slot.id);
                continue;
            }
            if slot.bounds.contains(point) {
                return Some(slot.id);
            }
        }
        None
    }

    /// Forward a tap to the slot's provider.
    pub fn tap(&self, id: SlotId, host: &mut impl ComplicationHost) -> TapOutcome {
        debug!("Complication {} tapped", id);
        let Some(data) = self.slots.get(&id).and_then(|slot| slot.data.as_ref()) else {
            debug!("No tap action for complication {}", id);
            return TapOutcome::Ignored;
        };

        if let Some(action) = data.tap_action() {
            match host.send_tap_action(action) {
                Ok(()) => TapOutcome::ActionSent,
                Err(e) => {
                    error!("Tap action of complication {} failed: {:?}", id, e);
                    TapOutcome::ActionFailed(e)
                }
            }
        } else if data.kind() == ComplicationType::NoPermission {
            host.request_permission(WATCH_FACE);
            TapOutcome::PermissionRequested
        } else {
            debug!("No tap action for complication {}", id);
            TapOutcome::Ignored
        }
    }
}

impl Default for ComplicationBridge {
    fn default() -> Self {
        Self::new(&COMPLICATION_IDS, &SUPPORTED_TYPES)
    }
}
