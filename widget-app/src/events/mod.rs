//! System events and application-observable event types.

mod handlers;

use serde::{Deserialize, Serialize};

use crate::platform::SettingKey;

pub use handlers::{AppEventCallback, EventHandlerTable, HandlerId};

/// Event types an application can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AppEventType {
    LowMemory,
    LowBattery,
    LanguageChanged,
    RegionFormatChanged,
    /// Part of the platform's event enumeration, but widget processes have
    /// no orientation of their own. Subscribing fails with `InvalidParameter`.
    DeviceOrientationChanged,
}

impl AppEventType {
    /// The setting watch backing this event type.
    pub fn setting_key(self) -> Option<SettingKey> {
        match self {
            Self::LowMemory => Some(SettingKey::LowMemory),
            Self::LowBattery => Some(SettingKey::LowBattery),
            Self::LanguageChanged => Some(SettingKey::Language),
            Self::RegionFormatChanged => Some(SettingKey::RegionFormat),
            Self::DeviceOrientationChanged => None,
        }
    }
}

/// Memory pressure reported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LowMemoryStatus {
    Normal,
    SoftWarning,
    HardWarning,
}

/// Battery level reported by the system, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatteryStatus {
    PowerOff,
    CriticalLow,
    WarningLow,
    Normal,
    Full,
}

/// Power-off state reported by the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PowerOffStatus {
    None,
    Popup,
    Direct,
    Restart,
}

/// An event delivered to subscribed application handlers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    LowMemory(LowMemoryStatus),
    LowBattery(BatteryStatus),
    LanguageChanged(String),
    RegionFormatChanged(String),
}

impl AppEvent {
    pub fn event_type(&self) -> AppEventType {
        match self {
            Self::LowMemory(_) => AppEventType::LowMemory,
            Self::LowBattery(_) => AppEventType::LowBattery,
            Self::LanguageChanged(_) => AppEventType::LanguageChanged,
            Self::RegionFormatChanged(_) => AppEventType::RegionFormatChanged,
        }
    }
}

/// A raw setting change coming from the platform.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum SystemEvent {
    LowMemory(LowMemoryStatus),
    LowBattery(BatteryStatus),
    LanguageChanged(String),
    RegionFormatChanged(String),
    PowerOff(PowerOffStatus),
}

impl SystemEvent {
    pub fn setting_key(&self) -> SettingKey {
        match self {
            Self::LowMemory(_) => SettingKey::LowMemory,
            Self::LowBattery(_) => SettingKey::LowBattery,
            Self::LanguageChanged(_) => SettingKey::Language,
            Self::RegionFormatChanged(_) => SettingKey::RegionFormat,
            Self::PowerOff(_) => SettingKey::PowerOff,
        }
    }
}
