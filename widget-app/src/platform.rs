//! Seams to the host platform.
//!
//! The runtime never talks to a message bus, window system, or settings
//! store directly. It goes through the traits in this module, bundled into a
//! [`Platform`] that the application context owns.

use std::collections::HashMap;
use std::fmt;

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WidgetError};
use crate::instance::InstanceId;
use crate::status::{InstanceEvent, LIFECYCLE_CHANNEL, StatusReport};

// =============================================================================
// Surfaces
// =============================================================================

/// Handle of a display surface bound to an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SurfaceId(pub u32);

impl fmt::Display for SurfaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "surface#{}", self.0)
    }
}

/// Window-system binding.
pub trait SurfaceProvider {
    /// Creates a surface for an instance.
    fn create_surface(&mut self, instance_id: &InstanceId) -> Result<SurfaceId>;

    /// Resizes a surface. The window system answers with a configure event.
    fn resize_surface(&mut self, surface: SurfaceId, width: i32, height: i32) -> Result<()> {
        let _ = (surface, width, height);
        Ok(())
    }

    /// Sets the title of a surface.
    fn set_title(&mut self, surface: SurfaceId, title: &str) {
        let _ = (surface, title);
    }

    /// Releases a surface when its instance is destroyed.
    fn destroy_surface(&mut self, surface: SurfaceId) {
        let _ = surface;
    }
}

/// Surface provider that hands out sequential ids without a real window system.
#[derive(Debug, Default)]
pub struct VirtualSurfaces {
    next: u32,
    titles: HashMap<SurfaceId, String>,
}

impl VirtualSurfaces {
    pub fn new() -> Self {
        Self::default()
    }

    /// Title last set on a surface.
    pub fn title(&self, surface: SurfaceId) -> Option<&str> {
        self.titles.get(&surface).map(String::as_str)
    }
}

impl SurfaceProvider for VirtualSurfaces {
    fn create_surface(&mut self, instance_id: &InstanceId) -> Result<SurfaceId> {
        self.next = self
            .next
            .checked_add(1)
            .ok_or_else(|| WidgetError::OutOfMemory("surface ids exhausted".into()))?;
        let surface = SurfaceId(self.next);
        debug!("created {} for {}", surface, instance_id);
        Ok(surface)
    }

    fn set_title(&mut self, surface: SurfaceId, title: &str) {
        self.titles.insert(surface, title.to_string());
    }

    fn destroy_surface(&mut self, surface: SurfaceId) {
        self.titles.remove(&surface);
    }
}

// =============================================================================
// Status reporting
// =============================================================================

/// Outbound IPC used for status reports.
pub trait StatusTransport {
    /// Sends one report to an endpoint.
    fn send(&mut self, endpoint: &str, report: &StatusReport) -> Result<()>;
}

/// Viewer endpoint plus the transport reports travel over.
pub struct StatusChannel {
    endpoint: Option<String>,
    transport: Box<dyn StatusTransport>,
}

impl StatusChannel {
    pub fn new(transport: Box<dyn StatusTransport>) -> Self {
        Self {
            endpoint: None,
            transport,
        }
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn set_endpoint(&mut self, endpoint: impl Into<String>) {
        let endpoint = endpoint.into();
        debug!("viewer endpoint: {}", endpoint);
        self.endpoint = Some(endpoint);
    }

    /// Reports an instance transition to the viewer.
    ///
    /// Create, destroy, pause, and resume are mirrored on the lifecycle
    /// channel as well. Only a failure to reach the viewer is returned.
    pub fn send_update(
        &mut self,
        class_id: &str,
        instance_id: &str,
        event: InstanceEvent,
        content: Option<String>,
    ) -> Result<()> {
        let report = StatusReport::instance(class_id, instance_id, event).with_content(content);
        let result = self.send_to_viewer(&report);

        if let Some(lifecycle) = event.lifecycle() {
            let mirror = StatusReport::lifecycle(class_id, instance_id, lifecycle);
            trace!("send lifecycle {}({})", instance_id, mirror.status);
            if let Err(err) = self.transport.send(LIFECYCLE_CHANNEL, &mirror) {
                error!("send lifecycle error: {err}");
            }
        }

        result
    }

    /// Sends a report to the viewer endpoint.
    pub fn send_to_viewer(&mut self, report: &StatusReport) -> Result<()> {
        let Some(endpoint) = self.endpoint.as_deref() else {
            warn!("no viewer endpoint; dropping status {}", report.status);
            return Err(WidgetError::io("viewer endpoint is not set"));
        };

        trace!(
            "send update {:?}({}) to {}",
            report.instance_id, report.status, endpoint
        );
        self.transport.send(endpoint, report).map_err(|err| {
            error!("failed to send status to {endpoint}: {err}");
            match err {
                WidgetError::IoError(_) => err,
                other => WidgetError::io(other.to_string()),
            }
        })
    }
}

// =============================================================================
// System settings
// =============================================================================

/// System settings the runtime can watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    LowMemory,
    LowBattery,
    Language,
    RegionFormat,
    PowerOff,
}

/// Settings store binding.
pub trait SystemSettings {
    /// Starts delivering change notifications for a key.
    fn watch(&mut self, key: SettingKey);

    /// Stops delivering change notifications for a key.
    fn unwatch(&mut self, key: SettingKey);

    /// Applies a new display language to the process.
    fn apply_language(&mut self, locale: &str) {
        let _ = locale;
    }

    /// Applies a new region format to the process.
    fn apply_region(&mut self, region: &str) {
        let _ = region;
    }
}

/// Settings binding that accepts every watch and does nothing.
#[derive(Debug, Default)]
pub struct NoopSettings;

impl SystemSettings for NoopSettings {
    fn watch(&mut self, _key: SettingKey) {}
    fn unwatch(&mut self, _key: SettingKey) {}
}

/// Reference-counted watches over a [`SystemSettings`] binding.
///
/// The first acquire of a key arms the platform watch and the last release
/// disarms it, so independent users of the same key never step on each other.
pub struct SettingWatches {
    settings: Box<dyn SystemSettings>,
    counts: HashMap<SettingKey, usize>,
}

impl SettingWatches {
    pub fn new(settings: Box<dyn SystemSettings>) -> Self {
        Self {
            settings,
            counts: HashMap::new(),
        }
    }

    pub fn acquire(&mut self, key: SettingKey) {
        let count = self.counts.entry(key).or_insert(0);
        if *count == 0 {
            debug!("arming {:?} watch", key);
            self.settings.watch(key);
        }
        *count += 1;
    }

    pub fn release(&mut self, key: SettingKey) {
        let Some(count) = self.counts.get_mut(&key) else {
            return;
        };
        *count = count.saturating_sub(1);
        if *count == 0 {
            self.counts.remove(&key);
            debug!("disarming {:?} watch", key);
            self.settings.unwatch(key);
        }
    }

    pub fn is_watched(&self, key: SettingKey) -> bool {
        self.counts.contains_key(&key)
    }

    pub fn settings_mut(&mut self) -> &mut dyn SystemSettings {
        self.settings.as_mut()
    }
}

// =============================================================================
// Platform
// =============================================================================

/// All platform bindings the runtime needs.
pub struct Platform {
    pub status: StatusChannel,
    pub surfaces: Box<dyn SurfaceProvider>,
    pub watches: SettingWatches,
}

impl Platform {
    /// Creates a platform with virtual surfaces and inert settings.
    pub fn new(transport: impl StatusTransport + 'static) -> Self {
        Self {
            status: StatusChannel::new(Box::new(transport)),
            surfaces: Box::new(VirtualSurfaces::new()),
            watches: SettingWatches::new(Box::new(NoopSettings)),
        }
    }

    /// Replaces the surface provider.
    pub fn with_surfaces(mut self, surfaces: impl SurfaceProvider + 'static) -> Self {
        self.surfaces = Box::new(surfaces);
        self
    }

    /// Replaces the settings binding.
    pub fn with_settings(mut self, settings: impl SystemSettings + 'static) -> Self {
        self.watches = SettingWatches::new(Box::new(settings));
        self
    }
}
