//! Routes host notifications to the lifecycle dispatcher.
//!
//! Four kinds of input reach a widget process:
//! 1. Launch signals (start with a control bundle, resume, terminate)
//! 2. Control messages carried by the start signal
//! 3. Display-surface notifications, keyed by surface
//! 4. System setting changes
//!
//! A bad message never takes the process down. [`WidgetApp::route`] returns
//! what went wrong; [`WidgetApp::handle`] logs it and moves on.

mod control;

use log::{debug, error, info, trace, warn};
use serde::{Deserialize, Serialize};

use crate::app::WidgetApp;
use crate::class::DestroyReason;
use crate::error::{Result, WidgetError};
use crate::events::{
    AppEvent, BatteryStatus, LowMemoryStatus, PowerOffStatus, SystemEvent,
};
use crate::instance::InstanceState;
use crate::platform::SurfaceId;

pub use control::{
    Bundle, ControlMessage, KEY_CALLER, KEY_CLASS, KEY_CONTENT, KEY_ENDPOINT, KEY_FORCE,
    KEY_HEIGHT, KEY_INSTANCE, KEY_OPERATION, KEY_REASON, KEY_WIDTH, Operation,
};

/// Process-level signal from the launcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LaunchSignal {
    /// (Re)launch with a control bundle.
    Start(Bundle),
    /// Bring every instance back.
    Resume,
    /// Exit the process.
    Terminate,
}

/// Display-surface notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SurfaceEvent {
    Show {
        surface: SurfaceId,
    },
    Hide {
        surface: SurfaceId,
    },
    Visibility {
        surface: SurfaceId,
        fully_obscured: bool,
    },
    Lower {
        surface: SurfaceId,
    },
    Configure {
        surface: SurfaceId,
        width: i32,
        height: i32,
    },
}

impl SurfaceEvent {
    pub fn surface(&self) -> SurfaceId {
        match *self {
            Self::Show { surface }
            | Self::Hide { surface }
            | Self::Visibility { surface, .. }
            | Self::Lower { surface }
            | Self::Configure { surface, .. } => surface,
        }
    }
}

/// Anything the host delivers to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    Launch(LaunchSignal),
    Surface(SurfaceEvent),
    System(SystemEvent),
}

impl From<LaunchSignal> for HostEvent {
    fn from(signal: LaunchSignal) -> Self {
        Self::Launch(signal)
    }
}

impl From<SurfaceEvent> for HostEvent {
    fn from(event: SurfaceEvent) -> Self {
        Self::Surface(event)
    }
}

impl From<SystemEvent> for HostEvent {
    fn from(event: SystemEvent) -> Self {
        Self::System(event)
    }
}

impl WidgetApp {
    /// Routes one host event, logging and dropping any failure.
    pub fn handle(&mut self, event: HostEvent) {
        if let Err(err) = self.route(event) {
            warn!("event dropped: {err}");
        }
    }

    /// Routes one host event to completion.
    pub fn route(&mut self, event: HostEvent) -> Result<()> {
        match event {
            HostEvent::Launch(signal) => self.route_launch(signal),
            HostEvent::Surface(event) => self.route_surface(event),
            HostEvent::System(event) => self.route_system(event),
        }
    }

    fn route_launch(&mut self, signal: LaunchSignal) -> Result<()> {
        match signal {
            LaunchSignal::Start(bundle) => {
                let message = ControlMessage::from_bundle(&bundle);
                match message.caller {
                    Some(pid) => self.set_caller_pid(pid),
                    None => debug!("no caller pid"),
                }
                self.route_control(&message)
            }
            LaunchSignal::Resume => {
                self.resume_all(true);
                Ok(())
            }
            LaunchSignal::Terminate => {
                self.exit();
                Ok(())
            }
        }
    }

    /// Applies one control message.
    pub fn route_control(&mut self, message: &ControlMessage) -> Result<()> {
        if let Some(endpoint) = &message.endpoint {
            self.platform.status.set_endpoint(endpoint.clone());
        }

        let class_id = message.class_id.as_deref().unwrap_or(self.app_id());
        let Some(class) = self.classes.find(class_id) else {
            return Err(WidgetError::not_found(format!("no handle provided: {class_id}")));
        };

        let Some(operation) = message.operation.as_deref() else {
            return Err(WidgetError::invalid("no operation provided"));
        };
        let operation: Operation = operation.parse()?;

        trace!(
            "control {} {:?} on {}",
            operation, message.instance_id, class_id
        );

        if operation == Operation::Update {
            return match message.instance_id.as_deref() {
                Some(id) => self.update_instance(id, message.content.as_deref(), message.force, true),
                None => self.update_all(message.content.as_deref(), message.force),
            };
        }

        let Some(id) = message.instance_id.as_deref() else {
            return Err(WidgetError::invalid(format!("{operation} without an instance id")));
        };

        match operation {
            Operation::Create => self.create_instance(
                &class,
                id,
                message.content.as_deref(),
                message.width,
                message.height,
            ),
            Operation::Resize => self.resize_window(id, message.width, message.height),
            Operation::Destroy => {
                let reason = message
                    .reason
                    .and_then(DestroyReason::from_code)
                    .unwrap_or(DestroyReason::Permanent);
                self.destroy_instance(id, reason, true)
            }
            Operation::Terminate => self.destroy_instance(id, DestroyReason::Temporary, true),
            Operation::Resume => self.resume_instance(id, true),
            Operation::Pause => self.pause_instance(id, true),
            Operation::Update => Ok(()),
        }
    }

    /// Resizes the bound surface, then applies the new size to the instance.
    fn resize_window(&mut self, id: &str, width: i32, height: i32) -> Result<()> {
        let Some(instance) = self.instances.find_by_id(id) else {
            return Err(WidgetError::not_found(format!("can not find instance: {id}")));
        };

        match instance.surface() {
            Some(surface) => {
                if let Err(err) = self.platform.surfaces.resize_surface(surface, width, height) {
                    error!("failed to resize {surface}: {err}");
                }
            }
            None => debug!("{} has no window to resize", id),
        }
        self.resize_instance(id, width, height, true)
    }

    fn route_surface(&mut self, event: SurfaceEvent) -> Result<()> {
        let surface = event.surface();
        let Some(instance) = self.instances.find_by_window(surface) else {
            return Err(WidgetError::not_found(format!("unknown window: {surface}")));
        };
        let id = instance.id().clone();
        let state = instance.state();

        match event {
            SurfaceEvent::Show { .. } => self.resume_instance(id.as_str(), true),
            SurfaceEvent::Hide { .. } => self.pause_instance(id.as_str(), true),
            SurfaceEvent::Visibility { fully_obscured, .. } => {
                match (state, fully_obscured) {
                    (InstanceState::Paused, false) => self.resume_instance(id.as_str(), true),
                    (InstanceState::Running, true) => self.pause_instance(id.as_str(), true),
                    _ => {
                        debug!("{} state:{:?} obscured:{}", id, state, fully_obscured);
                        Ok(())
                    }
                }
            }
            SurfaceEvent::Lower { .. } => {
                debug!("lower {}", surface);
                Ok(())
            }
            SurfaceEvent::Configure { width, height, .. } => {
                if matches!(state, InstanceState::Running | InstanceState::Paused) {
                    self.resize_instance(id.as_str(), width, height, true)
                } else {
                    debug!("{} configure {}x{} ignored", id, width, height);
                    Ok(())
                }
            }
        }
    }

    fn route_system(&mut self, event: SystemEvent) -> Result<()> {
        let key = event.setting_key();
        if !self.platform.watches.is_watched(key) {
            trace!("{:?} is not watched; dropped", key);
            return Ok(());
        }

        match event {
            SystemEvent::LowMemory(level) => {
                if level == LowMemoryStatus::SoftWarning {
                    info!("low memory");
                    self.handlers.dispatch(&AppEvent::LowMemory(level));
                }
            }
            SystemEvent::LowBattery(level) => {
                if level <= BatteryStatus::CriticalLow {
                    info!("low battery");
                    self.handlers.dispatch(&AppEvent::LowBattery(level));
                }
            }
            SystemEvent::LanguageChanged(locale) => {
                self.platform.watches.settings_mut().apply_language(&locale);
                self.handlers.dispatch(&AppEvent::LanguageChanged(locale));
            }
            SystemEvent::RegionFormatChanged(region) => {
                self.platform.watches.settings_mut().apply_region(&region);
                self.handlers.dispatch(&AppEvent::RegionFormatChanged(region));
            }
            SystemEvent::PowerOff(status) => match status {
                PowerOffStatus::Direct | PowerOffStatus::Restart => {
                    info!("power off changed: {:?}", status);
                    self.exit();
                }
                PowerOffStatus::None | PowerOffStatus::Popup => {}
            },
        }
        Ok(())
    }
}
