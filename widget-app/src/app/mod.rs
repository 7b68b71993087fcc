//! The application context: registries, platform bindings, and deferred work.

mod lifecycle;

use std::any::Any;
use std::collections::VecDeque;
use std::rc::Rc;

use log::{debug, info, warn};

use crate::class::{ClassRegistry, DestroyReason};
use crate::config::AppConfig;
use crate::context::{Command, WidgetContext};
use crate::error::{Result, WidgetError};
use crate::events::{AppEventCallback, AppEventType, EventHandlerTable, HandlerId};
use crate::instance::{InstanceId, InstanceRegistry, WidgetInstance};
use crate::platform::{Platform, SettingKey};
use crate::status::{InstanceEvent, StatusReport};

/// Watches the runtime holds for its own use, independent of subscribers.
const RUNTIME_WATCHES: [SettingKey; 3] = [
    SettingKey::Language,
    SettingKey::RegionFormat,
    SettingKey::PowerOff,
];

/// Runtime watches kept until the application's `terminate` hook has run.
const LOCALE_WATCHES: [SettingKey; 2] = [SettingKey::Language, SettingKey::RegionFormat];

/// Process-level hooks supplied by the application.
pub trait WidgetApplication {
    /// Registers the application's widget classes.
    ///
    /// At least one class must be registered, otherwise startup fails.
    fn create(&mut self, classes: &mut ClassRegistry) -> Result<()>;

    /// Called once at shutdown, after every instance has been destroyed.
    fn terminate(&mut self) {}
}

/// Everything a widget process owns.
///
/// Constructed once at process start and passed by reference to every
/// component. Dropping it drops the class registry.
pub struct WidgetApp {
    config: AppConfig,
    application: Box<dyn WidgetApplication>,
    pub(crate) classes: ClassRegistry,
    pub(crate) instances: InstanceRegistry,
    pub(crate) handlers: EventHandlerTable,
    pub(crate) platform: Platform,
    pub(crate) commands: VecDeque<Command>,
    exit_requested: bool,
    started: bool,
    caller_pid: Option<i32>,
}

impl WidgetApp {
    pub fn new(
        config: AppConfig,
        application: impl WidgetApplication + 'static,
        mut platform: Platform,
    ) -> Self {
        if let Some(endpoint) = &config.viewer_endpoint {
            platform.status.set_endpoint(endpoint.clone());
        } else {
            warn!("viewer endpoint is missing");
        }

        Self {
            classes: ClassRegistry::new(config.app_id.clone()),
            config,
            application: Box::new(application),
            instances: InstanceRegistry::new(),
            handlers: EventHandlerTable::new(),
            platform,
            commands: VecDeque::new(),
            exit_requested: false,
            started: false,
            caller_pid: None,
        }
    }

    // -------------------------------------------------------------------------
    // Process lifecycle
    // -------------------------------------------------------------------------

    /// Arms the runtime's setting watches and runs the application's `create`.
    pub fn start(&mut self) -> Result<()> {
        self.ensure_supported("start")?;
        if self.started {
            return Ok(());
        }

        for key in RUNTIME_WATCHES {
            self.platform.watches.acquire(key);
        }
        self.started = true;

        self.application.create(&mut self.classes)?;
        if self.classes.is_empty() {
            return Err(
                WidgetError::invalid("no widget class was registered").report("start"),
            );
        }

        info!(
            "{} started with {} widget class(es)",
            self.config.app_id,
            self.classes.len()
        );
        Ok(())
    }

    /// Requests process exit.
    ///
    /// Returns true when this call made the request; later calls are no-ops.
    pub fn exit(&mut self) -> bool {
        if self.exit_requested {
            return false;
        }
        info!("exit requested");
        self.exit_requested = true;
        true
    }

    pub fn is_exit_requested(&self) -> bool {
        self.exit_requested
    }

    /// Tears the process state down.
    ///
    /// Stops watching power-off, pauses every instance without reporting,
    /// destroys every instance as temporary, then runs the application's
    /// `terminate` hook. Locale watches and event handlers are dropped last.
    pub fn shutdown(&mut self) {
        debug!("shutting down");
        self.exit_requested = true;

        let started = std::mem::take(&mut self.started);
        if started {
            self.platform.watches.release(SettingKey::PowerOff);
        }

        self.pause_all(false);
        self.destroy_all(DestroyReason::Temporary, true);
        self.application.terminate();

        if started {
            for key in LOCALE_WATCHES {
                self.platform.watches.release(key);
            }
        }
        self.handlers.clear(&mut self.platform.watches);
        self.commands.clear();
    }

    /// Asks the viewer to restart this process.
    pub fn restart(&mut self) -> Result<()> {
        self.ensure_supported("restart")?;
        let report = StatusReport::process(InstanceEvent::AppRestartRequest);
        self.platform
            .status
            .send_to_viewer(&report)
            .map_err(|err| err.report("restart"))
    }

    // -------------------------------------------------------------------------
    // Event handlers
    // -------------------------------------------------------------------------

    /// Subscribes to an application event.
    pub fn add_event_handler(
        &mut self,
        event_type: AppEventType,
        callback: AppEventCallback,
        user_data: Option<Rc<dyn Any>>,
    ) -> Result<HandlerId> {
        self.ensure_supported("add_event_handler")?;
        self.handlers
            .subscribe(&mut self.platform.watches, event_type, callback, user_data)
    }

    pub fn remove_event_handler(&mut self, id: HandlerId) -> Result<()> {
        self.ensure_supported("remove_event_handler")?;
        self.handlers.unsubscribe(&mut self.platform.watches, id)
    }

    // -------------------------------------------------------------------------
    // Deferred work
    // -------------------------------------------------------------------------

    /// Schedules the instance for pause then temporary destroy once control
    /// returns to the loop.
    pub fn terminate_instance(&mut self, id: &str) -> Result<()> {
        self.ensure_supported("terminate_context")?;
        let Some(instance) = self.instances.find_by_id(id) else {
            return Err(
                WidgetError::not_found(format!("instance {id} not found"))
                    .report("terminate_context"),
            );
        };
        self.commands
            .push_back(Command::Terminate(instance.id().clone()));
        Ok(())
    }

    /// Runs the commands queued so far.
    ///
    /// Commands queued while these run wait for the next call.
    pub fn run_pending(&mut self) -> usize {
        let pending: Vec<_> = self.commands.drain(..).collect();
        let count = pending.len();
        for command in pending {
            match command {
                Command::Terminate(id) => self.finish_instance(&id),
                Command::Exit => {
                    self.exit();
                }
            }
        }
        count
    }

    pub fn has_pending(&self) -> bool {
        !self.commands.is_empty()
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Runs `f` with a context for the given instance.
    pub fn with_context<R>(
        &mut self,
        id: &str,
        f: impl FnOnce(&mut WidgetContext<'_>) -> R,
    ) -> Result<R> {
        let Some(instance) = self.instances.find_by_id_mut(id) else {
            return Err(WidgetError::not_found(format!("instance {id} not found")));
        };
        let mut cx = WidgetContext::new(instance, &mut self.platform, &mut self.commands);
        Ok(f(&mut cx))
    }

    /// Visits live instances oldest first until `visit` returns false.
    pub fn for_each_instance(
        &self,
        visit: impl FnMut(&WidgetInstance) -> bool,
    ) -> Result<()> {
        self.ensure_supported("foreach_context")?;
        self.instances.for_each(visit);
        Ok(())
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn app_id(&self) -> &str {
        &self.config.app_id
    }

    pub fn classes(&self) -> &ClassRegistry {
        &self.classes
    }

    pub fn instances(&self) -> &InstanceRegistry {
        &self.instances
    }

    pub fn handlers(&self) -> &EventHandlerTable {
        &self.handlers
    }

    pub fn platform(&self) -> &Platform {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut Platform {
        &mut self.platform
    }

    /// Pid of the process that last launched this one, if it said.
    pub fn caller_pid(&self) -> Option<i32> {
        self.caller_pid
    }

    pub(crate) fn set_caller_pid(&mut self, pid: i32) {
        self.caller_pid = Some(pid);
    }

    pub(crate) fn ids(&self) -> Vec<InstanceId> {
        self.instances.ids()
    }

    fn ensure_supported(&self, function: &str) -> Result<()> {
        if self.config.feature_enabled {
            Ok(())
        } else {
            Err(WidgetError::not_supported("widget feature is disabled").report(function))
        }
    }
}
