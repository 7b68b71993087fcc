//! Instance lifecycle transitions.
//!
//! ```text
//! create -> Ready -> Running <-> Paused -> Terminated
//! ```
//!
//! Every transition runs the class hook first, then moves the instance to
//! its new state, then reports it. `send_update = false` keeps a transition
//! local: nothing goes to the viewer or the lifecycle channel.

use std::rc::Rc;

use log::{debug, info, trace, warn};

use crate::class::{ClassHandle, DestroyReason, LifecycleCallbacks};
use crate::content::ContentInfo;
use crate::context::WidgetContext;
use crate::error::{Result, WidgetError};
use crate::instance::{InstanceId, InstanceState, WidgetInstance};
use crate::status::InstanceEvent;

use super::WidgetApp;

impl WidgetApp {
    /// Creates an instance of `class` and runs its `create` hook.
    ///
    /// A failing hook removes the record again and nothing is reported.
    pub fn create_instance(
        &mut self,
        class: &ClassHandle,
        id: &str,
        content: Option<&str>,
        width: i32,
        height: i32,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(WidgetError::invalid("instance id is empty").report("create"));
        }

        let instance = WidgetInstance::new(
            InstanceId::new(id),
            Rc::clone(class),
            content.map(str::to_string),
            (width, height),
        );
        let record = instance.record();
        self.instances
            .add(instance)
            .map_err(|err| err.report("create"))?;

        let info = ContentInfo::decode_lossy(content);
        let result = self
            .invoke(id, |callbacks, cx| {
                callbacks.call_create(cx, info.as_ref(), width, height)
            })
            .unwrap_or_else(|| Err(WidgetError::Fault(format!("{id} vanished during create"))));

        if let Err(err) = result {
            warn!("create of {} failed, rolling back: {}", id, err);
            if let Some(instance) = self.instances.remove(record) {
                self.release_surface(&instance);
            }
            return Err(err);
        }

        debug!("{} is created ({}x{})", id, width, height);
        self.send_status(class.id(), id, InstanceEvent::Create, None, true)
    }

    /// Moves a Ready or Paused instance to Running.
    pub fn resume_instance(&mut self, id: &str, send_update: bool) -> Result<()> {
        match self.state_of(id, "resume")? {
            InstanceState::Running => {
                debug!("{} is already in running state", id);
                return Ok(());
            }
            InstanceState::Terminated => {
                debug!("{} is in terminated state", id);
                return Ok(());
            }
            InstanceState::Ready | InstanceState::Paused => {}
        }

        let class = self.run_hook(id, LifecycleCallbacks::call_resume)?;
        self.set_state(id, InstanceState::Running);
        debug!("{} is resumed", id);
        self.send_status(class.id(), id, InstanceEvent::Resume, None, send_update)
    }

    /// Moves a Ready or Running instance to Paused.
    pub fn pause_instance(&mut self, id: &str, send_update: bool) -> Result<()> {
        match self.state_of(id, "pause")? {
            InstanceState::Paused => {
                debug!("{} is already in paused state", id);
                return Ok(());
            }
            InstanceState::Terminated => {
                debug!("{} is in terminated state", id);
                return Ok(());
            }
            InstanceState::Ready | InstanceState::Running => {}
        }

        let class = self.run_hook(id, LifecycleCallbacks::call_pause)?;
        self.set_state(id, InstanceState::Paused);
        debug!("{} is paused", id);
        self.send_status(class.id(), id, InstanceEvent::Pause, None, send_update)
    }

    /// Applies a new size. The state does not change.
    pub fn resize_instance(
        &mut self,
        id: &str,
        width: i32,
        height: i32,
        send_update: bool,
    ) -> Result<()> {
        if self.state_of(id, "resize")? == InstanceState::Terminated {
            return Ok(());
        }

        if let Some(instance) = self.instances.find_by_id_mut(id) {
            instance.size = (width, height);
        }
        let class = self.run_hook(id, |callbacks, cx| {
            callbacks.call_resize(cx, width, height)
        })?;
        debug!("{} is resized to {}x{}", id, width, height);
        self.send_status(class.id(), id, InstanceEvent::SizeChanged, None, send_update)
    }

    /// Runs the update hook of one instance.
    pub fn update_instance(
        &mut self,
        id: &str,
        content: Option<&str>,
        force: bool,
        send_update: bool,
    ) -> Result<()> {
        if self.state_of(id, "update")? == InstanceState::Terminated {
            return Ok(());
        }

        let info = ContentInfo::decode_lossy(content);
        let class = self.run_hook(id, |callbacks, cx| {
            callbacks.call_update(cx, info.as_ref(), force)
        })?;
        debug!("updated: {}", id);
        self.send_status(class.id(), id, InstanceEvent::Update, None, send_update)
    }

    /// Updates every live instance oldest first, each through its own class.
    ///
    /// Every instance is visited even when one fails; the first error is
    /// returned.
    pub fn update_all(&mut self, content: Option<&str>, force: bool) -> Result<()> {
        let mut first_error = None;
        for id in self.ids() {
            if let Err(err) = self.update_instance(id.as_str(), content, force, true) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Destroys an instance and removes it from the registry.
    ///
    /// A temporary destroy reports the content bundle the hook left behind
    /// before reporting TERMINATE; a permanent one reports DESTROY.
    pub fn destroy_instance(
        &mut self,
        id: &str,
        reason: DestroyReason,
        send_update: bool,
    ) -> Result<()> {
        let Some(instance) = self.instances.find_by_id(id) else {
            return Err(
                WidgetError::invalid(format!("could not find widget instance {id}"))
                    .report("destroy"),
            );
        };
        let record = instance.record();
        let mut content = ContentInfo::decode_lossy(instance.content()).unwrap_or_default();

        self.set_state(id, InstanceState::Terminated);
        let class = self.run_hook(id, |callbacks, cx| {
            callbacks.call_destroy(cx, reason, &mut content)
        })?;

        let mut result = Ok(());
        let event = match reason {
            DestroyReason::Permanent => InstanceEvent::Destroy,
            DestroyReason::Temporary => {
                let sent = content.encode().and_then(|blob| {
                    self.send_status(
                        class.id(),
                        id,
                        InstanceEvent::ExtraUpdated,
                        Some(blob),
                        send_update,
                    )
                });
                if let Err(err) = sent {
                    result = Err(err);
                }
                InstanceEvent::Terminate
            }
        };

        let sent = self.send_status(class.id(), id, event, None, send_update);
        if result.is_ok() {
            result = sent;
        }

        if let Some(instance) = self.instances.remove(record) {
            self.release_surface(&instance);
        }
        debug!("{} is destroyed ({:?})", id, reason);

        if self.instances.is_empty() && self.config().exit_when_empty && !self.is_exit_requested()
        {
            info!("all instances destroyed");
            self.exit();
        }

        result
    }

    // -------------------------------------------------------------------------
    // Bulk transitions
    // -------------------------------------------------------------------------

    /// Pauses every instance oldest first. Ready instances are resumed first.
    pub fn pause_all(&mut self, send_update: bool) {
        for id in self.ids() {
            let result = match self.instances.find_by_id(id.as_str()).map(|i| i.state()) {
                Some(InstanceState::Ready) => self
                    .resume_instance(id.as_str(), send_update)
                    .and_then(|()| self.pause_instance(id.as_str(), send_update)),
                Some(InstanceState::Running) => self.pause_instance(id.as_str(), send_update),
                _ => Ok(()),
            };
            if let Err(err) = result {
                warn!("pause of {} failed: {}", id, err);
            }
        }
    }

    /// Resumes every Ready or Paused instance oldest first.
    pub fn resume_all(&mut self, send_update: bool) {
        for id in self.ids() {
            let state = self.instances.find_by_id(id.as_str()).map(|i| i.state());
            if matches!(state, Some(InstanceState::Ready | InstanceState::Paused)) {
                if let Err(err) = self.resume_instance(id.as_str(), send_update) {
                    warn!("resume of {} failed: {}", id, err);
                }
            }
        }
    }

    /// Pauses then destroys every instance oldest first.
    pub fn destroy_all(&mut self, reason: DestroyReason, send_update: bool) {
        self.pause_all(send_update);
        for id in self.ids() {
            let state = self.instances.find_by_id(id.as_str()).map(|i| i.state());
            if state == Some(InstanceState::Paused) {
                if let Err(err) = self.destroy_instance(id.as_str(), reason, send_update) {
                    warn!("destroy of {} failed: {}", id, err);
                }
            }
        }
    }

    /// Runs a queued terminate request: pause locally, then destroy as
    /// temporary with reporting. A missing instance is a no-op.
    pub(crate) fn finish_instance(&mut self, id: &InstanceId) {
        let Some(state) = self.instances.find_by_id(id.as_str()).map(|i| i.state()) else {
            debug!("{} is already gone", id);
            return;
        };

        let result = match state {
            InstanceState::Ready => self
                .resume_instance(id.as_str(), false)
                .and_then(|()| self.pause_instance(id.as_str(), false))
                .and_then(|()| self.destroy_instance(id.as_str(), DestroyReason::Temporary, true)),
            InstanceState::Running => self
                .pause_instance(id.as_str(), false)
                .and_then(|()| self.destroy_instance(id.as_str(), DestroyReason::Temporary, true)),
            InstanceState::Paused => {
                self.destroy_instance(id.as_str(), DestroyReason::Temporary, true)
            }
            InstanceState::Terminated => Ok(()),
        };
        if let Err(err) = result {
            warn!("terminate of {} failed: {}", id, err);
        }
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn state_of(&self, id: &str, function: &str) -> Result<InstanceState> {
        self.instances
            .find_by_id(id)
            .map(WidgetInstance::state)
            .ok_or_else(|| {
                WidgetError::not_found(format!("context not found: {id}")).report(function)
            })
    }

    fn set_state(&mut self, id: &str, state: InstanceState) {
        if let Some(instance) = self.instances.find_by_id_mut(id) {
            instance.state = state;
        }
    }

    /// Calls a class hook with a context for the instance.
    fn invoke<R>(
        &mut self,
        id: &str,
        hook: impl FnOnce(&LifecycleCallbacks, &mut WidgetContext<'_>) -> R,
    ) -> Option<R> {
        let instance = self.instances.find_by_id_mut(id)?;
        let class = Rc::clone(instance.class());
        let mut cx = WidgetContext::new(instance, &mut self.platform, &mut self.commands);
        Some(hook(class.callbacks(), &mut cx))
    }

    /// Like [`invoke`](Self::invoke) for hooks without a result, returning
    /// the instance's class.
    fn run_hook(
        &mut self,
        id: &str,
        hook: impl FnOnce(&LifecycleCallbacks, &mut WidgetContext<'_>),
    ) -> Result<ClassHandle> {
        let class = self
            .instances
            .find_by_id(id)
            .map(|i| Rc::clone(i.class()))
            .ok_or_else(|| WidgetError::not_found(format!("context not found: {id}")))?;
        self.invoke(id, hook);
        Ok(class)
    }

    pub(crate) fn send_status(
        &mut self,
        class_id: &str,
        instance_id: &str,
        event: InstanceEvent,
        content: Option<String>,
        send_update: bool,
    ) -> Result<()> {
        if !send_update {
            trace!("local {:?} for {}", event, instance_id);
            return Ok(());
        }
        self.platform
            .status
            .send_update(class_id, instance_id, event, content)
    }

    fn release_surface(&mut self, instance: &WidgetInstance) {
        if let Some(surface) = instance.surface() {
            self.platform.surfaces.destroy_surface(surface);
        }
    }
}
