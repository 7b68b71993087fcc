//! Per-instance context handed to lifecycle callbacks.

use std::any::Any;
use std::collections::VecDeque;

use log::debug;

use crate::content::ContentInfo;
use crate::error::{Result, WidgetError};
use crate::instance::{InstanceId, InstanceState, WidgetInstance};
use crate::platform::{Platform, SurfaceId};
use crate::status::InstanceEvent;

/// Work a callback asks the runtime to do once control returns to the loop.
///
/// These commands are queued and processed by the runtime event loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Pause then destroy (temporary) one instance.
    Terminate(InstanceId),
    /// Request process exit.
    Exit,
}

/// View of one instance while a callback runs.
///
/// Anything that would re-enter the dispatcher (terminating the instance,
/// exiting the process) is queued instead of run in place.
pub struct WidgetContext<'a> {
    instance: &'a mut WidgetInstance,
    platform: &'a mut Platform,
    commands: &'a mut VecDeque<Command>,
}

impl<'a> WidgetContext<'a> {
    pub(crate) fn new(
        instance: &'a mut WidgetInstance,
        platform: &'a mut Platform,
        commands: &'a mut VecDeque<Command>,
    ) -> Self {
        Self {
            instance,
            platform,
            commands,
        }
    }

    pub fn id(&self) -> &InstanceId {
        self.instance.id()
    }

    pub fn class_id(&self) -> &str {
        self.instance.class_id()
    }

    pub fn state(&self) -> InstanceState {
        self.instance.state()
    }

    /// Last applied width and height.
    pub fn size(&self) -> (i32, i32) {
        self.instance.size()
    }

    /// User data of the owning class, if it is a `T`.
    pub fn class_data<T: Any>(&self) -> Option<&T> {
        self.instance.class().user_data::<T>()
    }

    // -------------------------------------------------------------------------
    // Tag
    // -------------------------------------------------------------------------

    pub fn tag<T: Any>(&self) -> Option<&T> {
        self.instance.tag::<T>()
    }

    pub fn tag_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.instance.tag.as_mut()?.downcast_mut::<T>()
    }

    /// Attaches an application value to the instance, replacing any previous one.
    pub fn set_tag<T: Any>(&mut self, tag: T) {
        self.instance.tag = Some(Box::new(tag));
    }

    // -------------------------------------------------------------------------
    // Content
    // -------------------------------------------------------------------------

    /// Last-known encoded content blob.
    pub fn content(&self) -> Option<&str> {
        self.instance.content()
    }

    /// Last-known content, decoded.
    pub fn content_info(&self) -> Option<ContentInfo> {
        ContentInfo::decode_lossy(self.instance.content())
    }

    /// Stores new content for the instance and reports it to the viewer.
    ///
    /// The content is kept even when the report cannot be delivered; that
    /// case surfaces as `IoError`.
    pub fn set_content_info(&mut self, info: &ContentInfo) -> Result<()> {
        let blob = info.encode()?;
        self.instance.content = Some(blob.clone());

        let class_id = self.instance.class_id().to_string();
        self.platform
            .status
            .send_update(
                &class_id,
                self.instance.id().as_str(),
                InstanceEvent::ExtraUpdated,
                Some(blob),
            )
            .map_err(|err| {
                WidgetError::io(format!(
                    "failed to send content info of {} ({}): {}",
                    self.instance.id(),
                    class_id,
                    err
                ))
                .report("set_content_info")
            })
    }

    // -------------------------------------------------------------------------
    // Surface
    // -------------------------------------------------------------------------

    /// Bound surface, if any.
    pub fn surface(&self) -> Option<SurfaceId> {
        self.instance.surface()
    }

    /// Returns the instance's surface, creating and binding one on first use.
    pub fn window(&mut self) -> Result<SurfaceId> {
        if let Some(surface) = self.instance.surface {
            return Ok(surface);
        }
        let surface = self
            .platform
            .surfaces
            .create_surface(self.instance.id())
            .map_err(|err| WidgetError::Fault(format!("failed to create window: {err}")))?;
        self.instance.surface = Some(surface);
        debug!("{} bound to {}", self.instance.id(), surface);
        Ok(surface)
    }

    /// Sets the title of the bound surface. Without a surface this does nothing.
    pub fn set_title(&mut self, title: &str) -> Result<()> {
        if title.is_empty() {
            return Err(WidgetError::invalid("title is empty"));
        }
        if let Some(surface) = self.instance.surface {
            self.platform.surfaces.set_title(surface, title);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Deferred requests
    // -------------------------------------------------------------------------

    /// Asks the runtime to terminate this instance once the callback returns.
    pub fn terminate(&mut self) {
        debug!("{} requested its own termination", self.instance.id());
        self.commands
            .push_back(Command::Terminate(self.instance.id().clone()));
    }

    /// Asks the runtime to exit the process.
    pub fn exit(&mut self) {
        self.commands.push_back(Command::Exit);
    }
}
