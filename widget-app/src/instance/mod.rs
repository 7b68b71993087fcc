//! Widget instance records and their registry.

mod registry;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::class::WidgetClass;
use crate::platform::SurfaceId;

pub use registry::InstanceRegistry;

/// Host-assigned identifier of a widget instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InstanceId(String);

impl InstanceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for InstanceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for InstanceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for InstanceId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Lifecycle state of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstanceState {
    /// Created, not yet shown.
    Ready,
    /// Visible.
    Running,
    /// Hidden or fully obscured.
    Paused,
    /// Destroyed. Absorbing.
    Terminated,
}

/// A live widget instance.
pub struct WidgetInstance {
    /// Record identity, distinct from the host-assigned id.
    record: Uuid,
    id: InstanceId,
    class: Rc<WidgetClass>,
    pub(crate) state: InstanceState,
    pub(crate) tag: Option<Box<dyn Any>>,
    pub(crate) surface: Option<SurfaceId>,
    pub(crate) content: Option<String>,
    pub(crate) size: (i32, i32),
}

impl WidgetInstance {
    pub(crate) fn new(
        id: InstanceId,
        class: Rc<WidgetClass>,
        content: Option<String>,
        size: (i32, i32),
    ) -> Self {
        Self {
            record: Uuid::new_v4(),
            id,
            class,
            state: InstanceState::Ready,
            tag: None,
            surface: None,
            content,
            size,
        }
    }

    pub fn record(&self) -> Uuid {
        self.record
    }

    pub fn id(&self) -> &InstanceId {
        &self.id
    }

    /// The class that drives this instance.
    pub fn class(&self) -> &Rc<WidgetClass> {
        &self.class
    }

    pub fn class_id(&self) -> &str {
        self.class.id()
    }

    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Bound display surface, if the application requested one.
    pub fn surface(&self) -> Option<SurfaceId> {
        self.surface
    }

    /// Last-known encoded content blob.
    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    /// Last applied width and height.
    pub fn size(&self) -> (i32, i32) {
        self.size
    }

    /// Application tag, if one of type `T` was set.
    pub fn tag<T: Any>(&self) -> Option<&T> {
        self.tag.as_ref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for WidgetInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetInstance")
            .field("id", &self.id)
            .field("class", &self.class.id())
            .field("state", &self.state)
            .field("surface", &self.surface)
            .field("size", &self.size)
            .field("has_tag", &self.tag.is_some())
            .field("has_content", &self.content.is_some())
            .finish()
    }
}
