//! Widget classes: a class id bound to a lifecycle callback table.

mod callbacks;
mod registry;

use std::any::Any;
use std::fmt;
use std::rc::Rc;

pub use callbacks::{
    CreateHook, DestroyHook, DestroyReason, LifecycleCallbacks, ResizeHook, StateHook, UpdateHook,
};
pub use registry::ClassRegistry;

/// Shared, read-only handle to a registered class.
pub type ClassHandle = Rc<WidgetClass>;

/// A registered widget class.
pub struct WidgetClass {
    id: String,
    callbacks: LifecycleCallbacks,
    user_data: Option<Rc<dyn Any>>,
}

impl WidgetClass {
    pub(crate) fn new(
        id: impl Into<String>,
        callbacks: LifecycleCallbacks,
        user_data: Option<Rc<dyn Any>>,
    ) -> Self {
        Self {
            id: id.into(),
            callbacks,
            user_data,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn callbacks(&self) -> &LifecycleCallbacks {
        &self.callbacks
    }

    /// User data registered with the class, if it is a `T`.
    pub fn user_data<T: Any>(&self) -> Option<&T> {
        self.user_data.as_deref()?.downcast_ref::<T>()
    }
}

impl fmt::Debug for WidgetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidgetClass")
            .field("id", &self.id)
            .field("has_user_data", &self.user_data.is_some())
            .finish()
    }
}
