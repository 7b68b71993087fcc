//! Registry of widget classes provided by the application.

use std::any::Any;
use std::rc::Rc;

use log::debug;

use crate::error::{Result, WidgetError};

use super::{ClassHandle, LifecycleCallbacks, WidgetClass};

/// Classes registered by the application, most recent first.
///
/// Built once while the application's `create` hook runs and dropped with
/// the application context. Class ids are unique: registering an id twice
/// is rejected rather than letting the newer class shadow the older one.
#[derive(Debug)]
pub struct ClassRegistry {
    app_id: String,
    classes: Vec<ClassHandle>,
}

impl ClassRegistry {
    /// Creates an empty registry for the given application id.
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
            classes: Vec::new(),
        }
    }

    /// The application id, used as the default class id.
    pub fn app_id(&self) -> &str {
        &self.app_id
    }

    /// Registers a class.
    ///
    /// Fails with `InvalidParameter` for an empty id and `AlreadyExists`
    /// when the id is taken.
    pub fn add(
        &mut self,
        class_id: &str,
        callbacks: LifecycleCallbacks,
        user_data: Option<Rc<dyn Any>>,
    ) -> Result<ClassHandle> {
        if class_id.is_empty() {
            return Err(WidgetError::invalid("class id is empty").report("add_class"));
        }
        if self.find(class_id).is_some() {
            return Err(
                WidgetError::AlreadyExists(format!("class {class_id} is already registered"))
                    .report("add_class"),
            );
        }

        let class = Rc::new(WidgetClass::new(class_id, callbacks, user_data));
        self.classes.insert(0, Rc::clone(&class));
        debug!("registered widget class {}", class_id);
        Ok(class)
    }

    /// Registers a class under the application id.
    pub fn add_default(
        &mut self,
        callbacks: LifecycleCallbacks,
        user_data: Option<Rc<dyn Any>>,
    ) -> Result<ClassHandle> {
        let app_id = self.app_id.clone();
        self.add(&app_id, callbacks, user_data)
    }

    /// Finds a class by exact id, most recently registered first.
    pub fn find(&self, class_id: &str) -> Option<ClassHandle> {
        self.classes.iter().find(|c| c.id() == class_id).cloned()
    }

    /// Iterates classes, most recently registered first.
    pub fn iter(&self) -> impl Iterator<Item = &ClassHandle> {
        self.classes.iter()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}
