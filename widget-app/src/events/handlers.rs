//! Subscription table for application event handlers.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::{debug, trace};
use uuid::Uuid;

use crate::error::{Result, WidgetError};
use crate::platform::SettingWatches;

use super::{AppEvent, AppEventType};

/// Application event handler. Identity (not behaviour) distinguishes handlers.
pub type AppEventCallback = Rc<dyn Fn(&AppEvent, Option<&dyn Any>)>;

/// Opaque handle of a subscription.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct HandlerId(Uuid);

impl HandlerId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

struct Registration {
    id: HandlerId,
    callback: AppEventCallback,
    user_data: Option<Rc<dyn Any>>,
}

/// Per-type listener lists.
///
/// The platform watch for a type is held while the type has at least one
/// listener. Listeners of one type are called in registration order.
#[derive(Default)]
pub struct EventHandlerTable {
    lists: HashMap<AppEventType, Vec<Registration>>,
}

impl EventHandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a listener.
    ///
    /// Fails with `InvalidParameter` for device orientation and when the
    /// same callback is already registered for the type.
    pub fn subscribe(
        &mut self,
        watches: &mut SettingWatches,
        event_type: AppEventType,
        callback: AppEventCallback,
        user_data: Option<Rc<dyn Any>>,
    ) -> Result<HandlerId> {
        let Some(key) = event_type.setting_key() else {
            return Err(WidgetError::invalid(format!(
                "{event_type:?} is not delivered to widget applications"
            ))
            .report("add_event_handler"));
        };

        let list = self.lists.entry(event_type).or_default();
        if list
            .iter()
            .any(|r| std::ptr::addr_eq(Rc::as_ptr(&r.callback), Rc::as_ptr(&callback)))
        {
            return Err(WidgetError::invalid(format!(
                "callback is already registered for {event_type:?}"
            ))
            .report("add_event_handler"));
        }

        if list.is_empty() {
            watches.acquire(key);
        }

        let id = HandlerId::new();
        list.push(Registration {
            id,
            callback,
            user_data,
        });
        debug!("subscribed {} to {:?}", id, event_type);
        Ok(id)
    }

    /// Removes a listener. Fails with `InvalidParameter` for an unknown handle.
    pub fn unsubscribe(&mut self, watches: &mut SettingWatches, id: HandlerId) -> Result<()> {
        let found = self.lists.iter_mut().find_map(|(event_type, list)| {
            let pos = list.iter().position(|r| r.id == id)?;
            list.remove(pos);
            Some((*event_type, list.is_empty()))
        });

        let Some((event_type, now_empty)) = found else {
            return Err(
                WidgetError::invalid(format!("unknown event handler {id}"))
                    .report("remove_event_handler"),
            );
        };

        if now_empty {
            self.lists.remove(&event_type);
            if let Some(key) = event_type.setting_key() {
                watches.release(key);
            }
        }
        debug!("unsubscribed {} from {:?}", id, event_type);
        Ok(())
    }

    /// Delivers an event to every listener of its type.
    ///
    /// Returns the number of listeners called; an event nobody listens to is
    /// dropped.
    pub fn dispatch(&self, event: &AppEvent) -> usize {
        let Some(list) = self.lists.get(&event.event_type()) else {
            trace!("no listeners for {:?}; dropped", event.event_type());
            return 0;
        };

        // Snapshot so a listener list is stable for the whole fan-out.
        let listeners: Vec<_> = list
            .iter()
            .map(|r| (Rc::clone(&r.callback), r.user_data.clone()))
            .collect();
        for (callback, user_data) in &listeners {
            callback(event, user_data.as_deref());
        }
        listeners.len()
    }

    pub fn listener_count(&self, event_type: AppEventType) -> usize {
        self.lists.get(&event_type).map_or(0, Vec::len)
    }

    /// Drops every listener and releases the watches they held.
    pub fn clear(&mut self, watches: &mut SettingWatches) {
        for (event_type, _) in self.lists.drain() {
            if let Some(key) = event_type.setting_key() {
                watches.release(key);
            }
        }
    }
}
