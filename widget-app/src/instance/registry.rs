//! Ordered registry of live instances.

use uuid::Uuid;

use crate::error::{Result, WidgetError};
use crate::platform::SurfaceId;

use super::{InstanceId, WidgetInstance};

/// Registry of live widget instances in insertion order.
///
/// Instance counts are small (single digits to low tens per process), so
/// lookups are linear scans. Terminated instances are removed, never kept
/// around flagged.
#[derive(Debug, Default)]
pub struct InstanceRegistry {
    instances: Vec<WidgetInstance>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instance. Fails if the id is already registered.
    pub fn add(&mut self, instance: WidgetInstance) -> Result<()> {
        if self.find_by_id(instance.id().as_str()).is_some() {
            return Err(WidgetError::AlreadyExists(format!(
                "instance {} is already registered",
                instance.id()
            )));
        }
        self.instances.push(instance);
        Ok(())
    }

    /// Removes the instance with the given record identity.
    ///
    /// Removing an absent record is a no-op.
    pub fn remove(&mut self, record: Uuid) -> Option<WidgetInstance> {
        let pos = self.instances.iter().position(|i| i.record() == record)?;
        Some(self.instances.remove(pos))
    }

    pub fn find_by_id(&self, id: &str) -> Option<&WidgetInstance> {
        self.instances.iter().find(|i| i.id().as_str() == id)
    }

    pub fn find_by_id_mut(&mut self, id: &str) -> Option<&mut WidgetInstance> {
        self.instances.iter_mut().find(|i| i.id().as_str() == id)
    }

    /// Finds the instance bound to a display surface.
    pub fn find_by_window(&self, surface: SurfaceId) -> Option<&WidgetInstance> {
        self.instances.iter().find(|i| i.surface() == Some(surface))
    }

    /// Ids of all live instances, oldest first.
    pub fn ids(&self) -> Vec<InstanceId> {
        self.instances.iter().map(|i| i.id().clone()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetInstance> {
        self.instances.iter()
    }

    /// Visits instances oldest first until `visit` returns false.
    pub fn for_each(&self, mut visit: impl FnMut(&WidgetInstance) -> bool) {
        for instance in &self.instances {
            if !visit(instance) {
                break;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}
