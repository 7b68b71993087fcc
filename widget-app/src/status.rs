//! Status reports sent upstream on every lifecycle transition.

use serde::{Deserialize, Serialize};

/// Channel that mirrors coarse lifecycle changes for the platform.
pub const LIFECYCLE_CHANNEL: &str = "widget.status";

/// Instance-level status code reported to the viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InstanceEvent {
    Create,
    Destroy,
    Pause,
    Resume,
    Update,
    SizeChanged,
    ExtraUpdated,
    Terminate,
    AppRestartRequest,
}

impl InstanceEvent {
    /// Integer code carried in the report.
    pub fn code(self) -> i32 {
        match self {
            Self::Create => 0,
            Self::Destroy => 1,
            Self::Pause => 2,
            Self::Resume => 3,
            Self::Update => 4,
            Self::SizeChanged => 6,
            Self::ExtraUpdated => 7,
            Self::Terminate => 9,
            Self::AppRestartRequest => 10,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Create),
            1 => Some(Self::Destroy),
            2 => Some(Self::Pause),
            3 => Some(Self::Resume),
            4 => Some(Self::Update),
            6 => Some(Self::SizeChanged),
            7 => Some(Self::ExtraUpdated),
            9 => Some(Self::Terminate),
            10 => Some(Self::AppRestartRequest),
            _ => None,
        }
    }

    /// The coarse lifecycle event mirrored on [`LIFECYCLE_CHANNEL`], if any.
    pub fn lifecycle(self) -> Option<LifecycleEvent> {
        match self {
            Self::Create => Some(LifecycleEvent::Create),
            Self::Destroy => Some(LifecycleEvent::Destroy),
            Self::Pause => Some(LifecycleEvent::Pause),
            Self::Resume => Some(LifecycleEvent::Resume),
            _ => None,
        }
    }
}

/// Coarse lifecycle status mirrored to the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LifecycleEvent {
    Create,
    Destroy,
    Pause,
    Resume,
}

impl LifecycleEvent {
    pub fn code(self) -> i32 {
        match self {
            Self::Create => 1,
            Self::Destroy => 2,
            Self::Pause => 3,
            Self::Resume => 4,
        }
    }
}

/// A single status report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    /// Class the instance belongs to. Absent for process-level reports.
    #[serde(rename = "class", default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    /// Instance the report is about. Absent for process-level reports.
    #[serde(rename = "instance", default, skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    /// Status code.
    pub status: i32,
    /// Encoded content blob, when relevant.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl StatusReport {
    /// Creates an instance-level report.
    pub fn instance(class_id: &str, instance_id: &str, event: InstanceEvent) -> Self {
        Self {
            class_id: Some(class_id.to_string()),
            instance_id: Some(instance_id.to_string()),
            status: event.code(),
            content: None,
        }
    }

    /// Creates the lifecycle mirror of a report.
    pub fn lifecycle(class_id: &str, instance_id: &str, event: LifecycleEvent) -> Self {
        Self {
            class_id: Some(class_id.to_string()),
            instance_id: Some(instance_id.to_string()),
            status: event.code(),
            content: None,
        }
    }

    /// Creates a process-level report with no instance attached.
    pub fn process(event: InstanceEvent) -> Self {
        Self {
            class_id: None,
            instance_id: None,
            status: event.code(),
            content: None,
        }
    }

    /// Attaches a content blob.
    pub fn with_content(mut self, content: Option<String>) -> Self {
        self.content = content;
        self
    }

    /// Decodes the status as an instance event.
    pub fn event(&self) -> Option<InstanceEvent> {
        InstanceEvent::from_code(self.status)
    }
}
