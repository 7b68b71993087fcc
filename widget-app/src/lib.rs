pub mod app;
pub mod class;
pub mod config;
pub mod content;
pub mod context;
pub mod error;
pub mod events;
pub mod instance;
pub mod platform;
pub mod router;
pub mod runtime;
pub mod status;

pub use app::{WidgetApp, WidgetApplication};
pub use config::AppConfig;
pub use error::{Result, WidgetError};
pub use runtime::Runtime;

pub mod prelude {
    pub use crate::app::{WidgetApp, WidgetApplication};
    pub use crate::class::{ClassHandle, ClassRegistry, DestroyReason, LifecycleCallbacks};
    pub use crate::config::AppConfig;
    pub use crate::content::ContentInfo;
    pub use crate::context::WidgetContext;
    pub use crate::error::{Result, WidgetError};
    pub use crate::events::{
        AppEvent, AppEventCallback, AppEventType, BatteryStatus, HandlerId, LowMemoryStatus,
        PowerOffStatus, SystemEvent,
    };
    pub use crate::instance::{InstanceId, InstanceState};
    pub use crate::platform::{
        Platform, SettingKey, StatusTransport, SurfaceId, SurfaceProvider, SystemSettings,
    };
    pub use crate::router::{Bundle, ControlMessage, HostEvent, LaunchSignal, Operation, SurfaceEvent};
    pub use crate::runtime::Runtime;
    pub use crate::status::{InstanceEvent, StatusReport};
}
