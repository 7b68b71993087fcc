//! Per-class lifecycle callback table.

use crate::content::ContentInfo;
use crate::context::WidgetContext;
use crate::error::Result;

/// Why an instance is being destroyed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestroyReason {
    /// The viewer removed the widget for good.
    Permanent,
    /// The instance goes away but may be recreated from its content.
    Temporary,
}

impl DestroyReason {
    pub fn code(self) -> i32 {
        match self {
            Self::Permanent => 0,
            Self::Temporary => 1,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            0 => Some(Self::Permanent),
            1 => Some(Self::Temporary),
            _ => None,
        }
    }
}

/// Called after an instance record is created. An error rolls the creation back.
pub type CreateHook =
    Box<dyn Fn(&mut WidgetContext<'_>, Option<&ContentInfo>, i32, i32) -> Result<()>>;
/// Called before an instance is removed, with its last-known content.
///
/// Entries written to the bundle during a temporary destroy are reported to
/// the viewer so it can recreate the instance later.
pub type DestroyHook = Box<dyn Fn(&mut WidgetContext<'_>, DestroyReason, &mut ContentInfo)>;
/// Called on pause or resume.
pub type StateHook = Box<dyn Fn(&mut WidgetContext<'_>)>;
/// Called with the new width and height.
pub type ResizeHook = Box<dyn Fn(&mut WidgetContext<'_>, i32, i32)>;
/// Called with the update payload and the force flag.
pub type UpdateHook = Box<dyn Fn(&mut WidgetContext<'_>, Option<&ContentInfo>, bool)>;

/// Lifecycle hooks for one widget class.
///
/// `create` and `destroy` are mandatory. The other hooks are optional: when
/// one is absent the transition still happens and is still reported, the
/// application just isn't told.
///
/// # Example
///
/// ```ignore
/// let callbacks = LifecycleCallbacks::new(
///     |cx, content, w, h| {
///         cx.window()?;
///         Ok(())
///     },
///     |_cx, _reason, _content| {},
/// )
/// .on_resize(|cx, w, h| log::info!("{} is now {}x{}", cx.id(), w, h));
/// ```
pub struct LifecycleCallbacks {
    create: CreateHook,
    destroy: DestroyHook,
    pause: Option<StateHook>,
    resume: Option<StateHook>,
    resize: Option<ResizeHook>,
    update: Option<UpdateHook>,
}

impl LifecycleCallbacks {
    /// Creates a table with the two mandatory hooks.
    pub fn new(
        create: impl Fn(&mut WidgetContext<'_>, Option<&ContentInfo>, i32, i32) -> Result<()> + 'static,
        destroy: impl Fn(&mut WidgetContext<'_>, DestroyReason, &mut ContentInfo) + 'static,
    ) -> Self {
        Self {
            create: Box::new(create),
            destroy: Box::new(destroy),
            pause: None,
            resume: None,
            resize: None,
            update: None,
        }
    }

    pub fn on_pause(mut self, hook: impl Fn(&mut WidgetContext<'_>) + 'static) -> Self {
        self.pause = Some(Box::new(hook));
        self
    }

    pub fn on_resume(mut self, hook: impl Fn(&mut WidgetContext<'_>) + 'static) -> Self {
        self.resume = Some(Box::new(hook));
        self
    }

    pub fn on_resize(mut self, hook: impl Fn(&mut WidgetContext<'_>, i32, i32) + 'static) -> Self {
        self.resize = Some(Box::new(hook));
        self
    }

    pub fn on_update(
        mut self,
        hook: impl Fn(&mut WidgetContext<'_>, Option<&ContentInfo>, bool) + 'static,
    ) -> Self {
        self.update = Some(Box::new(hook));
        self
    }

    pub(crate) fn call_create(
        &self,
        cx: &mut WidgetContext<'_>,
        content: Option<&ContentInfo>,
        width: i32,
        height: i32,
    ) -> Result<()> {
        (self.create)(cx, content, width, height)
    }

    pub(crate) fn call_destroy(
        &self,
        cx: &mut WidgetContext<'_>,
        reason: DestroyReason,
        content: &mut ContentInfo,
    ) {
        (self.destroy)(cx, reason, content);
    }

    pub(crate) fn call_pause(&self, cx: &mut WidgetContext<'_>) {
        if let Some(hook) = &self.pause {
            hook(cx);
        }
    }

    pub(crate) fn call_resume(&self, cx: &mut WidgetContext<'_>) {
        if let Some(hook) = &self.resume {
            hook(cx);
        }
    }

    pub(crate) fn call_resize(&self, cx: &mut WidgetContext<'_>, width: i32, height: i32) {
        if let Some(hook) = &self.resize {
            hook(cx, width, height);
        }
    }

    pub(crate) fn call_update(
        &self,
        cx: &mut WidgetContext<'_>,
        content: Option<&ContentInfo>,
        force: bool,
    ) {
        if let Some(hook) = &self.update {
            hook(cx, content, force);
        }
    }

    /// Whether an update hook is installed.
    pub fn has_update(&self) -> bool {
        self.update.is_some()
    }
}
