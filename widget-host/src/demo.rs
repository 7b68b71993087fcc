//! Clock widget served by the host binary.

use std::any::Any;
use std::rc::Rc;

use log::{debug, info};
use widget_app::prelude::*;

const KEY_TICKS: &str = "ticks";
const KEY_LABEL: &str = "label";

/// Per-instance state kept in the context tag.
#[derive(Debug, Default)]
struct Clock {
    ticks: u64,
}

/// A single-class application: a clock that counts update requests.
#[derive(Debug, Default)]
pub struct ClockApp;

impl WidgetApplication for ClockApp {
    fn create(&mut self, classes: &mut ClassRegistry) -> Result<()> {
        let callbacks = LifecycleCallbacks::new(create, destroy)
            .on_pause(|cx| debug!("{} paused", cx.id()))
            .on_resume(|cx| debug!("{} resumed", cx.id()))
            .on_resize(|cx, width, height| info!("{} resized to {}x{}", cx.id(), width, height))
            .on_update(update);

        let label: Rc<dyn Any> = Rc::new(String::from("clock"));
        classes.add_default(callbacks, Some(label))?;
        Ok(())
    }

    fn terminate(&mut self) {
        info!("clock application terminated");
    }
}

fn create(
    cx: &mut WidgetContext<'_>,
    content: Option<&ContentInfo>,
    width: i32,
    height: i32,
) -> Result<()> {
    let ticks = content
        .and_then(|c| c.get(KEY_TICKS))
        .and_then(|t| t.parse().ok())
        .unwrap_or(0);
    let label = cx
        .class_data::<String>()
        .cloned()
        .unwrap_or_else(|| "clock".to_string());

    let title = format!("{} {}", label, cx.id());
    cx.window()?;
    cx.set_title(&title)?;
    cx.set_tag(Clock { ticks });
    info!("{} created at {}x{} with {} ticks", cx.id(), width, height, ticks);
    Ok(())
}

fn update(cx: &mut WidgetContext<'_>, content: Option<&ContentInfo>, force: bool) {
    let Some(clock) = cx.tag_mut::<Clock>() else {
        return;
    };
    clock.ticks += 1;
    let ticks = clock.ticks;

    let mut info = ContentInfo::new().with(KEY_TICKS, ticks.to_string());
    if let Some(label) = content.and_then(|c| c.get(KEY_LABEL)) {
        info.insert(KEY_LABEL, label);
    }
    if let Err(err) = cx.set_content_info(&info) {
        log::warn!("{} could not publish content: {}", cx.id(), err);
    }
    debug!("{} tick {} (force: {})", cx.id(), ticks, force);
}

fn destroy(cx: &mut WidgetContext<'_>, reason: DestroyReason, content: &mut ContentInfo) {
    let ticks = cx.tag::<Clock>().map(|c| c.ticks).unwrap_or_default();
    content.insert(KEY_TICKS, ticks.to_string());
    info!("{} destroyed ({:?}) after {} ticks", cx.id(), reason, ticks);
}
