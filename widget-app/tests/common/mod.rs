//! Shared fixtures: recording platform bindings and a probe widget class.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use widget_app::prelude::*;
use widget_app::status::LIFECYCLE_CHANNEL;

pub const APP_ID: &str = "com.example.app";
pub const CLASS: &str = "com.example.widget";
pub const VIEWER: &str = "com.example.viewer";

// =============================================================================
// Recording bindings
// =============================================================================

/// Every report sent, with the endpoint it went to.
#[derive(Clone, Default)]
pub struct Sent {
    pub reports: Rc<RefCell<Vec<(String, StatusReport)>>>,
    pub fail: Rc<Cell<bool>>,
}

impl StatusTransport for Sent {
    fn send(&mut self, endpoint: &str, report: &StatusReport) -> Result<()> {
        if self.fail.get() {
            return Err(WidgetError::io("transport is down"));
        }
        self.reports
            .borrow_mut()
            .push((endpoint.to_string(), report.clone()));
        Ok(())
    }
}

/// Watch/unwatch calls and applied locale settings.
#[derive(Clone, Default)]
pub struct Settings {
    pub log: Rc<RefCell<Vec<String>>>,
}

impl SystemSettings for Settings {
    fn watch(&mut self, key: SettingKey) {
        self.log.borrow_mut().push(format!("watch:{key:?}"));
    }

    fn unwatch(&mut self, key: SettingKey) {
        self.log.borrow_mut().push(format!("unwatch:{key:?}"));
    }

    fn apply_language(&mut self, locale: &str) {
        self.log.borrow_mut().push(format!("language:{locale}"));
    }

    fn apply_region(&mut self, region: &str) {
        self.log.borrow_mut().push(format!("region:{region}"));
    }
}

// =============================================================================
// Probe class
// =============================================================================

pub type Calls = Rc<RefCell<Vec<String>>>;

/// Callbacks that record every invocation as `hook:instance[:detail]`.
///
/// Content keys steer the create hook: `fail` makes it fail, `window` makes
/// it bind a surface. The destroy hook stores `saved=<instance>` in the
/// bundle it is handed.
pub fn probe(calls: &Calls) -> LifecycleCallbacks {
    let create = Rc::clone(calls);
    let destroy = Rc::clone(calls);
    let pause = Rc::clone(calls);
    let resume = Rc::clone(calls);
    let resize = Rc::clone(calls);
    let update = Rc::clone(calls);

    LifecycleCallbacks::new(
        move |cx, content, w, h| {
            create
                .borrow_mut()
                .push(format!("create:{}:{}x{}", cx.id(), w, h));
            if let Some(content) = content {
                if content.get("fail").is_some() {
                    return Err(WidgetError::Fault("refused".into()));
                }
                if content.get("window").is_some() {
                    cx.window()?;
                }
            }
            Ok(())
        },
        move |cx, reason, content| {
            destroy
                .borrow_mut()
                .push(format!("destroy:{}:{:?}", cx.id(), reason));
            content.insert("saved", cx.id().as_str());
        },
    )
    .on_pause(move |cx| pause.borrow_mut().push(format!("pause:{}", cx.id())))
    .on_resume(move |cx| resume.borrow_mut().push(format!("resume:{}", cx.id())))
    .on_resize(move |cx, w, h| {
        resize
            .borrow_mut()
            .push(format!("resize:{}:{}x{}", cx.id(), w, h))
    })
    .on_update(move |cx, content, force| {
        let detail = content.and_then(|c| c.get("temp")).unwrap_or("-");
        update
            .borrow_mut()
            .push(format!("update:{}:{}:{}", cx.id(), detail, force))
    })
}

/// Application registering the probe class (and optionally a bare second
/// class with only the mandatory hooks).
pub struct ProbeApp {
    pub calls: Calls,
    pub terminated: Rc<Cell<bool>>,
    pub with_bare_class: bool,
    pub register_nothing: bool,
}

impl WidgetApplication for ProbeApp {
    fn create(&mut self, classes: &mut ClassRegistry) -> Result<()> {
        if self.register_nothing {
            return Ok(());
        }
        classes.add(CLASS, probe(&self.calls), Some(Rc::new("probe")))?;
        if self.with_bare_class {
            let calls = Rc::clone(&self.calls);
            classes.add_default(
                LifecycleCallbacks::new(
                    move |cx, _, _, _| {
                        calls.borrow_mut().push(format!("create:{}:bare", cx.id()));
                        Ok(())
                    },
                    |_, _, _| {},
                ),
                None,
            )?;
        }
        Ok(())
    }

    fn terminate(&mut self) {
        self.calls.borrow_mut().push("terminate".to_string());
        self.terminated.set(true);
    }
}

// =============================================================================
// Harness
// =============================================================================

pub struct Harness {
    pub app: WidgetApp,
    pub sent: Sent,
    pub settings: Settings,
    pub calls: Calls,
    pub terminated: Rc<Cell<bool>>,
}

impl Harness {
    /// A started app with the probe class and a viewer endpoint.
    pub fn new() -> Self {
        Self::build(AppConfig::new(APP_ID).with_viewer_endpoint(VIEWER), false)
    }

    /// Same as [`new`](Self::new), plus a bare default class.
    pub fn with_bare_class() -> Self {
        Self::build(AppConfig::new(APP_ID).with_viewer_endpoint(VIEWER), true)
    }

    pub fn with_config(config: AppConfig) -> Self {
        Self::build(config, false)
    }

    fn build(config: AppConfig, with_bare_class: bool) -> Self {
        let mut harness = Self::unstarted(config, with_bare_class);
        harness.app.start().expect("start");
        harness
    }

    pub fn unstarted(config: AppConfig, with_bare_class: bool) -> Self {
        let sent = Sent::default();
        let settings = Settings::default();
        let calls = Calls::default();
        let terminated = Rc::new(Cell::new(false));

        let application = ProbeApp {
            calls: Rc::clone(&calls),
            terminated: Rc::clone(&terminated),
            with_bare_class,
            register_nothing: false,
        };
        let platform = Platform::new(sent.clone()).with_settings(settings.clone());
        let app = WidgetApp::new(config, application, platform);

        Self {
            app,
            sent,
            settings,
            calls,
            terminated,
        }
    }

    /// Routes a control message through the launch path.
    pub fn control(&mut self, message: ControlMessage) -> Result<()> {
        self.app
            .route(HostEvent::Launch(LaunchSignal::Start(message.to_bundle())))
    }

    pub fn create(&mut self, id: &str) {
        self.control(
            ControlMessage::new(Operation::Create)
                .class(CLASS)
                .instance(id)
                .size(200, 200),
        )
        .expect("create");
    }

    /// Creates an instance whose create hook binds a surface.
    pub fn create_with_window(&mut self, id: &str) -> SurfaceId {
        let content = ContentInfo::new().with("window", "yes").encode().unwrap();
        self.control(
            ControlMessage::new(Operation::Create)
                .class(CLASS)
                .instance(id)
                .size(200, 200)
                .content(content),
        )
        .expect("create");
        self.app
            .instances()
            .find_by_id(id)
            .and_then(|i| i.surface())
            .expect("bound surface")
    }

    pub fn op(&mut self, operation: Operation, id: &str) -> Result<()> {
        self.control(ControlMessage::new(operation).class(CLASS).instance(id))
    }

    pub fn state(&self, id: &str) -> Option<InstanceState> {
        self.app.instances().find_by_id(id).map(|i| i.state())
    }

    /// `(instance, status)` of reports sent to the viewer.
    pub fn viewer(&self) -> Vec<(String, i32)> {
        self.reports_to(VIEWER)
            .into_iter()
            .map(|r| (r.instance_id.unwrap_or_default(), r.status))
            .collect()
    }

    /// `(instance, status)` of lifecycle mirror reports.
    pub fn lifecycle(&self) -> Vec<(String, i32)> {
        self.reports_to(LIFECYCLE_CHANNEL)
            .into_iter()
            .map(|r| (r.instance_id.unwrap_or_default(), r.status))
            .collect()
    }

    pub fn reports_to(&self, endpoint: &str) -> Vec<StatusReport> {
        self.sent
            .reports
            .borrow()
            .iter()
            .filter(|(to, _)| to == endpoint)
            .map(|(_, report)| report.clone())
            .collect()
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    pub fn settings_log(&self) -> Vec<String> {
        self.settings.log.borrow().clone()
    }

    /// Forgets everything recorded so far.
    pub fn reset(&self) {
        self.sent.reports.borrow_mut().clear();
        self.calls.borrow_mut().clear();
        self.settings.log.borrow_mut().clear();
    }
}

/// Status code of an instance event.
pub fn code(event: InstanceEvent) -> i32 {
    event.code()
}
