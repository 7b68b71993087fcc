//! Tests for instance lifecycle transitions and their status reports.

mod common;

use common::*;
use widget_app::platform::SettingWatches;
use widget_app::prelude::*;

const CREATE: i32 = 0;
const DESTROY: i32 = 1;
const PAUSE: i32 = 2;
const RESUME: i32 = 3;
const UPDATE: i32 = 4;
const SIZE_CHANGED: i32 = 6;
const EXTRA_UPDATED: i32 = 7;
const TERMINATE: i32 = 9;

fn pair(id: &str, status: i32) -> (String, i32) {
    (id.to_string(), status)
}

#[test]
fn test_status_codes() {
    assert_eq!(code(InstanceEvent::Create), CREATE);
    assert_eq!(code(InstanceEvent::Destroy), DESTROY);
    assert_eq!(code(InstanceEvent::SizeChanged), SIZE_CHANGED);
    assert_eq!(code(InstanceEvent::Terminate), TERMINATE);
    assert_eq!(code(InstanceEvent::AppRestartRequest), 10);
}

#[test]
fn test_create_reports_once() {
    let mut h = Harness::new();
    h.create("w1");

    assert_eq!(h.state("w1"), Some(InstanceState::Ready));
    assert_eq!(h.calls(), ["create:w1:200x200"]);
    assert_eq!(h.viewer(), [pair("w1", CREATE)]);
    assert_eq!(h.lifecycle(), [pair("w1", 1)]);

    let report = &h.reports_to(VIEWER)[0];
    assert_eq!(report.class_id.as_deref(), Some(CLASS));
    assert_eq!(report.event(), Some(InstanceEvent::Create));
}

#[test]
fn test_create_stores_content_and_size() {
    let mut h = Harness::new();
    let blob = ContentInfo::new().with("city", "Seoul").encode().unwrap();
    h.control(
        ControlMessage::new(Operation::Create)
            .class(CLASS)
            .instance("w1")
            .size(320, 160)
            .content(blob.clone()),
    )
    .unwrap();

    let instance = h.app.instances().find_by_id("w1").unwrap();
    assert_eq!(instance.content(), Some(blob.as_str()));
    assert_eq!(instance.size(), (320, 160));
    assert_eq!(instance.class().user_data::<&str>(), Some(&"probe"));
}

#[test]
fn test_failed_create_rolls_back() {
    let mut h = Harness::new();
    let blob = ContentInfo::new().with("fail", "yes").encode().unwrap();
    let err = h
        .control(
            ControlMessage::new(Operation::Create)
                .class(CLASS)
                .instance("w1")
                .content(blob),
        )
        .unwrap_err();

    assert!(matches!(err, WidgetError::Fault(_)));
    assert!(h.app.instances().is_empty());
    assert!(h.viewer().is_empty());
    assert!(!h.app.is_exit_requested());
}

#[test]
fn test_duplicate_instance_id_is_rejected() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    let err = h
        .control(ControlMessage::new(Operation::Create).class(CLASS).instance("w1"))
        .unwrap_err();
    assert!(matches!(err, WidgetError::AlreadyExists(_)));
    assert!(h.calls().is_empty());
    assert_eq!(h.app.instances().len(), 1);
}

#[test]
fn test_pause_then_resume() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    h.op(Operation::Pause, "w1").unwrap();
    h.op(Operation::Resume, "w1").unwrap();

    assert_eq!(h.state("w1"), Some(InstanceState::Running));
    assert_eq!(h.calls(), ["pause:w1", "resume:w1"]);
    assert_eq!(h.viewer(), [pair("w1", PAUSE), pair("w1", RESUME)]);
    assert_eq!(h.lifecycle(), [pair("w1", 3), pair("w1", 4)]);
}

#[test]
fn test_repeated_transitions_are_idempotent() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    h.op(Operation::Resume, "w1").unwrap();
    h.op(Operation::Resume, "w1").unwrap();
    h.op(Operation::Pause, "w1").unwrap();
    h.op(Operation::Pause, "w1").unwrap();

    assert_eq!(h.state("w1"), Some(InstanceState::Paused));
    assert_eq!(h.calls(), ["resume:w1", "pause:w1"]);
    assert_eq!(h.viewer(), [pair("w1", RESUME), pair("w1", PAUSE)]);
}

#[test]
fn test_state_follows_last_event() {
    let mut h = Harness::new();
    h.create("w1");

    let script = [
        (Operation::Pause, InstanceState::Paused),
        (Operation::Resume, InstanceState::Running),
        (Operation::Resume, InstanceState::Running),
        (Operation::Pause, InstanceState::Paused),
        (Operation::Resume, InstanceState::Running),
    ];
    for (operation, expected) in script {
        h.op(operation, "w1").unwrap();
        assert_eq!(h.state("w1"), Some(expected));
    }
}

#[test]
fn test_unknown_instance_is_not_found() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    for operation in [Operation::Pause, Operation::Resume, Operation::Resize] {
        let err = h.op(operation, "ghost").unwrap_err();
        assert!(matches!(err, WidgetError::NotFound(_)), "{operation}: {err}");
    }
    let err = h
        .control(
            ControlMessage::new(Operation::Update)
                .class(CLASS)
                .instance("ghost"),
        )
        .unwrap_err();
    assert!(matches!(err, WidgetError::NotFound(_)));

    assert!(h.app.instances().find_by_id("ghost").is_none());
    assert_eq!(h.app.instances().len(), 1);
    assert!(h.calls().is_empty());
    assert!(h.viewer().is_empty());
}

#[test]
fn test_destroy_unknown_instance() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    let err = h.op(Operation::Destroy, "unknown-id").unwrap_err();
    assert!(matches!(err, WidgetError::InvalidParameter(_)));
    assert!(h.calls().is_empty());
    assert_eq!(h.app.instances().ids(), [InstanceId::new("w1")]);
}

#[test]
fn test_resize_reports_size_changed() {
    let mut h = Harness::new();
    h.create("w1");
    h.reset();

    h.control(
        ControlMessage::new(Operation::Resize)
            .class(CLASS)
            .instance("w1")
            .size(400, 100),
    )
    .unwrap();

    assert_eq!(h.state("w1"), Some(InstanceState::Ready));
    assert_eq!(h.calls(), ["resize:w1:400x100"]);
    assert_eq!(h.viewer(), [pair("w1", SIZE_CHANGED)]);
    assert!(h.lifecycle().is_empty());
    assert_eq!(h.app.instances().find_by_id("w1").unwrap().size(), (400, 100));
}

#[test]
fn test_update_without_instance_fans_out() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.reset();

    let blob = ContentInfo::new().with("temp", "21").encode().unwrap();
    h.control(
        ControlMessage::new(Operation::Update)
            .class(CLASS)
            .content(blob)
            .force(true),
    )
    .unwrap();

    assert_eq!(h.calls(), ["update:w1:21:true", "update:w2:21:true"]);
    assert_eq!(h.viewer(), [pair("w1", UPDATE), pair("w2", UPDATE)]);
}

#[test]
fn test_update_fan_out_uses_each_class() {
    let mut h = Harness::with_bare_class();
    h.create("w1");
    h.control(ControlMessage::new(Operation::Create).instance("b1"))
        .unwrap();
    h.reset();

    h.control(ControlMessage::new(Operation::Update)).unwrap();

    // The bare class has no update hook but is still reported.
    assert_eq!(h.calls(), ["update:w1:-:false"]);
    assert_eq!(h.viewer(), [pair("w1", UPDATE), pair("b1", UPDATE)]);
}

#[test]
fn test_missing_class_defaults_to_app_id() {
    let mut h = Harness::with_bare_class();
    h.control(ControlMessage::new(Operation::Create).instance("b1"))
        .unwrap();

    assert_eq!(h.calls(), ["create:b1:bare"]);
    let instance = h.app.instances().find_by_id("b1").unwrap();
    assert_eq!(instance.class_id(), APP_ID);
}

#[test]
fn test_temporary_destroy_reports_content() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.reset();

    h.op(Operation::Terminate, "w1").unwrap();

    assert_eq!(h.calls(), ["destroy:w1:Temporary"]);
    assert_eq!(h.viewer(), [pair("w1", EXTRA_UPDATED), pair("w1", TERMINATE)]);
    assert!(h.lifecycle().is_empty());

    let extra = &h.reports_to(VIEWER)[0];
    let content = ContentInfo::decode(extra.content.as_deref().unwrap()).unwrap();
    assert_eq!(content.get("saved"), Some("w1"));
    assert!(h.app.instances().find_by_id("w1").is_none());
}

#[test]
fn test_permanent_destroy() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.reset();

    h.op(Operation::Destroy, "w1").unwrap();

    assert_eq!(h.calls(), ["destroy:w1:Permanent"]);
    assert_eq!(h.viewer(), [pair("w1", DESTROY)]);
    assert_eq!(h.lifecycle(), [pair("w1", 2)]);
    assert!(h.app.instances().find_by_id("w1").is_none());
    assert!(!h.app.is_exit_requested());
}

#[test]
fn test_destroy_honours_reason_field() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.reset();

    h.control(
        ControlMessage::new(Operation::Destroy)
            .class(CLASS)
            .instance("w1")
            .reason(DestroyReason::Temporary),
    )
    .unwrap();

    assert_eq!(h.calls(), ["destroy:w1:Temporary"]);
}

#[test]
fn test_destroyed_instance_is_gone_from_lookups() {
    let mut h = Harness::new();
    let surface = h.create_with_window("w1");
    h.create("w2");

    h.op(Operation::Destroy, "w1").unwrap();

    assert!(h.app.instances().find_by_id("w1").is_none());
    assert!(h.app.instances().find_by_window(surface).is_none());
    assert!(h.app.instances().iter().all(|i| i.state() != InstanceState::Terminated));
}

#[test]
fn test_last_destroy_requests_exit_once() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");

    h.op(Operation::Destroy, "w1").unwrap();
    assert!(!h.app.is_exit_requested());

    h.op(Operation::Destroy, "w2").unwrap();
    assert!(h.app.is_exit_requested());
    assert!(!h.app.exit(), "a second exit request must be a no-op");
}

#[test]
fn test_keep_alive_when_empty() {
    let mut h = Harness::with_config(
        AppConfig::new(APP_ID)
            .with_viewer_endpoint(VIEWER)
            .keep_alive_when_empty(),
    );
    h.create("w1");
    h.op(Operation::Destroy, "w1").unwrap();

    assert!(h.app.instances().is_empty());
    assert!(!h.app.is_exit_requested());
}

#[test]
fn test_missing_endpoint_is_io_error() {
    let mut h = Harness::with_config(AppConfig::new(APP_ID));
    let err = h
        .control(ControlMessage::new(Operation::Create).class(CLASS).instance("w1"))
        .unwrap_err();

    // The transition happened; only the report failed.
    assert!(matches!(err, WidgetError::IoError(_)));
    assert_eq!(h.state("w1"), Some(InstanceState::Ready));
}

#[test]
fn test_endpoint_from_control_message() {
    let mut h = Harness::with_config(AppConfig::new(APP_ID));
    h.control(
        ControlMessage::new(Operation::Create)
            .class(CLASS)
            .instance("w1")
            .endpoint(VIEWER),
    )
    .unwrap();

    assert_eq!(h.app.platform().status.endpoint(), Some(VIEWER));
    assert_eq!(h.viewer(), [pair("w1", CREATE)]);
}

#[test]
fn test_set_content_info_is_reported_and_kept() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.reset();

    let info = ContentInfo::new().with("city", "Busan");
    h.app
        .with_context("w1", |cx| cx.set_content_info(&info))
        .unwrap()
        .unwrap();

    let reports = h.reports_to(VIEWER);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status, EXTRA_UPDATED);
    assert_eq!(reports[0].content.as_deref(), Some(info.encode().unwrap().as_str()));

    // The stored content is what a later temporary destroy starts from.
    h.reset();
    h.op(Operation::Terminate, "w1").unwrap();
    let extra = &h.reports_to(VIEWER)[0];
    let content = ContentInfo::decode(extra.content.as_deref().unwrap()).unwrap();
    assert_eq!(content.get("city"), Some("Busan"));
    assert_eq!(content.get("saved"), Some("w1"));
}

#[test]
fn test_set_content_info_keeps_blob_when_send_fails() {
    let mut h = Harness::new();
    h.create("w1");
    h.sent.fail.set(true);

    let info = ContentInfo::new().with("k", "v");
    let err = h
        .app
        .with_context("w1", |cx| cx.set_content_info(&info))
        .unwrap()
        .unwrap_err();

    assert!(matches!(err, WidgetError::IoError(_)));
    let instance = h.app.instances().find_by_id("w1").unwrap();
    assert_eq!(instance.content(), Some(info.encode().unwrap().as_str()));
}

#[test]
fn test_context_tag_and_title() {
    let mut h = Harness::new();
    h.create("w1");

    h.app
        .with_context("w1", |cx| {
            assert!(cx.set_title("no window yet").is_ok());
            assert!(matches!(cx.set_title(""), Err(WidgetError::InvalidParameter(_))));

            cx.set_tag(7_u32);
            *cx.tag_mut::<u32>().unwrap() += 1;
            assert_eq!(cx.class_data::<&str>(), Some(&"probe"));

            let first = cx.window().unwrap();
            assert_eq!(cx.window().unwrap(), first);
        })
        .unwrap();

    let instance = h.app.instances().find_by_id("w1").unwrap();
    assert_eq!(instance.tag::<u32>(), Some(&8));
    assert!(instance.surface().is_some());
}

#[test]
fn test_bulk_pause_and_resume() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.op(Operation::Resume, "w2").unwrap();
    h.reset();

    h.app.pause_all(true);
    // Ready instances go through resume first.
    assert_eq!(h.calls(), ["resume:w1", "pause:w1", "pause:w2"]);

    h.reset();
    h.app.resume_all(true);
    assert_eq!(h.calls(), ["resume:w1", "resume:w2"]);
    assert_eq!(h.viewer(), [pair("w1", RESUME), pair("w2", RESUME)]);
}

#[test]
fn test_shutdown_order() {
    let mut h = Harness::new();
    h.create("w1");
    h.create("w2");
    h.op(Operation::Resume, "w1").unwrap();
    h.reset();

    h.app.shutdown();

    assert_eq!(
        h.calls(),
        [
            "pause:w1",
            "resume:w2",
            "pause:w2",
            "destroy:w1:Temporary",
            "destroy:w2:Temporary",
            "terminate",
        ]
    );
    // The pause pass is local; only the destroys are reported.
    assert_eq!(
        h.viewer(),
        [
            pair("w1", EXTRA_UPDATED),
            pair("w1", TERMINATE),
            pair("w2", EXTRA_UPDATED),
            pair("w2", TERMINATE),
        ]
    );
    assert!(h.app.instances().is_empty());
    assert!(h.terminated.get());
}

#[test]
fn test_shutdown_keeps_locale_watches_until_terminate() {
    let mut h = Harness::unstarted(AppConfig::new(APP_ID).with_viewer_endpoint(VIEWER), false);
    // Setting changes land in the callback log so their order is visible.
    let log = std::rc::Rc::clone(&h.calls);
    h.app.platform_mut().watches = SettingWatches::new(Box::new(Settings { log }));
    h.app.start().unwrap();
    h.create("w1");
    h.reset();

    h.app.shutdown();

    assert_eq!(
        h.calls(),
        [
            "unwatch:PowerOff",
            "resume:w1",
            "pause:w1",
            "destroy:w1:Temporary",
            "terminate",
            "unwatch:Language",
            "unwatch:RegionFormat",
        ]
    );
}

#[test]
fn test_restart_request() {
    let mut h = Harness::new();
    h.app.restart().unwrap();

    let reports = h.reports_to(VIEWER);
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].event(), Some(InstanceEvent::AppRestartRequest));
    assert!(reports[0].instance_id.is_none());

    h.sent.fail.set(true);
    assert!(matches!(h.app.restart(), Err(WidgetError::IoError(_))));
}

#[test]
fn test_for_each_instance_stops_early() {
    let mut h = Harness::new();
    for id in ["w1", "w2", "w3"] {
        h.create(id);
    }

    let mut seen = Vec::new();
    h.app
        .for_each_instance(|instance| {
            seen.push(instance.id().to_string());
            seen.len() < 2
        })
        .unwrap();
    assert_eq!(seen, ["w1", "w2"]);
}
