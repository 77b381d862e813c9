// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! End-to-end protocol scenarios against in-memory hosts.

use std::cell::RefCell;
use std::rc::Rc;

use canvas_a11y_core::bridge::{self, BridgeError, OutboundMessage, Outbox, RuntimeBridge};
use canvas_a11y_core::geometry::{CanvasGeometry, CanvasLocator, CssRect};
use canvas_a11y_core::mode::{PresentationMode, StyleSink};
use canvas_a11y_core::payload::ElementId;
use canvas_a11y_core::pool::{ProxyPresenter, ProxySpec};
use canvas_a11y_core::session::{
    Activation, OverlaySession, Phase, RequestOutcome, SessionOptions, SyncError,
};
use kurbo::Point;

/// Records every message with its target.
#[derive(Clone, Default)]
struct Runtime {
    log: Rc<RefCell<Vec<(String, OutboundMessage)>>>,
}

impl Runtime {
    fn methods(&self) -> Vec<&'static str> {
        self.log.borrow().iter().map(|(_, m)| m.method()).collect()
    }
}

impl RuntimeBridge for Runtime {
    fn send(&mut self, target: &str, message: &OutboundMessage) -> Result<(), BridgeError> {
        self.log
            .borrow_mut()
            .push((target.to_owned(), message.clone()));
        Ok(())
    }
}

/// A page with a canvas at a fixed spot and a stylesheet slot.
struct Page {
    canvas: Option<CanvasGeometry>,
    stylesheet: Option<String>,
    stylesheet_inserts: usize,
    proxies: Vec<ProxySpec>,
}

impl Page {
    fn new(origin: Point, dpr: f64) -> Self {
        Self {
            canvas: Some(CanvasGeometry::new(origin, dpr)),
            stylesheet: None,
            stylesheet_inserts: 0,
            proxies: Vec::new(),
        }
    }
}

impl StyleSink for Page {
    fn replace_stylesheet(&mut self, css: &str) {
        self.stylesheet = Some(css.to_owned());
        self.stylesheet_inserts += 1;
    }
}

struct Overlay<'a>(&'a mut Vec<ProxySpec>);

impl ProxyPresenter for Overlay<'_> {
    fn clear(&mut self) {
        self.0.clear();
    }

    fn insert(&mut self, proxy: ProxySpec) {
        self.0.push(proxy);
    }

    fn proxy_count(&self) -> usize {
        self.0.len()
    }
}

fn apply(
    session: &mut OverlaySession<Runtime>,
    page: &mut Page,
    text: &str,
) -> Result<usize, SyncError> {
    let locator = CanvasLocatorSnapshot(page.canvas);
    session.apply_payload(text, &locator, &mut Overlay(&mut page.proxies))
}

struct CanvasLocatorSnapshot(Option<CanvasGeometry>);

impl CanvasLocator for CanvasLocatorSnapshot {
    fn canvas_geometry(&self) -> Option<CanvasGeometry> {
        self.0
    }
}

fn new_session() -> OverlaySession<Runtime> {
    OverlaySession::new(SessionOptions::default(), PresentationMode::PRODUCTION)
}

#[test]
fn play_button_lands_where_the_canvas_draws_it() {
    let runtime = Runtime::default();
    let mut session = new_session();
    let mut page = Page::new(Point::new(10.0, 10.0), 2.0);
    let _ = session.attach_runtime(runtime.clone());
    assert!(session.arm(), "session arms once");
    let _ = session.activate();

    let count = apply(
        &mut session,
        &mut page,
        r#"{"elements":[{"id":"a","label":"Play","x":100,"y":200,"width":50,"height":20}]}"#,
    )
    .unwrap();

    assert_eq!(count, 1);
    let proxy = &page.proxies[0];
    assert_eq!(proxy.label, "Play");
    assert_eq!(proxy.id, ElementId::new("a"));
    assert_eq!(
        proxy.rect,
        CssRect {
            left: 60.0,
            top: 110.0,
            width: 25.0,
            height: 10.0,
        }
    );
    assert!(proxy.routes_clicks);
}

#[test]
fn rebuild_matches_payload_exactly() {
    let mut session = new_session();
    let mut page = Page::new(Point::ORIGIN, 1.0);
    let _ = session.attach_runtime(Runtime::default());
    let _ = session.activate();

    let labels = ["Start", "", "Options", "Quit", "Credits"];
    let elements: Vec<String> = labels
        .iter()
        .enumerate()
        .map(|(i, label)| {
            format!(
                r#"{{"id":"e{i}","label":"{label}","x":{x},"y":0,"width":10,"height":10}}"#,
                x = i * 20
            )
        })
        .collect();
    let text = format!(r#"{{"elements":[{}]}}"#, elements.join(","));

    assert_eq!(apply(&mut session, &mut page, &text), Ok(labels.len()));
    assert_eq!(page.proxies.len(), labels.len());
    for (proxy, label) in page.proxies.iter().zip(labels) {
        assert_eq!(proxy.label, label);
        assert_eq!(proxy.label.is_empty(), label.is_empty());
    }

    // A later, shorter payload wins outright.
    assert_eq!(
        apply(&mut session, &mut page, r#"{"elements":[]}"#),
        Ok(0)
    );
    assert!(page.proxies.is_empty());
}

#[test]
fn double_activation_sends_one_request() {
    let runtime = Runtime::default();
    let mut session = new_session();
    let _ = session.attach_runtime(runtime.clone());
    let _ = session.arm();

    assert_eq!(
        session.activate(),
        Activation::Activated(RequestOutcome::Dispatched)
    );
    assert_eq!(session.activate(), Activation::AlreadyActivated);
    assert_eq!(runtime.methods(), ["RequestFullSyncFromJS"]);
}

#[test]
fn garbage_payloads_leave_the_overlay_alone() {
    let mut session = new_session();
    let mut page = Page::new(Point::ORIGIN, 1.0);
    let _ = session.attach_runtime(Runtime::default());
    let _ = session.activate();
    let good = r#"{"elements":[{"id":"a","label":"A","x":0,"y":0,"width":1,"height":1}]}"#;
    apply(&mut session, &mut page, good).unwrap();
    let before = page.proxies.clone();

    for garbage in [
        "",
        "not json",
        "{\"elements\":[",
        "[1,2,3]",
        r#"{"elements":[{"id":"a"}]}"#,
        r#"{"elements":{"id":"a"}}"#,
        "null",
    ] {
        assert!(
            apply(&mut session, &mut page, garbage).is_err(),
            "{garbage:?} should be rejected"
        );
        assert_eq!(page.proxies, before, "{garbage:?} must not touch proxies");
    }
}

#[test]
fn mode_toggle_restyles_before_the_extra_request() {
    let runtime = Runtime::default();
    let mut session = new_session();
    let mut page = Page::new(Point::ORIGIN, 1.0);
    let _ = session.attach_runtime(runtime.clone());
    let _ = session.activate();
    let before = runtime.methods().len();

    assert_eq!(
        session.toggle_debug(&mut page),
        RequestOutcome::Dispatched
    );
    assert_eq!(runtime.methods().len(), before + 1);
    assert_eq!(page.stylesheet_inserts, 1);
    assert_eq!(
        page.stylesheet.as_deref(),
        Some(PresentationMode::new(true, true).stylesheet().as_str())
    );

    assert_eq!(
        session.toggle_pointer_passthrough(&mut page),
        RequestOutcome::Dispatched
    );
    assert_eq!(runtime.methods().len(), before + 2);
    assert!(
        page.stylesheet
            .as_deref()
            .is_some_and(|css| css.contains("pointer-events: none !important"))
    );
}

fn timers_armed(outcomes: &[RequestOutcome]) -> usize {
    outcomes
        .iter()
        .filter(|outcome| **outcome == RequestOutcome::ScheduleRetry { after_ms: 500 })
        .count()
}

#[test]
fn runtime_that_loads_late_gets_exactly_one_request() {
    let runtime = Runtime::default();
    let mut session = new_session();
    let _ = session.arm();

    let mut outcomes = Vec::new();

    // Activation plus several resize-triggered requests before the runtime
    // exists arm exactly one timer.
    match session.activate() {
        Activation::Activated(outcome) => outcomes.push(outcome),
        Activation::AlreadyActivated => panic!("first trigger must activate"),
    }
    for _ in 0..5 {
        outcomes.push(session.request_sync());
    }
    assert_eq!(timers_armed(&outcomes), 1);

    // Each tick re-arms once.
    for _ in 0..4 {
        outcomes.push(session.retry_elapsed());
    }
    assert_eq!(timers_armed(&outcomes), 5);
    assert_eq!(session.phase(), Phase::RequestingSync);

    assert_eq!(
        session.attach_runtime(runtime.clone()),
        RequestOutcome::Dispatched
    );
    assert_eq!(session.retry_elapsed(), RequestOutcome::Dropped);
    assert_eq!(runtime.methods(), ["RequestFullSyncFromJS"]);
    assert_eq!(session.phase(), Phase::Active);
}

#[test]
fn messages_are_addressed_to_the_configured_target() {
    let runtime = Runtime::default();
    let mut session = OverlaySession::new(
        SessionOptions {
            target: "A11yBridge".to_owned(),
            retry_interval_ms: 250,
        },
        PresentationMode::PRODUCTION,
    );
    let _ = session.attach_runtime(runtime.clone());
    let _ = session.activate();
    let _ = session.proxy_clicked(&ElementId::new("7"));

    let log = runtime.log.borrow();
    assert!(log.iter().all(|(target, _)| target == "A11yBridge"));
    assert_eq!(
        log.last().map(|(_, m)| m.argument()),
        Some(Some("7".to_owned()))
    );
}

/// A runtime whose message handlers call straight back into the overlay,
/// before `send` returns.
struct AnswersInline {
    session: Rc<RefCell<OverlaySession<Outbox>>>,
    proxies: Rc<RefCell<Vec<ProxySpec>>>,
    payloads: Vec<&'static str>,
    methods: Vec<&'static str>,
}

impl RuntimeBridge for AnswersInline {
    fn send(&mut self, _: &str, message: &OutboundMessage) -> Result<(), BridgeError> {
        self.methods.push(message.method());
        let mut session = self.session.borrow_mut();
        match message {
            OutboundMessage::RequestFullSync => {
                let payload = self.payloads.remove(0);
                let locator = CanvasLocatorSnapshot(Some(CanvasGeometry::new(Point::ORIGIN, 1.0)));
                let mut proxies = self.proxies.borrow_mut();
                session
                    .apply_payload(payload, &locator, &mut Overlay(&mut *proxies))
                    .unwrap();
            }
            // A button that switches screens asks for a fresh list.
            OutboundMessage::ProxyClicked(_) => {
                assert_eq!(session.request_sync(), RequestOutcome::Dispatched);
            }
            OutboundMessage::CanvasResized(_) => {}
        }
        Ok(())
    }
}

#[test]
fn runtime_answering_inside_send_finds_the_session_free() {
    let outbox = Outbox::new();
    let session = Rc::new(RefCell::new(OverlaySession::new(
        SessionOptions::default(),
        PresentationMode::PRODUCTION,
    )));
    let proxies = Rc::new(RefCell::new(Vec::new()));
    let mut runtime = AnswersInline {
        session: Rc::clone(&session),
        proxies: Rc::clone(&proxies),
        payloads: vec![
            r#"{"elements":[{"id":"play","label":"Play","x":0,"y":0,"width":10,"height":10}]}"#,
            r#"{"elements":[{"id":"back","label":"Back","x":0,"y":0,"width":10,"height":10},
                            {"id":"vol","label":"Volume","x":20,"y":0,"width":10,"height":10}]}"#,
        ],
        methods: Vec::new(),
    };

    let _ = session.borrow_mut().attach_runtime(outbox.clone());
    assert!(session.borrow_mut().arm());
    let activation = session.borrow_mut().activate();
    assert_eq!(activation, Activation::Activated(RequestOutcome::Dispatched));
    assert_eq!(bridge::flush(&outbox, &mut runtime), 1);
    assert_eq!(proxies.borrow().len(), 1);

    let _ = session
        .borrow_mut()
        .proxy_clicked(&ElementId::new("play"));
    assert_eq!(bridge::flush(&outbox, &mut runtime), 2);
    assert_eq!(
        runtime.methods,
        [
            "RequestFullSyncFromJS",
            "OnProxyElementClicked",
            "RequestFullSyncFromJS"
        ]
    );
    let labels: Vec<String> = proxies.borrow().iter().map(|p| p.label.clone()).collect();
    assert_eq!(labels, ["Back", "Volume"]);
    assert!(outbox.is_empty());
}
