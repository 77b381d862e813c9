// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wiring between the session, the DOM, timers and the page's JavaScript.
//!
//! [`AccessibilityOverlay`] is the handle the page receives from
//! [`start`](crate::start). Everything it needs lives in one shared context;
//! no state is kept in module-level globals.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use canvas_a11y_core::bridge::{self, Outbox};
use canvas_a11y_core::config::OverlayConfig;
use canvas_a11y_core::diagnostics::{self, ProxyListing};
use canvas_a11y_core::payload::ElementId;
use canvas_a11y_core::pool::ProxyPresenter as _;
use canvas_a11y_core::session::{Activation, OverlaySession, RequestOutcome, SessionOptions};
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement, Window};

use crate::canvas::DomCanvas;
use crate::listeners::{FirstInteraction, ResizeWatcher};
use crate::pool::DomProxyPool;
use crate::runtime::JsRuntime;
use crate::style::StyleElement;

/// Global names the page script and the runtime look up on `window`.
const GLOBALS: [(&str, GlobalFn); 6] = [
    ("UpdateAccessibilityLayer", GlobalFn::Update),
    ("updateAccessibilityLayer", GlobalFn::Update),
    ("toggleAccessibilityDebug", GlobalFn::ToggleDebug),
    ("toggleAccessibilityPointerEvents", GlobalFn::TogglePointer),
    ("showAccessibilityInfo", GlobalFn::ShowInfo),
    ("listAccessibilityElements", GlobalFn::ListElements),
];

#[derive(Clone, Copy)]
enum GlobalFn {
    Update,
    ToggleDebug,
    TogglePointer,
    ShowInfo,
    ListElements,
}

/// Shared overlay context.
///
/// The session sends into `outbox`; messages reach the runtime only from
/// [`deliver`](Self::deliver), once every cell borrow has been released.
/// The runtime may call back into the overlay from inside `SendMessage`
/// (and Unity does), so no borrow may be held across a runtime call.
pub(crate) struct Shared {
    config: OverlayConfig,
    window: Window,
    document: Document,
    session: RefCell<OverlaySession<Outbox>>,
    outbox: Outbox,
    runtime: RefCell<Option<JsRuntime>>,
    pool: RefCell<DomProxyPool>,
    styles: RefCell<StyleElement>,
    canvas: DomCanvas,
    retry: RefCell<Option<Timeout>>,
    first_interaction: RefCell<Option<FirstInteraction>>,
    resize: RefCell<Option<ResizeWatcher>>,
}

impl Shared {
    pub(crate) fn new(
        config: OverlayConfig,
        window: Window,
        document: Document,
        container: HtmlElement,
    ) -> Rc<Self> {
        Rc::new_cyclic(|weak: &Weak<Self>| {
            let weak = weak.clone();
            let on_click = Rc::new(move |id: &ElementId| {
                if let Some(shared) = weak.upgrade() {
                    shared.proxy_clicked(id);
                }
            });
            let session = OverlaySession::new(SessionOptions::from(&config), config.initial_mode());
            Self {
                session: RefCell::new(session),
                outbox: Outbox::new(),
                runtime: RefCell::new(None),
                pool: RefCell::new(DomProxyPool::new(container, on_click)),
                styles: RefCell::new(StyleElement::new(
                    document.clone(),
                    config.style_element_id.clone(),
                )),
                canvas: DomCanvas::new(window.clone(), config.canvas_id.clone()),
                retry: RefCell::new(None),
                first_interaction: RefCell::new(None),
                resize: RefCell::new(None),
                config,
                window,
                document,
            }
        })
    }

    /// Installs the initial stylesheet and, if enabled, the activation and
    /// resize listeners.
    pub(crate) fn wire(self: &Rc<Self>) {
        let mode = self.session.borrow().mode();
        let outcome = self
            .session
            .borrow_mut()
            .set_mode(mode, &mut *self.styles.borrow_mut());
        self.handle(outcome);

        if !self.config.enable {
            log::info!("accessibility overlay disabled by configuration");
            return;
        }
        if !self.session.borrow_mut().arm() {
            return;
        }

        let weak = Rc::downgrade(self);
        let gate = self.document.body().map(|body| {
            FirstInteraction::subscribe(&body, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.activate();
                }
            })
        });
        if gate.is_none() {
            log::error!("document has no <body>, first interaction cannot be observed");
        }
        *self.first_interaction.borrow_mut() = gate;

        let weak = Rc::downgrade(self);
        let watcher = ResizeWatcher::subscribe(&self.window, self.config.resize_debounce_ms, move || {
            if let Some(shared) = weak.upgrade() {
                shared.window_resized();
            }
        });
        *self.resize.borrow_mut() = Some(watcher);
        log::info!("accessibility overlay armed, waiting for first interaction");
    }

    fn activate(self: &Rc<Self>) {
        let activation = self.session.borrow_mut().activate();
        let Activation::Activated(outcome) = activation else {
            return;
        };
        self.first_interaction.borrow_mut().take();
        if let Some(trap) = self
            .config
            .screen_reader_trap_id
            .as_deref()
            .and_then(|id| self.document.get_element_by_id(id))
        {
            trap.remove();
        }
        self.handle(outcome);
    }

    /// Acts on what the session asked for.
    fn handle(self: &Rc<Self>, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::ScheduleRetry { after_ms } => {
                let weak = Rc::downgrade(self);
                let timeout = Timeout::new(after_ms, move || {
                    if let Some(shared) = weak.upgrade() {
                        shared.retry_elapsed();
                    }
                });
                *self.retry.borrow_mut() = Some(timeout);
            }
            RequestOutcome::Dispatched | RequestOutcome::RetryPending | RequestOutcome::Dropped => {}
        }
        if !self.session.borrow().retry_pending() {
            self.retry.borrow_mut().take();
        }
        self.deliver();
    }

    /// Hands queued messages to the runtime, if one is attached.
    fn deliver(&self) {
        if self.outbox.is_empty() {
            return;
        }
        let Some(mut runtime) = self.runtime.borrow().clone() else {
            return;
        };
        let _ = bridge::flush(&self.outbox, &mut runtime);
    }

    fn retry_elapsed(self: &Rc<Self>) {
        self.retry.borrow_mut().take();
        let outcome = self.session.borrow_mut().retry_elapsed();
        self.handle(outcome);
    }

    pub(crate) fn attach_runtime(self: &Rc<Self>, instance: JsValue) {
        *self.runtime.borrow_mut() = Some(JsRuntime::new(instance));
        let outcome = self
            .session
            .borrow_mut()
            .attach_runtime(self.outbox.clone());
        self.handle(outcome);
        self.window_resized();
    }

    fn window_resized(self: &Rc<Self>) {
        let Some(size) = self.canvas.fit(self.config.aspect_ratio) else {
            log::warn!("runtime canvas element not found, resize skipped");
            return;
        };
        let outcome = self.session.borrow_mut().canvas_resized(size);
        self.handle(outcome);
    }

    fn proxy_clicked(&self, id: &ElementId) {
        let _ = self.session.borrow_mut().proxy_clicked(id);
        self.deliver();
    }

    pub(crate) fn update_layer(self: &Rc<Self>, payload: &str) {
        let (Ok(mut session), Ok(mut pool)) =
            (self.session.try_borrow_mut(), self.pool.try_borrow_mut())
        else {
            // Called from inside another overlay operation; apply it once
            // the current task has finished.
            log::debug!("overlay busy, payload deferred");
            let weak = Rc::downgrade(self);
            let payload = payload.to_owned();
            let _ = Timeout::new(0, move || {
                if let Some(shared) = weak.upgrade() {
                    shared.update_layer(&payload);
                }
            })
            .forget();
            return;
        };
        // Failures are logged by the session; the previous proxies stay.
        let _ = session.apply_payload(payload, &self.canvas, &mut *pool);
    }

    pub(crate) fn toggle_debug(self: &Rc<Self>) -> String {
        let outcome = self
            .session
            .borrow_mut()
            .toggle_debug(&mut *self.styles.borrow_mut());
        self.handle(outcome);
        diagnostics::debug_status(self.session.borrow().mode().debug_visible)
    }

    pub(crate) fn toggle_pointer(self: &Rc<Self>) -> String {
        let outcome = self
            .session
            .borrow_mut()
            .toggle_pointer_passthrough(&mut *self.styles.borrow_mut());
        self.handle(outcome);
        diagnostics::pointer_status(self.session.borrow().mode().pointer_passthrough)
    }

    pub(crate) fn show_info(&self) -> JsValue {
        let proxy_count = self.pool.borrow().proxy_count();
        let summary = self
            .session
            .borrow()
            .summary(proxy_count, self.canvas.device_pixel_ratio());
        log::info!("{summary}");
        serde_wasm_bindgen::to_value(&summary).unwrap_or(JsValue::NULL)
    }

    pub(crate) fn list_elements(&self) -> JsValue {
        let listing: Vec<ProxyListing> = self.pool.borrow().listing();
        log::info!(
            "accessibility overlay elements:\n{}",
            diagnostics::format_listing(&listing)
        );
        serde_wasm_bindgen::to_value(&listing).unwrap_or(JsValue::NULL)
    }
}

/// Handle to a running accessibility overlay.
///
/// Returned by [`start`](crate::start). Dropping it detaches every listener
/// and timer the overlay installed.
#[wasm_bindgen]
pub struct AccessibilityOverlay {
    shared: Rc<Shared>,
    globals: Vec<Closure<dyn Fn(JsValue) -> JsValue>>,
}

impl core::fmt::Debug for AccessibilityOverlay {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("AccessibilityOverlay")
            .field(
                "phase",
                &self.shared.session.try_borrow().map(|s| s.phase()).ok(),
            )
            .field("globals", &self.globals.len())
            .finish_non_exhaustive()
    }
}

impl AccessibilityOverlay {
    pub(crate) fn new(shared: Rc<Shared>) -> Self {
        Self {
            shared,
            globals: Vec::new(),
        }
    }
}

#[wasm_bindgen]
impl AccessibilityOverlay {
    /// Hands the loaded runtime instance to the overlay.
    ///
    /// Call once the runtime loader resolves. A sync request that was
    /// waiting for the runtime goes out immediately.
    #[wasm_bindgen(js_name = attachRuntime)]
    pub fn attach_runtime(&self, instance: JsValue) {
        self.shared.attach_runtime(instance);
    }

    /// Inbound entry point for the runtime's element list.
    #[wasm_bindgen(js_name = updateAccessibilityLayer)]
    pub fn update_accessibility_layer(&self, payload: &str) {
        self.shared.update_layer(payload);
    }

    /// Flips debug visuals and re-syncs. Returns a status line.
    #[wasm_bindgen(js_name = toggleAccessibilityDebug)]
    pub fn toggle_accessibility_debug(&self) -> String {
        self.shared.toggle_debug()
    }

    /// Flips pointer passthrough and re-syncs. Returns a status line.
    #[wasm_bindgen(js_name = toggleAccessibilityPointerEvents)]
    pub fn toggle_accessibility_pointer_events(&self) -> String {
        self.shared.toggle_pointer()
    }

    /// Logs and returns the current mode summary.
    #[wasm_bindgen(js_name = showAccessibilityInfo)]
    pub fn show_accessibility_info(&self) -> JsValue {
        self.shared.show_info()
    }

    /// Logs and returns every proxy's label and position.
    #[wasm_bindgen(js_name = listAccessibilityElements)]
    pub fn list_accessibility_elements(&self) -> JsValue {
        self.shared.list_elements()
    }

    /// Publishes the inbound entry point and the console helpers on
    /// `window`, under the names the runtime and developers expect.
    #[wasm_bindgen(js_name = installGlobals)]
    pub fn install_globals(&mut self) -> Result<(), JsValue> {
        for (name, function) in GLOBALS {
            let weak = Rc::downgrade(&self.shared);
            let closure = Closure::<dyn Fn(JsValue) -> JsValue>::new(move |arg: JsValue| {
                let Some(shared) = weak.upgrade() else {
                    return JsValue::UNDEFINED;
                };
                match function {
                    GlobalFn::Update => {
                        match arg.as_string() {
                            Some(payload) => shared.update_layer(&payload),
                            None => log::error!("accessibility payload is not a string: {arg:?}"),
                        }
                        JsValue::UNDEFINED
                    }
                    GlobalFn::ToggleDebug => JsValue::from(shared.toggle_debug()),
                    GlobalFn::TogglePointer => JsValue::from(shared.toggle_pointer()),
                    GlobalFn::ShowInfo => shared.show_info(),
                    GlobalFn::ListElements => shared.list_elements(),
                }
            });
            js_sys::Reflect::set(
                &self.shared.window,
                &JsValue::from_str(name),
                closure.as_ref(),
            )?;
            self.globals.push(closure);
        }
        Ok(())
    }
}
