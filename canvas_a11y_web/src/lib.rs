// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Browser backend for canvas_a11y.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`DomProxyPool`]: `<button>` proxies in the overlay container
//! - [`StyleElement`]: the managed `<style>` element
//! - [`DomCanvas`]: canvas lookup, device pixel ratio and aspect fitting
//! - [`JsRuntime`]: the runtime instance's `SendMessage` entry point
//! - [`FirstInteraction`] and [`ResizeWatcher`]: page event subscriptions
//! - [`ConsoleLogger`]: a [`log`] backend writing to the browser console
//!
//! [`start`] wires them together around an
//! [`OverlaySession`](canvas_a11y_core::session::OverlaySession) and returns
//! an [`AccessibilityOverlay`] handle for the page script.
//!
//! ```js
//! import init, { start } from "./canvas_a11y_web.js";
//!
//! await init();
//! const overlay = start(JSON.stringify(window.pageConfig ?? {}));
//! overlay.installGlobals();
//! createRuntimeInstance(canvas, config).then((instance) => {
//!     overlay.attachRuntime(instance);
//! });
//! ```

#![cfg_attr(
    not(target_arch = "wasm32"),
    allow(dead_code, reason = "only the wasm32 build is wired to a page")
)]

mod canvas;
mod listeners;
mod logger;
mod overlay;
mod pool;
mod runtime;
mod style;

pub use canvas::DomCanvas;
pub use canvas_a11y_core::config::OverlayConfig;
pub use listeners::{FIRST_INTERACTION_EVENTS, FirstInteraction, ResizeWatcher};
pub use logger::ConsoleLogger;
pub use overlay::AccessibilityOverlay;
pub use pool::{ClickHandler, DomProxyPool};
pub use runtime::{JsRuntime, RuntimeInstance};
pub use style::StyleElement;

use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;
use web_sys::{Document, HtmlElement};

/// Starts the accessibility overlay.
///
/// `config` is the page configuration as JSON text; the overlay settings
/// are read from its `accessibilityLayer` key. Malformed configuration is
/// logged and replaced by the defaults.
///
/// With `enable: false` the stylesheet is installed but no listener is
/// registered and the overlay never requests a sync.
///
/// # Errors
///
/// Returns an error if there is no `window` or `document`, or if the overlay
/// container is missing and cannot be created.
#[wasm_bindgen]
pub fn start(config: &str) -> Result<AccessibilityOverlay, JsValue> {
    console_error_panic_hook::set_once();

    let parsed = OverlayConfig::from_page_config(config);
    let config = parsed.clone().unwrap_or_default();
    logger::init(config.max_log_level());
    if let Err(err) = parsed {
        log::warn!("{err}, using default overlay settings");
    }

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;
    let container = overlay_container(&document, &config.overlay_id)?;

    let shared = overlay::Shared::new(config, window, document, container);
    shared.wire();
    Ok(AccessibilityOverlay::new(shared))
}

/// Returns the overlay container, creating it under `<body>` if the page
/// does not provide one.
fn overlay_container(document: &Document, id: &str) -> Result<HtmlElement, JsValue> {
    if let Some(existing) = document.get_element_by_id(id) {
        return existing
            .dyn_into::<HtmlElement>()
            .map_err(|_| JsValue::from_str("overlay container is not an HTML element"));
    }
    let body = document
        .body()
        .ok_or_else(|| JsValue::from_str("no document body"))?;
    let container: HtmlElement = document.create_element("div")?.unchecked_into();
    container.set_id(id);
    body.append_child(&container)?;
    log::debug!("created overlay container #{id}");
    Ok(container)
}
