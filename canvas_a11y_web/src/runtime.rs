// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Binding to the embedded runtime's `SendMessage` endpoint.

use canvas_a11y_core::bridge::{BridgeError, OutboundMessage, RuntimeBridge};
use wasm_bindgen::JsCast as _;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// A loaded runtime instance, as resolved by the runtime's loader.
    #[derive(Clone)]
    pub type RuntimeInstance;

    #[wasm_bindgen(method, catch, js_name = "SendMessage")]
    fn send_message(this: &RuntimeInstance, target: &str, method: &str) -> Result<(), JsValue>;

    #[wasm_bindgen(method, catch, js_name = "SendMessage")]
    fn send_message_with_arg(
        this: &RuntimeInstance,
        target: &str,
        method: &str,
        argument: &str,
    ) -> Result<(), JsValue>;
}

/// [`RuntimeBridge`] over a JavaScript runtime instance.
#[derive(Clone)]
pub struct JsRuntime {
    instance: RuntimeInstance,
}

impl core::fmt::Debug for JsRuntime {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("JsRuntime")
            .field("instance", &"RuntimeInstance")
            .finish()
    }
}

impl JsRuntime {
    /// Wraps the value the runtime loader resolved with.
    #[must_use]
    pub fn new(instance: JsValue) -> Self {
        Self {
            instance: instance.unchecked_into(),
        }
    }
}

impl RuntimeBridge for JsRuntime {
    fn send(&mut self, target: &str, message: &OutboundMessage) -> Result<(), BridgeError> {
        let method = message.method();
        let result = match message.argument() {
            Some(argument) => self
                .instance
                .send_message_with_arg(target, method, &argument),
            None => self.instance.send_message(target, method),
        };
        result.map_err(|err| BridgeError {
            method,
            reason: describe(&err),
        })
    }
}

/// Best-effort text for a thrown JavaScript value.
pub(crate) fn describe(err: &JsValue) -> String {
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    err.as_string().unwrap_or_else(|| format!("{err:?}"))
}
