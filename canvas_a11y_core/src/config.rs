// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Overlay configuration.
//!
//! The host page keeps a `config.json` with an `accessibilityLayer` section.
//! Every field is optional; missing fields take the defaults below.

use alloc::string::{String, ToString as _};
use core::str::FromStr as _;

use log::LevelFilter;
use serde::Deserialize;

use crate::bridge::DEFAULT_TARGET;
use crate::mode::PresentationMode;

/// Default interval between sync attempts while the runtime is loading.
pub const DEFAULT_RETRY_INTERVAL_MS: u32 = 500;

/// Default debounce for window resize handling.
pub const DEFAULT_RESIZE_DEBOUNCE_MS: u32 = 100;

/// Settings for one overlay session.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OverlayConfig {
    /// Wire the overlay at all.
    pub enable: bool,
    /// Start with debug visuals on.
    pub debug: bool,
    /// Start with pointer passthrough on.
    #[serde(rename = "pointer-events")]
    pub pointer_events: bool,
    /// DOM id of the runtime's canvas.
    pub canvas_id: String,
    /// DOM id of the element that holds proxies.
    pub overlay_id: String,
    /// DOM id of the managed `<style>` element.
    pub style_element_id: String,
    /// DOM id of an element removed on activation, if present.
    pub screen_reader_trap_id: Option<String>,
    /// Logical runtime target for outbound messages.
    pub bridge_target: String,
    /// Delay between sync attempts while no runtime is attached.
    pub retry_interval_ms: u32,
    /// Quiet period before a window resize is handled.
    pub resize_debounce_ms: u32,
    /// Width / height ratio the canvas is fitted to on resize.
    pub aspect_ratio: Option<f64>,
    /// Maximum log level, as accepted by [`LevelFilter::from_str`].
    pub log_level: String,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            enable: false,
            debug: false,
            pointer_events: true,
            canvas_id: "unityCanvas".to_string(),
            overlay_id: "accessibility-overlay".to_string(),
            style_element_id: "accessibility-debug-style".to_string(),
            screen_reader_trap_id: Some("screen-reader-trap".to_string()),
            bridge_target: DEFAULT_TARGET.to_string(),
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
            resize_debounce_ms: DEFAULT_RESIZE_DEBOUNCE_MS,
            aspect_ratio: Some(16.0 / 9.0),
            log_level: "info".to_string(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PageConfig {
    #[serde(default)]
    accessibility_layer: Option<OverlayConfig>,
}

/// Why a page configuration could not be read.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("invalid page configuration: {0}")]
pub struct ConfigError(String);

impl OverlayConfig {
    /// Reads the `accessibilityLayer` section of a page `config.json`.
    ///
    /// A page config without that section yields the defaults, which leave
    /// the overlay disabled.
    pub fn from_page_config(text: &str) -> Result<Self, ConfigError> {
        let page: PageConfig =
            serde_json::from_str(text).map_err(|err| ConfigError(err.to_string()))?;
        Ok(page.accessibility_layer.unwrap_or_default())
    }

    /// The presentation mode the session starts in.
    #[must_use]
    pub const fn initial_mode(&self) -> PresentationMode {
        PresentationMode::new(self.debug, self.pointer_events)
    }

    /// The configured log level, falling back to `Info` if unrecognized.
    #[must_use]
    pub fn max_log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or(LevelFilter::Info)
    }
}
