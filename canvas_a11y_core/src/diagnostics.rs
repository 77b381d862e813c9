// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Developer-facing summaries of the overlay state.
//!
//! These back the browser console helpers. They are not part of the runtime
//! protocol.

use alloc::format;
use alloc::string::String;
use core::fmt::{self, Write as _};

use serde::Serialize;

use crate::geometry::CssRect;
use crate::mode::{Architecture, PointerEvents};

/// Session state at a glance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModeSummary {
    /// The first interaction has activated the overlay.
    pub active: bool,
    /// Debug visuals are on.
    pub debug_mode: bool,
    /// Pointer passthrough is on.
    pub pointer_events: bool,
    /// Input architecture implied by the mode.
    pub architecture: Architecture,
    /// Number of proxies currently in the overlay.
    pub proxy_count: usize,
    /// Device pixel ratio at the time of the snapshot.
    pub device_pixel_ratio: f64,
}

impl Serialize for ModeSummary {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct as _;

        let mut s = serializer.serialize_struct("ModeSummary", 6)?;
        s.serialize_field("active", &self.active)?;
        s.serialize_field("debugMode", &self.debug_mode)?;
        s.serialize_field("pointerEvents", &self.pointer_events)?;
        s.serialize_field("architecture", self.architecture.as_str())?;
        s.serialize_field("proxyCount", &self.proxy_count)?;
        s.serialize_field("devicePixelRatio", &self.device_pixel_ratio)?;
        s.end()
    }
}

fn on_off(flag: bool) -> &'static str {
    if flag { "on" } else { "off" }
}

impl fmt::Display for ModeSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pointer_events = if self.pointer_events {
            PointerEvents::Auto
        } else {
            PointerEvents::None
        };
        writeln!(f, "accessibility overlay")?;
        writeln!(
            f,
            "  status:             {}",
            if self.active { "active" } else { "inactive" }
        )?;
        writeln!(f, "  debug visuals:      {}", on_off(self.debug_mode))?;
        writeln!(f, "  pointer events:     {}", pointer_events.as_css())?;
        writeln!(f, "  architecture:       {}", self.architecture.as_str())?;
        writeln!(f, "  device pixel ratio: {}", self.device_pixel_ratio)?;
        write!(f, "  proxy elements:     {}", self.proxy_count)
    }
}

/// One proxy as it currently sits in the page.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProxyListing {
    /// The proxy's accessible label.
    pub label: String,
    /// Its laid-out rectangle in CSS pixels.
    pub position: CssRect,
}

/// Formats proxies one per line, numbered from 1, with rounded sizes.
#[must_use]
pub fn format_listing(proxies: &[ProxyListing]) -> String {
    let mut out = String::new();
    for (index, proxy) in proxies.iter().enumerate() {
        let _ = writeln!(
            out,
            "{}. \"{}\" - {:.0}x{:.0} px",
            index + 1,
            proxy.label,
            proxy.position.width,
            proxy.position.height,
        );
    }
    out
}

/// One-line status after toggling debug visuals.
#[must_use]
pub fn debug_status(debug_visible: bool) -> String {
    format!("debug visuals: {}", on_off(debug_visible))
}

/// One-line status after toggling pointer passthrough.
#[must_use]
pub fn pointer_status(pointer_passthrough: bool) -> String {
    let (events, architecture) = if pointer_passthrough {
        (PointerEvents::Auto, Architecture::DualLayer)
    } else {
        (PointerEvents::None, Architecture::Hybrid)
    };
    format!(
        "pointer events: {} ({})",
        events.as_css(),
        architecture.as_str()
    )
}
