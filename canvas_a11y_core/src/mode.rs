// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Presentation mode and the managed proxy stylesheet.
//!
//! Two independent axes control how proxies look and behave:
//!
//! - **debug visibility**: proxies are painted magenta with a green border
//!   and an on-element label, for visual QA. Otherwise they are fully
//!   transparent.
//! - **pointer passthrough**: when enabled, proxies take pointer input
//!   (`pointer-events: auto`) and forward clicks to the runtime. When
//!   disabled, input falls through to the canvas (`pointer-events: none`).
//!
//! Every style rule targets [`PROXY_CLASS`], so one stylesheet covers all
//! proxies regardless of which payload created them.

use alloc::format;
use alloc::string::String;

/// CSS class carried by every proxy element.
pub const PROXY_CLASS: &str = "proxy-element";

/// The session-wide presentation state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PresentationMode {
    /// Paint proxies so they can be seen.
    pub debug_visible: bool,
    /// Let proxies take pointer input and route clicks to the runtime.
    pub pointer_passthrough: bool,
}

impl Default for PresentationMode {
    fn default() -> Self {
        Self::PRODUCTION
    }
}

/// The CSS `pointer-events` value applied to proxies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PointerEvents {
    /// Proxies receive pointer input.
    Auto,
    /// Pointer input passes through to the canvas.
    None,
}

impl PointerEvents {
    /// Returns the CSS keyword.
    #[must_use]
    pub const fn as_css(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::None => "none",
        }
    }
}

/// How input reaches the runtime for a given mode.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Architecture {
    /// Proxies catch clicks and forward them; the canvas also sees input.
    DualLayer,
    /// Proxies are for discovery only; input goes straight to the canvas.
    Hybrid,
}

impl Architecture {
    /// Returns a short label for diagnostics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::DualLayer => "dual-layer",
            Self::Hybrid => "hybrid-layer",
        }
    }
}

impl PresentationMode {
    /// Transparent proxies that take pointer input.
    pub const PRODUCTION: Self = Self {
        debug_visible: false,
        pointer_passthrough: true,
    };

    /// Creates a mode from its two axes.
    #[must_use]
    pub const fn new(debug_visible: bool, pointer_passthrough: bool) -> Self {
        Self {
            debug_visible,
            pointer_passthrough,
        }
    }

    /// Returns this mode with debug visibility flipped.
    #[must_use]
    pub const fn toggled_debug(self) -> Self {
        Self::new(!self.debug_visible, self.pointer_passthrough)
    }

    /// Returns this mode with pointer passthrough flipped.
    #[must_use]
    pub const fn toggled_pointer_passthrough(self) -> Self {
        Self::new(self.debug_visible, !self.pointer_passthrough)
    }

    /// The `pointer-events` value for proxies. Independent of debug mode.
    #[must_use]
    pub const fn pointer_events(self) -> PointerEvents {
        if self.pointer_passthrough {
            PointerEvents::Auto
        } else {
            PointerEvents::None
        }
    }

    /// The input architecture implied by pointer passthrough.
    #[must_use]
    pub const fn architecture(self) -> Architecture {
        if self.pointer_passthrough {
            Architecture::DualLayer
        } else {
            Architecture::Hybrid
        }
    }

    /// Short tag for log lines: `debug` or `production`.
    #[must_use]
    pub const fn visibility_tag(self) -> &'static str {
        if self.debug_visible {
            "debug"
        } else {
            "production"
        }
    }

    /// Renders the complete managed stylesheet for this mode.
    #[must_use]
    pub fn stylesheet(self) -> String {
        let pointer_events = self.pointer_events().as_css();
        if self.debug_visible {
            format!(
                "\
.{PROXY_CLASS} {{
  background-color: rgba(255, 0, 255, 0.4) !important;
  border: 2px solid #00FF00 !important;
  opacity: 1 !important;
  pointer-events: {pointer_events} !important;
}}
.{PROXY_CLASS}::after {{
  content: attr(aria-label);
  position: absolute;
  top: -20px;
  left: 0;
  background: #000;
  color: #fff;
  font-size: 10px;
  padding: 2px 4px;
  border-radius: 2px;
  white-space: nowrap;
  z-index: 1000;
  pointer-events: none;
}}
"
            )
        } else {
            format!(
                "\
.{PROXY_CLASS} {{
  background-color: transparent !important;
  border: none !important;
  opacity: 0 !important;
  pointer-events: {pointer_events} !important;
}}
.{PROXY_CLASS}::after {{
  display: none !important;
}}
"
            )
        }
    }
}

/// Owner of the single managed stylesheet in the host document.
pub trait StyleSink {
    /// Removes the previous managed stylesheet, if any, and inserts `css` in
    /// its place.
    fn replace_stylesheet(&mut self, css: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pointer_events_follow_passthrough_in_both_visibilities() {
        for debug in [false, true] {
            let on = PresentationMode::new(debug, true);
            let off = PresentationMode::new(debug, false);
            assert!(on.stylesheet().contains("pointer-events: auto !important"));
            assert!(off.stylesheet().contains("pointer-events: none !important"));
            assert!(!off.stylesheet().contains("pointer-events: auto"));
        }
    }

    #[test]
    fn debug_sheet_paints_and_labels_proxies() {
        let css = PresentationMode::new(true, true).stylesheet();
        assert!(css.contains(".proxy-element {"));
        assert!(css.contains("rgba(255, 0, 255, 0.4)"));
        assert!(css.contains("border: 2px solid #00FF00"));
        assert!(css.contains("content: attr(aria-label);"));
    }

    #[test]
    fn production_sheet_is_invisible() {
        let css = PresentationMode::PRODUCTION.stylesheet();
        assert!(css.contains("background-color: transparent !important"));
        assert!(css.contains("border: none !important"));
        assert!(css.contains("opacity: 0 !important"));
        assert!(css.contains("display: none !important"));
        assert!(!css.contains("attr(aria-label)"));
    }

    #[test]
    fn toggles_flip_one_axis() {
        let mode = PresentationMode::PRODUCTION;
        assert_eq!(mode.toggled_debug(), PresentationMode::new(true, true));
        assert_eq!(
            mode.toggled_pointer_passthrough(),
            PresentationMode::new(false, false)
        );
        assert_eq!(mode.toggled_debug().toggled_debug(), mode);
    }

    #[test]
    fn architecture_tracks_passthrough() {
        assert_eq!(
            PresentationMode::new(true, true).architecture(),
            Architecture::DualLayer
        );
        assert_eq!(
            PresentationMode::new(true, false).architecture(),
            Architecture::Hybrid
        );
        assert_eq!(Architecture::Hybrid.as_str(), "hybrid-layer");
    }
}
