// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Mapping from runtime physical pixels to page CSS pixels.
//!
//! The embedded runtime reports element rectangles in the physical pixel
//! space of its canvas backing store. Proxies live in page CSS pixels, so
//! every rectangle is divided by the device pixel ratio and then offset by
//! the canvas's top-left corner on the page. No rotation, extra scaling or
//! clipping is applied.

use kurbo::{Point, Size};

/// A rectangle in the runtime's physical pixel space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PhysicalRect {
    /// Left edge, relative to the canvas origin.
    pub x: f64,
    /// Top edge, relative to the canvas origin.
    pub y: f64,
    /// Width in physical pixels.
    pub width: f64,
    /// Height in physical pixels.
    pub height: f64,
}

/// An absolutely positioned rectangle in page CSS pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize)]
pub struct CssRect {
    /// Value for the CSS `left` property.
    pub left: f64,
    /// Value for the CSS `top` property.
    pub top: f64,
    /// Value for the CSS `width` property.
    pub width: f64,
    /// Value for the CSS `height` property.
    pub height: f64,
}

/// Where the canvas sits on the page, and how dense its pixels are.
///
/// Recomputed for every synchronization; layout may have moved the canvas
/// since the last one.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CanvasGeometry {
    origin: Point,
    device_pixel_ratio: f64,
}

impl CanvasGeometry {
    /// Creates a geometry from the canvas's page origin (CSS pixels) and the
    /// current device pixel ratio.
    ///
    /// A ratio that is not a finite positive number is replaced by `1.0`,
    /// matching what browsers report when no ratio is available.
    #[must_use]
    pub fn new(origin: Point, device_pixel_ratio: f64) -> Self {
        let device_pixel_ratio = if device_pixel_ratio.is_finite() && device_pixel_ratio > 0.0 {
            device_pixel_ratio
        } else {
            1.0
        };
        Self {
            origin,
            device_pixel_ratio,
        }
    }

    /// Returns the canvas's top-left corner in page CSS pixels.
    #[must_use]
    pub const fn origin(&self) -> Point {
        self.origin
    }

    /// Returns the device pixel ratio used for conversion.
    #[must_use]
    pub const fn device_pixel_ratio(&self) -> f64 {
        self.device_pixel_ratio
    }

    /// Converts a physical rectangle into a page-positioned CSS rectangle.
    #[must_use]
    pub fn to_css(&self, rect: PhysicalRect) -> CssRect {
        let dpr = self.device_pixel_ratio;
        CssRect {
            left: self.origin.x + rect.x / dpr,
            top: self.origin.y + rect.y / dpr,
            width: rect.width / dpr,
            height: rect.height / dpr,
        }
    }
}

/// Reads the canvas placement from the host page.
///
/// Returns `None` when the canvas element cannot be found. That is an
/// integration fault and aborts the synchronization that asked.
pub trait CanvasLocator {
    /// Returns the current geometry of the runtime's canvas.
    fn canvas_geometry(&self) -> Option<CanvasGeometry>;
}

/// Largest size with the given aspect ratio that fits inside `container`.
///
/// A degenerate container or ratio returns `container` unchanged.
#[must_use]
pub fn fit_to_aspect(container: Size, aspect_ratio: f64) -> Size {
    if !(aspect_ratio.is_finite() && aspect_ratio > 0.0) || container.height <= 0.0 {
        return container;
    }
    if container.width / container.height > aspect_ratio {
        Size::new(container.height * aspect_ratio, container.height)
    } else {
        Size::new(container.width, container.width / aspect_ratio)
    }
}
