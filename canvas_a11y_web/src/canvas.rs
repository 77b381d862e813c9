// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Locating and fitting the runtime's canvas.

use canvas_a11y_core::geometry::{CanvasGeometry, CanvasLocator, fit_to_aspect};
use kurbo::{Point, Size};
use wasm_bindgen::JsCast as _;
use web_sys::{Element, HtmlElement, Window};

/// Finds the canvas by id on every call; layout may change between syncs.
#[derive(Debug)]
pub struct DomCanvas {
    window: Window,
    canvas_id: String,
}

impl DomCanvas {
    /// Creates a locator for `<canvas id="{canvas_id}">`.
    #[must_use]
    pub fn new(window: Window, canvas_id: impl Into<String>) -> Self {
        Self {
            window,
            canvas_id: canvas_id.into(),
        }
    }

    /// Current device pixel ratio of the window.
    #[must_use]
    pub fn device_pixel_ratio(&self) -> f64 {
        self.window.device_pixel_ratio()
    }

    fn element(&self) -> Option<Element> {
        self.window
            .document()?
            .get_element_by_id(&self.canvas_id)
    }

    /// Fits the canvas into its parent at `aspect_ratio`, if given, and
    /// returns the canvas's resulting client size in CSS pixels.
    ///
    /// Returns `None` if the canvas is not in the document.
    pub fn fit(&self, aspect_ratio: Option<f64>) -> Option<Size> {
        let canvas: HtmlElement = self.element()?.dyn_into().ok()?;
        if let (Some(ratio), Some(parent)) = (aspect_ratio, canvas.parent_element()) {
            let container = Size::new(
                f64::from(parent.client_width()),
                f64::from(parent.client_height()),
            );
            let fitted = fit_to_aspect(container, ratio);
            let style = canvas.style();
            let _ = style.set_property("width", &format!("{}px", fitted.width));
            let _ = style.set_property("height", &format!("{}px", fitted.height));
        }
        Some(Size::new(
            f64::from(canvas.client_width()),
            f64::from(canvas.client_height()),
        ))
    }
}

impl CanvasLocator for DomCanvas {
    fn canvas_geometry(&self) -> Option<CanvasGeometry> {
        let rect = self.element()?.get_bounding_client_rect();
        Some(CanvasGeometry::new(
            Point::new(rect.left(), rect.top()),
            self.device_pixel_ratio(),
        ))
    }
}
