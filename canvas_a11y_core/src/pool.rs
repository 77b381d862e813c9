// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Proxy element pool.
//!
//! Turns an [`ElementList`] into [`ProxySpec`]s and hands them to a
//! [`ProxyPresenter`], which owns the actual stand-ins. Every rebuild tears
//! the previous set down completely; there is no diffing by id.

use alloc::string::String;
use alloc::vec::Vec;

use crate::geometry::{CanvasGeometry, CssRect};
use crate::mode::PresentationMode;
use crate::payload::{ElementId, ElementList};

/// Everything a presenter needs to create one proxy.
#[derive(Clone, Debug, PartialEq)]
pub struct ProxySpec {
    /// Id of the descriptor this proxy stands in for.
    pub id: ElementId,
    /// Accessible label, verbatim from the descriptor.
    pub label: String,
    /// Page position and size in CSS pixels.
    pub rect: CssRect,
    /// Whether activating the proxy notifies the runtime.
    pub routes_clicks: bool,
}

/// Owns the live proxy stand-ins in a host presentation tree.
///
/// The DOM pool implements this in the web backend; tests use in-memory
/// doubles.
pub trait ProxyPresenter {
    /// Removes every proxy currently presented.
    fn clear(&mut self);

    /// Creates one proxy.
    fn insert(&mut self, proxy: ProxySpec);

    /// Number of proxies currently presented.
    fn proxy_count(&self) -> usize;
}

/// Builds proxy specs for `list` without touching any presenter.
#[must_use]
pub fn plan(list: ElementList, geometry: &CanvasGeometry, mode: PresentationMode) -> Vec<ProxySpec> {
    list.elements
        .into_iter()
        .map(|element| {
            let rect = geometry.to_css(element.physical_rect());
            ProxySpec {
                id: element.id,
                label: element.label,
                rect,
                routes_clicks: mode.pointer_passthrough,
            }
        })
        .collect()
}

/// Replaces every proxy in `presenter` with one per descriptor in `list`.
///
/// Returns the number of proxies created.
pub fn rebuild<P: ProxyPresenter + ?Sized>(
    presenter: &mut P,
    list: ElementList,
    geometry: &CanvasGeometry,
    mode: PresentationMode,
) -> usize {
    let specs = plan(list, geometry, mode);
    let count = specs.len();
    presenter.clear();
    for spec in specs {
        presenter.insert(spec);
    }
    count
}
