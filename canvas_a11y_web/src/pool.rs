// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM proxy pool.
//!
//! Presents [`ProxySpec`]s as absolutely positioned `<button>` elements in
//! the overlay container. Every rebuild empties the container first.

use std::rc::Rc;

use canvas_a11y_core::diagnostics::ProxyListing;
use canvas_a11y_core::geometry::CssRect;
use canvas_a11y_core::mode::PROXY_CLASS;
use canvas_a11y_core::payload::ElementId;
use canvas_a11y_core::pool::{ProxyPresenter, ProxySpec};
use gloo_events::EventListener;
use wasm_bindgen::JsCast as _;
use web_sys::HtmlElement;

/// Called with the element id when a click-routing proxy is activated.
pub type ClickHandler = Rc<dyn Fn(&ElementId)>;

struct DomProxy {
    element: HtmlElement,
    // Dropping the listener detaches it.
    _click: Option<EventListener>,
}

/// Maps proxy specs to live `<button>` elements inside a container.
pub struct DomProxyPool {
    container: HtmlElement,
    proxies: Vec<DomProxy>,
    on_click: ClickHandler,
}

impl core::fmt::Debug for DomProxyPool {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DomProxyPool")
            .field("container", &"HtmlElement")
            .field("proxies_len", &self.proxies.len())
            .finish_non_exhaustive()
    }
}

impl DomProxyPool {
    /// Creates a pool that owns the children of `container`.
    #[must_use]
    pub fn new(container: HtmlElement, on_click: ClickHandler) -> Self {
        Self {
            container,
            proxies: Vec::new(),
            on_click,
        }
    }

    /// Returns the overlay container.
    #[must_use]
    pub fn container(&self) -> &HtmlElement {
        &self.container
    }

    /// Labels and laid-out rectangles of the current proxies.
    #[must_use]
    pub fn listing(&self) -> Vec<ProxyListing> {
        self.proxies
            .iter()
            .map(|proxy| {
                let rect = proxy.element.get_bounding_client_rect();
                ProxyListing {
                    label: proxy
                        .element
                        .get_attribute("aria-label")
                        .unwrap_or_default(),
                    position: CssRect {
                        left: rect.left(),
                        top: rect.top(),
                        width: rect.width(),
                        height: rect.height(),
                    },
                }
            })
            .collect()
    }

    fn create(&self, proxy: &ProxySpec) -> Option<HtmlElement> {
        let document = self.container.owner_document()?;
        let element: HtmlElement = document.create_element("button").ok()?.unchecked_into();
        element.set_class_name(PROXY_CLASS);
        let _ = element.set_attribute("type", "button");
        let _ = element.set_attribute("aria-label", &proxy.label);

        let style = element.style();
        let _ = style.set_property("position", "absolute");
        let _ = style.set_property("left", &format!("{}px", proxy.rect.left));
        let _ = style.set_property("top", &format!("{}px", proxy.rect.top));
        let _ = style.set_property("width", &format!("{}px", proxy.rect.width));
        let _ = style.set_property("height", &format!("{}px", proxy.rect.height));
        Some(element)
    }
}

impl ProxyPresenter for DomProxyPool {
    fn clear(&mut self) {
        for proxy in self.proxies.drain(..) {
            proxy.element.remove();
        }
        // Anything else left in the container is stale too.
        self.container.set_inner_html("");
    }

    fn insert(&mut self, proxy: ProxySpec) {
        let Some(element) = self.create(&proxy) else {
            log::error!("could not create proxy element for {}", proxy.id);
            return;
        };
        let click = proxy.routes_clicks.then(|| {
            let on_click = Rc::clone(&self.on_click);
            let id = proxy.id;
            EventListener::new(&element, "click", move |_| on_click(&id))
        });
        if let Err(err) = self.container.append_child(&element) {
            log::error!(
                "could not attach proxy element: {}",
                crate::runtime::describe(&err)
            );
            return;
        }
        self.proxies.push(DomProxy {
            element,
            _click: click,
        });
    }

    fn proxy_count(&self) -> usize {
        self.proxies.len()
    }
}
