// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page-level event subscriptions.
//!
//! Both types detach their listeners when dropped.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_events::{EventListener, EventListenerOptions, EventListenerPhase};
use gloo_timers::callback::Timeout;
use web_sys::EventTarget;

/// Events that count as the first user interaction.
pub const FIRST_INTERACTION_EVENTS: [&str; 2] = ["pointerdown", "touchstart"];

/// A subscribe-once gate on the first pointer or touch interaction.
///
/// Each listener is passive, fires at most once, and never prevents the
/// page's default handling. `on_first` runs at most once overall, even if
/// both events fire for the same gesture.
pub struct FirstInteraction {
    listeners: Vec<EventListener>,
}

impl core::fmt::Debug for FirstInteraction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FirstInteraction")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl FirstInteraction {
    /// Subscribes to the first interaction on `target`.
    pub fn subscribe(target: &EventTarget, on_first: impl FnOnce() + 'static) -> Self {
        let on_first = Rc::new(RefCell::new(Some(on_first)));
        let listeners = FIRST_INTERACTION_EVENTS
            .iter()
            .map(|&event_type| {
                let on_first = Rc::clone(&on_first);
                let options = EventListenerOptions {
                    phase: EventListenerPhase::Bubble,
                    passive: true,
                };
                EventListener::once_with_options(target, event_type, options, move |_| {
                    let callback = on_first.borrow_mut().take();
                    if let Some(callback) = callback {
                        callback();
                    }
                })
            })
            .collect();
        Self { listeners }
    }
}

/// Debounced window resize subscription.
pub struct ResizeWatcher {
    _listener: EventListener,
}

impl core::fmt::Debug for ResizeWatcher {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ResizeWatcher").finish_non_exhaustive()
    }
}

impl ResizeWatcher {
    /// Calls `on_resize` once `debounce_ms` has passed without another
    /// `resize` event on `target`.
    pub fn subscribe(target: &EventTarget, debounce_ms: u32, on_resize: impl Fn() + 'static) -> Self {
        let on_resize = Rc::new(on_resize);
        let pending: Rc<RefCell<Option<Timeout>>> = Rc::new(RefCell::new(None));
        let listener = EventListener::new(target, "resize", move |_| {
            let on_resize = Rc::clone(&on_resize);
            // Replacing the timeout cancels the previous one.
            let timeout = Timeout::new(debounce_ms, move || on_resize());
            *pending.borrow_mut() = Some(timeout);
        });
        Self {
            _listener: listener,
        }
    }
}
