// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Synchronization protocol state machine.
//!
//! [`OverlaySession`] is the single context object for one page session. It
//! owns the activation state, the presentation mode and the runtime handle,
//! and decides when sync requests go out over the bridge.
//!
//! ```text
//!   Idle ──arm()──► AwaitingFirstInteraction ──activate()──► RequestingSync
//!                                                                │
//!                       runtime attached, or retry tick finds it │
//!                                                                ▼
//!                                                             Active
//! ```
//!
//! The session never sleeps or owns a timer. When a request has to wait for
//! the runtime, it returns [`RequestOutcome::ScheduleRetry`] and the host
//! arms a one-shot timer that later calls [`OverlaySession::retry_elapsed`].
//! At most one retry is pending at any time.

use alloc::string::String;

use kurbo::Size;

use crate::bridge::{DEFAULT_TARGET, OutboundMessage, RuntimeBridge};
use crate::config::{DEFAULT_RETRY_INTERVAL_MS, OverlayConfig};
use crate::diagnostics::ModeSummary;
use crate::geometry::CanvasLocator;
use crate::mode::{PresentationMode, StyleSink};
use crate::payload::{ElementId, ElementList, PayloadError};
use crate::pool::{self, ProxyPresenter};

/// Where the session is in the activation protocol.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    /// Not wired to any user gesture yet.
    Idle,
    /// Waiting for the first pointer or touch interaction.
    AwaitingFirstInteraction,
    /// Activated; the first sync request is waiting for the runtime.
    RequestingSync,
    /// The first sync request went out. Terminal.
    Active,
}

/// What happened to a sync request.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RequestOutcome {
    /// The request was handed to the runtime.
    Dispatched,
    /// No runtime yet. The host must call
    /// [`OverlaySession::retry_elapsed`] after `after_ms` milliseconds.
    ScheduleRetry {
        /// Delay before the next attempt.
        after_ms: u32,
    },
    /// No runtime yet, and a retry is already scheduled.
    RetryPending,
    /// Nothing was sent.
    Dropped,
}

/// Result of an activation trigger.
#[must_use]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Activation {
    /// This trigger activated the overlay.
    Activated(RequestOutcome),
    /// The overlay was already activated; nothing happened.
    AlreadyActivated,
}

/// Why an inbound payload was not applied.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// Payloads are ignored until the first interaction activates the overlay.
    #[error("overlay is not active yet")]
    Inactive,
    /// The payload could not be parsed.
    #[error(transparent)]
    Payload(#[from] PayloadError),
    /// The runtime's canvas is not in the document.
    #[error("runtime canvas element not found")]
    CanvasMissing,
}

/// Static options for a session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionOptions {
    /// Logical runtime target for outbound messages.
    pub target: String,
    /// Delay between sync attempts while no runtime is attached.
    pub retry_interval_ms: u32,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            target: String::from(DEFAULT_TARGET),
            retry_interval_ms: DEFAULT_RETRY_INTERVAL_MS,
        }
    }
}

impl From<&OverlayConfig> for SessionOptions {
    fn from(config: &OverlayConfig) -> Self {
        Self {
            target: config.bridge_target.clone(),
            retry_interval_ms: config.retry_interval_ms,
        }
    }
}

/// The overlay's state for one page session.
#[derive(Debug)]
pub struct OverlaySession<B> {
    options: SessionOptions,
    phase: Phase,
    mode: PresentationMode,
    runtime: Option<B>,
    retry_pending: bool,
}

impl<B: RuntimeBridge> OverlaySession<B> {
    /// Creates an idle session with no runtime attached.
    #[must_use]
    pub fn new(options: SessionOptions, mode: PresentationMode) -> Self {
        Self {
            options,
            phase: Phase::Idle,
            mode,
            runtime: None,
            retry_pending: false,
        }
    }

    /// Returns the current protocol phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns `true` once the first sync request has gone out.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        matches!(self.phase, Phase::Active)
    }

    /// Returns `true` once an activation trigger has been accepted.
    #[must_use]
    pub const fn is_activated(&self) -> bool {
        matches!(self.phase, Phase::RequestingSync | Phase::Active)
    }

    /// Returns the current presentation mode.
    #[must_use]
    pub const fn mode(&self) -> PresentationMode {
        self.mode
    }

    /// Returns `true` if a runtime instance is attached.
    #[must_use]
    pub const fn has_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Returns `true` while a retry timer is expected to be armed.
    #[must_use]
    pub const fn retry_pending(&self) -> bool {
        self.retry_pending
    }

    /// Moves from `Idle` to `AwaitingFirstInteraction`.
    ///
    /// Returns `true` if the host should install first-interaction
    /// listeners; `false` if the session was already armed or activated.
    pub fn arm(&mut self) -> bool {
        if self.phase != Phase::Idle {
            return false;
        }
        self.phase = Phase::AwaitingFirstInteraction;
        true
    }

    /// Handles an activation trigger (the first user interaction).
    ///
    /// Only the first trigger does anything.
    pub fn activate(&mut self) -> Activation {
        if self.is_activated() {
            return Activation::AlreadyActivated;
        }
        log::info!("first interaction detected, activating accessibility overlay");
        self.phase = Phase::RequestingSync;
        Activation::Activated(self.request_sync())
    }

    /// Asks the runtime for a full element list.
    ///
    /// Before activation this is a no-op. While the first request is
    /// waiting for the runtime, repeated calls share a single retry. Once
    /// active, a missing runtime drops the request instead of retrying.
    pub fn request_sync(&mut self) -> RequestOutcome {
        match self.phase {
            Phase::Idle | Phase::AwaitingFirstInteraction => {
                log::debug!("sync request ignored, overlay not activated");
                RequestOutcome::Dropped
            }
            Phase::RequestingSync => {
                if self.runtime.is_some() {
                    self.phase = Phase::Active;
                    self.retry_pending = false;
                    self.dispatch(&OutboundMessage::RequestFullSync)
                } else if self.retry_pending {
                    RequestOutcome::RetryPending
                } else {
                    log::info!("waiting for runtime instance before syncing");
                    self.retry_pending = true;
                    RequestOutcome::ScheduleRetry {
                        after_ms: self.options.retry_interval_ms,
                    }
                }
            }
            Phase::Active => {
                if self.runtime.is_some() {
                    self.dispatch(&OutboundMessage::RequestFullSync)
                } else {
                    log::warn!("sync request dropped, runtime instance missing");
                    RequestOutcome::Dropped
                }
            }
        }
    }

    /// Called by the host when a timer armed by
    /// [`RequestOutcome::ScheduleRetry`] fires.
    pub fn retry_elapsed(&mut self) -> RequestOutcome {
        if !self.retry_pending {
            return RequestOutcome::Dropped;
        }
        self.retry_pending = false;
        if self.phase != Phase::RequestingSync {
            return RequestOutcome::Dropped;
        }
        self.request_sync()
    }

    /// Attaches the runtime instance once its loader resolves.
    ///
    /// A sync request that was waiting for the runtime is dispatched right
    /// away; the host should then cancel its retry timer.
    pub fn attach_runtime(&mut self, runtime: B) -> RequestOutcome {
        self.runtime = Some(runtime);
        log::debug!("runtime instance attached");
        if self.phase == Phase::RequestingSync {
            self.request_sync()
        } else {
            RequestOutcome::Dropped
        }
    }

    /// Reports a canvas resize and re-syncs so proxy geometry stays current.
    ///
    /// Does nothing until the session is active.
    pub fn canvas_resized(&mut self, size: Size) -> RequestOutcome {
        if !self.is_active() {
            return RequestOutcome::Dropped;
        }
        if self.runtime.is_none() {
            log::warn!("resize not reported, runtime instance missing");
            return RequestOutcome::Dropped;
        }
        let _ = self.dispatch(&OutboundMessage::CanvasResized(size));
        self.request_sync()
    }

    /// Forwards a proxy activation to the runtime.
    pub fn proxy_clicked(&mut self, id: &ElementId) -> RequestOutcome {
        if self.runtime.is_none() {
            log::warn!("click on {id} dropped, runtime instance missing");
            return RequestOutcome::Dropped;
        }
        self.dispatch(&OutboundMessage::ProxyClicked(id.clone()))
    }

    /// Switches presentation mode.
    ///
    /// The managed stylesheet is replaced first; then, if the session is
    /// active, exactly one sync request goes out so existing proxies are
    /// rebuilt under the new rules.
    pub fn set_mode<S: StyleSink + ?Sized>(
        &mut self,
        mode: PresentationMode,
        styles: &mut S,
    ) -> RequestOutcome {
        self.mode = mode;
        styles.replace_stylesheet(&mode.stylesheet());
        log::info!(
            "presentation mode: {} visuals, pointer-events {} ({})",
            mode.visibility_tag(),
            mode.pointer_events().as_css(),
            mode.architecture().as_str(),
        );
        if self.is_active() {
            self.request_sync()
        } else {
            RequestOutcome::Dropped
        }
    }

    /// Flips debug visibility. See [`set_mode`](Self::set_mode).
    pub fn toggle_debug<S: StyleSink + ?Sized>(&mut self, styles: &mut S) -> RequestOutcome {
        self.set_mode(self.mode.toggled_debug(), styles)
    }

    /// Flips pointer passthrough. See [`set_mode`](Self::set_mode).
    pub fn toggle_pointer_passthrough<S: StyleSink + ?Sized>(
        &mut self,
        styles: &mut S,
    ) -> RequestOutcome {
        self.set_mode(self.mode.toggled_pointer_passthrough(), styles)
    }

    /// Applies an inbound payload to the proxy pool.
    ///
    /// The payload is parsed and the canvas located before anything is
    /// removed, so a failure leaves the previous proxies in place. Failures
    /// are logged here; the returned error is informational.
    pub fn apply_payload<L, P>(
        &mut self,
        text: &str,
        locator: &L,
        presenter: &mut P,
    ) -> Result<usize, SyncError>
    where
        L: CanvasLocator + ?Sized,
        P: ProxyPresenter + ?Sized,
    {
        if !self.is_activated() {
            log::debug!("payload ignored, overlay not activated");
            return Err(SyncError::Inactive);
        }
        let list = match ElementList::parse(text) {
            Ok(list) => list,
            Err(err) => {
                log::error!("malformed accessibility payload: {err}");
                log::error!("payload received: {text}");
                return Err(err.into());
            }
        };
        let Some(geometry) = locator.canvas_geometry() else {
            log::error!("runtime canvas element not found, sync aborted");
            return Err(SyncError::CanvasMissing);
        };
        let count = pool::rebuild(presenter, list, &geometry, self.mode);
        log::info!(
            "[{}] {count} proxy elements created ({})",
            self.mode.visibility_tag(),
            self.mode.architecture().as_str(),
        );
        Ok(count)
    }

    /// Snapshot of the session for diagnostics.
    #[must_use]
    pub fn summary(&self, proxy_count: usize, device_pixel_ratio: f64) -> ModeSummary {
        ModeSummary {
            active: self.is_activated(),
            debug_mode: self.mode.debug_visible,
            pointer_events: self.mode.pointer_passthrough,
            architecture: self.mode.architecture(),
            proxy_count,
            device_pixel_ratio,
        }
    }

    fn dispatch(&mut self, message: &OutboundMessage) -> RequestOutcome {
        let Some(runtime) = self.runtime.as_mut() else {
            return RequestOutcome::Dropped;
        };
        log::debug!("sending `{}` to {}", message.method(), self.options.target);
        match runtime.send(&self.options.target, message) {
            Ok(()) => RequestOutcome::Dispatched,
            Err(err) => {
                log::error!("{err}");
                RequestOutcome::Dropped
            }
        }
    }
}
