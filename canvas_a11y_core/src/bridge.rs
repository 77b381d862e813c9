// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Outbound message contract with the embedded runtime.
//!
//! Every call is fire-and-forget: a named method on a fixed logical target,
//! with at most one string argument. Replies, if any, arrive later through
//! the inbound entry point and are not correlated with requests.

use alloc::collections::VecDeque;
use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use core::cell::RefCell;

use kurbo::Size;

use crate::payload::ElementId;

/// Logical target that receives overlay messages inside the runtime.
pub const DEFAULT_TARGET: &str = "AccessibilityManager";

/// A message sent from the overlay to the runtime.
#[derive(Clone, Debug, PartialEq)]
pub enum OutboundMessage {
    /// Ask for a full element list.
    RequestFullSync,
    /// A proxy was activated.
    ProxyClicked(ElementId),
    /// The canvas changed size, in CSS pixels.
    CanvasResized(Size),
}

impl OutboundMessage {
    /// The runtime method name this message invokes.
    #[must_use]
    pub const fn method(&self) -> &'static str {
        match self {
            Self::RequestFullSync => "RequestFullSyncFromJS",
            Self::ProxyClicked(_) => "OnProxyElementClicked",
            Self::CanvasResized(_) => "OnCanvasResized",
        }
    }

    /// The single string argument, if the method takes one.
    #[must_use]
    pub fn argument(&self) -> Option<String> {
        match self {
            Self::RequestFullSync => None,
            Self::ProxyClicked(id) => Some(String::from(id.as_str())),
            Self::CanvasResized(size) => Some(format!("{},{}", size.width, size.height)),
        }
    }
}

/// Failure reported by a bridge implementation while sending.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("runtime call `{method}` failed: {reason}")]
pub struct BridgeError {
    /// The method that was being invoked.
    pub method: &'static str,
    /// What the host reported.
    pub reason: String,
}

/// A connected runtime instance that can receive named messages.
///
/// Implementations deliver the message and return immediately; nothing is
/// awaited.
pub trait RuntimeBridge {
    /// Sends `message` to `target`.
    fn send(&mut self, target: &str, message: &OutboundMessage) -> Result<(), BridgeError>;
}

/// A message waiting in an [`Outbox`].
#[derive(Clone, Debug, PartialEq)]
pub struct Envelope {
    /// Logical runtime target.
    pub target: String,
    /// The message itself.
    pub message: OutboundMessage,
}

/// A [`RuntimeBridge`] that queues messages instead of delivering them.
///
/// Runtimes may answer synchronously from inside their message handler,
/// calling back into the overlay before `send` returns. Sending through an
/// `Outbox` lets the caller release its own state first and deliver with
/// [`flush`] afterwards. Clones share one queue.
#[derive(Clone, Debug, Default)]
pub struct Outbox {
    queue: Rc<RefCell<VecDeque<Envelope>>>,
}

impl Outbox {
    /// Creates an empty outbox.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes the oldest queued message.
    pub fn pop(&self) -> Option<Envelope> {
        self.queue.borrow_mut().pop_front()
    }

    /// Number of queued messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.queue.borrow().is_empty()
    }
}

impl RuntimeBridge for Outbox {
    fn send(&mut self, target: &str, message: &OutboundMessage) -> Result<(), BridgeError> {
        self.queue.borrow_mut().push_back(Envelope {
            target: String::from(target),
            message: message.clone(),
        });
        Ok(())
    }
}

/// Delivers everything queued in `outbox` through `bridge`, oldest first.
///
/// The queue is not borrowed while `bridge` runs, so messages queued by
/// re-entrant calls are delivered by the same flush, after the current one.
/// Failures are logged and do not stop later messages. Returns the number
/// of messages delivered successfully.
pub fn flush<B: RuntimeBridge + ?Sized>(outbox: &Outbox, bridge: &mut B) -> usize {
    let mut delivered = 0;
    while let Some(envelope) = outbox.pop() {
        log::debug!(
            "delivering `{}` to {}",
            envelope.message.method(),
            envelope.target
        );
        match bridge.send(&envelope.target, &envelope.message) {
            Ok(()) => delivered += 1,
            Err(err) => log::error!("{err}"),
        }
    }
    delivered
}
