// Copyright 2026 the Canvas A11y Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Accessibility overlay synchronization for canvas-rendered runtimes.
//!
//! An embedded runtime draws its whole UI into a `<canvas>`, which assistive
//! technology cannot see into. `canvas_a11y_core` keeps a layer of proxy
//! controls aligned with the widgets the runtime reports, so screen readers
//! and switch devices can discover and activate them. It is `no_std`
//! compatible (with `alloc`) and has no browser dependencies; platform glue
//! lives in `canvas_a11y_web`.
//!
//! # Architecture
//!
//! ```text
//!   first interaction / resize / mode toggle
//!       │
//!       ▼
//!   OverlaySession ──► RuntimeBridge::send(RequestFullSync)
//!                                  │
//!                 ┌────────────────┘  (asynchronous reply)
//!                 ▼
//!   OverlaySession::apply_payload()
//!       ├─► ElementList::parse()
//!       ├─► CanvasLocator::canvas_geometry()
//!       └─► pool::rebuild() ──► ProxyPresenter
//! ```
//!
//! **[`session`]** — The protocol state machine and session context: the
//! activation gate, the retry-until-ready handshake, resize re-sync, and
//! mode switching.
//!
//! **[`geometry`]** — Physical-pixel to CSS-pixel transform and canvas
//! fitting.
//!
//! **[`payload`]** — Strict schema for inbound element lists.
//!
//! **[`pool`]** — Full-teardown proxy rebuild against the
//! [`ProxyPresenter`](pool::ProxyPresenter) trait.
//!
//! **[`mode`]** — Presentation mode and the managed stylesheet.
//!
//! **[`bridge`]** — Outbound message contract and the
//! [`RuntimeBridge`](bridge::RuntimeBridge) trait. Hosts whose runtime may
//! answer re-entrantly send through an [`Outbox`](bridge::Outbox) and
//! [`flush`](bridge::flush) it once their own state is released.
//!
//! **[`config`]** — Page configuration.
//!
//! **[`diagnostics`]** — Console summaries.
//!
//! # Logging
//!
//! The crate logs through the [`log`] facade and never installs a logger.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables `std` support in dependencies.

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

pub mod bridge;
pub mod config;
pub mod diagnostics;
pub mod geometry;
pub mod mode;
pub mod payload;
pub mod pool;
pub mod session;
