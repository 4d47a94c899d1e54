// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Frame-coalesced scroll broadcast engine.
//!
//! `driftline_core` provides the state machine that turns a browser's
//! high-frequency `scroll` events into at-most-one-per-frame
//! measurement-and-notify cycles, fanned out to registered subscribers. It is
//! `no_std` compatible (with `alloc`) and single-threaded by design: all
//! "concurrency" is the interleaving of scroll signals, frame callbacks, and
//! subscriber-triggered mutations on one UI thread.
//!
//! # Architecture
//!
//! The crate is organized around one deferred cycle per rendering frame:
//!
//! ```text
//!   Backend (scroll listener)
//!       │ many per frame
//!       ▼
//!   Broadcaster::signal() ──► FrameScheduler::schedule()   (coalesced:
//!       │                                                   at most one
//!       ▼ next frame boundary                               cycle pending)
//!   notify cycle: PageProbe::geometry() ──► ScrollMetrics
//!       │
//!       ▼ same snapshot to every subscriber
//!   callbacks ──► NavTracker / RevealLatch (consumer-side state)
//! ```
//!
//! **[`geometry`]** — [`PageGeometry`](geometry::PageGeometry) read fresh
//! each cycle and the derived [`ScrollMetrics`](geometry::ScrollMetrics)
//! snapshot pushed to subscribers.
//!
//! **[`backend`]** — The [`FrameScheduler`](backend::FrameScheduler) and
//! [`PageProbe`](backend::PageProbe) traits that backend crates implement.
//!
//! **[`broadcaster`]** — The [`Broadcaster`](broadcaster::Broadcaster)
//! itself: subscribe/unsubscribe bookkeeping, pending-flag coalescing,
//! snapshot-then-iterate notification, idempotent teardown.
//!
//! **[`section`]** — Consumer-side section geometry: visible fraction of a
//! bounding rect and the one-way reveal latch that drives entrance
//! animations.
//!
//! **[`nav`]** — Active-section resolution for a navigation bar: which
//! section's box straddles a fixed reference line, plus the condensed-bar
//! threshold.
//!
//! **[`trace`]** — [`TraceSink`](trace::TraceSink) trait and event types for
//! instrumentation, with zero-overhead [`Tracer`](trace::Tracer) wrapper.
//!
//! # Crate features
//!
//! - `std` (disabled by default): Enables subscriber panic isolation via
//!   `catch_unwind`. Without it, a panicking subscriber unwinds through the
//!   notify cycle.
//! - `trace` (disabled by default): Enables `Tracer` method bodies (one
//!   branch per call site).

#![no_std]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]

extern crate alloc;

#[cfg(any(test, feature = "std"))]
extern crate std;

pub mod backend;
pub mod broadcaster;
pub mod geometry;
pub mod nav;
pub mod section;
pub mod trace;
