// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Backend contract for platform integrations.
//!
//! Driftline splits platform-specific work into *backend* crates. Each
//! backend provides the following pieces:
//!
//! - **Signal source** — Forwards the platform's native scroll notification
//!   (e.g. a passive DOM `scroll` listener) to
//!   [`Broadcaster::signal`](crate::broadcaster::Broadcaster::signal). This
//!   is backend-specific and not abstracted by a trait because listener
//!   setup and lifecycle differ fundamentally across hosts.
//!
//! - **Frame scheduler** — Implements [`FrameScheduler`] to run one unit of
//!   deferred work at the next frame boundary (e.g.
//!   `requestAnimationFrame`; a headless host may use the next macrotask).
//!
//! - **Page probe** — Implements [`PageProbe`] to read the page's current
//!   scroll offset and document/viewport geometry.
//!
//! # Crate boundaries
//!
//! `driftline_core` owns the broadcast state machine, metrics derivation,
//! and this contract module. Backend crates depend on `driftline_core` and
//! provide platform glue. Application code depends on both and wires them
//! together at start-up, passing the constructed broadcaster to whichever
//! components need it.

use alloc::boxed::Box;

use crate::geometry::PageGeometry;

/// Schedules a unit of work to run once at the next frame boundary.
///
/// The broadcaster guarantees it schedules at most one unit of work at a
/// time; implementations do not need to queue more than one.
///
/// # Contract
///
/// - `schedule` must **not** run `work` synchronously; it runs after
///   `schedule` returns, at the implementation's next frame boundary.
/// - [`cancel`](Self::cancel) prevents a still-pending unit of work from
///   running. Cancelling a handle whose work already ran (or was already
///   cancelled) is a no-op.
pub trait FrameScheduler {
    /// Token identifying one scheduled unit of work, usable for cancellation.
    type Handle;

    /// Schedules `work` to run once before the next frame is rendered.
    fn schedule(&self, work: Box<dyn FnOnce()>) -> Self::Handle;

    /// Cancels a pending unit of work, if it has not run yet.
    fn cancel(&self, handle: Self::Handle);
}

/// Reads the page's current scroll state.
///
/// Called exactly once per notify cycle, at the frame boundary, so that all
/// subscribers in that cycle observe the same snapshot. Implementations are
/// synchronous and infallible; a backend that cannot produce a sensible
/// measurement should return zeroed geometry rather than panic.
pub trait PageProbe {
    /// Returns the instantaneous page geometry.
    fn geometry(&self) -> PageGeometry;
}
