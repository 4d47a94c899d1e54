// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Tracing and diagnostics for the broadcast loop.
//!
//! This module provides a [`TraceSink`] trait with per-event methods that the
//! broadcaster calls at each stage. All method bodies default to no-ops, so
//! implementing only the events you care about is fine.
//!
//! [`Tracer`] wraps an optional `Box<dyn TraceSink>`. When the `trace`
//! feature is **off**, every `Tracer` method compiles to nothing (zero
//! overhead). When **on**, each method performs a single `Option` branch
//! before dispatching.
//!
//! # Crate features
//!
//! - `trace` — enables the `Tracer` method bodies (one branch per call).

use crate::broadcaster::Subscription;
use crate::geometry::ScrollMetrics;

// ---------------------------------------------------------------------------
// Event structs
// ---------------------------------------------------------------------------

/// Emitted for every raw scroll signal delivered to the broadcaster.
#[derive(Clone, Copy, Debug)]
pub struct SignalEvent {
    /// `true` when a cycle was already pending and this signal was collapsed
    /// into it; `false` when this signal scheduled a new cycle.
    pub coalesced: bool,
}

/// Emitted at the end of each notify cycle.
#[derive(Clone, Copy, Debug)]
pub struct CycleEvent {
    /// The snapshot delivered to every subscriber in this cycle.
    pub metrics: ScrollMetrics,
    /// How many subscribers were invoked.
    pub notified: u32,
    /// Monotonic cycle counter.
    pub cycle_index: u64,
}

/// Emitted when a subscriber panics during notification (requires the core's
/// `std` feature; without it the panic propagates instead).
#[derive(Clone, Copy, Debug)]
pub struct SubscriberPanicEvent {
    /// Handle of the faulting subscriber.
    pub subscription: Subscription,
    /// Cycle in which the fault occurred.
    pub cycle_index: u64,
}

// ---------------------------------------------------------------------------
// TraceSink
// ---------------------------------------------------------------------------

/// Receives broadcast-loop events. All methods default to no-ops.
pub trait TraceSink {
    /// A raw scroll signal arrived.
    fn on_signal(&mut self, e: &SignalEvent) {
        _ = e;
    }

    /// A notify cycle completed.
    fn on_cycle(&mut self, e: &CycleEvent) {
        _ = e;
    }

    /// A subscriber panicked and was isolated.
    fn on_subscriber_panic(&mut self, e: &SubscriberPanicEvent) {
        _ = e;
    }

    /// The broadcaster was torn down.
    fn on_teardown(&mut self) {}
}

// ---------------------------------------------------------------------------
// Tracer
// ---------------------------------------------------------------------------

/// Zero-overhead dispatch wrapper over an optional [`TraceSink`].
///
/// The broadcaster owns its tracer for the lifetime of the page, so the sink
/// is boxed rather than borrowed.
pub struct Tracer {
    #[cfg(feature = "trace")]
    sink: Option<alloc::boxed::Box<dyn TraceSink>>,
    #[cfg(not(feature = "trace"))]
    _marker: core::marker::PhantomData<()>,
}

impl core::fmt::Debug for Tracer {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        #[cfg(feature = "trace")]
        let enabled = self.sink.is_some();
        #[cfg(not(feature = "trace"))]
        let enabled = false;
        f.debug_struct("Tracer").field("enabled", &enabled).finish()
    }
}

impl Tracer {
    /// Creates a tracer that forwards events to `sink`.
    ///
    /// With the `trace` feature disabled the sink is dropped and all methods
    /// compile to nothing.
    #[must_use]
    pub fn new(sink: alloc::boxed::Box<dyn TraceSink>) -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: Some(sink) }
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = sink;
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Creates a tracer that discards all events.
    #[inline]
    #[must_use]
    pub fn none() -> Self {
        #[cfg(feature = "trace")]
        {
            Self { sink: None }
        }
        #[cfg(not(feature = "trace"))]
        {
            Self {
                _marker: core::marker::PhantomData,
            }
        }
    }

    /// Emits a [`SignalEvent`].
    #[inline]
    pub fn signal(&mut self, e: &SignalEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_signal(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`CycleEvent`].
    #[inline]
    pub fn cycle(&mut self, e: &CycleEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_cycle(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a [`SubscriberPanicEvent`].
    #[inline]
    pub fn subscriber_panic(&mut self, e: &SubscriberPanicEvent) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_subscriber_panic(e);
        }
        #[cfg(not(feature = "trace"))]
        {
            _ = e;
        }
    }

    /// Emits a teardown event.
    #[inline]
    pub fn teardown(&mut self) {
        #[cfg(feature = "trace")]
        if let Some(s) = &mut self.sink {
            s.on_teardown();
        }
    }
}

impl Default for Tracer {
    fn default() -> Self {
        Self::none()
    }
}

#[cfg(all(test, feature = "trace"))]
mod tests {
    use super::*;
    use alloc::boxed::Box;
    use alloc::rc::Rc;
    use core::cell::RefCell;

    #[derive(Default)]
    struct CountingSink {
        signals: Rc<RefCell<(u32, u32)>>, // (total, coalesced)
    }

    impl TraceSink for CountingSink {
        fn on_signal(&mut self, e: &SignalEvent) {
            let mut counts = self.signals.borrow_mut();
            counts.0 += 1;
            if e.coalesced {
                counts.1 += 1;
            }
        }
    }

    #[test]
    fn tracer_dispatches_to_sink() {
        let counts = Rc::new(RefCell::new((0, 0)));
        let mut tracer = Tracer::new(Box::new(CountingSink {
            signals: Rc::clone(&counts),
        }));

        tracer.signal(&SignalEvent { coalesced: false });
        tracer.signal(&SignalEvent { coalesced: true });
        // Unimplemented events fall through to the default no-op.
        tracer.teardown();

        assert_eq!(*counts.borrow(), (2, 1));
    }

    #[test]
    fn none_tracer_discards_events() {
        let mut tracer = Tracer::none();
        tracer.signal(&SignalEvent { coalesced: false });
        tracer.teardown();
    }
}
