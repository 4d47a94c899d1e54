// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The scroll broadcaster: one measurement per frame, fanned out to all
//! subscribers.
//!
//! [`Broadcaster`] is the single point of truth for "where is the page
//! scrolled to". A backend forwards every native scroll notification to
//! [`signal`](Broadcaster::signal); the broadcaster collapses bursts into at
//! most one deferred cycle per frame via its
//! [`FrameScheduler`](crate::backend::FrameScheduler). At the frame boundary
//! it reads the page once through its
//! [`PageProbe`](crate::backend::PageProbe) and pushes the same
//! [`ScrollMetrics`] snapshot to every registered subscriber.
//!
//! The broadcaster is an explicitly constructed, explicitly passed value:
//! create it once at application start-up and hand clones to whichever
//! components need scroll updates. Clones share state, so tests can build
//! isolated instances with harness doubles instead of fighting a global.
//!
//! # State machine
//!
//! Two states: *idle* (no cycle pending) and *pending* (a cycle is scheduled
//! but has not run). The first signal since the last cycle moves idle →
//! pending; each cycle clears the flag *before* notifying, so a signal
//! arriving mid-notification schedules a fresh cycle instead of being lost.
//! [`teardown`](Broadcaster::teardown) forces idle and cancels any scheduled
//! cycle.
//!
//! # Re-entrancy
//!
//! Subscribers may call [`subscribe`](Broadcaster::subscribe),
//! [`unsubscribe`](Broadcaster::unsubscribe), or even
//! [`signal`](Broadcaster::signal) from within their callback. Each cycle
//! iterates a snapshot of the registration ids taken at cycle start: a
//! subscriber removed mid-cycle is skipped, one added mid-cycle waits for
//! the next cycle, and no still-registered subscriber is skipped or
//! double-invoked.

use alloc::boxed::Box;
use alloc::rc::{Rc, Weak};
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};
use core::fmt;

use crate::backend::{FrameScheduler, PageProbe};
use crate::geometry::ScrollMetrics;
use crate::trace::{CycleEvent, SignalEvent, SubscriberPanicEvent, Tracer};

/// A registered scroll callback.
type ScrollCallback = Box<dyn FnMut(ScrollMetrics)>;

/// Handle returned by [`Broadcaster::subscribe`], used to unsubscribe.
///
/// Ids are monotonic and never reused, so a stale handle can never alias a
/// later registration.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
}

impl Subscription {
    /// Returns the raw registration id (for diagnostics only).
    #[inline]
    #[must_use]
    pub const fn id(self) -> u64 {
        self.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subscription({})", self.id)
    }
}

/// One slot in the registration set.
///
/// The callback is temporarily taken out of its slot while it runs, so a
/// callback can re-enter the broadcaster without overlapping borrows.
struct Entry {
    id: u64,
    callback: Option<ScrollCallback>,
}

struct Inner<S: FrameScheduler, P: PageProbe> {
    scheduler: S,
    probe: P,
    subscribers: RefCell<Vec<Entry>>,
    /// True between "a scroll signal arrived" and "the deferred cycle ran".
    pending: Cell<bool>,
    /// Cancellation token for the scheduled cycle, if one is in flight.
    scheduled: Cell<Option<S::Handle>>,
    next_id: Cell<u64>,
    cycle_count: Cell<u64>,
    torn_down: Cell<bool>,
    tracer: RefCell<Tracer>,
}

/// Frame-coalescing scroll broadcaster.
///
/// Cheap to clone; clones share the same registration set and pending state.
/// Single-threaded by design (`Rc` interior), matching the cooperative
/// event-driven model of a UI thread.
pub struct Broadcaster<S: FrameScheduler, P: PageProbe> {
    inner: Rc<Inner<S, P>>,
}

impl<S: FrameScheduler, P: PageProbe> Clone for Broadcaster<S, P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<S: FrameScheduler, P: PageProbe> fmt::Debug for Broadcaster<S, P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .field("pending", &self.inner.pending.get())
            .field("cycles", &self.inner.cycle_count.get())
            .field("torn_down", &self.inner.torn_down.get())
            .finish()
    }
}

impl<S, P> Broadcaster<S, P>
where
    S: FrameScheduler + 'static,
    S::Handle: 'static,
    P: PageProbe + 'static,
{
    /// Creates a broadcaster over the given scheduler and probe, with
    /// tracing disabled.
    #[must_use]
    pub fn new(scheduler: S, probe: P) -> Self {
        Self::with_tracer(scheduler, probe, Tracer::none())
    }

    /// Creates a broadcaster that reports events to `tracer`.
    #[must_use]
    pub fn with_tracer(scheduler: S, probe: P, tracer: Tracer) -> Self {
        Self {
            inner: Rc::new(Inner {
                scheduler,
                probe,
                subscribers: RefCell::new(Vec::new()),
                pending: Cell::new(false),
                scheduled: Cell::new(None),
                next_id: Cell::new(0),
                cycle_count: Cell::new(0),
                torn_down: Cell::new(false),
                tracer: RefCell::new(tracer),
            }),
        }
    }

    /// Registers `callback` to receive the metrics snapshot of every notify
    /// cycle after this call.
    ///
    /// The callback is **not** fired with an initial snapshot; a consumer
    /// that needs the current state at mount time reads it explicitly via
    /// [`measure`](Self::measure).
    pub fn subscribe(&self, callback: impl FnMut(ScrollMetrics) + 'static) -> Subscription {
        let id = self.inner.next_id.get();
        self.inner.next_id.set(id + 1);
        self.inner.subscribers.borrow_mut().push(Entry {
            id,
            callback: Some(Box::new(callback)),
        });
        Subscription { id }
    }

    /// Removes a registration.
    ///
    /// Idempotent: unsubscribing an already-removed or unknown handle is a
    /// no-op. Safe to call from within a subscriber callback; the
    /// in-progress cycle skips the removed subscriber and delivers to every
    /// other still-registered one.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.inner
            .subscribers
            .borrow_mut()
            .retain(|entry| entry.id != subscription.id);
    }

    /// Records that a native scroll notification arrived.
    ///
    /// If no cycle is pending, schedules one deferred cycle at the next
    /// frame boundary. Otherwise the signal is coalesced into the pending
    /// cycle. No-op after [`teardown`](Self::teardown).
    pub fn signal(&self) {
        let inner = &self.inner;
        if inner.torn_down.get() {
            return;
        }
        if inner.pending.get() {
            inner
                .tracer
                .borrow_mut()
                .signal(&SignalEvent { coalesced: true });
            return;
        }
        inner.pending.set(true);
        inner
            .tracer
            .borrow_mut()
            .signal(&SignalEvent { coalesced: false });

        let weak = Rc::downgrade(inner);
        let handle = inner.scheduler.schedule(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                Inner::run_cycle(&inner);
            }
        }));
        inner.scheduled.set(Some(handle));
    }

    /// Reads the page and returns the current metrics snapshot without
    /// notifying anyone.
    ///
    /// Covers the "page loaded already scrolled, or never scrolls" case: a
    /// consumer reads once at mount instead of waiting for the first native
    /// scroll signal.
    #[must_use]
    pub fn measure(&self) -> ScrollMetrics {
        self.inner.probe.geometry().metrics()
    }

    /// Cancels any pending cycle and permanently disables the broadcaster.
    ///
    /// Idempotent. Later calls to [`signal`](Self::signal) are no-ops and a
    /// cycle that was scheduled but has not run will not fire. Detaching the
    /// native scroll listener is the owning backend's job.
    pub fn teardown(&self) {
        let inner = &self.inner;
        if inner.torn_down.get() {
            return;
        }
        inner.torn_down.set(true);
        inner.pending.set(false);
        if let Some(handle) = inner.scheduled.take() {
            inner.scheduler.cancel(handle);
        }
        inner.tracer.borrow_mut().teardown();
    }

    /// Returns `true` once [`teardown`](Self::teardown) has been called.
    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.inner.torn_down.get()
    }

    /// Number of currently registered subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    /// Number of notify cycles that have run.
    #[must_use]
    pub fn cycle_count(&self) -> u64 {
        self.inner.cycle_count.get()
    }
}

impl<S, P> Inner<S, P>
where
    S: FrameScheduler + 'static,
    S::Handle: 'static,
    P: PageProbe + 'static,
{
    /// The deferred measurement-and-notify cycle.
    fn run_cycle(inner: &Rc<Self>) {
        if inner.torn_down.get() {
            return;
        }

        // Clear the pending flag before anything else: a signal arriving
        // while callbacks run must schedule a fresh cycle, not be dropped.
        inner.pending.set(false);
        inner.scheduled.take();

        let metrics = inner.probe.geometry().metrics();
        let cycle_index = inner.cycle_count.get();
        inner.cycle_count.set(cycle_index + 1);

        // Snapshot of the registration ids; mutation during iteration
        // affects the live set, never this snapshot.
        let ids: Vec<u64> = inner
            .subscribers
            .borrow()
            .iter()
            .map(|entry| entry.id)
            .collect();

        let mut notified: u32 = 0;
        for id in ids {
            if inner.torn_down.get() {
                break;
            }

            // Take the callback out of its slot so it can re-enter the
            // broadcaster without an overlapping RefCell borrow.
            let taken = {
                let mut subscribers = inner.subscribers.borrow_mut();
                match subscribers.iter_mut().find(|entry| entry.id == id) {
                    Some(entry) => entry.callback.take(),
                    None => None,
                }
            };
            let Some(mut callback) = taken else {
                // Unsubscribed earlier in this same cycle.
                continue;
            };

            let completed = invoke_isolated(&mut callback, metrics);

            // Put the callback back unless the subscriber removed itself
            // while running (its entry is gone from the live set).
            {
                let mut subscribers = inner.subscribers.borrow_mut();
                if let Some(entry) = subscribers.iter_mut().find(|entry| entry.id == id) {
                    entry.callback = Some(callback);
                }
            }

            if completed {
                notified += 1;
            } else {
                inner
                    .tracer
                    .borrow_mut()
                    .subscriber_panic(&SubscriberPanicEvent {
                        subscription: Subscription { id },
                        cycle_index,
                    });
            }
        }

        inner.tracer.borrow_mut().cycle(&CycleEvent {
            metrics,
            notified,
            cycle_index,
        });
    }
}

/// Runs one callback, isolating panics when the `std` feature is enabled.
///
/// Returns `false` if the callback panicked. Without `std` there is no
/// `catch_unwind`, so the panic propagates out of the notify cycle.
#[cfg(feature = "std")]
fn invoke_isolated(callback: &mut ScrollCallback, metrics: ScrollMetrics) -> bool {
    std::panic::catch_unwind(core::panic::AssertUnwindSafe(|| callback(metrics))).is_ok()
}

#[cfg(not(feature = "std"))]
fn invoke_isolated(callback: &mut ScrollCallback, metrics: ScrollMetrics) -> bool {
    callback(metrics);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::PageGeometry;

    /// Manually stepped scheduler double; clones share the queue.
    #[derive(Clone, Default)]
    struct TestScheduler {
        state: Rc<RefCell<TestSchedulerState>>,
    }

    #[derive(Default)]
    struct TestSchedulerState {
        queue: Vec<(u64, Box<dyn FnOnce()>)>,
        next_handle: u64,
        scheduled: u32,
        cancelled: u32,
    }

    impl TestScheduler {
        /// Runs everything scheduled before this frame boundary.
        fn advance_frame(&self) -> usize {
            let due: Vec<_> = self.state.borrow_mut().queue.drain(..).collect();
            let count = due.len();
            for (_, work) in due {
                work();
            }
            count
        }

        fn scheduled_total(&self) -> u32 {
            self.state.borrow().scheduled
        }

        fn cancelled_total(&self) -> u32 {
            self.state.borrow().cancelled
        }
    }

    impl FrameScheduler for TestScheduler {
        type Handle = u64;

        fn schedule(&self, work: Box<dyn FnOnce()>) -> u64 {
            let mut state = self.state.borrow_mut();
            let handle = state.next_handle;
            state.next_handle += 1;
            state.scheduled += 1;
            state.queue.push((handle, work));
            handle
        }

        fn cancel(&self, handle: u64) {
            let mut state = self.state.borrow_mut();
            let before = state.queue.len();
            state.queue.retain(|(h, _)| *h != handle);
            if state.queue.len() != before {
                state.cancelled += 1;
            }
        }
    }

    /// Settable page double; clones share the geometry cell.
    #[derive(Clone)]
    struct TestPage {
        geometry: Rc<Cell<PageGeometry>>,
    }

    impl TestPage {
        fn new(scroll_offset: f64, document_height: f64, viewport_height: f64) -> Self {
            Self {
                geometry: Rc::new(Cell::new(PageGeometry::new(
                    scroll_offset,
                    document_height,
                    viewport_height,
                ))),
            }
        }

        fn set_offset(&self, scroll_offset: f64) {
            let mut geometry = self.geometry.get();
            geometry.scroll_offset = scroll_offset;
            self.geometry.set(geometry);
        }
    }

    impl PageProbe for TestPage {
        fn geometry(&self) -> PageGeometry {
            self.geometry.get()
        }
    }

    fn fixture() -> (
        Broadcaster<TestScheduler, TestPage>,
        TestScheduler,
        TestPage,
    ) {
        let scheduler = TestScheduler::default();
        let page = TestPage::new(0.0, 3000.0, 1000.0);
        let broadcaster = Broadcaster::new(scheduler.clone(), page.clone());
        (broadcaster, scheduler, page)
    }

    #[test]
    fn burst_of_signals_coalesces_into_one_cycle() {
        let (broadcaster, scheduler, page) = fixture();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        broadcaster.subscribe(move |m| sink.borrow_mut().push(m));

        page.set_offset(100.0);
        broadcaster.signal();
        page.set_offset(140.0);
        broadcaster.signal();
        broadcaster.signal();

        assert_eq!(scheduler.scheduled_total(), 1);
        assert_eq!(scheduler.advance_frame(), 1);

        // One cycle, reporting the latest offset, not the first.
        let seen = seen.borrow();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].offset_px, 140.0);
        assert_eq!(broadcaster.cycle_count(), 1);
    }

    #[test]
    fn signal_after_cycle_schedules_again() {
        let (broadcaster, scheduler, _page) = fixture();
        broadcaster.signal();
        scheduler.advance_frame();
        broadcaster.signal();
        assert_eq!(scheduler.scheduled_total(), 2);
    }

    #[test]
    fn all_subscribers_see_the_same_snapshot() {
        let (broadcaster, scheduler, page) = fixture();
        page.set_offset(500.0);

        let first = Rc::new(Cell::new(ScrollMetrics::default()));
        let second = Rc::new(Cell::new(ScrollMetrics::default()));

        let sink = Rc::clone(&first);
        let mid_cycle_page = page.clone();
        broadcaster.subscribe(move |m| {
            sink.set(m);
            // Mutating the page mid-cycle must not leak into this cycle's
            // snapshot.
            mid_cycle_page.set_offset(900.0);
        });
        let sink = Rc::clone(&second);
        broadcaster.subscribe(move |m| sink.set(m));

        broadcaster.signal();
        scheduler.advance_frame();

        assert_eq!(first.get(), second.get());
        assert_eq!(first.get().offset_px, 500.0);
        assert_eq!(first.get().progress, 0.25);
    }

    #[test]
    fn pending_clears_before_notification() {
        let (broadcaster, scheduler, _page) = fixture();
        let resignal = broadcaster.clone();
        broadcaster.subscribe(move |_| resignal.signal());

        broadcaster.signal();
        scheduler.advance_frame();

        // The mid-cycle signal scheduled a fresh cycle instead of being lost.
        assert_eq!(scheduler.scheduled_total(), 2);
        scheduler.advance_frame();
        assert_eq!(broadcaster.cycle_count(), 2);
    }

    #[test]
    fn subscriber_can_unsubscribe_itself_mid_cycle() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls_a = Rc::new(Cell::new(0u32));
        let calls_b = Rc::new(Cell::new(0u32));

        let handle_slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let slot = Rc::clone(&handle_slot);
        let unsubscriber = broadcaster.clone();
        let count = Rc::clone(&calls_a);
        let a = broadcaster.subscribe(move |_| {
            count.set(count.get() + 1);
            if let Some(own) = slot.get() {
                unsubscriber.unsubscribe(own);
            }
        });
        handle_slot.set(Some(a));

        let count = Rc::clone(&calls_b);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.signal();
        scheduler.advance_frame();

        // A ran once and removed itself; B was still notified.
        assert_eq!(calls_a.get(), 1);
        assert_eq!(calls_b.get(), 1);
        assert_eq!(broadcaster.subscriber_count(), 1);

        broadcaster.signal();
        scheduler.advance_frame();
        assert_eq!(calls_a.get(), 1);
        assert_eq!(calls_b.get(), 2);
    }

    #[test]
    fn subscriber_can_tear_down_mid_cycle() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls_a = Rc::new(Cell::new(0u32));
        let calls_b = Rc::new(Cell::new(0u32));

        let destroyer = broadcaster.clone();
        let count = Rc::clone(&calls_a);
        broadcaster.subscribe(move |_| {
            count.set(count.get() + 1);
            destroyer.teardown();
        });
        let count = Rc::clone(&calls_b);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.signal();
        scheduler.advance_frame();

        // Notification stops at the teardown: later subscribers in the same
        // cycle are not invoked.
        assert_eq!(calls_a.get(), 1);
        assert_eq!(calls_b.get(), 0);
        assert!(broadcaster.is_torn_down());
        assert_eq!(broadcaster.cycle_count(), 1);

        // And the broadcaster stays dead afterwards.
        broadcaster.signal();
        assert_eq!(scheduler.scheduled_total(), 1);
        assert_eq!(scheduler.advance_frame(), 0);
        assert_eq!(calls_a.get(), 1);
    }

    #[test]
    fn subscriber_can_unsubscribe_another_mid_cycle() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls_b = Rc::new(Cell::new(0u32));
        let calls_c = Rc::new(Cell::new(0u32));

        let b_slot: Rc<Cell<Option<Subscription>>> = Rc::new(Cell::new(None));
        let slot = Rc::clone(&b_slot);
        let remover = broadcaster.clone();
        broadcaster.subscribe(move |_| {
            if let Some(b) = slot.take() {
                remover.unsubscribe(b);
            }
        });

        let count = Rc::clone(&calls_b);
        let b = broadcaster.subscribe(move |_| count.set(count.get() + 1));
        b_slot.set(Some(b));

        let count = Rc::clone(&calls_c);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.signal();
        scheduler.advance_frame();

        // B was removed before its turn; C was neither skipped nor doubled.
        assert_eq!(calls_b.get(), 0);
        assert_eq!(calls_c.get(), 1);
    }

    #[test]
    fn subscribe_during_notification_waits_for_next_cycle() {
        let (broadcaster, scheduler, _page) = fixture();
        let late_calls = Rc::new(Cell::new(0u32));

        let registrar = broadcaster.clone();
        let count = Rc::clone(&late_calls);
        let registered = Rc::new(Cell::new(false));
        let once = Rc::clone(&registered);
        broadcaster.subscribe(move |_| {
            if !once.get() {
                once.set(true);
                let count = Rc::clone(&count);
                registrar.subscribe(move |_| count.set(count.get() + 1));
            }
        });

        broadcaster.signal();
        scheduler.advance_frame();
        assert_eq!(late_calls.get(), 0);

        broadcaster.signal();
        scheduler.advance_frame();
        assert_eq!(late_calls.get(), 1);
    }

    #[test]
    fn unsubscribe_is_idempotent() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&calls);
        let handle = broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.unsubscribe(handle);
        broadcaster.unsubscribe(handle);
        assert_eq!(broadcaster.subscriber_count(), 0);

        broadcaster.signal();
        scheduler.advance_frame();
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn teardown_cancels_the_pending_cycle() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&calls);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.signal();
        broadcaster.teardown();
        assert_eq!(scheduler.cancelled_total(), 1);

        assert_eq!(scheduler.advance_frame(), 0);
        assert_eq!(calls.get(), 0);
        assert_eq!(broadcaster.cycle_count(), 0);
    }

    #[test]
    fn teardown_is_idempotent_and_disables_signal() {
        let (broadcaster, scheduler, _page) = fixture();
        broadcaster.teardown();
        broadcaster.teardown();
        assert!(broadcaster.is_torn_down());

        broadcaster.signal();
        assert_eq!(scheduler.scheduled_total(), 0);
    }

    #[test]
    fn measure_reads_without_notifying() {
        let (broadcaster, scheduler, page) = fixture();
        let calls = Rc::new(Cell::new(0u32));
        let count = Rc::clone(&calls);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        page.set_offset(1000.0);
        let metrics = broadcaster.measure();
        assert_eq!(metrics.offset_px, 1000.0);
        assert_eq!(metrics.progress, 0.5);
        assert_eq!(calls.get(), 0);
        assert_eq!(scheduler.scheduled_total(), 0);
    }

    #[test]
    fn dropping_every_handle_drops_pending_work_silently() {
        let (broadcaster, scheduler, _page) = fixture();
        broadcaster.signal();
        drop(broadcaster);

        // The scheduled closure holds only a weak reference; running it
        // after the broadcaster is gone is a no-op.
        assert_eq!(scheduler.advance_frame(), 1);
    }

    #[cfg(feature = "std")]
    #[test]
    fn panicking_subscriber_does_not_starve_the_rest() {
        let (broadcaster, scheduler, _page) = fixture();
        let calls = Rc::new(Cell::new(0u32));

        broadcaster.subscribe(|_| panic!("subscriber fault"));
        let count = Rc::clone(&calls);
        broadcaster.subscribe(move |_| count.set(count.get() + 1));

        broadcaster.signal();
        scheduler.advance_frame();
        assert_eq!(calls.get(), 1);
    }
}
