// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Deterministic doubles for driving the broadcaster without a browser.
//!
//! [`ManualScheduler`] stands in for `requestAnimationFrame`: scheduled work
//! sits in a queue until [`advance_frame`](ManualScheduler::advance_frame)
//! is called, so tests control exactly where frame boundaries fall.
//! [`FakePage`] is a settable [`PageProbe`], and [`MetricsLog`] records
//! every snapshot a subscriber receives.
//!
//! All three are cheap clones sharing interior state, mirroring how the
//! broadcaster itself is shared, so a test can keep a handle to a double
//! after moving a clone into the broadcaster.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::cell::{Cell, RefCell};

use driftline_core::backend::{FrameScheduler, PageProbe};
use driftline_core::geometry::{PageGeometry, ScrollMetrics};

/// A manually stepped [`FrameScheduler`].
///
/// Work scheduled during a frame (for example by a subscriber signalling
/// mid-notification) lands in the queue for the *next*
/// [`advance_frame`](Self::advance_frame) call, matching how a real
/// animation-frame callback scheduled from within a frame callback runs one
/// frame later.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    state: Rc<RefCell<SchedulerState>>,
}

#[derive(Default)]
struct SchedulerState {
    queue: Vec<(u64, Box<dyn FnOnce()>)>,
    next_handle: u64,
    scheduled: u64,
    cancelled: u64,
    ran: u64,
}

impl core::fmt::Debug for ManualScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("ManualScheduler")
            .field("pending", &state.queue.len())
            .field("scheduled", &state.scheduled)
            .field("cancelled", &state.cancelled)
            .field("ran", &state.ran)
            .finish()
    }
}

impl ManualScheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs everything scheduled before this frame boundary.
    ///
    /// The due work is drained first and run outside the queue borrow, so
    /// work may schedule more work re-entrantly. Returns how many units ran.
    pub fn advance_frame(&self) -> usize {
        let due: Vec<_> = self.state.borrow_mut().queue.drain(..).collect();
        let count = due.len();
        for (_, work) in due {
            work();
        }
        self.state.borrow_mut().ran += count as u64;
        count
    }

    /// Units of work currently waiting for the next frame boundary.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.state.borrow().queue.len()
    }

    /// Total units ever scheduled.
    #[must_use]
    pub fn scheduled_total(&self) -> u64 {
        self.state.borrow().scheduled
    }

    /// Total pending units that were cancelled before running.
    #[must_use]
    pub fn cancelled_total(&self) -> u64 {
        self.state.borrow().cancelled
    }

    /// Total units that actually ran.
    #[must_use]
    pub fn ran_total(&self) -> u64 {
        self.state.borrow().ran
    }
}

impl FrameScheduler for ManualScheduler {
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

/// A settable [`PageProbe`] double.
#[derive(Clone, Debug)]
pub struct FakePage {
    geometry: Rc<Cell<PageGeometry>>,
}

impl FakePage {
    /// Creates a page with the given document and viewport heights, scrolled
    /// to the top.
    #[must_use]
    pub fn new(document_height: f64, viewport_height: f64) -> Self {
        Self {
            geometry: Rc::new(Cell::new(PageGeometry::new(
                0.0,
                document_height,
                viewport_height,
            ))),
        }
    }

    /// Replaces the whole geometry.
    pub fn set_geometry(&self, geometry: PageGeometry) {
        self.geometry.set(geometry);
    }

    /// Moves the scroll position, keeping heights unchanged.
    pub fn scroll_to(&self, scroll_offset: f64) {
        let mut geometry = self.geometry.get();
        geometry.scroll_offset = scroll_offset;
        self.geometry.set(geometry);
    }

    /// Resizes the document, keeping offset and viewport unchanged.
    pub fn set_document_height(&self, document_height: f64) {
        let mut geometry = self.geometry.get();
        geometry.document_height = document_height;
        self.geometry.set(geometry);
    }
}

impl PageProbe for FakePage {
    fn geometry(&self) -> PageGeometry {
        self.geometry.get()
    }
}

/// Records every [`ScrollMetrics`] snapshot delivered to a subscriber.
#[derive(Clone, Debug, Default)]
pub struct MetricsLog {
    entries: Rc<RefCell<Vec<ScrollMetrics>>>,
}

impl MetricsLog {
    /// Creates an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback suitable for
    /// [`Broadcaster::subscribe`](driftline_core::broadcaster::Broadcaster::subscribe)
    /// that appends every delivery to this log.
    #[must_use]
    pub fn recorder(&self) -> impl FnMut(ScrollMetrics) + 'static + use<> {
        let entries = Rc::clone(&self.entries);
        move |metrics| entries.borrow_mut().push(metrics)
    }

    /// Number of deliveries recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether nothing has been delivered yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// The most recent delivery, if any.
    #[must_use]
    pub fn last(&self) -> Option<ScrollMetrics> {
        self.entries.borrow().last().copied()
    }

    /// A copy of every recorded delivery, oldest first.
    #[must_use]
    pub fn entries(&self) -> Vec<ScrollMetrics> {
        self.entries.borrow().clone()
    }
}

// ---------------------------------------------------------------------------
// End-to-end scenarios
// ---------------------------------------------------------------------------
