// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! `requestAnimationFrame` frame scheduler.
//!
//! [`RafScheduler`] implements
//! [`FrameScheduler`](driftline_core::backend::FrameScheduler) over the
//! browser's `requestAnimationFrame` API. The broadcaster schedules at most
//! one unit of work at a time, so the scheduler keeps a single work slot and
//! one persistent JS closure that is re-registered per request instead of
//! allocating a fresh closure every frame.
//!
//! Each callback receives a [`DOMHighResTimeStamp`][mdn] which is ignored
//! here; the notify cycle reads the page directly at the frame boundary.
//!
//! [mdn]: https://developer.mozilla.org/en-US/docs/Web/API/DOMHighResTimeStamp

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;

use driftline_core::backend::FrameScheduler;

// Bind the globals directly rather than going through `web_sys::Window`,
// which would mean fetching and unwrapping the Window object every frame.
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = performance, js_name = "now")]
    fn performance_now() -> f64;

    #[wasm_bindgen(js_name = "requestAnimationFrame")]
    fn request_animation_frame(callback: &JsValue) -> i32;

    #[wasm_bindgen(js_name = "cancelAnimationFrame")]
    fn cancel_animation_frame(id: i32);
}

/// Current host time in microseconds, from `performance.now()`.
///
/// The broadcaster itself never reads the clock; this is for consumers that
/// want to timestamp events, such as a
/// [`TraceSink`](driftline_core::trace::TraceSink) implementation.
#[must_use]
pub fn now() -> u64 {
    // Convert DOMHighResTimeStamp (ms) → µs ticks.
    #[expect(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "performance.now() is a small positive f64; µs fits in u64"
    )]
    let micros = (performance_now() * 1000.0) as u64;
    micros
}

type FrameClosure = Closure<dyn FnMut(f64)>;

struct RafInner {
    /// The JS closure registered with `requestAnimationFrame`.
    ///
    /// Created once and reused for every scheduled frame; stored in its own
    /// `RefCell` so `Drop` can take it to break the reference cycle.
    closure: RefCell<Option<FrameClosure>>,

    /// The unit of work to run at the next frame boundary, if any.
    work: RefCell<Option<Box<dyn FnOnce()>>>,

    /// The ID returned by the most recent `requestAnimationFrame` call.
    raf_id: Cell<i32>,
}

/// A [`FrameScheduler`] backed by `requestAnimationFrame`.
///
/// Holds one work slot: scheduling while a unit is already pending replaces
/// the pending unit (the broadcaster never does this, since it coalesces to
/// one pending cycle).
pub struct RafScheduler {
    inner: Rc<RafInner>,
}

impl Default for RafScheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl RafScheduler {
    /// Creates a scheduler with nothing pending.
    #[must_use]
    pub fn new() -> Self {
        let inner = Rc::new(RafInner {
            closure: RefCell::new(None),
            work: RefCell::new(None),
            raf_id: Cell::new(0),
        });

        let frame_inner = Rc::clone(&inner);
        let closure = Closure::wrap(Box::new(move |_timestamp_ms: f64| {
            // Take the work out before running it so the work itself may
            // schedule again re-entrantly.
            let work = frame_inner.work.borrow_mut().take();
            if let Some(work) = work {
                work();
            }
        }) as Box<dyn FnMut(f64)>);
        *inner.closure.borrow_mut() = Some(closure);

        Self { inner }
    }
}

impl FrameScheduler for RafScheduler {
    type Handle = i32;

    fn schedule(&self, work: Box<dyn FnOnce()>) -> i32 {
        *self.inner.work.borrow_mut() = Some(work);

        let id = match &*self.inner.closure.borrow() {
            Some(closure) => request_animation_frame(closure.as_ref().unchecked_ref()),
            // Only reachable mid-Drop; the work slot is never run then.
            None => 0,
        };
        self.inner.raf_id.set(id);
        id
    }

    fn cancel(&self, handle: i32) {
        // cancelAnimationFrame ignores ids that already fired, so a stale
        // handle is a no-op, as the contract requires.
        cancel_animation_frame(handle);
        if self.inner.raf_id.get() == handle {
            self.inner.work.borrow_mut().take();
        }
    }
}

impl Drop for RafScheduler {
    fn drop(&mut self) {
        cancel_animation_frame(self.inner.raf_id.get());
        self.inner.work.borrow_mut().take();
        // Drop the JS closure so it doesn't leak through the Rc cycle.
        self.inner.closure.borrow_mut().take();
    }
}

impl core::fmt::Debug for RafScheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RafScheduler")
            .field("pending", &self.inner.work.borrow().is_some())
            .field("raf_id", &self.inner.raf_id.get())
            .finish()
    }
}
