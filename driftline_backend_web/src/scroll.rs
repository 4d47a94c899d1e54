// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The native `scroll` listener and page navigation helpers.
//!
//! [`ScrollLoop`] owns the single passive `scroll` event listener for a
//! window and forwards every event to
//! [`Broadcaster::signal`](driftline_core::broadcaster::Broadcaster::signal),
//! where bursts are coalesced to one cycle per frame. Create it once at
//! application start-up, call [`start`](ScrollLoop::start), and hand clones
//! of the [`broadcaster`](ScrollLoop::broadcaster) to the components that
//! want scroll updates.

use alloc::boxed::Box;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};

use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast as _;
use web_sys::{AddEventListenerOptions, Document, ScrollBehavior, ScrollIntoViewOptions, Window};

use driftline_core::broadcaster::Broadcaster;

use crate::probe::DomProbe;
use crate::raf::RafScheduler;

/// The broadcaster type wired to the browser backend.
pub type WebBroadcaster = Broadcaster<RafScheduler, DomProbe>;

type ScrollClosure = Closure<dyn FnMut()>;

struct ScrollInner {
    window: Window,
    broadcaster: WebBroadcaster,

    /// The JS listener registered on the window while running.
    listener: RefCell<Option<ScrollClosure>>,

    /// Whether the listener is currently attached.
    attached: Cell<bool>,
}

/// Owns the native scroll subscription for one window.
///
/// `start`/`stop` are idempotent; [`teardown`](Self::teardown) additionally
/// tears down the broadcaster. Dropping the loop detaches the listener.
pub struct ScrollLoop {
    inner: Rc<ScrollInner>,
}

impl ScrollLoop {
    /// Creates a loop over `window` with a freshly wired broadcaster
    /// (`requestAnimationFrame` scheduler, DOM probe). Not yet listening;
    /// call [`start`](Self::start).
    #[must_use]
    pub fn new(window: Window) -> Self {
        let broadcaster = Broadcaster::new(RafScheduler::new(), DomProbe::new(window.clone()));
        Self::with_broadcaster(window, broadcaster)
    }

    /// Creates a loop that drives an existing broadcaster.
    #[must_use]
    pub fn with_broadcaster(window: Window, broadcaster: WebBroadcaster) -> Self {
        Self {
            inner: Rc::new(ScrollInner {
                window,
                broadcaster,
                listener: RefCell::new(None),
                attached: Cell::new(false),
            }),
        }
    }

    /// Returns a clone of the driven broadcaster for consumers to subscribe
    /// to.
    #[must_use]
    pub fn broadcaster(&self) -> WebBroadcaster {
        self.inner.broadcaster.clone()
    }

    /// Attaches the passive `scroll` listener.
    ///
    /// If already listening, this is a no-op.
    pub fn start(&self) {
        if self.inner.attached.get() {
            return;
        }
        self.inner.attached.set(true);

        let broadcaster = self.inner.broadcaster.clone();
        let closure = Closure::wrap(Box::new(move || broadcaster.signal()) as Box<dyn FnMut()>);

        // Passive: the listener never calls preventDefault, so the browser
        // may start scrolling without waiting on it.
        let options = AddEventListenerOptions::new();
        options.set_passive(true);
        let _ = self
            .inner
            .window
            .add_event_listener_with_callback_and_add_event_listener_options(
                "scroll",
                closure.as_ref().unchecked_ref(),
                &options,
            );

        *self.inner.listener.borrow_mut() = Some(closure);
    }

    /// Detaches the `scroll` listener.
    ///
    /// The broadcaster keeps its subscribers and can be restarted by calling
    /// [`start`](Self::start) again. If not listening, this is a no-op.
    pub fn stop(&self) {
        if !self.inner.attached.get() {
            return;
        }
        self.inner.attached.set(false);

        if let Some(closure) = self.inner.listener.borrow_mut().take() {
            let _ = self
                .inner
                .window
                .remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
    }

    /// Detaches the listener and tears down the broadcaster.
    ///
    /// Idempotent, like the teardown it forwards to. Intended for
    /// whole-page shutdown; normal operation keeps the loop alive for the
    /// lifetime of the page.
    pub fn teardown(&self) {
        self.stop();
        self.inner.broadcaster.teardown();
    }

    /// Returns `true` while the `scroll` listener is attached.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.inner.attached.get()
    }
}

impl Drop for ScrollLoop {
    fn drop(&mut self) {
        self.stop();
    }
}

impl core::fmt::Debug for ScrollLoop {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ScrollLoop")
            .field("attached", &self.inner.attached.get())
            .field("broadcaster", &self.inner.broadcaster)
            .finish()
    }
}

/// Smooth-scrolls the page so the section with DOM id `id` is in view.
///
/// No-op when no element has that id. This is the navigation bar's
/// click-through path; it produces native scroll events that flow back in
/// through the [`ScrollLoop`] like any user scroll.
pub fn scroll_to_section(document: &Document, id: &str) {
    if let Some(element) = document.get_element_by_id(id) {
        let options = ScrollIntoViewOptions::new();
        options.set_behavior(ScrollBehavior::Smooth);
        element.scroll_into_view_with_scroll_into_view_options(&options);
    }
}
