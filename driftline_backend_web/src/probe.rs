// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! DOM page measurement.
//!
//! [`DomProbe`] implements
//! [`PageProbe`](driftline_core::backend::PageProbe) by reading
//! `window.scrollY`, `document.documentElement.scrollHeight`, and
//! `window.innerHeight`. Reads happen once per notify cycle, at the frame
//! boundary, so every subscriber in a cycle sees the same measurement.
//!
//! A malformed read (detached document, non-numeric `innerHeight`) degrades
//! to `0.0` for that field rather than failing the cycle; the metrics
//! derivation in `driftline_core` already treats zeroed geometry as a
//! defined edge case.

use kurbo::Rect;
use web_sys::{Element, Window};

use driftline_core::backend::PageProbe;
use driftline_core::geometry::PageGeometry;
use driftline_core::section::SectionBounds;

/// A [`PageProbe`] over a browser `Window`.
#[derive(Clone, Debug)]
pub struct DomProbe {
    window: Window,
}

impl DomProbe {
    /// Creates a probe over the given window.
    #[must_use]
    pub const fn new(window: Window) -> Self {
        Self { window }
    }

    /// Creates a probe over the global window, if one exists (returns `None`
    /// outside a browser main thread, e.g. in a worker).
    #[must_use]
    pub fn for_current_window() -> Option<Self> {
        web_sys::window().map(Self::new)
    }

    /// Returns the underlying window.
    #[must_use]
    pub const fn window(&self) -> &Window {
        &self.window
    }
}

impl PageProbe for DomProbe {
    fn geometry(&self) -> PageGeometry {
        let scroll_offset = self.window.scroll_y().unwrap_or(0.0);
        let viewport_height = self
            .window
            .inner_height()
            .ok()
            .and_then(|value| value.as_f64())
            .unwrap_or(0.0);
        let document_height = self
            .window
            .document()
            .and_then(|document| document.document_element())
            .map(|root| f64::from(root.scroll_height()))
            .unwrap_or(0.0);

        PageGeometry::new(scroll_offset, document_height, viewport_height)
    }
}

/// Reads an element's bounding box into document-space [`SectionBounds`].
///
/// `getBoundingClientRect` reports viewport-space coordinates; adding the
/// current scroll offset converts to document space, which is the frame of
/// reference [`SectionBounds`] expects.
#[must_use]
pub fn section_bounds(element: &Element, scroll_offset: f64) -> SectionBounds {
    let rect = element.get_bounding_client_rect();
    SectionBounds::new(Rect::new(
        rect.left(),
        rect.top() + scroll_offset,
        rect.right(),
        rect.bottom() + scroll_offset,
    ))
}
