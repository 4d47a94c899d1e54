// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Page measurement and the per-cycle metrics snapshot.
//!
//! [`PageGeometry`] is the raw measurement a backend reads from the page at
//! the start of each notify cycle: absolute scroll offset, full document
//! height, and viewport height, all in CSS pixels. It is produced fresh every
//! cycle and never cached across cycles.
//!
//! [`ScrollMetrics`] is the value pushed to subscribers: the offset plus a
//! normalized progress in `[0, 1]` over the scrollable range. Derivation is
//! total — a document shorter than the viewport yields `progress = 0`, never
//! `NaN` or a negative value.

use core::fmt;

/// A single measurement of the page's scroll state, in CSS pixels.
///
/// Backends produce one of these per notify cycle via
/// [`PageProbe::geometry`](crate::backend::PageProbe::geometry). All fields
/// are instantaneous reads; none are retained between cycles.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PageGeometry {
    /// Absolute vertical scroll offset from the top of the document.
    pub scroll_offset: f64,
    /// Full document height, including content outside the viewport.
    pub document_height: f64,
    /// Height of the visible viewport.
    pub viewport_height: f64,
}

impl PageGeometry {
    /// Creates a geometry snapshot from raw measurements.
    #[must_use]
    pub const fn new(scroll_offset: f64, document_height: f64, viewport_height: f64) -> Self {
        Self {
            scroll_offset,
            document_height,
            viewport_height,
        }
    }

    /// Returns the scrollable range: document height minus viewport height.
    ///
    /// Zero or negative when the content fits within the viewport.
    #[inline]
    #[must_use]
    pub fn scrollable_height(&self) -> f64 {
        self.document_height - self.viewport_height
    }

    /// Derives the [`ScrollMetrics`] snapshot for this measurement.
    #[must_use]
    pub fn metrics(&self) -> ScrollMetrics {
        ScrollMetrics::from_geometry(self)
    }
}

/// The value delivered to every subscriber in a notify cycle.
///
/// All subscribers notified within one cycle receive the same snapshot;
/// high-frequency scroll signals are collapsed, so consumers must treat this
/// as "current state", not as a complete event log.
#[derive(Clone, Copy, Default, PartialEq)]
pub struct ScrollMetrics {
    /// Absolute vertical scroll offset in pixels.
    pub offset_px: f64,
    /// Normalized scroll progress in `[0, 1]`: offset over scrollable range.
    ///
    /// Defined as `0.0` when the scrollable range is zero or negative.
    pub progress: f64,
}

impl ScrollMetrics {
    /// Derives metrics from a page measurement.
    ///
    /// `progress` is `offset / scrollable_height` clamped to `[0, 1]`. A
    /// non-positive or non-finite scrollable range yields `progress = 0`, and
    /// a non-finite offset is sanitized to `0.0` so a malformed measurement
    /// cannot poison downstream state.
    #[must_use]
    pub fn from_geometry(geometry: &PageGeometry) -> Self {
        let offset = if geometry.scroll_offset.is_finite() {
            geometry.scroll_offset
        } else {
            0.0
        };

        let scrollable = geometry.scrollable_height();
        let progress = if scrollable.is_finite() && scrollable > 0.0 {
            (offset / scrollable).clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            offset_px: offset,
            progress,
        }
    }
}

impl fmt::Debug for ScrollMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ScrollMetrics({}px, {:.3})",
            self.offset_px, self.progress
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_is_offset_over_scrollable_range() {
        let m = PageGeometry::new(500.0, 3000.0, 1000.0).metrics();
        assert_eq!(m.offset_px, 500.0);
        assert_eq!(m.progress, 0.25);
    }

    #[test]
    fn progress_clamps_to_one_past_the_end() {
        // Rubber-band overscroll can report offsets past the scrollable range.
        let m = PageGeometry::new(2500.0, 3000.0, 1000.0).metrics();
        assert_eq!(m.progress, 1.0);
    }

    #[test]
    fn zero_scrollable_range_reports_zero_progress() {
        let m = PageGeometry::new(120.0, 1000.0, 1000.0).metrics();
        assert_eq!(m.offset_px, 120.0);
        assert_eq!(m.progress, 0.0);
        assert!(m.progress.is_finite());
    }

    #[test]
    fn negative_scrollable_range_reports_zero_progress() {
        let m = PageGeometry::new(0.0, 600.0, 1000.0).metrics();
        assert_eq!(m.progress, 0.0);
    }

    #[test]
    fn negative_offset_clamps_to_zero_progress() {
        // Overscroll at the top (bounce scrolling) reports negative offsets.
        let m = PageGeometry::new(-40.0, 3000.0, 1000.0).metrics();
        assert_eq!(m.offset_px, -40.0);
        assert_eq!(m.progress, 0.0);
    }

    #[test]
    fn non_finite_measurements_are_sanitized() {
        let m = PageGeometry::new(f64::NAN, f64::INFINITY, 1000.0).metrics();
        assert_eq!(m.offset_px, 0.0);
        assert_eq!(m.progress, 0.0);
    }
}
