// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Section geometry and reveal state for scroll-driven consumers.
//!
//! Presentational sections subscribe to the broadcaster and decide locally
//! when to animate into view. They do not use the broadcast `progress`
//! value; each computes its own visibility ratio from its bounding rectangle
//! and the pushed scroll offset, then trips a one-way [`RevealLatch`] once a
//! threshold is crossed.
//!
//! Coordinates: [`SectionBounds`] is stored in *document space* (y grows
//! downward from the top of the document). Viewport-space positions are
//! obtained by subtracting the current scroll offset.

use kurbo::{Rect, Vec2};

/// A section's bounding rectangle in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionBounds {
    /// Bounding rectangle, y measured from the top of the document.
    pub rect: Rect,
}

impl SectionBounds {
    /// Creates bounds from a document-space rectangle.
    #[must_use]
    pub const fn new(rect: Rect) -> Self {
        Self { rect }
    }

    /// Convenience constructor for a full-width section: top edge and height
    /// in document pixels.
    #[must_use]
    pub fn spanning(top: f64, height: f64, width: f64) -> Self {
        Self {
            rect: Rect::new(0.0, top, width, top + height),
        }
    }

    /// Returns the bounding rectangle translated into viewport space for the
    /// given scroll offset.
    #[must_use]
    pub fn in_viewport(&self, scroll_offset: f64) -> Rect {
        self.rect - Vec2::new(0.0, scroll_offset)
    }

    /// Fraction of this section currently visible, in `[0, 1]`.
    ///
    /// Computed as the height of the intersection between the section's
    /// viewport-space box and the viewport band, over the section's own
    /// height. A degenerate (zero or negative height) section reports `0.0`.
    #[must_use]
    pub fn visible_fraction(&self, scroll_offset: f64, viewport_height: f64) -> f64 {
        let height = self.rect.height();
        if !height.is_finite() || height <= 0.0 || !viewport_height.is_finite() {
            return 0.0;
        }

        let on_screen = self.in_viewport(scroll_offset);
        let band = Rect::new(on_screen.x0, 0.0, on_screen.x1, viewport_height.max(0.0));
        let visible = on_screen.intersect(band).height();

        (visible / height).clamp(0.0, 1.0)
    }

    /// Whether the section's viewport-space box contains the horizontal
    /// reference line `line_px` pixels from the viewport top.
    ///
    /// This is the test the navigation bar uses to decide which section is
    /// "current"; see [`NavTracker`](crate::nav::NavTracker).
    #[must_use]
    pub fn straddles_line(&self, scroll_offset: f64, line_px: f64) -> bool {
        let on_screen = self.in_viewport(scroll_offset);
        on_screen.y0 <= line_px && on_screen.y1 >= line_px
    }
}

/// Configuration for [`RevealLatch`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealConfig {
    /// Visible fraction above which the section reveals itself.
    pub threshold: f64,
}

impl RevealConfig {
    /// The portfolio default: reveal once more than a tenth of the section
    /// is on screen.
    #[must_use]
    pub const fn standard() -> Self {
        Self { threshold: 0.1 }
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// One-way latch driving a section's entrance animation.
///
/// Feed it the section's visible fraction on every notify cycle; it trips
/// the first time the fraction exceeds the configured threshold and never
/// resets — scrolling back out of view does not replay the animation.
#[derive(Clone, Copy, Debug)]
pub struct RevealLatch {
    threshold: f64,
    revealed: bool,
}

impl RevealLatch {
    /// Creates an untripped latch.
    #[must_use]
    pub const fn new(config: RevealConfig) -> Self {
        Self {
            threshold: config.threshold,
            revealed: false,
        }
    }

    /// Observes the current visible fraction.
    ///
    /// Returns `true` exactly once: on the cycle where the latch trips.
    pub fn observe(&mut self, visible_fraction: f64) -> bool {
        if self.revealed {
            return false;
        }
        if visible_fraction > self.threshold {
            self.revealed = true;
            return true;
        }
        false
    }

    /// Trips the latch unconditionally.
    ///
    /// Used by the initial-load fallback that reveals above-the-fold
    /// sections shortly after mount even if no scroll ever happens.
    pub fn force(&mut self) -> bool {
        let newly = !self.revealed;
        self.revealed = true;
        newly
    }

    /// Whether the latch has tripped.
    #[must_use]
    pub const fn is_revealed(&self) -> bool {
        self.revealed
    }
}

impl Default for RevealLatch {
    fn default() -> Self {
        Self::new(RevealConfig::standard())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(top: f64, height: f64) -> SectionBounds {
        SectionBounds::spanning(top, height, 1280.0)
    }

    #[test]
    fn fully_on_screen_section_is_fully_visible() {
        let s = section(1000.0, 600.0);
        assert_eq!(s.visible_fraction(900.0, 1000.0), 1.0);
    }

    #[test]
    fn off_screen_section_is_invisible() {
        let s = section(2000.0, 600.0);
        assert_eq!(s.visible_fraction(0.0, 1000.0), 0.0);
        // Scrolled past it entirely.
        assert_eq!(s.visible_fraction(3000.0, 1000.0), 0.0);
    }

    #[test]
    fn partially_scrolled_in_section_reports_the_overlap() {
        // Section top sits 200px below the viewport bottom after scrolling.
        let s = section(1000.0, 600.0);
        let fraction = s.visible_fraction(200.0, 1000.0);
        // Visible band: y 800..1000 of the viewport → 200px of 600px.
        assert!((fraction - 200.0 / 600.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_section_height_reports_zero() {
        let s = SectionBounds::spanning(100.0, 0.0, 1280.0);
        assert_eq!(s.visible_fraction(0.0, 1000.0), 0.0);
    }

    #[test]
    fn straddle_test_matches_edges_inclusively() {
        let s = section(500.0, 400.0);
        // Viewport-space top is exactly on the line.
        assert!(s.straddles_line(350.0, 150.0));
        // Above the line entirely.
        assert!(!s.straddles_line(1100.0, 150.0));
        // Below the line entirely.
        assert!(!s.straddles_line(0.0, 150.0));
    }

    #[test]
    fn latch_trips_once_above_threshold() {
        let mut latch = RevealLatch::new(RevealConfig::standard());
        assert!(!latch.observe(0.05));
        assert!(!latch.is_revealed());

        assert!(latch.observe(0.2));
        assert!(latch.is_revealed());

        // Stays tripped; never fires again, even back at zero visibility.
        assert!(!latch.observe(0.9));
        assert!(!latch.observe(0.0));
        assert!(latch.is_revealed());
    }

    #[test]
    fn threshold_is_exclusive() {
        let mut latch = RevealLatch::new(RevealConfig { threshold: 0.1 });
        assert!(!latch.observe(0.1));
        assert!(latch.observe(0.10001));
    }

    #[test]
    fn force_reveals_exactly_once() {
        let mut latch = RevealLatch::default();
        assert!(latch.force());
        assert!(!latch.force());
        assert!(!latch.observe(1.0));
    }
}
