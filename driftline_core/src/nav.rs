// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Active-section tracking for a navigation bar.
//!
//! The navigation bar subscribes to the broadcaster and, on every notify
//! cycle, recomputes two pieces of local state from the pushed scroll
//! offset:
//!
//! - **condensed** — whether the bar has shrunk into its compact style,
//!   once the page is scrolled past a small threshold;
//! - **active** — which section is "current": the first entry of a fixed
//!   ordered section list whose on-screen box straddles a reference line a
//!   fixed distance from the viewport top.
//!
//! When no section straddles the line (mid-gap between sections, or
//! overscroll), the previously active section is retained rather than
//! cleared, so the highlight never flickers off.

use core::fmt;

use crate::section::SectionBounds;

/// Identifies a section in the navigation order.
///
/// The application assigns ids; the tracker passes them through without
/// interpreting the value.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SectionId(pub u32);

impl fmt::Debug for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SectionId({})", self.0)
    }
}

/// Configuration for [`NavTracker`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NavConfig {
    /// Distance of the reference line from the viewport top, in pixels.
    pub reference_line_px: f64,
    /// Scroll offset beyond which the bar condenses.
    pub condense_threshold_px: f64,
}

impl NavConfig {
    /// The portfolio defaults: reference line 150px down, condense past
    /// 50px of scroll.
    #[must_use]
    pub const fn standard() -> Self {
        Self {
            reference_line_px: 150.0,
            condense_threshold_px: 50.0,
        }
    }
}

impl Default for NavConfig {
    fn default() -> Self {
        Self::standard()
    }
}

/// The navigation bar's scroll-derived state after a notify cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NavState {
    /// Whether the bar is in its condensed style.
    pub condensed: bool,
    /// The currently highlighted section, if one has ever been resolved.
    pub active: Option<SectionId>,
}

/// Resolves the active section and condensed state from scroll offsets.
///
/// Owned by the navigation consumer; feed it the pushed scroll offset plus
/// the fixed ordered section list on each notify cycle.
#[derive(Clone, Debug)]
pub struct NavTracker {
    config: NavConfig,
    state: NavState,
}

impl NavTracker {
    /// Creates a tracker with no active section.
    #[must_use]
    pub const fn new(config: NavConfig) -> Self {
        Self {
            config,
            state: NavState {
                condensed: false,
                active: None,
            },
        }
    }

    /// Creates a tracker pre-seeded with an active section (typically the
    /// topmost one, so the bar is highlighted before the first scroll).
    #[must_use]
    pub const fn with_active(config: NavConfig, active: SectionId) -> Self {
        Self {
            config,
            state: NavState {
                condensed: false,
                active: Some(active),
            },
        }
    }

    /// Recomputes the state for the given scroll offset.
    ///
    /// `sections` is the fixed navigation order; the first section whose
    /// viewport-space box straddles the reference line wins. Returns the
    /// updated state (also retrievable via [`state`](Self::state)).
    pub fn observe(
        &mut self,
        scroll_offset: f64,
        sections: &[(SectionId, SectionBounds)],
    ) -> NavState {
        self.state.condensed = scroll_offset > self.config.condense_threshold_px;

        let hit = sections
            .iter()
            .find(|(_, bounds)| bounds.straddles_line(scroll_offset, self.config.reference_line_px))
            .map(|(id, _)| *id);
        if hit.is_some() {
            self.state.active = hit;
        }

        self.state
    }

    /// Returns the most recently computed state.
    #[must_use]
    pub const fn state(&self) -> NavState {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    const HOME: SectionId = SectionId(0);
    const ABOUT: SectionId = SectionId(1);
    const PROJECTS: SectionId = SectionId(2);

    /// Three stacked full-width sections: 0..900, 900..2100, 2100..3000.
    fn sections() -> Vec<(SectionId, SectionBounds)> {
        let mut out = Vec::new();
        out.push((HOME, SectionBounds::spanning(0.0, 900.0, 1280.0)));
        out.push((ABOUT, SectionBounds::spanning(900.0, 1200.0, 1280.0)));
        out.push((PROJECTS, SectionBounds::spanning(2100.0, 900.0, 1280.0)));
        out
    }

    #[test]
    fn resolves_the_section_under_the_reference_line() {
        let mut tracker = NavTracker::new(NavConfig::standard());
        let sections = sections();

        let state = tracker.observe(0.0, &sections);
        assert_eq!(state.active, Some(HOME));

        // 1000px down: the line at viewport y=150 sits at document y=1150.
        let state = tracker.observe(1000.0, &sections);
        assert_eq!(state.active, Some(ABOUT));

        let state = tracker.observe(2500.0, &sections);
        assert_eq!(state.active, Some(PROJECTS));
    }

    #[test]
    fn retains_previous_active_when_nothing_straddles_the_line() {
        let mut tracker = NavTracker::new(NavConfig::standard());
        let sections = sections();

        tracker.observe(1000.0, &sections);
        assert_eq!(tracker.state().active, Some(ABOUT));

        // Scrolled past every section: keep the last highlight.
        let state = tracker.observe(10_000.0, &sections);
        assert_eq!(state.active, Some(ABOUT));
    }

    #[test]
    fn first_match_wins_when_sections_overlap() {
        let mut tracker = NavTracker::new(NavConfig::standard());
        let mut sections = sections();
        // An overlapping later entry must not steal the highlight.
        sections.push((SectionId(9), SectionBounds::spanning(0.0, 3000.0, 1280.0)));

        let state = tracker.observe(0.0, &sections);
        assert_eq!(state.active, Some(HOME));
    }

    #[test]
    fn condenses_past_the_threshold() {
        let mut tracker = NavTracker::new(NavConfig::standard());
        let sections = sections();

        assert!(!tracker.observe(50.0, &sections).condensed);
        assert!(tracker.observe(51.0, &sections).condensed);
        // Expands again when scrolled back to the top.
        assert!(!tracker.observe(0.0, &sections).condensed);
    }

    #[test]
    fn seeded_active_survives_until_a_hit() {
        let mut tracker = NavTracker::with_active(NavConfig::standard(), PROJECTS);
        // No sections at all: nothing straddles, seed is retained.
        let state = tracker.observe(500.0, &[]);
        assert_eq!(state.active, Some(PROJECTS));
    }
}
