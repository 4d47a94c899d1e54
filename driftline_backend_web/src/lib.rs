// Copyright 2026 the Driftline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Web backend for driftline.
//!
//! This crate provides integration with browser APIs:
//!
//! - [`ScrollLoop`]: the passive `scroll` listener driving the broadcaster
//! - [`RafScheduler`]: `requestAnimationFrame` frame scheduler
//! - [`DomProbe`]: page geometry reads (`scrollY`, document/viewport height)
//! - [`scroll_to_section`]: smooth scroll-into-view navigation
//! - [`now`]: microsecond host time from `performance.now()`, for consumers
//!   that timestamp events
//!
//! # Wiring
//!
//! ```rust,ignore
//! let window = web_sys::window().expect("no window");
//! let scroll = ScrollLoop::new(window);
//! scroll.start();
//!
//! let broadcaster = scroll.broadcaster();
//! let initial = broadcaster.measure(); // mount-time read
//! let subscription = broadcaster.subscribe(|metrics| {
//!     // per-frame consumer state update
//! });
//! ```

#![no_std]

extern crate alloc;

mod probe;
mod raf;
mod scroll;

pub use probe::{section_bounds, DomProbe};
pub use raf::{now, RafScheduler};
pub use scroll::{scroll_to_section, ScrollLoop, WebBroadcaster};

pub use driftline_core::backend::{FrameScheduler, PageProbe};
