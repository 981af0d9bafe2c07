//! Timeline Layout for lifecycle plans
//!
//! Converts the absolute start/end dates of a plan's milestones and tasks
//! into proportional screen-space intervals on a normalized `[0, 100]` axis,
//! for a Gantt-style view.
//!
//! # Guarantees
//!
//! - Layout never fails. Missing or inverted plan dates fall back to a
//!   synthetic window anchored at the plan start (or today).
//! - No bar extends past the right edge: `left + width <= 100` for every bar.
//! - Every bar is at least one day wide before clipping.
//! - The layout is a pure function of the plan, the options and `now`.
//!
//! # Example
//!
//! ```rust
//! use chrono::{NaiveDate, TimeZone, Utc};
//! use lifecycle_timeline::TimelineLayoutEngine;
//! use lifecycle_types::{Milestone, Plan};
//!
//! let d = |m, day| NaiveDate::from_ymd_opt(2024, m, day).unwrap();
//! let plan = Plan::new("p-1", "Launch")
//!     .with_window(d(1, 1), d(1, 31))
//!     .with_milestone(Milestone::new("m-1", "Beta", d(2, 15)).with_start(d(1, 28)));
//!
//! let now = Utc.with_ymd_and_hms(2024, 1, 16, 0, 0, 0).unwrap();
//! let layout = TimelineLayoutEngine::default().layout_at(&plan, now);
//!
//! let bar = &layout.bars[0];
//! assert!((bar.left_percent + bar.width_percent - 100.0).abs() < 1e-9);
//! assert!((layout.today_percent - 50.0).abs() < 1e-9);
//! ```

#![deny(unsafe_code)]

mod layout;
mod options;
mod resolve;
mod window;

pub use layout::*;
pub use options::LayoutOptions;
pub use resolve::{resolve_milestone, resolve_task, EffectiveRange};
pub use window::TimelineWindow;
