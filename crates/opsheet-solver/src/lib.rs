//! # opsheet-solver
//!
//! Timeline scheduler for opsheet.
//!
//! This crate provides:
//! - Lunch-window conflict resolution (shift and extend)
//! - The running-clock scheduler with total/per-worker/individual time modes
//! - Confirmation-number (PDTV) assignment with last/penultimate exceptions
//! - Chain-mode resume from prior history entries
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use opsheet_core::{Instant, OperationSpec, TimeUnit};
//! use opsheet_solver::{ScheduleRequest, TimelineScheduler};
//!
//! let req = ScheduleRequest::new(
//!     NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
//!     Instant::from_hm(8, 0),
//! )
//! .ops(vec![OperationSpec::new(1, "Milling").duration(30.0, TimeUnit::Minutes)]);
//!
//! let run = TimelineScheduler::new().run(&req).unwrap();
//! assert_eq!(run.clock, Instant::from_hm(8, 30));
//! ```

pub mod lunch;
pub mod pdtv;
pub mod timeline;

pub use timeline::{resume_from, ScheduleRequest, TimelineRun, TimelineScheduler};
