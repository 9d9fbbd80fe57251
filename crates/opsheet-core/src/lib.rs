//! # opsheet-core
//!
//! Core domain model for the opsheet timeline engine.
//!
//! This crate provides:
//! - Domain types: `OperationSpec`, `LunchConfig`, `WorkerSelection`, `ScheduleRow`, `HistoryEntry`
//! - Numbering state: `PdtvState` (10-digit confirmation numbers)
//! - The `Instant` day/time-of-day representation shared by the solver and the
//!   spreadsheet mirror
//! - Error types and the in-flight `ExclusiveFlag` guard
//!
//! ## Example
//!
//! ```rust
//! use opsheet_core::{OperationSpec, TimeUnit};
//!
//! let op = OperationSpec::new(1, "Milling")
//!     .duration(30.0, TimeUnit::Minutes)
//!     .pause(5.0, TimeUnit::Minutes)
//!     .workers(vec![true, true]);
//! assert_eq!(op.duration_minutes(), 30.0);
//! ```

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod guard;
mod instant;

pub use guard::{ExclusiveFlag, InFlight};
pub use instant::{date_serial, Instant};

// ============================================================================
// Limits
// ============================================================================

/// Maximum number of operations per calculation run
pub const MAX_OPERATIONS: usize = 99;

/// Maximum number of worker slots
pub const MAX_WORKERS: usize = 10;

/// Maximum lunch duration in minutes
pub const MAX_LUNCH_MINUTES: u16 = 480;

/// Width of a confirmation-number label
pub const PDTV_DIGITS: usize = 10;

// ============================================================================
// Units and modes
// ============================================================================

/// Unit attached to a duration or pause value
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeUnit {
    #[default]
    Minutes,
    Hours,
}

impl TimeUnit {
    /// Convert a value in this unit into minutes
    pub fn to_minutes(self, value: f64) -> f64 {
        match self {
            TimeUnit::Minutes => value,
            TimeUnit::Hours => value * 60.0,
        }
    }

    /// The other unit (minutes <-> hours)
    pub fn alternate(self) -> TimeUnit {
        match self {
            TimeUnit::Minutes => TimeUnit::Hours,
            TimeUnit::Hours => TimeUnit::Minutes,
        }
    }
}

/// How operation durations feed the running clock
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimeMode {
    /// Duration is total work: divided by worker count when more than one
    /// worker is selected
    #[default]
    Total,
    /// Duration applies to every worker as-is
    PerWorker,
    /// Durations and pauses are recorded for display/export only and never
    /// advance the timeline
    Individual,
}

/// Display order of operations inside a calculation run
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    /// Original ordinal order
    #[default]
    Ordinal,
    /// Confirmation-number order
    Confirmation,
}

// ============================================================================
// OperationSpec
// ============================================================================

/// A single work operation as entered in the UI.
///
/// The ordinal is a stable identity: it never changes across reorderings and
/// is the join key between UI state and computed rows.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OperationSpec {
    /// Stable 1-based identity
    pub ordinal: u32,
    /// Display name
    pub name: String,
    /// Duration value in `duration_unit`
    pub duration: f64,
    pub duration_unit: TimeUnit,
    /// Pause before the operation, in `pause_unit`
    pub pause: f64,
    pub pause_unit: TimeUnit,
    /// Worker inclusion mask, indexed by worker slot
    pub workers: Vec<bool>,
    /// Manual confirmation-number override
    pub pdtv_override: Option<String>,
    /// Soft-delete flag; deleted operations are filtered before scheduling
    pub deleted: bool,
}

impl OperationSpec {
    pub fn new(ordinal: u32, name: impl Into<String>) -> Self {
        Self {
            ordinal,
            name: name.into(),
            duration: 0.0,
            duration_unit: TimeUnit::Minutes,
            pause: 0.0,
            pause_unit: TimeUnit::Minutes,
            workers: vec![true],
            pdtv_override: None,
            deleted: false,
        }
    }

    /// Set the duration
    pub fn duration(mut self, value: f64, unit: TimeUnit) -> Self {
        self.duration = value;
        self.duration_unit = unit;
        self
    }

    /// Set the pre-operation pause
    pub fn pause(mut self, value: f64, unit: TimeUnit) -> Self {
        self.pause = value;
        self.pause_unit = unit;
        self
    }

    /// Set the worker inclusion mask
    pub fn workers(mut self, mask: Vec<bool>) -> Self {
        self.workers = mask;
        self
    }

    /// Set a manual confirmation number
    pub fn pdtv_override(mut self, id: impl Into<String>) -> Self {
        self.pdtv_override = Some(id.into());
        self
    }

    /// Mark as soft-deleted
    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn duration_minutes(&self) -> f64 {
        self.duration_unit.to_minutes(self.duration)
    }

    pub fn pause_minutes(&self) -> f64 {
        self.pause_unit.to_minutes(self.pause)
    }

    /// Worker slots selected for this operation, capped at `count` slots
    pub fn selected_workers(&self, count: usize) -> Vec<usize> {
        self.workers
            .iter()
            .take(count)
            .enumerate()
            .filter_map(|(i, on)| on.then_some(i))
            .collect()
    }
}

// ============================================================================
// Lunch configuration
// ============================================================================

/// Start of a lunch window as a time of day.
///
/// A window starting at 00:00 is inactive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchWindow {
    pub hour: u8,
    pub minute: u8,
}

impl LunchWindow {
    pub fn new(hour: u8, minute: u8) -> Self {
        Self { hour, minute }
    }

    /// Inactive windows do not interrupt the timeline
    pub fn is_active(&self) -> bool {
        self.hour != 0 || self.minute != 0
    }

    /// Start as minutes from midnight
    pub fn start_minutes(&self) -> f64 {
        f64::from(self.hour) * 60.0 + f64::from(self.minute)
    }
}

/// An active lunch window resolved to minutes-from-midnight.
///
/// This is the shape both the runtime resolver and the formula mirror work
/// with; `LunchConfig::active_windows` produces them sorted by start time.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Window {
    /// Start, minutes from midnight
    pub start: f64,
    /// Length in minutes
    pub len: f64,
}

impl Window {
    /// End of the window, minutes from midnight
    pub fn end(&self) -> f64 {
        self.start + self.len
    }
}

/// Up to two lunch windows sharing one duration
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LunchConfig {
    pub first: LunchWindow,
    pub second: LunchWindow,
    /// Shared window duration in minutes (0-480)
    pub duration_min: u16,
}

impl LunchConfig {
    pub fn new(first: LunchWindow, second: LunchWindow, duration_min: u16) -> Self {
        Self {
            first,
            second,
            duration_min,
        }
    }

    /// A configuration with no active windows
    pub fn none() -> Self {
        Self::default()
    }

    /// Reject out-of-range values.
    ///
    /// Clamping has already happened upstream by contract; the core rejects
    /// rather than silently adjusting.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        if self.duration_min > MAX_LUNCH_MINUTES {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "lunch duration {} exceeds {} minutes",
                self.duration_min, MAX_LUNCH_MINUTES
            )));
        }
        for w in [self.first, self.second] {
            if w.hour >= 24 || w.minute >= 60 {
                return Err(ScheduleError::InvalidConfiguration(format!(
                    "malformed lunch time {:02}:{:02}",
                    w.hour, w.minute
                )));
            }
            if w.is_active() && w.start_minutes() + f64::from(self.duration_min) >= 1440.0 {
                return Err(ScheduleError::InvalidConfiguration(format!(
                    "lunch window {:02}:{:02} + {} min reaches midnight",
                    w.hour, w.minute, self.duration_min
                )));
            }
        }
        Ok(())
    }

    /// Active windows sorted by start time.
    ///
    /// Windows may be supplied in any order; the resolver and the mirror both
    /// process them in this order.
    pub fn active_windows(&self) -> Vec<Window> {
        let len = f64::from(self.duration_min);
        if len == 0.0 {
            return Vec::new();
        }
        let mut windows: Vec<Window> = [self.first, self.second]
            .iter()
            .filter(|w| w.is_active())
            .map(|w| Window {
                start: w.start_minutes(),
                len,
            })
            .collect();
        windows.sort_by(|a, b| a.start.total_cmp(&b.start));
        windows
    }
}

// ============================================================================
// Workers
// ============================================================================

/// The worker slots participating in a calculation run
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSelection {
    /// Number of worker slots in use
    pub count: usize,
    /// Display labels; missing entries fall back to a numbered label
    pub names: Vec<String>,
}

impl WorkerSelection {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            names: Vec::new(),
        }
    }

    pub fn with_names(names: Vec<String>) -> Self {
        Self {
            count: names.len(),
            names,
        }
    }

    /// Display label for a worker slot
    pub fn label(&self, slot: usize) -> String {
        self.names
            .get(slot)
            .filter(|n| !n.is_empty())
            .cloned()
            .unwrap_or_else(|| format!("Worker {}", slot + 1))
    }
}

// ============================================================================
// Schedule rows and history
// ============================================================================

/// One computed timeline row: an operation bound to a worker slot.
///
/// Rows are produced in (operation, worker) order and are immutable once
/// placed into a `HistoryEntry`; corrections re-run the scheduler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduleRow {
    pub ordinal: u32,
    pub name: String,
    /// Worker slot index
    pub worker: usize,
    pub start: Instant,
    pub end: Instant,
    /// The row was shifted past or extended across a lunch window
    pub crossed_lunch: bool,
    /// Pause before the operation, minutes, display value
    pub pause_min: f64,
    /// Posting date the instants are relative to
    pub posting_date: NaiveDate,
    /// Duration display value in `duration_unit`
    pub duration: f64,
    pub duration_unit: TimeUnit,
    /// Assigned confirmation-number label
    pub pdtv: String,
    /// The label came from a manual override; the mirror keeps it literal
    pub pdtv_manual: bool,
}

impl ScheduleRow {
    /// Synthetic lookup key used by individual-mode cross-operation chaining
    pub fn row_key(&self) -> String {
        format!("{}_{}", self.ordinal, self.worker + 1)
    }
}

/// One exported calculation run.
///
/// Entries form a session-scoped, append-only sequence owned by the caller;
/// the core only reads the last entry's last row when resuming a chain.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub rows: Vec<ScheduleRow>,
    /// Lunch configuration that produced the rows. Absent on entries imported
    /// from incomplete sessions; the mirror refuses to process those.
    pub lunch: Option<LunchConfig>,
    /// Chain mode: the next entry resumes from this entry's last end
    pub chain: bool,
    pub time_mode: TimeMode,
    pub workers: WorkerSelection,
    /// Whether confirmation numbers were auto-assigned for this entry
    pub pdtv_auto: bool,
    /// Free-text report lines attached to the run
    pub report_lines: Vec<String>,
}

impl HistoryEntry {
    /// End instant of the last row, if any
    pub fn last_end(&self) -> Option<Instant> {
        self.rows.last().map(|r| r.end)
    }
}

// ============================================================================
// Confirmation numbering state
// ============================================================================

/// Confirmation-number (PDTV) assignment state.
///
/// Invariants: `penultimate` can only be set while `last` is set, and auto
/// assignment cannot be disabled while either marker is set.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdtvState {
    /// Numeric ID assigned to the first normal operation; `None` disables
    /// the numbering scheme entirely
    pub first_id: Option<u64>,
    /// Ordinal of the operation that receives the run's final number
    pub last: Option<u32>,
    /// Ordinal of the operation that receives the run's second-to-last number
    pub penultimate: Option<u32>,
    /// Auto-increment assignment
    pub auto: bool,
}

impl PdtvState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_first_id(first_id: u64) -> Self {
        Self {
            first_id: Some(first_id),
            last: None,
            penultimate: None,
            auto: true,
        }
    }

    /// Mark the operation that was actually performed last
    pub fn set_last(&mut self, ordinal: Option<u32>) -> Result<(), ScheduleError> {
        if ordinal.is_none() && self.penultimate.is_some() {
            return Err(ScheduleError::InvalidConfiguration(
                "cannot clear the last marker while penultimate is set".into(),
            ));
        }
        self.last = ordinal;
        Ok(())
    }

    /// Mark the operation performed second-to-last; requires `last`
    pub fn set_penultimate(&mut self, ordinal: Option<u32>) -> Result<(), ScheduleError> {
        if ordinal.is_some() && self.last.is_none() {
            return Err(ScheduleError::InvalidConfiguration(
                "penultimate marker requires the last marker".into(),
            ));
        }
        self.penultimate = ordinal;
        Ok(())
    }

    /// Toggle auto-increment assignment
    pub fn set_auto(&mut self, auto: bool) -> Result<(), ScheduleError> {
        if !auto && (self.last.is_some() || self.penultimate.is_some()) {
            return Err(ScheduleError::InvalidConfiguration(
                "auto assignment cannot be disabled while last/penultimate markers are set".into(),
            ));
        }
        self.auto = auto;
        Ok(())
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Scheduling failure.
///
/// All variants are deterministic pure-function failures; nothing here is
/// transient or retryable.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    /// The operation list itself is empty
    #[error("no operations to schedule")]
    NoOperations,

    /// Every operation is soft-deleted; distinct from `NoOperations` because
    /// the user-facing remedy differs
    #[error("all operations are marked deleted")]
    EmptyOperationSet,

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("too many operations: {0} (limit {MAX_OPERATIONS})")]
    TooManyOperations(usize),

    #[error("too many workers: {0} (limit {MAX_WORKERS})")]
    TooManyWorkers(usize),

    /// Chain resume requested but the prior entry is unusable; never
    /// silently defaults to "no chain"
    #[error("inconsistent chain state: {0}")]
    InconsistentChainState(String),
}

/// Formula mirror failure.
///
/// A wrong formula is worse than a visible failure: every variant is fatal
/// and surfaced to the caller instead of guessed around.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MirrorError {
    #[error("history entry {0} has no lunch configuration")]
    MissingLunchConfig(usize),

    #[error("row {row} lacks structural metadata: {what}")]
    MetadataGap { row: usize, what: String },

    #[error("workbook error: {0}")]
    Format(String),
}

// ============================================================================
// Display helpers
// ============================================================================

/// Format minutes as `H:MM` clock text for report lines
pub fn format_clock(minutes: f64) -> String {
    let total = minutes.round() as i64;
    format!("{}:{:02}", total / 60, total.rem_euclid(60))
}

/// Format a duration value with its unit suffix
pub fn format_duration(value: f64, unit: TimeUnit) -> String {
    match unit {
        TimeUnit::Minutes => format!("{value} min"),
        TimeUnit::Hours => format!("{value} h"),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn unit_conversion() {
        assert_eq!(TimeUnit::Minutes.to_minutes(45.0), 45.0);
        assert_eq!(TimeUnit::Hours.to_minutes(1.5), 90.0);
        assert_eq!(TimeUnit::Hours.alternate(), TimeUnit::Minutes);
    }

    #[test]
    fn operation_builder() {
        let op = OperationSpec::new(3, "Turning")
            .duration(2.0, TimeUnit::Hours)
            .pause(10.0, TimeUnit::Minutes)
            .workers(vec![true, false, true]);

        assert_eq!(op.ordinal, 3);
        assert_eq!(op.duration_minutes(), 120.0);
        assert_eq!(op.pause_minutes(), 10.0);
        assert_eq!(op.selected_workers(3), vec![0, 2]);
        assert!(!op.deleted);
    }

    #[test]
    fn worker_mask_capped_at_selection_count() {
        let op = OperationSpec::new(1, "Op").workers(vec![true, true, true, true]);
        assert_eq!(op.selected_workers(2), vec![0, 1]);
    }

    #[test]
    fn midnight_window_is_inactive() {
        assert!(!LunchWindow::new(0, 0).is_active());
        assert!(LunchWindow::new(0, 1).is_active());
        assert!(LunchWindow::new(12, 0).is_active());
    }

    #[test]
    fn active_windows_sorted_by_start() {
        let lunch = LunchConfig::new(LunchWindow::new(16, 30), LunchWindow::new(12, 0), 45);
        let windows = lunch.active_windows();
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].start, 720.0);
        assert_eq!(windows[1].start, 990.0);
        assert_eq!(windows[0].end(), 765.0);
    }

    #[test]
    fn zero_duration_disables_windows() {
        let lunch = LunchConfig::new(LunchWindow::new(12, 0), LunchWindow::default(), 0);
        assert!(lunch.active_windows().is_empty());
    }

    #[test]
    fn lunch_validation_rejects_out_of_range() {
        let too_long = LunchConfig::new(LunchWindow::new(12, 0), LunchWindow::default(), 481);
        assert!(matches!(
            too_long.validate(),
            Err(ScheduleError::InvalidConfiguration(_))
        ));

        let bad_time = LunchConfig::new(LunchWindow::new(25, 0), LunchWindow::default(), 30);
        assert!(bad_time.validate().is_err());

        let past_midnight = LunchConfig::new(LunchWindow::new(23, 30), LunchWindow::default(), 60);
        assert!(past_midnight.validate().is_err());

        let ok = LunchConfig::new(LunchWindow::new(12, 0), LunchWindow::new(16, 30), 45);
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn worker_labels_fall_back_to_numbered() {
        let mut sel = WorkerSelection::new(2);
        assert_eq!(sel.label(0), "Worker 1");
        sel.names = vec!["Ivanov".into()];
        assert_eq!(sel.label(0), "Ivanov");
        assert_eq!(sel.label(1), "Worker 2");
    }

    #[test]
    fn pdtv_penultimate_requires_last() {
        let mut state = PdtvState::with_first_id(100);
        assert!(state.set_penultimate(Some(2)).is_err());
        state.set_last(Some(4)).unwrap();
        assert!(state.set_penultimate(Some(2)).is_ok());
        // last cannot be cleared while penultimate is set
        assert!(state.set_last(None).is_err());
        state.set_penultimate(None).unwrap();
        assert!(state.set_last(None).is_ok());
    }

    #[test]
    fn pdtv_auto_locked_while_markers_set() {
        let mut state = PdtvState::with_first_id(1);
        state.set_last(Some(3)).unwrap();
        assert!(state.set_auto(false).is_err());
        state.set_last(None).unwrap();
        assert!(state.set_auto(false).is_ok());
    }

    #[test]
    fn row_key_format() {
        let row = ScheduleRow {
            ordinal: 7,
            name: "Op".into(),
            worker: 1,
            start: Instant::from_hm(8, 0),
            end: Instant::from_hm(9, 0),
            crossed_lunch: false,
            pause_min: 0.0,
            posting_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
            duration: 60.0,
            duration_unit: TimeUnit::Minutes,
            pdtv: "1".into(),
            pdtv_manual: false,
        };
        assert_eq!(row.row_key(), "7_2");
    }

    #[test]
    fn history_entry_round_trips_through_json() {
        let entry = HistoryEntry {
            rows: vec![ScheduleRow {
                ordinal: 1,
                name: "Drilling".into(),
                worker: 0,
                start: Instant::from_hm(11, 45),
                end: Instant::from_hm(13, 0),
                crossed_lunch: true,
                pause_min: 0.0,
                posting_date: NaiveDate::from_ymd_opt(2025, 3, 14).unwrap(),
                duration: 30.0,
                duration_unit: TimeUnit::Minutes,
                pdtv: "0000000001".into(),
                pdtv_manual: false,
            }],
            lunch: Some(LunchConfig::new(
                LunchWindow::new(12, 0),
                LunchWindow::default(),
                45,
            )),
            chain: true,
            time_mode: TimeMode::Total,
            workers: WorkerSelection::new(1),
            pdtv_auto: true,
            report_lines: vec!["shift A".into()],
        };

        let json = serde_json::to_string(&entry).unwrap();
        let back: HistoryEntry = serde_json::from_str(&json).unwrap();
        assert_eq!(back, entry);
        assert_eq!(back.last_end(), Some(Instant::from_hm(13, 0)));
    }

    #[test]
    fn clock_formatting() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(725.0), "12:05");
        assert_eq!(format_duration(30.0, TimeUnit::Minutes), "30 min");
        assert_eq!(format_duration(1.5, TimeUnit::Hours), "1.5 h");
    }
}
