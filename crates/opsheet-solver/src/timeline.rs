//! Timeline scheduling.
//!
//! Turns an ordered list of operation specs, a worker selection and a lunch
//! configuration into concrete per-row start/end instants. Workers assigned
//! to the same operation run it concurrently in wall-clock terms; the running
//! clock is threaded through operations, not through worker fan-out.

use chrono::NaiveDate;
use tracing::debug;

use opsheet_core::{
    HistoryEntry, Instant, LunchConfig, OperationSpec, PdtvState, ScheduleError, ScheduleRow,
    SortMode, TimeMode, WorkerSelection, MAX_OPERATIONS, MAX_WORKERS, PDTV_DIGITS,
};

use crate::{lunch, pdtv};

/// Everything one calculation run needs
#[derive(Clone, Debug)]
pub struct ScheduleRequest {
    pub ops: Vec<OperationSpec>,
    pub workers: WorkerSelection,
    pub lunch: LunchConfig,
    pub mode: TimeMode,
    pub sort: SortMode,
    pub pdtv: PdtvState,
    /// Date the day offsets of all instants are relative to
    pub posting_date: NaiveDate,
    /// First start: a literal user-entered time, or a prior entry's last end
    /// when chain mode is active (see [`resume_from`])
    pub start: Instant,
}

impl ScheduleRequest {
    pub fn new(posting_date: NaiveDate, start: Instant) -> Self {
        Self {
            ops: Vec::new(),
            workers: WorkerSelection::new(1),
            lunch: LunchConfig::none(),
            mode: TimeMode::Total,
            sort: SortMode::Ordinal,
            pdtv: PdtvState::new(),
            posting_date,
            start,
        }
    }

    pub fn ops(mut self, ops: Vec<OperationSpec>) -> Self {
        self.ops = ops;
        self
    }

    pub fn workers(mut self, workers: WorkerSelection) -> Self {
        self.workers = workers;
        self
    }

    pub fn lunch(mut self, lunch: LunchConfig) -> Self {
        self.lunch = lunch;
        self
    }

    pub fn mode(mut self, mode: TimeMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    pub fn pdtv(mut self, pdtv: PdtvState) -> Self {
        self.pdtv = pdtv;
        self
    }
}

/// Result of one scheduler run: the rows plus the clock the caller persists
/// for chain continuation
#[derive(Clone, Debug)]
pub struct TimelineRun {
    pub rows: Vec<ScheduleRow>,
    pub clock: Instant,
}

/// The timeline scheduler
pub struct TimelineScheduler;

impl TimelineScheduler {
    pub fn new() -> Self {
        Self
    }

    /// Compute the timeline for one calculation run.
    ///
    /// Per operation in display order: advance the clock by the pre-pause,
    /// shift the start out of lunch windows, extend the end across windows
    /// the span covers, then emit one row per selected worker.
    pub fn run(&self, req: &ScheduleRequest) -> Result<TimelineRun, ScheduleError> {
        req.lunch.validate()?;
        if req.ops.len() > MAX_OPERATIONS {
            return Err(ScheduleError::TooManyOperations(req.ops.len()));
        }
        if req.workers.count > MAX_WORKERS {
            return Err(ScheduleError::TooManyWorkers(req.workers.count));
        }
        if req.ops.is_empty() {
            return Err(ScheduleError::NoOperations);
        }

        let mut ops: Vec<&OperationSpec> = req.ops.iter().filter(|op| !op.deleted).collect();
        if ops.is_empty() {
            return Err(ScheduleError::EmptyOperationSet);
        }
        if let Some(bad) = ops.iter().find(|op| op.duration < 0.0 || op.pause < 0.0) {
            return Err(ScheduleError::InvalidConfiguration(format!(
                "operation {} has a negative duration or pause",
                bad.ordinal
            )));
        }

        // Numbering works on ranks within this run, so soft-deleted
        // operations leave no gap in the emitted labels.
        let numbering =
            pdtv::NumberingPlan::new(ops.iter().map(|op| op.ordinal).collect(), &req.pdtv);
        match req.sort {
            SortMode::Ordinal => ops.sort_by_key(|op| op.ordinal),
            SortMode::Confirmation => {
                ops.sort_by_key(|op| confirmation_key(op, &numbering));
            }
        }

        let windows = req.lunch.active_windows();
        debug!(
            ops = ops.len(),
            workers = req.workers.count,
            mode = ?req.mode,
            windows = windows.len(),
            "scheduling timeline"
        );

        let mut rows = Vec::new();
        let mut clock = req.start;

        for op in ops {
            let pause_min = match req.mode {
                TimeMode::Individual => 0.0,
                _ => op.pause_minutes(),
            };
            clock = clock.add_minutes(pause_min);

            let selected = op.selected_workers(req.workers.count);
            let active = selected.len();

            // Display value keeps the native unit; Total mode splits the raw
            // duration across the active workers.
            let display_duration = match req.mode {
                TimeMode::Total if active > 1 => op.duration / active as f64,
                _ => op.duration,
            };
            let clock_minutes = match req.mode {
                TimeMode::Individual => 0.0,
                TimeMode::Total if active > 1 => op.duration_minutes() / active as f64,
                _ => op.duration_minutes(),
            };

            let (start, crossed_start) = lunch::resolve(clock, &windows);
            let end = start.add_minutes(clock_minutes);
            let (end, crossed_span) = lunch::extend_interval(start, end, &windows);
            let crossed = crossed_start || crossed_span;

            let label = op
                .pdtv_override
                .clone()
                .unwrap_or_else(|| numbering.label(op.ordinal));

            for worker in selected {
                rows.push(ScheduleRow {
                    ordinal: op.ordinal,
                    name: op.name.clone(),
                    worker,
                    start,
                    end,
                    crossed_lunch: crossed,
                    pause_min: op.pause_minutes(),
                    posting_date: req.posting_date,
                    duration: display_duration,
                    duration_unit: op.duration_unit,
                    pdtv: label.clone(),
                    pdtv_manual: op.pdtv_override.is_some(),
                });
            }

            clock = end;
        }

        Ok(TimelineRun { rows, clock })
    }
}

impl Default for TimelineScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort key for confirmation order: the assigned label, left-padded with
/// zeros so short plain-ordinal labels still compare numerically as text
fn confirmation_key(op: &OperationSpec, numbering: &pdtv::NumberingPlan) -> String {
    let label = op
        .pdtv_override
        .clone()
        .unwrap_or_else(|| numbering.label(op.ordinal));
    format!("{label:0>width$}", width = PDTV_DIGITS)
}

/// Clock to resume a chained entry from.
///
/// Fails with `InconsistentChainState` when there is nothing usable to
/// resume from; a silent fall-back to "no chain" would corrupt the timeline.
pub fn resume_from(entries: &[HistoryEntry]) -> Result<Instant, ScheduleError> {
    let last = entries.last().ok_or_else(|| {
        ScheduleError::InconsistentChainState("no prior entry to resume from".into())
    })?;
    if last.lunch.is_none() {
        return Err(ScheduleError::InconsistentChainState(
            "prior entry has no lunch configuration".into(),
        ));
    }
    last.last_end().ok_or_else(|| {
        ScheduleError::InconsistentChainState("prior entry has no rows".into())
    })
}
