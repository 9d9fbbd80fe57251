//! Formula mirror.
//!
//! Re-encodes the timeline rules as spreadsheet formulas so the exported
//! sheet recomputes itself when a user edits a literal cell. A cell is one
//! of three things: a literal (the handful of values the user may edit), a
//! reference to an anchor cell, or a formula re-deriving the runtime result
//! from cells earlier in the table. Formulas cannot loop, so the lunch
//! shift and extend rules are emitted as nested single-pass conditionals;
//! `arith` is the evaluable Rust rendition of those shapes and the
//! conformance tests hold the two backends together.

use tracing::debug;

use opsheet_core::{
    date_serial, HistoryEntry, MirrorError, ScheduleRow, TimeMode, TimeUnit, Window,
    WorkerSelection, PDTV_DIGITS,
};

use crate::anchors::{AnchorKey, AnchorTable};
use crate::layout::{cell, Column, COLUMN_COUNT};

/// Marker the lunch column shows when a row crossed a window
pub const LUNCH_MARK: &str = "*";

/// One worksheet cell of the planned table
#[derive(Clone, Debug, PartialEq)]
pub enum CellContent {
    Blank,
    Number(f64),
    Text(String),
    /// Formula text including the leading `=`
    Formula(String),
}

/// One planned data row, `COLUMN_COUNT` cells in sheet order
#[derive(Clone, Debug)]
pub struct PlannedRow {
    pub cells: Vec<CellContent>,
}

impl PlannedRow {
    fn blank() -> Self {
        Self {
            cells: vec![CellContent::Blank; COLUMN_COUNT],
        }
    }

    fn set(&mut self, column: Column, content: CellContent) {
        self.cells[column.index() as usize] = content;
    }

    /// Cell content of a column
    pub fn get(&self, column: Column) -> &CellContent {
        &self.cells[column.index() as usize]
    }
}

/// The planned table: data rows plus trailing report lines
#[derive(Clone, Debug)]
pub struct MirrorPlan {
    pub rows: Vec<PlannedRow>,
    pub reports: Vec<String>,
}

/// Per-entry facts the emission passes need over and over
struct EntryMeta {
    windows: Vec<Window>,
    chain: bool,
    individual: bool,
    auto: bool,
}

/// One row of the flattened history
struct FlatRow<'a> {
    entry: usize,
    row: &'a ScheduleRow,
    workers: &'a WorkerSelection,
    /// First worker-row of its operation group
    group_first: bool,
    /// First row of its entry
    entry_first: bool,
}

/// Plans the formula-mirrored table for a calculation history
#[derive(Debug, Default)]
pub struct FormulaMirror;

impl FormulaMirror {
    pub fn new() -> Self {
        Self
    }

    /// Build the cell plan for `history`, oldest entry first.
    ///
    /// Every entry must carry its lunch configuration: the formulas bake the
    /// window bounds in as `TIME` literals, so a missing configuration can
    /// not be defaulted without silently changing what the sheet computes.
    pub fn plan(&self, history: &[HistoryEntry]) -> Result<MirrorPlan, MirrorError> {
        let mut metas = Vec::with_capacity(history.len());
        for (ei, entry) in history.iter().enumerate() {
            let lunch = entry.lunch.ok_or(MirrorError::MissingLunchConfig(ei))?;
            lunch
                .validate()
                .map_err(|e| MirrorError::Format(e.to_string()))?;
            metas.push(EntryMeta {
                windows: lunch.active_windows(),
                chain: entry.chain,
                individual: entry.time_mode == TimeMode::Individual,
                auto: entry.pdtv_auto,
            });
        }

        let flat = flatten(history);
        debug!(entries = history.len(), rows = flat.len(), "planning mirror");
        for (i, fr) in flat.iter().enumerate() {
            if fr.row.worker >= history[fr.entry].workers.count {
                return Err(MirrorError::MetadataGap {
                    row: i,
                    what: format!("worker slot {} outside the selection", fr.row.worker),
                });
            }
        }

        let anchors = register_anchors(&flat, &metas);

        let mut rows = Vec::with_capacity(flat.len());
        // Index of the current operation group's first flat row
        let mut group_anchor = 0usize;
        // Index of the current entry's first flat row
        let mut entry_start = 0usize;
        // Per-worker previous row inside the current entry (individual mode)
        let mut worker_prev: Vec<Option<usize>> = Vec::new();

        for (i, fr) in flat.iter().enumerate() {
            let meta = &metas[fr.entry];
            if fr.entry_first {
                entry_start = i;
                worker_prev = vec![None; history[fr.entry].workers.count];
            }
            if fr.group_first {
                group_anchor = i;
            }

            let mut planned = PlannedRow::blank();
            planned.set(Column::Ordinal, CellContent::Number(f64::from(fr.row.ordinal)));
            planned.set(Column::Name, CellContent::Text(fr.row.name.clone()));
            planned.set(Column::RowKey, CellContent::Text(fr.row.row_key()));

            self.emit_shared(&mut planned, &flat, i, &anchors)?;
            self.emit_pdtv(&mut planned, &flat, i, meta, &anchors)?;

            if meta.individual {
                let incoming = individual_incoming(&worker_prev, fr, meta, entry_start);
                self.emit_individual_times(&mut planned, &flat, i, incoming, meta);
                worker_prev[fr.row.worker] = Some(i);
            } else if fr.group_first {
                let literal = i == 0 || (fr.entry_first && (!meta.chain || fr.entry == 0));
                self.emit_group_times(&mut planned, &flat, i, literal, meta);
            } else {
                // Fan-out worker row: every time cell mirrors the group head
                for col in [
                    Column::StartDate,
                    Column::StartTime,
                    Column::EndDate,
                    Column::EndTime,
                    Column::LunchMark,
                ] {
                    if col == Column::LunchMark && meta.windows.is_empty() {
                        continue;
                    }
                    planned.set(col, reference(col, group_anchor));
                }
            }

            rows.push(planned);
        }

        let reports = history
            .iter()
            .flat_map(|e| e.report_lines.iter().cloned())
            .collect();

        Ok(MirrorPlan { rows, reports })
    }

    /// Pause, duration, posting date and worker columns: anchor literals
    /// with references fanning out
    fn emit_shared(
        &self,
        planned: &mut PlannedRow,
        flat: &[FlatRow<'_>],
        i: usize,
        anchors: &AnchorTable,
    ) -> Result<(), MirrorError> {
        let fr = &flat[i];
        let row = fr.row;

        // Pause: the very first row of the sheet starts at the literal start
        // time, which already absorbed any pre-pause, so its cell is pinned
        // to zero to keep re-chaining from counting the pause twice.
        let pause_key = AnchorKey::Pause {
            entry: fr.entry,
            ordinal: row.ordinal,
        };
        if anchors.is_anchor(pause_key, i) {
            let value = if i == 0 { 0.0 } else { row.pause_min };
            planned.set(Column::Pause, CellContent::Number(value));
        } else {
            planned.set(Column::Pause, reference(Column::Pause, anchors.anchor(pause_key, i)?));
        }

        let dur_key = AnchorKey::Duration {
            entry: fr.entry,
            ordinal: row.ordinal,
        };
        if anchors.is_anchor(dur_key, i) {
            planned.set(Column::Duration, CellContent::Number(row.duration));
        } else {
            planned.set(
                Column::Duration,
                reference(Column::Duration, anchors.anchor(dur_key, i)?),
            );
        }

        // Alternate unit is always derived from the native cell
        let own_dur = cell(Column::Duration, i);
        let alt = match row.duration_unit {
            TimeUnit::Minutes => format!("={own_dur}/60"),
            TimeUnit::Hours => format!("={own_dur}*60"),
        };
        planned.set(Column::DurationAlt, CellContent::Formula(alt));

        if anchors.is_anchor(AnchorKey::PostingDate, i) {
            planned.set(
                Column::PostingDate,
                CellContent::Number(date_serial(row.posting_date)),
            );
        } else {
            planned.set(
                Column::PostingDate,
                reference(Column::PostingDate, anchors.anchor(AnchorKey::PostingDate, i)?),
            );
        }

        let worker_key = AnchorKey::Worker(row.worker);
        if anchors.is_anchor(worker_key, i) {
            planned.set(
                Column::Worker,
                CellContent::Text(fr.workers.label(row.worker)),
            );
        } else {
            planned.set(
                Column::Worker,
                reference(Column::Worker, anchors.anchor(worker_key, i)?),
            );
        }
        Ok(())
    }

    /// Confirmation column: auto-numbered entries carry one anchor label and
    /// `TEXT(VALUE(..)+offset)` arithmetic; manual and plain labels anchor
    /// per operation
    fn emit_pdtv(
        &self,
        planned: &mut PlannedRow,
        flat: &[FlatRow<'_>],
        i: usize,
        meta: &EntryMeta,
        anchors: &AnchorTable,
    ) -> Result<(), MirrorError> {
        let fr = &flat[i];
        let row = fr.row;

        if let Some(own) = numeric_auto(row, meta) {
            let key = AnchorKey::PdtvEntry { entry: fr.entry };
            let anchor_idx = anchors.anchor(key, i)?;
            if anchor_idx == i {
                planned.set(Column::Pdtv, CellContent::Text(row.pdtv.clone()));
                return Ok(());
            }
            let base: i64 = flat[anchor_idx]
                .row
                .pdtv
                .parse()
                .map_err(|_| MirrorError::MetadataGap {
                    row: anchor_idx,
                    what: "confirmation anchor is not numeric".into(),
                })?;
            let d = own as i64 - base;
            let anchor_cell = cell(Column::Pdtv, anchor_idx);
            let content = if d == 0 {
                CellContent::Formula(format!("={anchor_cell}"))
            } else {
                let sign = if d < 0 { "-" } else { "+" };
                let mask = "0".repeat(PDTV_DIGITS);
                CellContent::Formula(format!(
                    "=TEXT(VALUE({anchor_cell}){sign}{},\"{mask}\")",
                    d.abs()
                ))
            };
            planned.set(Column::Pdtv, content);
            return Ok(());
        }

        let key = AnchorKey::PdtvOp {
            entry: fr.entry,
            ordinal: row.ordinal,
        };
        if anchors.is_anchor(key, i) {
            planned.set(Column::Pdtv, CellContent::Text(row.pdtv.clone()));
        } else {
            planned.set(Column::Pdtv, reference(Column::Pdtv, anchors.anchor(key, i)?));
        }
        Ok(())
    }

    /// Time columns of a group head in total or per-worker mode
    fn emit_group_times(
        &self,
        planned: &mut PlannedRow,
        flat: &[FlatRow<'_>],
        i: usize,
        literal: bool,
        meta: &EntryMeta,
    ) {
        let row = flat[i].row;
        let windows = &meta.windows;
        let k = cell(Column::StartTime, i);
        let dur = duration_frac_expr(i, row.duration_unit);

        let mut tests = Vec::new();

        if literal {
            planned.set(
                Column::StartDate,
                CellContent::Number(date_serial(row.start.date(row.posting_date))),
            );
            planned.set(Column::StartTime, CellContent::Number(row.start.time_frac()));
            push_inside_tests(&mut tests, &k, windows);
        } else {
            let p = i - 1;
            let m_p = cell(Column::EndTime, p);
            let l_p = cell(Column::EndDate, p);
            let d_r = cell(Column::Pause, i);
            let raw = format!("MOD({m_p}+{d_r}/1440,1)");
            planned.set(
                Column::StartTime,
                CellContent::Formula(format!("={}", shifted_expr(&raw, windows))),
            );
            planned.set(
                Column::StartDate,
                CellContent::Formula(format!("={l_p}+INT({m_p}+{d_r}/1440)")),
            );
            push_inside_tests(&mut tests, &raw, windows);
        }

        let j = cell(Column::StartDate, i);
        let mut z = format!("({k}+{dur})");
        for w in windows {
            let s = time_lit(w.start);
            tests.push(format!("AND({k}<{s},{z}>{s})"));
            z = format!("({z}+IF(AND({k}<{s},{z}>{s}),{}/1440,0))", w.len);
        }
        planned.set(Column::EndTime, CellContent::Formula(format!("=MOD({z},1)")));
        planned.set(Column::EndDate, CellContent::Formula(format!("={j}+INT({z})")));

        planned.set(Column::LunchMark, marker(&tests, windows));
    }

    /// Time columns in individual mode: each worker chains through their own
    /// rows, and an operation adds nothing to the clock
    fn emit_individual_times(
        &self,
        planned: &mut PlannedRow,
        flat: &[FlatRow<'_>],
        i: usize,
        incoming: Option<usize>,
        meta: &EntryMeta,
    ) {
        let row = flat[i].row;
        let windows = &meta.windows;
        let mut tests = Vec::new();

        match incoming {
            Some(q) => {
                let m_q = cell(Column::EndTime, q);
                let l_q = cell(Column::EndDate, q);
                planned.set(
                    Column::StartTime,
                    CellContent::Formula(format!("={}", shifted_expr(&m_q, windows))),
                );
                planned.set(Column::StartDate, CellContent::Formula(format!("={l_q}")));
                push_inside_tests(&mut tests, &m_q, windows);
            }
            None => {
                planned.set(
                    Column::StartDate,
                    CellContent::Number(date_serial(row.start.date(row.posting_date))),
                );
                planned.set(Column::StartTime, CellContent::Number(row.start.time_frac()));
                push_inside_tests(&mut tests, &cell(Column::StartTime, i), windows);
            }
        }

        let k = cell(Column::StartTime, i);
        let j = cell(Column::StartDate, i);
        planned.set(Column::EndTime, CellContent::Formula(format!("={k}")));
        planned.set(Column::EndDate, CellContent::Formula(format!("={j}")));

        planned.set(Column::LunchMark, marker(&tests, windows));
    }
}

/// Flatten the history, tagging group and entry heads
fn flatten(history: &[HistoryEntry]) -> Vec<FlatRow<'_>> {
    let mut flat = Vec::new();
    for (ei, entry) in history.iter().enumerate() {
        for (ri, row) in entry.rows.iter().enumerate() {
            let group_first = ri == 0 || entry.rows[ri - 1].ordinal != row.ordinal;
            flat.push(FlatRow {
                entry: ei,
                row,
                workers: &entry.workers,
                group_first,
                entry_first: ri == 0,
            });
        }
    }
    flat
}

/// One pass claiming every anchor cell before any formula is written
fn register_anchors(flat: &[FlatRow<'_>], metas: &[EntryMeta]) -> AnchorTable {
    let mut anchors = AnchorTable::new();
    for (i, fr) in flat.iter().enumerate() {
        anchors.register(AnchorKey::PostingDate, i);
        anchors.register(AnchorKey::Worker(fr.row.worker), i);
        if fr.group_first {
            anchors.register(
                AnchorKey::Duration {
                    entry: fr.entry,
                    ordinal: fr.row.ordinal,
                },
                i,
            );
            anchors.register(
                AnchorKey::Pause {
                    entry: fr.entry,
                    ordinal: fr.row.ordinal,
                },
                i,
            );
            anchors.register(
                AnchorKey::PdtvOp {
                    entry: fr.entry,
                    ordinal: fr.row.ordinal,
                },
                i,
            );
        }
        if numeric_auto(fr.row, &metas[fr.entry]).is_some() {
            anchors.register(AnchorKey::PdtvEntry { entry: fr.entry }, i);
        }
    }
    anchors
}

/// Incoming end-row for an individual-mode row: the worker's previous row in
/// this entry, or the prior entry's last row when chaining in
fn individual_incoming(
    worker_prev: &[Option<usize>],
    fr: &FlatRow<'_>,
    meta: &EntryMeta,
    entry_start: usize,
) -> Option<usize> {
    if let Some(q) = worker_prev[fr.row.worker] {
        return Some(q);
    }
    // A worker's first row in a chained entry continues from the entry
    // boundary even when it is not the entry head
    if meta.chain && fr.entry > 0 && entry_start > 0 {
        return Some(entry_start - 1);
    }
    None
}

/// Auto-numbered confirmation value of a row, when the entry and the label
/// qualify for offset arithmetic
fn numeric_auto(row: &ScheduleRow, meta: &EntryMeta) -> Option<u64> {
    if !meta.auto || row.pdtv_manual || row.pdtv.len() != PDTV_DIGITS {
        return None;
    }
    row.pdtv.parse().ok()
}

fn reference(column: Column, anchor_idx: usize) -> CellContent {
    CellContent::Formula(format!("={}", cell(column, anchor_idx)))
}

/// `TIME(h,m,0)` literal for a minutes-of-day boundary
fn time_lit(minutes: f64) -> String {
    let h = (minutes / 60.0).floor() as u32;
    let m = (minutes - f64::from(h) * 60.0).round() as u32;
    format!("TIME({h},{m},0)")
}

/// Duration of row `i` as a day-fraction expression over its own cell
fn duration_frac_expr(i: usize, unit: TimeUnit) -> String {
    let e = cell(Column::Duration, i);
    match unit {
        TimeUnit::Minutes => format!("{e}/1440"),
        TimeUnit::Hours => format!("{e}/24"),
    }
}

/// Fold the ordered window shift into a nested `IF(AND(..))` expression
fn shifted_expr(raw: &str, windows: &[Window]) -> String {
    let mut t = raw.to_string();
    for w in windows {
        let s = time_lit(w.start);
        let e = time_lit(w.end());
        t = format!("IF(AND({t}>={s},{t}<{e}),{e},{t})");
    }
    t
}

/// Inside-tests of the iterated shift, window by window
fn push_inside_tests(tests: &mut Vec<String>, raw: &str, windows: &[Window]) {
    let mut t = raw.to_string();
    for w in windows {
        let s = time_lit(w.start);
        let e = time_lit(w.end());
        tests.push(format!("AND({t}>={s},{t}<{e})"));
        t = format!("IF(AND({t}>={s},{t}<{e}),{e},{t})");
    }
}

/// The lunch-mark cell: `*` when any shift or span test fires
fn marker(tests: &[String], windows: &[Window]) -> CellContent {
    if windows.is_empty() || tests.is_empty() {
        return CellContent::Blank;
    }
    CellContent::Formula(format!(
        "=IF(OR({}),\"{LUNCH_MARK}\",\"\")",
        tests.join(",")
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use opsheet_core::{Instant, LunchConfig, LunchWindow, WorkerSelection};
    use pretty_assertions::assert_eq;

    fn posting() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    fn row(ordinal: u32, worker: usize, start_min: f64, end_min: f64) -> ScheduleRow {
        ScheduleRow {
            ordinal,
            name: format!("op {ordinal}"),
            worker,
            start: Instant::new(0, start_min),
            end: Instant::new(0, end_min),
            crossed_lunch: false,
            pause_min: 0.0,
            posting_date: posting(),
            duration: end_min - start_min,
            duration_unit: TimeUnit::Minutes,
            pdtv: format!("{ordinal}"),
            pdtv_manual: false,
        }
    }

    fn entry(rows: Vec<ScheduleRow>, workers: usize) -> HistoryEntry {
        HistoryEntry {
            rows,
            lunch: Some(LunchConfig::new(
                LunchWindow::new(12, 0),
                LunchWindow::default(),
                45,
            )),
            chain: false,
            time_mode: TimeMode::PerWorker,
            workers: WorkerSelection::new(workers),
            pdtv_auto: false,
            report_lines: Vec::new(),
        }
    }

    #[test]
    fn missing_lunch_configuration_is_fatal() {
        let mut e = entry(vec![row(1, 0, 480.0, 510.0)], 1);
        e.lunch = None;
        let err = FormulaMirror::new().plan(&[e]).unwrap_err();
        assert!(matches!(err, MirrorError::MissingLunchConfig(0)));
    }

    #[test]
    fn fan_out_rows_reference_the_group_head() {
        let e = entry(
            vec![row(1, 0, 480.0, 510.0), row(1, 1, 480.0, 510.0)],
            2,
        );
        let plan = FormulaMirror::new().plan(&[e]).unwrap();
        assert_eq!(plan.rows.len(), 2);

        // Head carries literals, second worker references them
        assert_eq!(
            plan.rows[0].get(Column::StartTime),
            &CellContent::Number(480.0 / 1440.0)
        );
        assert_eq!(
            plan.rows[1].get(Column::StartTime),
            &CellContent::Formula("=K2".into())
        );
        assert_eq!(
            plan.rows[1].get(Column::Duration),
            &CellContent::Formula("=E2".into())
        );
        assert_eq!(
            plan.rows[1].get(Column::Pause),
            &CellContent::Formula("=D2".into())
        );
    }

    #[test]
    fn chained_group_head_rederives_its_start() {
        let e = entry(
            vec![row(1, 0, 480.0, 510.0), row(2, 0, 510.0, 540.0)],
            1,
        );
        let plan = FormulaMirror::new().plan(&[e]).unwrap();

        let k = plan.rows[1].get(Column::StartTime);
        let CellContent::Formula(f) = k else {
            panic!("expected a formula, got {k:?}");
        };
        assert!(f.contains("MOD(M2+D3/1440,1)"), "start formula: {f}");
        assert!(f.contains("TIME(12,0,0)"), "window bound baked in: {f}");

        let j = plan.rows[1].get(Column::StartDate);
        assert_eq!(
            j,
            &CellContent::Formula("=L2+INT(M2+D3/1440)".into())
        );
    }

    #[test]
    fn end_formula_extends_across_the_window() {
        let e = entry(vec![row(1, 0, 705.0, 735.0)], 1);
        let plan = FormulaMirror::new().plan(&[e]).unwrap();

        let m = plan.rows[0].get(Column::EndTime);
        let CellContent::Formula(f) = m else {
            panic!("expected a formula, got {m:?}");
        };
        assert!(f.starts_with("=MOD("), "{f}");
        assert!(f.contains("K2+E2/1440"), "{f}");
        assert!(f.contains("45/1440"), "window length compensation: {f}");

        let c = plan.rows[0].get(Column::LunchMark);
        let CellContent::Formula(f) = c else {
            panic!("expected a marker formula, got {c:?}");
        };
        assert!(f.contains("\"*\""), "{f}");
    }

    #[test]
    fn first_row_pause_is_pinned_to_zero() {
        let mut r = row(1, 0, 480.0, 510.0);
        r.pause_min = 15.0;
        let e = entry(vec![r], 1);
        let plan = FormulaMirror::new().plan(&[e]).unwrap();
        assert_eq!(plan.rows[0].get(Column::Pause), &CellContent::Number(0.0));
    }

    #[test]
    fn auto_confirmation_offsets_from_the_entry_anchor() {
        let mut rows = vec![
            row(1, 0, 480.0, 510.0),
            row(2, 0, 510.0, 540.0),
            row(3, 0, 540.0, 570.0),
        ];
        rows[0].pdtv = "0000000201".into();
        rows[1].pdtv = "0000000203".into();
        rows[2].pdtv = "0000000200".into();
        let mut e = entry(rows, 1);
        e.pdtv_auto = true;
        let plan = FormulaMirror::new().plan(&[e]).unwrap();

        assert_eq!(
            plan.rows[0].get(Column::Pdtv),
            &CellContent::Text("0000000201".into())
        );
        assert_eq!(
            plan.rows[1].get(Column::Pdtv),
            &CellContent::Formula("=TEXT(VALUE(G2)+2,\"0000000000\")".into())
        );
        assert_eq!(
            plan.rows[2].get(Column::Pdtv),
            &CellContent::Formula("=TEXT(VALUE(G2)-1,\"0000000000\")".into())
        );
    }

    #[test]
    fn manual_labels_anchor_per_operation() {
        let mut rows = vec![row(4, 0, 480.0, 510.0), row(4, 1, 480.0, 510.0)];
        rows[0].pdtv = "A-17".into();
        rows[0].pdtv_manual = true;
        rows[1].pdtv = "A-17".into();
        rows[1].pdtv_manual = true;
        let mut e = entry(rows, 2);
        e.pdtv_auto = true;
        let plan = FormulaMirror::new().plan(&[e]).unwrap();

        assert_eq!(
            plan.rows[0].get(Column::Pdtv),
            &CellContent::Text("A-17".into())
        );
        assert_eq!(
            plan.rows[1].get(Column::Pdtv),
            &CellContent::Formula("=G2".into())
        );
    }

    #[test]
    fn individual_mode_chains_per_worker() {
        let mut e = entry(
            vec![
                row(1, 0, 480.0, 480.0),
                row(1, 1, 480.0, 480.0),
                row(2, 0, 480.0, 480.0),
            ],
            2,
        );
        e.time_mode = TimeMode::Individual;
        let plan = FormulaMirror::new().plan(&[e]).unwrap();

        // Worker 2's first row is literal, not a fan-out reference
        assert_eq!(
            plan.rows[1].get(Column::StartTime),
            &CellContent::Number(480.0 / 1440.0)
        );
        // Worker 1's second row continues from their own row, skipping the
        // interleaved worker-2 row
        let k = plan.rows[2].get(Column::StartTime);
        let CellContent::Formula(f) = k else {
            panic!("expected a formula, got {k:?}");
        };
        assert!(f.contains("M2"), "chains from worker 1's previous end: {f}");
        assert!(!f.contains("M3"), "must not chain through worker 2: {f}");
        // Zero clock contribution: end mirrors start
        assert_eq!(
            plan.rows[2].get(Column::EndTime),
            &CellContent::Formula("=K4".into())
        );
    }

    #[test]
    fn chained_entries_continue_across_the_boundary() {
        let mut first = entry(vec![row(1, 0, 480.0, 510.0)], 1);
        first.report_lines.push("entry one".into());
        let mut second = entry(vec![row(1, 0, 520.0, 550.0)], 1);
        second.chain = true;
        let plan = FormulaMirror::new().plan(&[first, second]).unwrap();

        let k = plan.rows[1].get(Column::StartTime);
        let CellContent::Formula(f) = k else {
            panic!("expected a formula, got {k:?}");
        };
        assert!(f.contains("M2"), "continues from the prior entry: {f}");
        assert_eq!(plan.reports, vec!["entry one".to_string()]);
    }

    #[test]
    fn worker_slot_outside_the_selection_is_a_metadata_gap() {
        let e = entry(vec![row(1, 0, 480.0, 510.0), row(1, 3, 480.0, 510.0)], 2);
        let err = FormulaMirror::new().plan(&[e]).unwrap_err();
        assert!(matches!(err, MirrorError::MetadataGap { row: 1, .. }));
    }
}
