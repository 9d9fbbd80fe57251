//! Spreadsheet-semantics arithmetic.
//!
//! The emitted formulas cannot loop, so they re-express the lunch shift and
//! extend rules as single-pass conditional arithmetic over date serials and
//! day fractions. This module is that arithmetic, evaluable in Rust: every
//! function corresponds one-to-one to a formula shape in `mirror`, and the
//! conformance tests run it against the runtime scheduler to keep the two
//! backends from drifting.

use opsheet_core::Window;

/// Minutes in a day, as f64
pub const DAY_MIN: f64 = 1440.0;

/// Day fraction of a window start
pub fn win_start_frac(w: &Window) -> f64 {
    w.start / DAY_MIN
}

/// Day fraction of a window end
pub fn win_end_frac(w: &Window) -> f64 {
    w.end() / DAY_MIN
}

/// `MOD(x, 1)`
pub fn frac(x: f64) -> f64 {
    x - x.floor()
}

/// The nested-IF shift: move a time-of-day fraction out of each window it
/// falls into, checked in window order
pub fn shift_frac(tod: f64, windows: &[Window]) -> f64 {
    let mut t = tod;
    for w in windows {
        if t >= win_start_frac(w) && t < win_end_frac(w) {
            t = win_end_frac(w);
        }
    }
    t
}

/// Did the shift cross any window? Mirrors the marker formula's iterated
/// inside-tests.
pub fn shift_crossed(tod: f64, windows: &[Window]) -> bool {
    let mut t = tod;
    let mut crossed = false;
    for w in windows {
        if t >= win_start_frac(w) && t < win_end_frac(w) {
            t = win_end_frac(w);
            crossed = true;
        }
    }
    crossed
}

/// Start cells of a chained row: previous end (date serial, time fraction)
/// plus a pause in minutes, shifted out of the windows.
///
/// Returns `(start_date_serial, start_time_frac)`.
pub fn chained_start(
    prev_end_date: f64,
    prev_end_time: f64,
    pause_min: f64,
    windows: &[Window],
) -> (f64, f64) {
    let raw = prev_end_time + pause_min / DAY_MIN;
    let date = prev_end_date + raw.floor();
    let time = shift_frac(frac(raw), windows);
    (date, time)
}

/// End cells from a row's own start and duration (as a day fraction): the
/// single-pass extend chain, each covered window adding its length before
/// the next window's test.
///
/// Returns `(end_date_serial, end_time_frac)`.
pub fn row_end(
    start_date: f64,
    start_time: f64,
    duration_frac: f64,
    windows: &[Window],
) -> (f64, f64) {
    let mut z = start_time + duration_frac;
    for w in windows {
        if start_time < win_start_frac(w) && z > win_start_frac(w) {
            z += w.len / DAY_MIN;
        }
    }
    (start_date + z.floor(), frac(z))
}

/// The span part of the lunch marker: does the extend chain cover any window?
pub fn span_crossed(start_time: f64, duration_frac: f64, windows: &[Window]) -> bool {
    let mut z = start_time + duration_frac;
    let mut crossed = false;
    for w in windows {
        if start_time < win_start_frac(w) && z > win_start_frac(w) {
            z += w.len / DAY_MIN;
            crossed = true;
        }
    }
    crossed
}
