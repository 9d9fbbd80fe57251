//! Lunch-window conflict resolution.
//!
//! The shared algorithm behind both the runtime scheduler and the formula
//! mirror: decide whether and how a moment or an interval is shifted past one
//! or two lunch windows.
//!
//! Boundary convention (used identically by both backends): a moment is
//! inside a window over the half-open range `[start, start + duration)`; an
//! interval covers a window when it starts strictly before the window start
//! and ends strictly after it.

use opsheet_core::{Instant, Window};

/// Is a time of day (minutes from midnight) inside the window?
pub fn inside(tod_min: f64, window: &Window) -> bool {
    tod_min >= window.start && tod_min < window.end()
}

/// Shift a moment out of any lunch window it falls into.
///
/// Windows must be pre-sorted by start time. Each window is checked in order
/// against the already-shifted moment, so a shift to one window's end that
/// lands inside a later window is re-checked and shifted again. The calendar
/// day component never changes (window ends are validated to stay within the
/// day).
pub fn resolve(instant: Instant, windows: &[Window]) -> (Instant, bool) {
    let mut shifted = instant;
    let mut crossed = false;
    for w in windows {
        if inside(shifted.minute, w) {
            shifted = shifted.with_minute(w.end());
            crossed = true;
        }
    }
    (shifted, crossed)
}

/// Push an interval's end past every lunch window the span covers.
///
/// Covers means: the interval starts strictly before the window start and,
/// at the time the window is considered, already ends strictly after it.
/// Each covered window adds its full duration to the end, and that extension
/// feeds the test for the next window. Triggers independently of [`resolve`],
/// e.g. for an operation long enough to span a window that begins after its
/// shifted start.
pub fn extend_interval(start: Instant, end: Instant, windows: &[Window]) -> (Instant, bool) {
    let mut end = end;
    let mut crossed = false;
    for w in windows {
        // Window start on the interval's starting day; comparisons stay in
        // minutes relative to that day so multi-day ends are handled exactly.
        let window_start = w.start;
        let end_rel = (end.day - start.day) as f64 * 1440.0 + end.minute;
        if start.minute < window_start && end_rel > window_start {
            end = end.add_minutes(w.len);
            crossed = true;
        }
    }
    (end, crossed)
}
