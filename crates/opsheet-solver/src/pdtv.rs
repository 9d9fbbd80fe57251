//! Confirmation-number (PDTV) assignment.
//!
//! Paperwork numbering must stay contiguous even when the operation actually
//! performed last is not last in the edited list: the designated last and
//! penultimate operations receive the run's final two numbers, and every
//! other operation closes ranks around them. Soft-deleted operations are
//! absent from the scheduled run and must not leave gaps either, so labels
//! are assigned from an operation's rank within the run, not from its raw
//! ordinal.

use opsheet_core::{PdtvState, PDTV_DIGITS};

/// Contiguous numbering for one scheduled run.
///
/// Built from the ordinals actually scheduled, so the emitted number set is
/// exactly `[first_id, first_id + total - 1]` regardless of which ordinals
/// were filtered out. The last/penultimate markers are translated from
/// ordinals to ranks on construction; a marker pointing at an unscheduled
/// ordinal is dropped.
#[derive(Clone, Debug)]
pub struct NumberingPlan {
    ordinals: Vec<u32>,
    state: PdtvState,
}

impl NumberingPlan {
    pub fn new(mut ordinals: Vec<u32>, state: &PdtvState) -> Self {
        ordinals.sort_unstable();
        ordinals.dedup();
        let rank = |marked: u32| {
            ordinals
                .iter()
                .position(|&o| o == marked)
                .map(|p| p as u32 + 1)
        };
        let state = PdtvState {
            first_id: state.first_id,
            last: state.last.and_then(rank),
            penultimate: state.penultimate.and_then(rank),
            auto: state.auto,
        };
        Self { ordinals, state }
    }

    /// 1-based rank of an ordinal within the run, in ordinal order
    fn rank(&self, ordinal: u32) -> Option<u32> {
        self.ordinals
            .iter()
            .position(|&o| o == ordinal)
            .map(|p| p as u32 + 1)
    }

    /// Display label for an operation's confirmation number.
    ///
    /// The ordinal as a plain string when numbering is inactive or the
    /// ordinal is not part of the run, otherwise the rank-based label.
    pub fn label(&self, ordinal: u32) -> String {
        let total = self.ordinals.len() as u32;
        match (self.state.first_id, self.rank(ordinal)) {
            (Some(_), Some(rank)) => label(rank, total, &self.state),
            _ => ordinal.to_string(),
        }
    }
}

/// Zero-based offset of an operation's number from `first_id`.
///
/// `None` when no numbering scheme is active. `position` is the operation's
/// 1-based rank within the scheduled run, `total_ops` the count of scheduled
/// operations; marker fields are expressed in the same rank space.
pub fn offset(position: u32, total_ops: u32, state: &PdtvState) -> Option<i64> {
    state.first_id?;

    if state.last == Some(position) {
        return Some(i64::from(total_ops) - 1);
    }
    if state.penultimate == Some(position) {
        return Some(i64::from(total_ops) - 2);
    }

    let mut slot = i64::from(position);
    if matches!(state.last, Some(last) if position > last) {
        slot -= 1;
    }
    if matches!(state.penultimate, Some(pen) if position > pen) {
        slot -= 1;
    }
    Some(slot - 1)
}

/// Display label for a run position.
///
/// The position as a plain string when numbering is inactive, otherwise
/// `first_id + offset` zero-padded to ten digits.
pub fn label(position: u32, total_ops: u32, state: &PdtvState) -> String {
    match (state.first_id, offset(position, total_ops, state)) {
        (Some(first), Some(off)) => {
            let value = (first as i64 + off).max(0) as u64;
            format!("{value:0width$}", width = PDTV_DIGITS)
        }
        _ => position.to_string(),
    }
}
