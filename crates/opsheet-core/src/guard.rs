//! In-flight operation guards.
//!
//! Timeline generation and spreadsheet export each accept at most one
//! in-flight invocation; a second call while one is active is a no-op rather
//! than queued. Neither operation is cancellable once started.

use std::sync::atomic::{AtomicBool, Ordering};

/// A non-queuing mutual-exclusion flag for one long-running operation.
///
/// ```rust
/// use opsheet_core::ExclusiveFlag;
///
/// static EXPORT: ExclusiveFlag = ExclusiveFlag::new();
///
/// if let Some(_guard) = EXPORT.try_begin() {
///     // run the export; the flag clears when the guard drops
/// } else {
///     // an export is already running: drop the request
/// }
/// ```
#[derive(Debug, Default)]
pub struct ExclusiveFlag {
    busy: AtomicBool,
}

impl ExclusiveFlag {
    pub const fn new() -> Self {
        Self {
            busy: AtomicBool::new(false),
        }
    }

    /// Claim the flag. Returns `None` when an invocation is already active.
    pub fn try_begin(&self) -> Option<InFlight<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight { flag: self })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

/// Releases the owning [`ExclusiveFlag`] on drop
#[derive(Debug)]
pub struct InFlight<'a> {
    flag: &'a ExclusiveFlag,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.flag.busy.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_rejected_while_active() {
        let flag = ExclusiveFlag::new();
        let guard = flag.try_begin();
        assert!(guard.is_some());
        assert!(flag.is_busy());
        assert!(flag.try_begin().is_none());
    }

    #[test]
    fn flag_clears_on_drop() {
        let flag = ExclusiveFlag::new();
        {
            let _guard = flag.try_begin().unwrap();
        }
        assert!(!flag.is_busy());
        assert!(flag.try_begin().is_some());
    }
}
