//! Anchor-cell arena.
//!
//! "Set once, reference everywhere": repeated values (pause, worker, posting
//! date, duration, confirmation anchors) live in exactly one literal cell and
//! every structurally-equivalent cell references it. The table is built in
//! one pass over the flattened row list before any formula is emitted, so
//! first-occurrence detection is deterministic and spans chained entries.

use std::collections::HashMap;

use opsheet_core::MirrorError;

/// Identity of an anchor cell
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AnchorKey {
    /// First row of a worker slot across the whole history
    Worker(usize),
    /// First row overall; every row shares one posting date
    PostingDate,
    /// First row of an operation group within an entry
    Duration { entry: usize, ordinal: u32 },
    /// First worker-row of an operation within an entry
    Pause { entry: usize, ordinal: u32 },
    /// First row of an entry (auto confirmation numbering)
    PdtvEntry { entry: usize },
    /// First worker-row of an operation (manual confirmation numbering)
    PdtvOp { entry: usize, ordinal: u32 },
}

/// Anchor cells keyed by identity, holding the owning data-row index
#[derive(Debug, Default)]
pub struct AnchorTable {
    map: HashMap<AnchorKey, usize>,
}

impl AnchorTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the anchor for `row`. The first registration per key wins;
    /// later rows for the same key become references.
    pub fn register(&mut self, key: AnchorKey, row: usize) {
        self.map.entry(key).or_insert(row);
    }

    /// Data-row index of the anchor. A missing anchor means the row set
    /// arrived without the structural metadata the mirror depends on; that
    /// is fatal rather than guessed around.
    pub fn anchor(&self, key: AnchorKey, row: usize) -> Result<usize, MirrorError> {
        self.map.get(&key).copied().ok_or(MirrorError::MetadataGap {
            row,
            what: format!("no anchor registered for {key:?}"),
        })
    }

    /// Does `row` own the anchor cell for `key`?
    pub fn is_anchor(&self, key: AnchorKey, row: usize) -> bool {
        self.map.get(&key) == Some(&row)
    }
}
