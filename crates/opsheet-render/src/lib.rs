//! # opsheet-render
//!
//! Spreadsheet export for opsheet timelines.
//!
//! The exported workbook is not a snapshot: the scheduling rules are mirrored
//! into cell formulas, so the sheet recomputes starts, ends and lunch markers
//! when a user edits one of the literal cells. The crate splits into:
//!
//! - [`layout`]: the fixed column layout and `A1` reference helpers
//! - [`anchors`]: the set-once/reference-everywhere anchor-cell arena
//! - [`mirror`]: planning each cell as a literal, a reference or a formula
//! - [`arith`]: the formula semantics as evaluable Rust, for conformance
//!   testing against the runtime scheduler
//! - [`excel`]: writing the plan into an XLSX workbook
//!
//! ## Example
//!
//! ```rust,no_run
//! use opsheet_core::HistoryEntry;
//! use opsheet_render::ExcelRenderer;
//!
//! fn export(history: &[HistoryEntry]) -> Result<Vec<u8>, opsheet_core::MirrorError> {
//!     ExcelRenderer::new().sheet_name("Shift plan").render_to_bytes(history)
//! }
//! ```

pub mod anchors;
pub mod arith;
pub mod excel;
pub mod layout;
pub mod mirror;

pub use excel::ExcelRenderer;
pub use mirror::{CellContent, FormulaMirror, MirrorPlan, PlannedRow, LUNCH_MARK};
