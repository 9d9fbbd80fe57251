//! XLSX workbook writer.
//!
//! Takes a [`MirrorPlan`](crate::mirror::MirrorPlan) and writes it into one
//! worksheet. Formulas are written as formulas, not as their computed
//! values, so the file stays live: editing a duration or pause cell
//! recomputes every dependent start, end and lunch marker downstream.

use rust_xlsxwriter::{Format, FormatAlign, FormatBorder, Workbook, Worksheet};
use tracing::debug;

use opsheet_core::{HistoryEntry, MirrorError};

use crate::layout::{Column, COLUMNS, HEADER_ROWS};
use crate::mirror::{CellContent, FormulaMirror, MirrorPlan};

/// Excel timeline exporter
#[derive(Clone, Debug)]
pub struct ExcelRenderer {
    /// Worksheet name
    pub sheet_name: String,
    /// Whether to append the per-entry report lines below the table
    pub include_reports: bool,
}

impl Default for ExcelRenderer {
    fn default() -> Self {
        Self {
            sheet_name: "Timeline".into(),
            include_reports: true,
        }
    }
}

/// Reusable cell formats
struct SheetFormats {
    header: Format,
    date: Format,
    time: Format,
    number: Format,
    text: Format,
    marker: Format,
    report: Format,
}

impl ExcelRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sheet_name(mut self, name: impl Into<String>) -> Self {
        self.sheet_name = name.into();
        self
    }

    pub fn no_reports(mut self) -> Self {
        self.include_reports = false;
        self
    }

    /// Plan the formula mirror for `history` and render it to XLSX bytes
    pub fn render_to_bytes(&self, history: &[HistoryEntry]) -> Result<Vec<u8>, MirrorError> {
        let plan = FormulaMirror::new().plan(history)?;
        self.render_plan(&plan)
    }

    /// Render an already-built plan
    pub fn render_plan(&self, plan: &MirrorPlan) -> Result<Vec<u8>, MirrorError> {
        let mut workbook = Workbook::new();
        let formats = create_formats();

        let sheet = workbook.add_worksheet();
        sheet
            .set_name(&self.sheet_name)
            .map_err(|e| MirrorError::Format(format!("invalid sheet name: {e}")))?;

        write_header(sheet, &formats)?;
        debug!(rows = plan.rows.len(), reports = plan.reports.len(), "writing workbook");

        for (i, row) in plan.rows.iter().enumerate() {
            let sheet_row = crate::layout::sheet_row(i) - 1;
            for column in COLUMNS {
                let col = column.index();
                let format = format_for(column, &formats);
                match &row.cells[col as usize] {
                    CellContent::Blank => {}
                    CellContent::Number(v) => {
                        sheet
                            .write_number_with_format(sheet_row, col, *v, format)
                            .map_err(write_err)?;
                    }
                    CellContent::Text(s) => {
                        sheet
                            .write_string_with_format(sheet_row, col, s, format)
                            .map_err(write_err)?;
                    }
                    CellContent::Formula(f) => {
                        sheet
                            .write_formula_with_format(sheet_row, col, f.as_str(), format)
                            .map_err(write_err)?;
                    }
                }
            }
        }

        if self.include_reports && !plan.reports.is_empty() {
            // One blank row between the table and the report block
            let mut row = plan.rows.len() as u32 + HEADER_ROWS + 1;
            for line in &plan.reports {
                sheet
                    .write_string_with_format(row, 0, line, &formats.report)
                    .map_err(write_err)?;
                row += 1;
            }
        }

        workbook
            .save_to_buffer()
            .map_err(|e| MirrorError::Format(format!("failed to create workbook: {e}")))
    }
}

fn write_header(sheet: &mut Worksheet, formats: &SheetFormats) -> Result<(), MirrorError> {
    for column in COLUMNS {
        let col = column.index();
        sheet
            .write_string_with_format(0, col, column.header(), &formats.header)
            .map_err(write_err)?;
        sheet.set_column_width(col, column.width()).ok();
    }
    Ok(())
}

fn create_formats() -> SheetFormats {
    let header = Format::new()
        .set_bold()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let date = Format::new()
        .set_num_format("yyyy-mm-dd")
        .set_border(FormatBorder::Thin);

    let time = Format::new()
        .set_num_format("hh:mm")
        .set_border(FormatBorder::Thin);

    let number = Format::new()
        .set_num_format("0.##")
        .set_border(FormatBorder::Thin);

    let text = Format::new().set_border(FormatBorder::Thin);

    let marker = Format::new()
        .set_align(FormatAlign::Center)
        .set_border(FormatBorder::Thin);

    let report = Format::new().set_italic();

    SheetFormats {
        header,
        date,
        time,
        number,
        text,
        marker,
        report,
    }
}

fn format_for(column: Column, formats: &SheetFormats) -> &Format {
    match column {
        Column::PostingDate | Column::StartDate | Column::EndDate => &formats.date,
        Column::StartTime | Column::EndTime => &formats.time,
        Column::Ordinal | Column::Pause | Column::Duration | Column::DurationAlt => {
            &formats.number
        }
        Column::LunchMark => &formats.marker,
        _ => &formats.text,
    }
}

fn write_err(e: rust_xlsxwriter::XlsxError) -> MirrorError {
    MirrorError::Format(format!("failed to write cell: {e}"))
}
