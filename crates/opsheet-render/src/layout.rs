//! Fixed worksheet layout.
//!
//! The export populates one continuous table with a fixed set of logical
//! columns; everything else on the sheet is decorative. Cell references in
//! emitted formulas are built from this module so the mirror and the workbook
//! writer can never disagree about where a value lives.

/// Logical columns of the export table, in sheet order
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Column {
    /// Operation ordinal
    Ordinal,
    /// Operation display name
    Name,
    /// Crossed-lunch display marker
    LunchMark,
    /// Pre-operation pause, minutes
    Pause,
    /// Duration in its native unit
    Duration,
    /// Duration converted to the alternate unit (always a formula)
    DurationAlt,
    /// Confirmation-number label
    Pdtv,
    /// Posting date
    PostingDate,
    /// Worker label
    Worker,
    StartDate,
    StartTime,
    EndDate,
    EndTime,
    /// Synthetic `"{ordinal}_{worker}"` lookup key
    RowKey,
}

/// All columns in sheet order
pub const COLUMNS: [Column; 14] = [
    Column::Ordinal,
    Column::Name,
    Column::LunchMark,
    Column::Pause,
    Column::Duration,
    Column::DurationAlt,
    Column::Pdtv,
    Column::PostingDate,
    Column::Worker,
    Column::StartDate,
    Column::StartTime,
    Column::EndDate,
    Column::EndTime,
    Column::RowKey,
];

pub const COLUMN_COUNT: usize = COLUMNS.len();

/// Header rows above the data table
pub const HEADER_ROWS: u32 = 1;

impl Column {
    /// Zero-based sheet column index
    pub fn index(self) -> u16 {
        COLUMNS.iter().position(|c| *c == self).unwrap_or(0) as u16
    }

    pub fn header(self) -> &'static str {
        match self {
            Column::Ordinal => "No.",
            Column::Name => "Operation",
            Column::LunchMark => "Lunch",
            Column::Pause => "Pause (min)",
            Column::Duration => "Duration",
            Column::DurationAlt => "Duration (alt)",
            Column::Pdtv => "Confirmation",
            Column::PostingDate => "Posting date",
            Column::Worker => "Worker",
            Column::StartDate => "Start date",
            Column::StartTime => "Start",
            Column::EndDate => "End date",
            Column::EndTime => "End",
            Column::RowKey => "Key",
        }
    }

    pub fn width(self) -> f64 {
        match self {
            Column::Ordinal => 5.0,
            Column::Name => 28.0,
            Column::LunchMark => 6.0,
            Column::Pdtv => 14.0,
            Column::PostingDate | Column::StartDate | Column::EndDate => 12.0,
            Column::Worker => 16.0,
            _ => 10.0,
        }
    }
}

/// Sheet column index to letters (0 -> A, 25 -> Z, 26 -> AA)
pub fn col_letter(col: u16) -> String {
    let mut result = String::new();
    let mut n = u32::from(col) + 1;
    while n > 0 {
        let rem = (n - 1) % 26;
        result.insert(0, (b'A' + rem as u8) as char);
        n = (n - 1) / 26;
    }
    result
}

/// 1-based spreadsheet row of a data row index
pub fn sheet_row(data_idx: usize) -> u32 {
    data_idx as u32 + HEADER_ROWS + 1
}

/// `A1`-style reference to a column cell of a data row
pub fn cell(column: Column, data_idx: usize) -> String {
    format!("{}{}", col_letter(column.index()), sheet_row(data_idx))
}
