//! Integration tests for the XLSX export

use chrono::NaiveDate;

use opsheet_core::{
    HistoryEntry, Instant, LunchConfig, LunchWindow, OperationSpec, PdtvState, TimeMode,
    TimeUnit, WorkerSelection,
};
use opsheet_render::{CellContent, ExcelRenderer, FormulaMirror};
use opsheet_render::layout::Column;
use opsheet_solver::{resume_from, ScheduleRequest, TimelineScheduler};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// A two-worker shift with a lunch window and auto confirmation numbering
fn create_shift_entry() -> HistoryEntry {
    let lunch = LunchConfig::new(LunchWindow::new(12, 0), LunchWindow::default(), 45);
    let workers = WorkerSelection::with_names(vec!["A. Petrov".into(), "M. Orlova".into()]);
    let req = ScheduleRequest::new(date(2025, 3, 14), Instant::from_hm(11, 0))
        .lunch(lunch)
        .workers(workers.clone())
        .pdtv(PdtvState::with_first_id(200))
        .ops(vec![
            OperationSpec::new(1, "Turning")
                .duration(40.0, TimeUnit::Minutes)
                .workers(vec![true, true]),
            OperationSpec::new(2, "Milling")
                .duration(30.0, TimeUnit::Minutes)
                .pause(10.0, TimeUnit::Minutes)
                .workers(vec![true, false]),
            OperationSpec::new(3, "Inspection")
                .duration(15.0, TimeUnit::Minutes)
                .workers(vec![false, true]),
        ]);
    let run = TimelineScheduler::new().run(&req).unwrap();

    HistoryEntry {
        rows: run.rows,
        lunch: Some(lunch),
        chain: false,
        time_mode: TimeMode::PerWorker,
        workers,
        pdtv_auto: true,
        report_lines: vec!["Shift plan, posting 2025-03-14".into()],
    }
}

#[test]
fn renders_a_workbook() {
    let entry = create_shift_entry();
    let bytes = ExcelRenderer::new().render_to_bytes(&[entry]).unwrap();

    // XLSX files are zip archives
    assert!(bytes.len() > 1000);
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn plan_and_workbook_agree_on_row_count() {
    let entry = create_shift_entry();
    let plan = FormulaMirror::new().plan(std::slice::from_ref(&entry)).unwrap();
    assert_eq!(plan.rows.len(), entry.rows.len());
    assert_eq!(plan.reports.len(), 1);

    let bytes = ExcelRenderer::new().render_plan(&plan).unwrap();
    assert!(!bytes.is_empty());
}

#[test]
fn worker_names_come_from_the_selection() {
    let entry = create_shift_entry();
    let plan = FormulaMirror::new().plan(&[entry]).unwrap();

    assert_eq!(
        plan.rows[0].get(Column::Worker),
        &CellContent::Text("A. Petrov".into())
    );
    // First row of the second worker slot carries their literal name
    assert_eq!(
        plan.rows[1].get(Column::Worker),
        &CellContent::Text("M. Orlova".into())
    );
    // Later rows reference the slot anchors
    assert_eq!(
        plan.rows[2].get(Column::Worker),
        &CellContent::Formula("=I2".into())
    );
    assert_eq!(
        plan.rows[3].get(Column::Worker),
        &CellContent::Formula("=I3".into())
    );
}

#[test]
fn chained_entries_render_as_one_table() {
    let first = create_shift_entry();
    let resume = resume_from(std::slice::from_ref(&first)).unwrap();

    let lunch = first.lunch.unwrap();
    let workers = first.workers.clone();
    let req = ScheduleRequest::new(date(2025, 3, 14), resume)
        .lunch(lunch)
        .workers(workers.clone())
        .ops(vec![OperationSpec::new(1, "Packing")
            .duration(25.0, TimeUnit::Minutes)
            .workers(vec![true, false])]);
    let run = TimelineScheduler::new().run(&req).unwrap();
    let second = HistoryEntry {
        rows: run.rows,
        lunch: Some(lunch),
        chain: true,
        time_mode: TimeMode::PerWorker,
        workers,
        pdtv_auto: false,
        report_lines: Vec::new(),
    };

    let plan = FormulaMirror::new().plan(&[first, second]).unwrap();
    let boundary = plan.rows.len() - 1;
    let CellContent::Formula(f) = plan.rows[boundary].get(Column::StartTime) else {
        panic!("chained entry head must re-derive its start");
    };
    assert!(f.contains("MOD("), "{f}");

    let bytes = ExcelRenderer::new().render_plan(&plan).unwrap();
    assert_eq!(&bytes[0..2], b"PK");
}
