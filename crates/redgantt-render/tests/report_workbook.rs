//! Integration tests for the XLSX report writer

use chrono::NaiveDate;
use redgantt_core::{GanttRange, HolidayCalendar, Issue, RowPlacement};
use redgantt_render::{map_date_grid, ReportWriter};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn sample_rows() -> Vec<RowPlacement> {
    let parent = Issue::new(100, "Rollout")
        .start(date(2024, 2, 1))
        .due(date(2024, 2, 20))
        .done_ratio(40)
        .child(101)
        .child(102);
    let prep = Issue::new(101, "Site preparation")
        .parent(100)
        .assignee("tanaka")
        .start(date(2024, 2, 1))
        .due(date(2024, 2, 5))
        .closed(date(2024, 2, 5))
        .done_ratio(80);
    let install = Issue::new(102, "Installation")
        .parent(100)
        .assignee("sato")
        .start(date(2024, 2, 6))
        .due(date(2024, 2, 20))
        .done_ratio(25);

    vec![
        RowPlacement {
            row: 3,
            indent: 0,
            is_target: false,
            issue: parent,
        },
        RowPlacement {
            row: 4,
            indent: 1,
            is_target: true,
            issue: prep,
        },
        RowPlacement {
            row: 5,
            indent: 1,
            is_target: true,
            issue: install,
        },
    ]
}

fn sample_grid() -> Vec<redgantt_render::GridColumn> {
    let range = GanttRange::new(date(2024, 1, 29), date(2024, 2, 25)).unwrap();
    let calendar = HolidayCalendar::new(vec![date(2024, 2, 12)]);
    map_date_grid(&range, &calendar)
}

#[test]
fn renders_report_to_bytes() {
    let writer = ReportWriter::new("https://tracker.example.com/issues/")
        .font_name("Meiryo UI")
        .tab_title("Rollout");

    let bytes = writer
        .render_to_bytes(&sample_rows(), &sample_grid())
        .expect("report should render");

    // XLSX files are zip archives
    assert!(bytes.len() > 1000);
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn renders_without_optional_settings() {
    let writer = ReportWriter::new("https://tracker.example.com/issues/");

    let bytes = writer
        .render_to_bytes(&sample_rows(), &sample_grid())
        .expect("defaults should render");
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn renders_empty_row_set() {
    let writer = ReportWriter::new("https://tracker.example.com/issues/").tab_title("Empty");

    // No data rows: headers and date grid only, no conditional formats
    let bytes = writer
        .render_to_bytes(&[], &sample_grid())
        .expect("empty report should render");
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn renders_rows_with_missing_fields() {
    let bare = Issue::new(200, "Unscheduled work");
    let rows = vec![RowPlacement {
        row: 3,
        indent: 0,
        is_target: true,
        issue: bare,
    }];

    let writer = ReportWriter::new("https://tracker.example.com/issues/");
    let bytes = writer
        .render_to_bytes(&rows, &sample_grid())
        .expect("blank optional fields should render");
    assert_eq!(&bytes[0..2], b"PK");
}

#[test]
fn build_workbook_exposes_the_sheet() {
    let writer = ReportWriter::new("https://tracker.example.com/issues/").tab_title("Rollout");
    let mut workbook = writer
        .build_workbook(&sample_rows(), &sample_grid())
        .expect("workbook should build");

    assert!(workbook.worksheet_from_name("Rollout").is_ok());
}
