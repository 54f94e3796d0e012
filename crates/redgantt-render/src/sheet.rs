//! XLSX gantt report writer
//!
//! Lays a resolved issue forest out as a single worksheet: a two-row merged
//! title header over the seven issue columns, a month/day date header over
//! the gantt grid, one row per issue, and the conditional-format rule set
//! that turns the grid into bars.
//!
//! ## Sheet Layout
//!
//! ```text
//! |  #  | Subject      | Assigned | Start      | Due        | Closed | Done(%) | 02 ...     |
//! |     |              |          |            |            |        |         | 01  02  03 |
//! | 101 | Rollout      | sato     | 2024/02/01 | 2024/02/20 |        | 40%     | ########## |
//! | 102 |   Site prep  | tanaka   | 2024/02/01 | 2024/02/05 |        | 100%    | ####       |
//! ```
//!
//! Issue numbers link back to the tracker, subjects are indented one level
//! per hierarchy depth, and rows for issues that only appear as ancestors of
//! a filter hit get a grey subject fill. Holiday columns are tinted pink in
//! both the day header and the grid body.

use rust_xlsxwriter::{
    ConditionalFormatDataBar, ConditionalFormatFormula, ConditionalFormatType, Format, FormatAlign,
    FormatBorder, FormatPattern, FormatUnderline, Url, Workbook, Worksheet,
};

use redgantt_core::RowPlacement;

use crate::grid::{GridColumn, GANTT_START_COL};
use crate::rules::{self, CellRegion, FillPattern, FormatRule, DAY_HEADER_ROW, MONTH_HEADER_ROW};
use crate::RenderError;

const SUBJECT_SHADE: u32 = 0xD9D9D9;
const LINK_COLOR: u32 = 0x0563C1;
const GRID_BORDER_COLOR: u32 = 0xAAAAAA;
const HOLIDAY_BODY_FILL: u32 = 0xFFDCFF;
const HOLIDAY_HEADER_FILL: u32 = 0xFFCCFF;

const TITLE_HEADERS: [&str; 7] = ["#", "Subject", "Assigned", "Start", "Due", "Closed", "Done(%)"];
const FIXED_COLUMN_WIDTHS: [f64; 7] = [8.0, 50.0, 16.0, 12.0, 12.0, 12.0, 12.0];
const DAY_COLUMN_WIDTH: f64 = 4.0;

/// Gantt report writer
#[derive(Clone, Debug)]
pub struct ReportWriter {
    /// Font applied to every written cell
    pub font_name: Option<String>,
    /// Worksheet tab title
    pub tab_title: Option<String>,
    /// Base URL for issue hyperlinks, e.g. `https://tracker.example.com/issues/`
    pub link_url: String,
}

impl ReportWriter {
    pub fn new(link_url: impl Into<String>) -> Self {
        Self {
            font_name: None,
            tab_title: None,
            link_url: link_url.into(),
        }
    }

    /// Set the cell font
    pub fn font_name(mut self, name: impl Into<String>) -> Self {
        self.font_name = Some(name.into());
        self
    }

    /// Set the worksheet tab title
    pub fn tab_title(mut self, title: impl Into<String>) -> Self {
        self.tab_title = Some(title.into());
        self
    }

    /// Build the report workbook from laid-out rows and a mapped date grid.
    pub fn build_workbook(
        &self,
        rows: &[RowPlacement],
        grid: &[GridColumn],
    ) -> Result<Workbook, RenderError> {
        let mut workbook = Workbook::new();
        let formats = self.create_formats();

        let sheet = workbook.add_worksheet();
        if let Some(title) = &self.tab_title {
            sheet
                .set_name(title)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        self.write_title_row(sheet, &formats)?;
        self.write_date_header(sheet, grid, &formats)?;

        for placement in rows {
            self.write_issue_row(sheet, placement, &formats)?;
        }

        let last_row = rows.iter().map(|p| p.row).max();
        if let Some(max_row) = last_row {
            let min_row = rows.iter().map(|p| p.row).min().unwrap_or(max_row);
            self.paint_grid_body(sheet, grid, min_row, max_row, &formats)?;

            if let (Some(first), Some(last)) = (grid.first(), grid.last()) {
                let rule_set = rules::generate_rules(min_row, max_row, first.index, last.index);
                self.apply_rules(sheet, &rule_set)?;
            }

            // Filter on the day-header row so date columns stay filter-free
            sheet
                .autofilter(DAY_HEADER_ROW - 1, 0, max_row - 1, 6)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }

        // Keep the issue columns and both header rows in view
        sheet.set_freeze_panes(2, GANTT_START_COL - 1).ok();

        Ok(workbook)
    }

    /// Build the workbook and serialize it to XLSX bytes.
    pub fn render_to_bytes(
        &self,
        rows: &[RowPlacement],
        grid: &[GridColumn],
    ) -> Result<Vec<u8>, RenderError> {
        let mut workbook = self.build_workbook(rows, grid)?;
        let buffer = workbook
            .save_to_buffer()
            .map_err(|e| RenderError::Format(format!("Failed to create workbook: {e}")))?;
        Ok(buffer)
    }

    fn base_format(&self) -> Format {
        match &self.font_name {
            Some(name) => Format::new().set_font_name(name),
            None => Format::new(),
        }
    }

    /// Create reusable formats
    fn create_formats(&self) -> ReportFormats {
        let centered = self
            .base_format()
            .set_align(FormatAlign::Center)
            .set_align(FormatAlign::VerticalCenter);

        let header = centered.clone();

        let link = centered
            .clone()
            .set_font_color(LINK_COLOR)
            .set_underline(FormatUnderline::Single);

        let subject = self.base_format().set_align(FormatAlign::VerticalCenter);

        let subject_shaded = subject.clone().set_background_color(SUBJECT_SHADE);

        let date = centered.clone().set_num_format("yyyy/mm/dd");

        let percent = centered.clone().set_num_format("0%");

        let month = centered.clone().set_num_format("mm");

        let day = centered.clone().set_num_format("dd");

        let day_holiday = day.clone().set_background_color(HOLIDAY_HEADER_FILL);

        let grid_cell = Format::new()
            .set_border(FormatBorder::Thin)
            .set_border_color(GRID_BORDER_COLOR);

        let grid_holiday = grid_cell.clone().set_background_color(HOLIDAY_BODY_FILL);

        ReportFormats {
            header,
            link,
            subject,
            subject_shaded,
            centered,
            date,
            percent,
            month,
            day,
            day_holiday,
            grid_cell,
            grid_holiday,
        }
    }

    /// Write the merged two-row title header over columns A-G
    fn write_title_row(
        &self,
        sheet: &mut Worksheet,
        formats: &ReportFormats,
    ) -> Result<(), RenderError> {
        for (col, header) in TITLE_HEADERS.iter().enumerate() {
            let col = col as u16;
            sheet
                .merge_range(0, col, 1, col, header, &formats.header)
                .map_err(|e| RenderError::Format(e.to_string()))?;
            sheet.set_column_width(col, FIXED_COLUMN_WIDTHS[col as usize]).ok();
        }
        Ok(())
    }

    /// Write the month/day header rows over the gantt grid
    fn write_date_header(
        &self,
        sheet: &mut Worksheet,
        grid: &[GridColumn],
        formats: &ReportFormats,
    ) -> Result<(), RenderError> {
        for column in grid {
            let col = column.index - 1;
            sheet.set_column_width(col, DAY_COLUMN_WIDTH).ok();

            if column.is_month_boundary {
                sheet
                    .write_datetime_with_format(MONTH_HEADER_ROW - 1, col, &column.date, &formats.month)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }

            let day_format = if column.is_holiday {
                &formats.day_holiday
            } else {
                &formats.day
            };
            sheet
                .write_datetime_with_format(DAY_HEADER_ROW - 1, col, &column.date, day_format)
                .map_err(|e| RenderError::Format(e.to_string()))?;
        }
        Ok(())
    }

    /// Write one issue row into columns A-G
    fn write_issue_row(
        &self,
        sheet: &mut Worksheet,
        placement: &RowPlacement,
        formats: &ReportFormats,
    ) -> Result<(), RenderError> {
        let row = placement.row - 1;
        let issue = &placement.issue;

        let url = Url::new(format!("{}{}", self.link_url, issue.id)).set_text(issue.id.to_string());
        sheet
            .write_url_with_format(row, 0, url, &formats.link)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        // Ancestors pulled in only to complete the tree get a grey subject
        let subject_base = if placement.is_target {
            &formats.subject
        } else {
            &formats.subject_shaded
        };
        let subject_format = subject_base
            .clone()
            .set_indent(placement.indent.min(u16::from(u8::MAX)) as u8);
        sheet
            .write_with_format(row, 1, &issue.subject, &subject_format)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        sheet
            .write_with_format(row, 2, issue.assignee.as_deref().unwrap_or(""), &formats.centered)
            .map_err(|e| RenderError::Format(e.to_string()))?;

        let date_columns = [(3, issue.start_date), (4, issue.due_date), (5, issue.closed_on)];
        for (col, value) in date_columns {
            match value {
                Some(date) => sheet
                    .write_datetime_with_format(row, col, &date, &formats.date)
                    .map_err(|e| RenderError::Format(e.to_string()))?,
                None => sheet
                    .write_blank(row, col, &formats.centered)
                    .map_err(|e| RenderError::Format(e.to_string()))?,
            };
        }

        match issue.effective_done_ratio() {
            Some(ratio) => sheet
                .write_with_format(row, 6, f64::from(ratio) / 100.0, &formats.percent)
                .map_err(|e| RenderError::Format(e.to_string()))?,
            None => sheet
                .write_blank(row, 6, &formats.percent)
                .map_err(|e| RenderError::Format(e.to_string()))?,
        };

        Ok(())
    }

    /// Border every grid cell in the data region and tint holiday columns
    fn paint_grid_body(
        &self,
        sheet: &mut Worksheet,
        grid: &[GridColumn],
        min_row: u32,
        max_row: u32,
        formats: &ReportFormats,
    ) -> Result<(), RenderError> {
        for row in min_row..=max_row {
            for column in grid {
                let format = if column.is_holiday {
                    &formats.grid_holiday
                } else {
                    &formats.grid_cell
                };
                sheet
                    .write_blank(row - 1, column.index - 1, format)
                    .map_err(|e| RenderError::Format(e.to_string()))?;
            }
        }
        Ok(())
    }

    /// Apply the generated rule set as worksheet conditional formats
    fn apply_rules(&self, sheet: &mut Worksheet, rule_set: &[FormatRule]) -> Result<(), RenderError> {
        for rule in rule_set {
            match rule {
                FormatRule::ProgressBar { region, color } => {
                    let bar = ConditionalFormatDataBar::new()
                        .set_minimum(ConditionalFormatType::Number, 0)
                        .set_maximum(ConditionalFormatType::Number, 1)
                        .set_fill_color(*color);
                    Self::add_conditional(sheet, region, &bar)?;
                }
                FormatRule::Formula { region, formula, fill } => {
                    let format = match fill.pattern {
                        FillPattern::Solid => Format::new().set_background_color(fill.color),
                        FillPattern::LightGray => Format::new()
                            .set_pattern(FormatPattern::LightGray)
                            .set_foreground_color(fill.color),
                    };
                    let conditional = ConditionalFormatFormula::new()
                        .set_rule(formula.as_str())
                        .set_format(format);
                    Self::add_conditional(sheet, region, &conditional)?;
                }
            }
        }
        Ok(())
    }

    fn add_conditional<T: rust_xlsxwriter::ConditionalFormat + Send>(
        sheet: &mut Worksheet,
        region: &CellRegion,
        conditional: &T,
    ) -> Result<(), RenderError> {
        sheet
            .add_conditional_format(
                region.first_row - 1,
                region.first_col - 1,
                region.last_row - 1,
                region.last_col - 1,
                conditional,
            )
            .map_err(|e| RenderError::Format(e.to_string()))?;
        Ok(())
    }
}

/// Reusable cell formats for one report
struct ReportFormats {
    header: Format,
    link: Format,
    subject: Format,
    subject_shaded: Format,
    centered: Format,
    date: Format,
    percent: Format,
    month: Format,
    day: Format,
    day_holiday: Format,
    grid_cell: Format,
    grid_holiday: Format,
}
