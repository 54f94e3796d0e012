//! Format rule generation
//!
//! Produces the ordered, declarative highlighting rules the sheet writer
//! feeds to the spreadsheet engine. Gantt bar rules are spreadsheet
//! formulas evaluated per cell against the column's date in the day header
//! and the row's start/due/ratio columns; their insertion order carries
//! first-match-wins semantics, so completed must precede incomplete must
//! precede future.

/// Row holding month labels.
pub const MONTH_HEADER_ROW: u32 = 1;
/// Row holding day-of-month labels; gantt formulas anchor on it.
pub const DAY_HEADER_ROW: u32 = 2;

/// Fixed report columns, 1-based.
pub const ID_COL: u16 = 1;
pub const SUBJECT_COL: u16 = 2;
pub const ASSIGNEE_COL: u16 = 3;
pub const START_DATE_COL: u16 = 4;
pub const DUE_DATE_COL: u16 = 5;
pub const CLOSED_DATE_COL: u16 = 6;
pub const DONE_RATIO_COL: u16 = 7;

/// Gantt bar palette.
pub const PROGRESS_BAR_COLOR: u32 = 0x31869B;
pub const COMPLETED_FILL: u32 = 0x8888FF;
pub const INCOMPLETE_FILL: u32 = 0xFF8888;
pub const FUTURE_FILL: u32 = 0xCCCCCC;
pub const TODAY_FILL: u32 = 0x31869B;
pub const OVERDUE_FILL: u32 = 0xFFFF88;

/// A rectangular cell region, 1-based inclusive on both axes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CellRegion {
    pub first_row: u32,
    pub first_col: u16,
    pub last_row: u32,
    pub last_col: u16,
}

impl CellRegion {
    pub fn new(first_row: u32, first_col: u16, last_row: u32, last_col: u16) -> Self {
        Self {
            first_row,
            first_col,
            last_row,
            last_col,
        }
    }
}

/// How a matched cell is painted.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillPattern {
    Solid,
    LightGray,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FillTreatment {
    pub pattern: FillPattern,
    pub color: u32,
}

/// One declarative (region, condition, treatment) rule.
#[derive(Clone, Debug, PartialEq)]
pub enum FormatRule {
    /// In-cell data bar over the done-ratio column, scaled 0-1.
    ProgressBar { region: CellRegion, color: u32 },
    /// Formula rule; the formula is anchored at the region's first row and
    /// the spreadsheet engine shifts relative references per cell.
    Formula {
        region: CellRegion,
        formula: String,
        fill: FillTreatment,
    },
}

/// Spreadsheet column letter for a 1-based column index.
pub fn col_letter(col: u16) -> String {
    let mut col = col;
    let mut letters = Vec::new();
    while col > 0 {
        let rem = (col - 1) % 26;
        letters.push(char::from(b'A' + rem as u8));
        col = (col - 1) / 26;
    }
    letters.iter().rev().collect()
}

/// Generate the full ordered rule set for a report whose data rows span
/// `[min_row, max_row]` and whose grid columns span `[first_col, last_col]`.
pub fn generate_rules(min_row: u32, max_row: u32, first_col: u16, last_col: u16) -> Vec<FormatRule> {
    let h = col_letter(first_col);
    let r = min_row;
    let solid = |color| FillTreatment {
        pattern: FillPattern::Solid,
        color,
    };

    let grid = CellRegion::new(min_row, first_col, max_row, last_col);
    // Today marker also covers the day header row above the data region
    let grid_with_day_header = CellRegion::new(DAY_HEADER_ROW, first_col, max_row, last_col);
    let due_column = CellRegion::new(min_row, DUE_DATE_COL, max_row, DUE_DATE_COL);
    let ratio_column = CellRegion::new(min_row, DONE_RATIO_COL, max_row, DONE_RATIO_COL);

    vec![
        FormatRule::ProgressBar {
            region: ratio_column,
            color: PROGRESS_BAR_COLOR,
        },
        // Completed part of the bar, scaled by done ratio
        FormatRule::Formula {
            region: grid,
            formula: format!(
                "=AND($D{r}<={h}$2,{h}$2<=ROUNDDOWN(($E{r}-$D{r}+1)*$G{r},0)+$D{r}-1)"
            ),
            fill: solid(COMPLETED_FILL),
        },
        // Whole planned span; loses to the completed rule where both match
        FormatRule::Formula {
            region: grid,
            formula: format!("=AND($D{r}<={h}$2,{h}$2<=$E{r})"),
            fill: solid(INCOMPLETE_FILL),
        },
        // Span lying entirely in the future
        FormatRule::Formula {
            region: grid,
            formula: format!("=AND($D{r}<={h}$2,{h}$2<=$E{r},TODAY()<{h}$2)"),
            fill: solid(FUTURE_FILL),
        },
        FormatRule::Formula {
            region: grid_with_day_header,
            formula: format!("=AND({h}$2=TODAY())"),
            fill: FillTreatment {
                pattern: FillPattern::LightGray,
                color: TODAY_FILL,
            },
        },
        // Due date passed without completion
        FormatRule::Formula {
            region: due_column,
            formula: format!("=AND($E{r}<>\"\",$E{r}<TODAY(),$G{r}<1)"),
            fill: solid(OVERDUE_FILL),
        },
    ]
}
