//! # redgantt-render
//!
//! XLSX gantt report generation for laid-out issue rows.
//!
//! This crate provides:
//! - Date-grid mapping: one worksheet column per calendar day
//! - A declarative conditional-format rule set for gantt bars
//! - The worksheet writer producing the final workbook
//!
//! ## Example
//!
//! ```rust,ignore
//! use redgantt_core::{GanttRange, HolidayCalendar};
//! use redgantt_render::{map_date_grid, ReportWriter};
//!
//! let grid = map_date_grid(&range, &calendar);
//! let writer = ReportWriter::new("https://tracker.example.com/issues/")
//!     .font_name("Meiryo UI")
//!     .tab_title("Rollout");
//! let xlsx_bytes = writer.render_to_bytes(&rows, &grid)?;
//! std::fs::write("rollout.xlsx", xlsx_bytes)?;
//! ```

use thiserror::Error;

mod grid;
mod rules;
mod sheet;

pub use grid::{map_date_grid, GridColumn, GANTT_START_COL};
pub use rules::{col_letter, generate_rules, CellRegion, FillPattern, FillTreatment, FormatRule};
pub use sheet::ReportWriter;

/// Rendering error
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Format error: {0}")]
    Format(String),
}
