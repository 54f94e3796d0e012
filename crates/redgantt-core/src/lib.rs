//! # redgantt-core
//!
//! Core domain model for the redgantt report generator.
//!
//! This crate provides:
//! - The [`Issue`] model mirroring the tracker fields the report consumes
//! - The [`IssueRepository`] trait and its caching decorator
//! - [`HolidayCalendar`] and [`GanttRange`] for the date grid
//! - Error types shared across the pipeline
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use redgantt_core::Issue;
//!
//! let issue = Issue::new(42, "Implement importer")
//!     .assignee("mika")
//!     .start(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap())
//!     .due(NaiveDate::from_ymd_opt(2024, 3, 8).unwrap())
//!     .done_ratio(40);
//! assert_eq!(issue.effective_done_ratio(), Some(40));
//! ```

mod calendar;
mod error;
mod issue;
mod repo;
mod report;

pub use calendar::{GanttRange, HolidayCalendar};
pub use error::{ResolveError, ReversedRange, TrackerError};
pub use issue::{Issue, IssueId};
pub use repo::{CachedRepository, FilterCriteria, IssueRepository};
pub use report::RowPlacement;
