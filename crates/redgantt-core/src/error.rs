//! Error types shared across the pipeline

use chrono::NaiveDate;
use thiserror::Error;

use crate::issue::IssueId;

/// Failure talking to the issue tracker.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error("issue #{0} not found")]
    NotFound(IssueId),

    #[error("tracker rejected the credentials")]
    Auth,

    #[error("tracker request failed: {0}")]
    Transport(String),
}

/// Failure resolving the issue hierarchy.
///
/// A cyclic parent chain is reported distinctly from a missing issue: the
/// tracker is assumed acyclic, but the climb must terminate either way.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("cyclic parent chain through issues {0:?}")]
    CyclicHierarchy(Vec<IssueId>),

    #[error(transparent)]
    Tracker(#[from] TrackerError),
}

/// A gantt interval whose start lies after its end.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("gantt range start {start} is after end {end}")]
pub struct ReversedRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}
