//! Issue model
//!
//! A deliberately small mirror of the tracker's issue resource: only the
//! fields the report renders. Every non-identity field is optional because
//! the tracker omits unset attributes entirely; an absent value renders as a
//! blank cell, never as zero.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Unique identifier for an issue
pub type IssueId = u64;

/// A single tracker issue with its hierarchy links.
///
/// `children_ids` is populated lazily as child enumerations are fetched;
/// the order is the repository's delivery order and is preserved through
/// layout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier
    pub id: IssueId,
    /// Issue subject line
    pub subject: String,
    /// Assignee display name, if assigned
    pub assignee: Option<String>,
    /// Planned start date
    pub start_date: Option<NaiveDate>,
    /// Planned due date
    pub due_date: Option<NaiveDate>,
    /// Date the issue was closed
    pub closed_on: Option<NaiveDate>,
    /// Completion percentage 0-100
    pub done_ratio: Option<u8>,
    /// Direct parent issue
    pub parent_id: Option<IssueId>,
    /// Direct children, repository enumeration order
    pub children_ids: Vec<IssueId>,
}

impl Issue {
    /// Create a new issue with the given id and subject
    pub fn new(id: IssueId, subject: impl Into<String>) -> Self {
        Self {
            id,
            subject: subject.into(),
            assignee: None,
            start_date: None,
            due_date: None,
            closed_on: None,
            done_ratio: None,
            parent_id: None,
            children_ids: Vec::new(),
        }
    }

    /// Set the assignee
    pub fn assignee(mut self, name: impl Into<String>) -> Self {
        self.assignee = Some(name.into());
        self
    }

    /// Set the start date
    pub fn start(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self
    }

    /// Set the due date
    pub fn due(mut self, date: NaiveDate) -> Self {
        self.due_date = Some(date);
        self
    }

    /// Set the closed date
    pub fn closed(mut self, date: NaiveDate) -> Self {
        self.closed_on = Some(date);
        self
    }

    /// Set the completion percentage
    pub fn done_ratio(mut self, ratio: u8) -> Self {
        self.done_ratio = Some(ratio);
        self
    }

    /// Set the parent issue
    pub fn parent(mut self, id: IssueId) -> Self {
        self.parent_id = Some(id);
        self
    }

    /// Append a child issue id
    pub fn child(mut self, id: IssueId) -> Self {
        self.children_ids.push(id);
        self
    }

    /// Completion percentage as it should be rendered.
    ///
    /// A closed issue always reports 100 regardless of the stored ratio;
    /// otherwise the stored ratio (clamped to 100) or `None` when unset.
    pub fn effective_done_ratio(&self) -> Option<u8> {
        if self.closed_on.is_some() {
            return Some(100);
        }
        self.done_ratio.map(|r| r.min(100))
    }

    /// Check if this issue has a parent link
    pub fn has_parent(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Check if any children have been recorded for this issue
    pub fn has_children(&self) -> bool {
        !self.children_ids.is_empty()
    }
}
