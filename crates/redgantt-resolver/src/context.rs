//! Run-scoped resolution state
//!
//! The original per-run bookkeeping (which ids were matched by the filter,
//! which already own a row) is global mutable state in spirit; here it is an
//! explicit context object owned by the orchestrator and threaded through
//! every resolver and layout call. Single-threaded, single-writer, no
//! locking.

use std::collections::HashSet;

use redgantt_core::{CachedRepository, Issue, IssueId};

/// Ids returned directly by the filter query, in first-encounter order.
///
/// Fixed for the run. Order matters: roots are visited in the order their
/// originating target was first seen here.
#[derive(Clone, Debug, Default)]
pub struct TargetSet {
    order: Vec<IssueId>,
    members: HashSet<IssueId>,
}

impl TargetSet {
    pub fn from_issues(issues: &[Issue]) -> Self {
        let mut set = Self::default();
        for issue in issues {
            set.insert(issue.id);
        }
        set
    }

    /// Record a target id; duplicates keep their first position.
    pub fn insert(&mut self, id: IssueId) {
        if self.members.insert(id) {
            self.order.push(id);
        }
    }

    pub fn contains(&self, id: IssueId) -> bool {
        self.members.contains(&id)
    }

    /// Iterate in first-encounter order.
    pub fn iter(&self) -> impl Iterator<Item = IssueId> + '_ {
        self.order.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Ids that have already been assigned a row.
///
/// Grows monotonically; registering an id twice is a no-op, not an error.
#[derive(Clone, Debug, Default)]
pub struct RegisteredSet {
    members: HashSet<IssueId>,
}

impl RegisteredSet {
    /// Returns true if the id was newly registered, false if it already
    /// owned a row.
    pub fn register(&mut self, id: IssueId) -> bool {
        self.members.insert(id)
    }

    pub fn contains(&self, id: IssueId) -> bool {
        self.members.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }
}

/// Everything a run mutates: the fetch cache, the target set and the
/// registered set. Created once per run by the orchestrator.
pub struct RunContext<R> {
    pub repo: CachedRepository<R>,
    pub targets: TargetSet,
    pub registered: RegisteredSet,
}

impl<R: redgantt_core::IssueRepository> RunContext<R> {
    pub fn new(repo: R) -> Self {
        Self {
            repo: CachedRepository::new(repo),
            targets: TargetSet::default(),
            registered: RegisteredSet::default(),
        }
    }

    /// Record filter results: seed the cache and fill the target set.
    pub fn adopt_targets(&mut self, issues: Vec<Issue>) {
        for issue in issues {
            self.targets.insert(issue.id);
            self.repo.seed(issue);
        }
    }
}
